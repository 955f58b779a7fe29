use clap::Parser;
use database::Database;
use std::path::PathBuf;
use std::time::Instant;

pub mod feed;

pub use feed::{ChangeFeed, RecordChange, Subscription};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub feed: ChangeFeed,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config,
            feed: ChangeFeed::new(),
            started_at: Instant::now(),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:finance.db")]
    pub database_url: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Directory holding the template lists and daily snapshot files.
    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Static UI assets served for any path the API does not claim.
    #[arg(long, env = "STATIC_DIR", default_value = "./public")]
    pub static_dir: PathBuf,
}

impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            port: 0,
            data_dir: std::env::temp_dir(),
            static_dir: PathBuf::from("public"),
        }
    }
}
