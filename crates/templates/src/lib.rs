//! File-backed name lists (expense, salary and bank-expense templates) and
//! the daily snapshot log, each kept as a JSON array under the data directory.

mod files;
pub mod handler;
pub mod models;
pub mod service;

pub use handler::templates_router;
pub use models::TemplateKind;
pub use service::{TemplateError, TemplateStore};
