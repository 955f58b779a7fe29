//! Month dashboards for sales, expenses and profit, their CSV exports, and
//! the live view that recomputes whenever the ledger changes.

pub mod controller;
pub mod export;
pub mod handler;
pub mod models;
pub mod service;

pub use controller::DashboardController;
pub use handler::{DashboardState, dashboard_router};
pub use service::{DashboardError, DashboardService};
