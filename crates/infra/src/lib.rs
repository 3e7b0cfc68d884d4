//! Infrastructure layer: config, collaborator stores, model persistence,
//! trigger log, dashboard aggregation.

pub mod config;
pub mod dashboard;
pub mod directory;
pub mod models;
pub mod seed;
pub mod triggers;

pub use config::HrisConfig;
pub use dashboard::{DashboardAggregator, DashboardError, DashboardSnapshot, EmployeePrediction, PayrollChartPoint};
