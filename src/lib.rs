pub mod analytics;
pub mod api;
pub mod app;
pub mod chart;
pub mod clipboard;
pub mod config;
pub mod errors;
pub mod models;
pub mod shorten;
pub mod state;
pub mod stats;
pub mod ui;
pub mod validation;

pub use analytics::AnalyticsController;
pub use api::ApiClient;
pub use app::run;
pub use config::{Cli, Config};
pub use errors::AppError;
pub use shorten::ShortenController;
