//! HTTP surface of the house price predictor

pub mod api;
pub mod config;

pub use api::{create_router, AppState};
pub use config::ServerConfig;
