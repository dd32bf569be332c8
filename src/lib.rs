pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::DanfeError;
pub use service::{extract_invoice, DanfeRenderer};
