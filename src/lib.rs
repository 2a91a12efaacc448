pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;

pub use infrastructure::axum_http;
