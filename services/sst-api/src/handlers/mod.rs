//! HTTP request handlers.
//!
//! - `upload`: multipart upload and render
//! - `form`: the browser upload page
//! - `health`: health check and Prometheus metrics

pub mod form;
pub mod health;
pub mod upload;

pub use form::form_handler;
pub use health::{health_handler, metrics_handler, HealthResponse};
pub use upload::upload_handler;
