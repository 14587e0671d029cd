//! Browser upload form.

use axum::response::{Html, IntoResponse};

const UPLOAD_FORM_HTML: &str = include_str!("../../static/index.html");

/// GET / - Upload form
pub async fn form_handler() -> impl IntoResponse {
    Html(UPLOAD_FORM_HTML)
}
