pub mod issues;

use axum::{response::IntoResponse, Json};

pub use issues::{create_issue, get_issue, nearby_issues};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "civictrack-location",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
