//! Location validation and nearby-issue search for CivicTrack.
//!
//! Geospatial helpers live in [`libraries::geo_utils`]; the axum middleware in
//! [`middleware::location`] gates every geolocation-bearing route before it
//! reaches a handler or the issue store.

pub mod config;
pub mod handlers;
pub mod libraries;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::{create_issue, get_issue, health, nearby_issues};
use middleware::{validate_coordinates, validate_radius};

pub use config::Config;
pub use state::AppState;

/// Build the HTTP router
pub fn app(state: AppState) -> Router {
    let nearby = Router::new()
        .route("/api/issues/nearby", get(nearby_issues).post(nearby_issues))
        .route("/api/issues/near/:lat/:lng", get(nearby_issues))
        .route_layer(from_fn_with_state(state.clone(), validate_radius))
        .route_layer(from_fn_with_state(state.clone(), validate_coordinates));

    let report = Router::new()
        .route("/api/issues", post(create_issue))
        .route_layer(from_fn_with_state(state.clone(), validate_coordinates));

    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/issues/:id", get(get_issue))
        .merge(nearby)
        .merge(report)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
