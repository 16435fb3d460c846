use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    libraries::geo_utils::{calculate_bearing, get_bounding_box, haversine_distance_km, km_to_meters},
    models::{
        Issue, NearbyIssue, NearbyIssuesResponse, NewIssue, NormalizedCoordinate, Notification,
        ReportIssueRequest, SearchRadius,
    },
    state::AppState,
};

/// Report a new issue at the coordinates validated by the middleware
pub async fn create_issue(
    State(state): State<AppState>,
    Extension(coordinates): Extension<NormalizedCoordinate>,
    Json(request): Json<ReportIssueRequest>,
) -> Result<(StatusCode, Json<Issue>), StatusCode> {
    let report = NewIssue {
        title: request.title,
        description: request.description,
        category: request.category,
        location: coordinates,
    };

    if let Err(e) = report.validate() {
        warn!("Rejecting issue report: {}", e);
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let issue = state.issues.insert(report);
    info!(
        "Created issue {} at ({}, {})",
        issue.id,
        issue.location.latitude(),
        issue.location.longitude()
    );

    let notification = Notification::system(
        "New issue reported",
        format!("{} was reported nearby", issue.title),
    )
    .for_issue(issue.id);
    let delivered = state.notifications.publish(&notification);
    debug!("Issue {} notification delivered to {} listeners", issue.id, delivered);

    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Issue>, StatusCode> {
    state.issues.get(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// List issues within the validated radius of the validated center
pub async fn nearby_issues(
    State(state): State<AppState>,
    Extension(coordinates): Extension<NormalizedCoordinate>,
    Extension(radius): Extension<SearchRadius>,
) -> Result<Json<NearbyIssuesResponse>, StatusCode> {
    let center = coordinates.as_coordinate();

    let bounding_box = get_bounding_box(&center, radius.km()).map_err(|e| {
        error!("Failed to derive bounding box for validated input: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let issues: Vec<NearbyIssue> = state
        .issues
        .find_within_radius(&center, radius.km())
        .into_iter()
        .map(|issue| {
            let location = issue.location.as_coordinate();
            NearbyIssue {
                distance_meters: km_to_meters(haversine_distance_km(&center, &location)),
                bearing_degrees: calculate_bearing(&center, &location),
                issue,
            }
        })
        .collect();

    debug!(
        "Found {} issues within {} km of ({}, {})",
        issues.len(),
        radius.km(),
        coordinates.latitude(),
        coordinates.longitude()
    );

    Ok(Json(NearbyIssuesResponse {
        coordinates,
        radius,
        bounding_box,
        total_count: issues.len(),
        issues,
    }))
}
