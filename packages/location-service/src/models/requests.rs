use serde::{Deserialize, Serialize};

use super::issue::{Issue, IssueCategory};
use super::location::{BoundingBox, NormalizedCoordinate};

/// Validated search radius in kilometers, attached to the request as `radius`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchRadius(pub(crate) f64);

impl SearchRadius {
    pub fn km(&self) -> f64 {
        self.0
    }
}

/// Body of `POST /api/issues`; `lat`/`lng` are consumed by the coordinate middleware
#[derive(Debug, Clone, Deserialize)]
pub struct ReportIssueRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: IssueCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub distance_meters: f64,
    pub bearing_degrees: f64, // From the search center to the issue
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyIssuesResponse {
    pub coordinates: NormalizedCoordinate,
    pub radius: SearchRadius,
    pub bounding_box: BoundingBox,
    pub issues: Vec<NearbyIssue>,
    pub total_count: usize,
}
