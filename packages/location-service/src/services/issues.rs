use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::libraries::geo_utils::{
    get_bounding_box, haversine_distance_km, wrap_longitude, EARTH_RADIUS_KM,
};
use crate::models::{BoundingBox, Coordinate, GeoError, Issue, NewIssue};

/// Storage collaborator for reported issues.
///
/// Consumes coordinates and radii already validated by the location
/// middleware; it never sees raw request input.
pub trait IssueStore: Send + Sync {
    fn insert(&self, report: NewIssue) -> Issue;

    fn get(&self, id: &Uuid) -> Option<Issue>;

    /// Issues whose stored location falls inside `bbox`
    fn find_in_bounding_box(&self, bbox: &BoundingBox) -> Vec<Issue>;

    /// Issues within `radius_km` of `center`, nearest first
    fn find_within_radius(&self, center: &Coordinate, radius_km: f64) -> Vec<Issue> {
        let Ok(bbox) = search_box(center, radius_km) else {
            return Vec::new();
        };

        let mut matches: Vec<(f64, Issue)> = self
            .find_in_bounding_box(&bbox)
            .into_iter()
            .map(|issue| {
                let distance = haversine_distance_km(center, &issue.location.as_coordinate());
                (distance, issue)
            })
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();

        matches.sort_by(|a, b| a.0.total_cmp(&b.0));
        matches.into_iter().map(|(_, issue)| issue).collect()
    }
}

/// Prefilter box for a radius search.
///
/// Latitude bounds match [`get_bounding_box`]. The longitude half-width is
/// asin(sin δ / cos φ), the true extent of the circle, which grows past
/// δ / cos φ as the center nears a pole.
pub fn search_box(center: &Coordinate, radius_km: f64) -> Result<BoundingBox, GeoError> {
    let bbox = get_bounding_box(center, radius_km)?;
    if bbox.spans_all_longitudes() {
        return Ok(bbox);
    }

    let angular = radius_km / EARTH_RADIUS_KM;
    let ratio = angular.sin() / center.latitude.to_radians().cos();
    if !ratio.is_finite() || ratio >= 1.0 {
        return Ok(BoundingBox {
            east: 180.0,
            west: -180.0,
            ..bbox
        });
    }

    let delta_lng = ratio.asin().to_degrees();
    Ok(BoundingBox {
        east: wrap_longitude(center.longitude + delta_lng),
        west: wrap_longitude(center.longitude - delta_lng),
        ..bbox
    })
}

/// In-process issue store
#[derive(Default)]
pub struct InMemoryIssueStore {
    issues: RwLock<HashMap<Uuid, Issue>>,
}

impl InMemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.issues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IssueStore for InMemoryIssueStore {
    fn insert(&self, report: NewIssue) -> Issue {
        let issue = Issue::new(report);
        let mut issues = self.issues.write().unwrap_or_else(PoisonError::into_inner);
        issues.insert(issue.id, issue.clone());
        issue
    }

    fn get(&self, id: &Uuid) -> Option<Issue> {
        let issues = self.issues.read().unwrap_or_else(PoisonError::into_inner);
        issues.get(id).cloned()
    }

    fn find_in_bounding_box(&self, bbox: &BoundingBox) -> Vec<Issue> {
        let issues = self.issues.read().unwrap_or_else(PoisonError::into_inner);
        issues
            .values()
            .filter(|issue| bbox.contains(&issue.location.as_coordinate()))
            .cloned()
            .collect()
    }
}
