use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{FromRequestParts, Query, RawPathParams, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::{
    libraries::{
        geo_utils::{self, normalize_coordinates, parse_coordinate_value},
        radius::RadiusPolicy,
    },
    models::{NormalizedCoordinate, SearchRadius, ValidationError},
    state::AppState,
};

pub const LATITUDE_PARAM: &str = "lat";
pub const LONGITUDE_PARAM: &str = "lng";
pub const RADIUS_PARAM: &str = "radius";

/// Where a coordinate pair was read from, in lookup order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Body,
    Query,
    Path,
}

/// Candidate location parameters gathered from one request.
///
/// Values stay loosely typed here; [`extract_coordinates`] and
/// [`extract_radius`] are the only way to turn them into typed values.
#[derive(Debug, Clone, Default)]
pub struct LocationParams {
    pub body: Option<Map<String, Value>>,
    pub query: HashMap<String, String>,
    pub path: HashMap<String, String>,
}

impl LocationParams {
    /// Gather parameters from request parts and an already-buffered body.
    ///
    /// A body declared as JSON that does not parse is rejected rather than
    /// treated as absent.
    pub async fn from_parts(parts: &mut Parts, body: &Bytes) -> Result<Self, ValidationError> {
        let path = RawPathParams::from_request_parts(parts, &())
            .await
            .map(|params| {
                params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            body: json_object(body, is_json_content(&parts.headers))?,
            query: query_params(&parts.uri),
            path,
        })
    }

    fn lookup(&self, source: ParamSource, key: &str) -> Option<Value> {
        match source {
            ParamSource::Body => self
                .body
                .as_ref()
                .and_then(|body| body.get(key))
                .filter(|value| !value.is_null())
                .cloned(),
            ParamSource::Query => self.query.get(key).cloned().map(Value::String),
            ParamSource::Path => self.path.get(key).cloned().map(Value::String),
        }
    }

    /// First source supplying either coordinate key; that source supplies both
    fn coordinate_candidates(&self) -> Option<(ParamSource, Option<Value>, Option<Value>)> {
        [ParamSource::Body, ParamSource::Query, ParamSource::Path]
            .into_iter()
            .map(|source| {
                (
                    source,
                    self.lookup(source, LATITUDE_PARAM),
                    self.lookup(source, LONGITUDE_PARAM),
                )
            })
            .find(|(_, lat, lng)| lat.is_some() || lng.is_some())
    }
}

fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Top-level object of a JSON body, if any.
///
/// Parse failures are only an error when the request declared a JSON body;
/// otherwise the body is ignored and lookup falls back to query and path.
fn json_object(
    body: &Bytes,
    declared_json: bool,
) -> Result<Option<Map<String, Value>>, ValidationError> {
    if body.is_empty() {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Ok(None),
        Err(e) if declared_json => Err(ValidationError::invalid_coordinates(format!(
            "Request body is not valid JSON: {}",
            e
        ))),
        Err(_) => Ok(None),
    }
}

fn query_params(uri: &Uri) -> HashMap<String, String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default()
}

/// Validate and normalize the request's coordinate pair
pub fn extract_coordinates(
    params: &LocationParams,
) -> Result<(ParamSource, NormalizedCoordinate), ValidationError> {
    let Some((source, lat, lng)) = params.coordinate_candidates() else {
        return Err(ValidationError::invalid_coordinates(
            "Latitude (lat) and longitude (lng) are required",
        ));
    };

    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ValidationError::invalid_coordinates(
            "Both latitude (lat) and longitude (lng) must be provided",
        ));
    };

    if !geo_utils::validate_coordinates(&lat, &lng) {
        return Err(ValidationError::invalid_coordinates(
            "Invalid coordinates: latitude must be between -90 and 90, longitude between -180 and 180",
        ));
    }

    let normalized = match (parse_coordinate_value(&lat), parse_coordinate_value(&lng)) {
        (Some(lat), Some(lng)) => normalize_coordinates(lat, lng)
            .map_err(|e| ValidationError::invalid_coordinates(e.to_string()))?,
        _ => {
            return Err(ValidationError::invalid_coordinates(
                "Coordinates must be numeric",
            ))
        }
    };

    Ok((source, normalized))
}

/// Validate the request's search radius against `policy`
pub fn extract_radius(
    params: &LocationParams,
    policy: &RadiusPolicy,
) -> Result<SearchRadius, ValidationError> {
    policy
        .resolve(params.query.get(RADIUS_PARAM).map(String::as_str))
        .map(SearchRadius)
        .map_err(ValidationError::invalid_radius)
}

/// Gate a route on a valid coordinate pair.
///
/// Looks for `lat`/`lng` in the JSON body, then the query string, then path
/// parameters. On success the [`NormalizedCoordinate`] is inserted into the
/// request extensions and the body is handed on untouched.
pub async fn validate_coordinates(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Rejecting request to {}: unreadable body: {}", parts.uri, e);
            return ValidationError::invalid_coordinates("Request body could not be read")
                .into_response();
        }
    };

    let coordinates = LocationParams::from_parts(&mut parts, &bytes)
        .await
        .and_then(|params| extract_coordinates(&params));

    match coordinates {
        Ok((source, coordinates)) => {
            debug!(
                "Accepted coordinates ({}, {}) from {:?}",
                coordinates.latitude(),
                coordinates.longitude(),
                source
            );
            parts.extensions.insert(coordinates);
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(e) => {
            warn!("Rejecting request to {}: {}", parts.uri, e);
            e.into_response()
        }
    }
}

/// Gate a route on an accepted `radius` query parameter (default applied when absent)
pub async fn validate_radius(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let params = LocationParams {
        query: query_params(request.uri()),
        ..LocationParams::default()
    };

    match extract_radius(&params, &state.radius_policy) {
        Ok(radius) => {
            debug!("Accepted search radius {} km", radius.km());
            request.extensions_mut().insert(radius);
            next.run(request).await
        }
        Err(e) => {
            warn!("Rejecting request to {}: {}", request.uri(), e);
            e.into_response()
        }
    }
}
