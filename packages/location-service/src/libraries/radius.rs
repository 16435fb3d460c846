use crate::libraries::geo_utils::parse_numeric_str;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RadiusPolicyError {
    #[error("Radius bounds must be finite numbers")]
    NonFinite,

    #[error("Invalid radius bounds: min {min_km} km must be non-negative and below max {max_km} km")]
    InvalidBounds { min_km: f64, max_km: f64 },

    #[error("Default radius {default_km} km is outside the accepted range ({range})")]
    DefaultOutOfRange { default_km: f64, range: String },
}

/// Acceptance range for neighborhood-scale search radii, in kilometers.
///
/// Radii must be strictly greater than `min_km` and at most `max_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusPolicy {
    min_km: f64,
    max_km: f64,
    default_km: f64,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self {
            min_km: 0.1,
            max_km: 5.0,
            default_km: 3.0,
        }
    }
}

impl RadiusPolicy {
    pub fn new(min_km: f64, max_km: f64, default_km: f64) -> Result<Self, RadiusPolicyError> {
        if !(min_km.is_finite() && max_km.is_finite() && default_km.is_finite()) {
            return Err(RadiusPolicyError::NonFinite);
        }
        if min_km < 0.0 || min_km >= max_km {
            return Err(RadiusPolicyError::InvalidBounds { min_km, max_km });
        }

        let policy = Self {
            min_km,
            max_km,
            default_km,
        };
        if !policy.accepts(default_km) {
            return Err(RadiusPolicyError::DefaultOutOfRange {
                default_km,
                range: policy.describe_range(),
            });
        }

        Ok(policy)
    }

    pub fn min_km(&self) -> f64 {
        self.min_km
    }

    pub fn max_km(&self) -> f64 {
        self.max_km
    }

    pub fn default_km(&self) -> f64 {
        self.default_km
    }

    pub fn accepts(&self, radius_km: f64) -> bool {
        radius_km.is_finite() && radius_km > self.min_km && radius_km <= self.max_km
    }

    /// Resolve an optional raw radius into an accepted value in kilometers.
    ///
    /// `None` resolves to the default. Unparsable or out-of-range input is
    /// returned as an error message stating the valid range.
    pub fn resolve(&self, raw: Option<&str>) -> Result<f64, String> {
        let Some(raw) = raw else {
            return Ok(self.default_km);
        };

        match parse_numeric_str(raw) {
            Some(radius) if self.accepts(radius) => Ok(radius),
            Some(radius) => Err(format!(
                "Radius {} km is out of range. Radius must be {}",
                radius,
                self.describe_range()
            )),
            None => Err(format!(
                "Radius must be a number. Radius must be {}",
                self.describe_range()
            )),
        }
    }

    pub fn describe_range(&self) -> String {
        format!(
            "greater than {} km and at most {} km",
            self.min_km, self.max_km
        )
    }
}
