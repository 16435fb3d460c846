use serde::Deserialize;

use crate::libraries::radius::{RadiusPolicy, RadiusPolicyError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    // Radius used when a nearby search omits `radius`
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,

    // Exclusive lower bound of accepted search radii
    #[serde(default = "default_min_radius_km")]
    pub min_radius_km: f64,

    // Inclusive upper bound of accepted search radii
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,

    // Upper bound on request bodies buffered by the coordinate middleware
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    /// Build the radius acceptance policy, rejecting inconsistent bounds.
    pub fn radius_policy(&self) -> Result<RadiusPolicy, RadiusPolicyError> {
        RadiusPolicy::new(
            self.min_radius_km,
            self.max_radius_km,
            self.default_radius_km,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            default_radius_km: default_radius_km(),
            min_radius_km: default_min_radius_km(),
            max_radius_km: default_max_radius_km(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_radius_km() -> f64 {
    3.0
}

fn default_min_radius_km() -> f64 {
    0.1
}

fn default_max_radius_km() -> f64 {
    5.0
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}
