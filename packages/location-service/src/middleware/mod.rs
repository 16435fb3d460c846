pub mod location;

pub use location::{validate_coordinates, validate_radius};
