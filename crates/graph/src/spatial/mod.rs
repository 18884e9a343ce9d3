//! Spatial indexing and geo math.

pub mod index;
pub mod queries;

pub use queries::{
    buffer_bounding_box, buffer_polygon, great_circle_distance_km, BoundingBox, GeoPoint,
};
