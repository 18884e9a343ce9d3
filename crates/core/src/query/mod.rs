//! Source-specific query construction.
//!
//! Builders are pure: they validate their numeric inputs and return a query
//! object whose `Display` output is the text sent to (or logged for) the
//! source. Nothing here touches the network or the graph store.

pub mod place;
pub mod station;

pub use place::{RadiusQuery, place_query};
pub use station::{BoundingBoxQuery, station_query};
