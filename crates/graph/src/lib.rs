//! # nearby-graph
//!
//! In-memory knowledge graph and geographic primitives for proximity lookups.
//!
//! ## Features
//!
//! - **Geo math**: geodesic bounding boxes and great-circle distances
//! - **Graph store**: triples decoded from a JSON-LD dataset, loaded once per session
//! - **Spatial index**: R-tree over subjects carrying WGS84 coordinates
//! - **Streaming queries**: basic graph patterns with numeric range filters
//! - **Pluggable networking**: implement your own data fetching
//!
//! ## Example
//!
//! ```
//! use nearby_graph::prelude::*;
//!
//! let origin = GeoPoint::new(4.4, 51.2).unwrap();
//! let bbox = buffer_bounding_box(origin, 5.0).unwrap();
//! assert!(bbox.contains(origin));
//!
//! let antwerp_centraal = GeoPoint::new(4.421, 51.2172).unwrap();
//! let km = great_circle_distance_km(origin, antwerp_centraal);
//! assert!(km > 1.0 && km < 3.0);
//! ```

pub mod identifiers;
pub mod jsonld;
pub mod loader;
pub mod models;
pub mod network;
pub mod query;
pub mod spatial;
pub mod store;
pub mod vocab;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::loader::{LoadState, StoreLoader};
    pub use crate::models::{binding::*, term::*, types::*};
    pub use crate::network::traits::*;
    pub use crate::query::{evaluate, BindingStream, PatternTerm, RangeFilter, SelectQuery, TriplePattern};
    pub use crate::spatial::{buffer_bounding_box, great_circle_distance_km, BoundingBox, GeoPoint};
    pub use crate::store::GraphStore;
}

pub use prelude::*;
