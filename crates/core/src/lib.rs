//! Proximity resolution over heterogeneous knowledge sources.
//!
//! A [`Resolver`] takes an origin and a radius, builds the query for the
//! selected source, runs it against the local station graph or the remote
//! geospatial endpoint and returns a distance-ranked list of candidates.

pub mod candidate;
pub mod config;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod query;
pub mod resolver;

pub use candidate::{Candidate, PlaceKind, ProximityQuery, RankedResult, SourceKind, SourceTag};
pub use config::{Dialect, MAX_PLACE_RESULTS, NearbyConfig, RemoteEndpointConfig};
pub use error::{QueryExecutionError, ResolveError, Result};
pub use fetch::HttpFetcher;
pub use resolver::Resolver;

// Re-export the graph crate
pub use nearby_graph as graph;
