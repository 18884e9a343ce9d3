//! Structured queries over the graph store.

pub mod engine;
pub mod pattern;

pub use engine::{evaluate, BindingStream};
pub use pattern::{PatternTerm, RangeFilter, SelectQuery, TriplePattern};
