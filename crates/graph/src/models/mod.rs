//! Graph data models and error types.

pub mod binding;
pub mod term;
pub mod types;

// Re-exports for convenience
pub use binding::Binding;
pub use term::{escape_string_literal, Literal, Term, Triple};
pub use types::{GraphError, Result};
