//! Error types for proximity resolution.

use nearby_graph::GraphError;

use crate::candidate::SourceTag;

#[derive(Clone, Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid radius: {0} km (must be a finite number greater than zero)")]
    InvalidRadius(f64),

    #[error("Invalid coordinate: longitude {longitude}, latitude {latitude}")]
    InvalidCoordinate { longitude: f64, latitude: f64 },

    #[error("Invalid query parameter `{name}`: {value}")]
    InvalidQueryParameter { name: &'static str, value: f64 },

    #[error("Invalid place kind: {0}")]
    InvalidPlaceKind(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error(transparent)]
    QueryExecution(#[from] QueryExecutionError),
}

/// Transport or parse failure of a single query
#[derive(Clone, Debug, thiserror::Error)]
#[error("{data_source} query failed: {cause}")]
pub struct QueryExecutionError {
    pub data_source: SourceTag,
    pub cause: String,
}

impl QueryExecutionError {
    pub fn new(data_source: SourceTag, cause: impl ToString) -> Self {
        Self {
            data_source,
            cause: cause.to_string(),
        }
    }
}

impl From<GraphError> for ResolveError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::InvalidRadius(radius) => ResolveError::InvalidRadius(radius),
            GraphError::InvalidCoordinate { longitude, latitude } => {
                ResolveError::InvalidCoordinate { longitude, latitude }
            }
            GraphError::InvalidQueryParameter { name, value } => {
                ResolveError::InvalidQueryParameter { name, value }
            }
            GraphError::SourceUnavailable(reason) => ResolveError::SourceUnavailable(reason),
            other @ (GraphError::FetchFailed { .. } | GraphError::DecodeError(_)) => {
                ResolveError::SourceUnavailable(other.to_string())
            }
        }
    }
}

impl ResolveError {
    /// Bad caller input, as opposed to a source that could not answer
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidRadius(_)
                | ResolveError::InvalidCoordinate { .. }
                | ResolveError::InvalidQueryParameter { .. }
                | ResolveError::InvalidPlaceKind(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
