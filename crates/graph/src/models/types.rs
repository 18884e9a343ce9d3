//! Core error type for graph data.

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid radius: {0} km (must be a finite number greater than zero)")]
    InvalidRadius(f64),

    #[error("Invalid coordinate: longitude {longitude}, latitude {latitude}")]
    InvalidCoordinate { longitude: f64, latitude: f64 },

    #[error("Invalid query parameter `{name}`: {value}")]
    InvalidQueryParameter { name: &'static str, value: f64 },

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Decode error: {0}")]
    DecodeError(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GraphError::InvalidRadius(-1.0);
        assert!(err.to_string().contains("-1 km"));

        let err = GraphError::FetchFailed {
            url: "https://graph.irail.be/sncb/stops".into(),
            reason: "HTTP 503".into(),
        };
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://graph.irail.be/sncb/stops: HTTP 503"
        );
    }
}
