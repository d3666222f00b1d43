// Graph error types - crate-wide error enum and result alias

use std::fmt;

#[derive(Debug)]
pub enum GraphError {
    /// Failure inside the HTTP transport or another collaborator; carried
    /// unmodified.
    Transport(anyhow::Error),
    /// Structured error payload returned by the remote API.
    Api {
        code: i64,
        kind: String,
        message: String,
    },
    /// Requested insights span exceeds the supported window. Never retried
    /// or truncated; chunking large ranges is out of scope.
    RangeTooLarge { days: i64 },
    /// A batched metric fetch came back with fewer datasets than requested.
    PartialBatch { requested: usize, received: usize },
    InvalidDate(String),
    Url(String),
    Deserialization(String),
    Config(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Transport(err) => write!(f, "Transport error: {}", err),
            GraphError::Api {
                code,
                kind,
                message,
            } => write!(f, "Graph API error {} ({}): {}", code, kind, message),
            GraphError::RangeTooLarge { days } => {
                write!(f, "Date range of {} days exceeds the 93 day window", days)
            }
            GraphError::PartialBatch {
                requested,
                received,
            } => write!(
                f,
                "Batched fetch returned {} of {} requested datasets",
                received, requested
            ),
            GraphError::InvalidDate(raw) => write!(f, "Unrecognized date: {}", raw),
            GraphError::Url(msg) => write!(f, "URL error: {}", msg),
            GraphError::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            GraphError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for GraphError {
    fn from(err: anyhow::Error) -> Self {
        GraphError::Transport(err)
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        GraphError::Transport(err.into())
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Deserialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GraphError {
    fn from(err: chrono::ParseError) -> Self {
        GraphError::InvalidDate(err.to_string())
    }
}

impl From<url::ParseError> for GraphError {
    fn from(err: url::ParseError) -> Self {
        GraphError::Url(err.to_string())
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
