use std::fmt;

/// Errors surfaced by the engine.
///
/// A hand that simply does not win is never an error; these variants are
/// reserved for malformed input and violated caller preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Tile or hand text that could not be parsed
    Parse { input: String, message: String },
    /// The caller broke an invariant the engine relies on (wrong hand size, duplicate tiles, ...)
    Precondition { message: String },
    /// JSON encoding/decoding failed at the API boundary
    Serialization { message: String },
}

impl EngineError {
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        EngineError::Precondition {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Parse { input, message } => {
                write!(f, "Parse error on '{}': {}", input, message)
            }
            EngineError::Precondition { message } => {
                write!(f, "Precondition violated: {}", message)
            }
            EngineError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
