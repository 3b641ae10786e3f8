use crate::mapping::MappingError;
use crate::parameters::{BoundsError, ExpressionError, ParamError};
use thiserror::Error;

/// Error types for the dspace-rs library.
#[derive(Error, Debug)]
pub enum SpaceError {
    /// Error while building, linking or ordering a design space.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Error while resolving a constructor or instantiating a parameter.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Error while parsing or evaluating a bound expression.
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Error for invalid bounds.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpaceError {
    /// Id of the parameter the error is about, if it names one
    pub fn param_id(&self) -> Option<&str> {
        match self {
            SpaceError::Mapping(err) => Some(err.param_id()),
            SpaceError::Param(
                ParamError::DuplicateId { id }
                | ParamError::ParameterNotFound { id }
                | ParamError::BoundEvaluation { id, .. }
                | ParamError::InvalidBounds { id, .. },
            ) => Some(id),
            _ => None,
        }
    }
}

/// Result type alias for dspace-rs operations.
pub type Result<T> = std::result::Result<T, SpaceError>;
