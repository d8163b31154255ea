use thiserror::Error;

use crate::category::CategoryId;
use crate::model::Phase;

/// Failure reported by an engine implementation for a single request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine unreachable: {0}")]
    Unreachable(String),

    #[error("request `{request}` rejected: {reason}")]
    Rejected { request: String, reason: String },

    #[error("malformed response to `{request}`: {reason}")]
    Malformed { request: String, reason: String },
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("transport error: {0}")]
    Transport(#[from] EngineError),

    #[error("invalid category summary: {message}")]
    Validation { message: String },

    #[error("unknown category `{category}`")]
    NotFound { category: String },

    #[error("deletion failed with {} categories completed: {source}", .completed.len())]
    Deletion {
        completed: Vec<CategoryId>,
        #[source]
        source: EngineError,
    },

    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    #[error("no categories selected for deletion")]
    NothingSelected,

    #[error("malformed `{event}` event: {reason}")]
    MalformedEvent { event: String, reason: String },
}

impl WorkflowError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            message: message.into(),
        }
    }
}
