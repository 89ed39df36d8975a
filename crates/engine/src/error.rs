//! The module contains the errors the engine can throw.
//!
//! Conflict-style errors ([`OperationInUse`], [`AlreadyActive`], [`Consumed`])
//! are expected, recoverable outcomes: the caller is supposed to surface them
//! and let the operator pick another option.
//!
//! [`OperationInUse`]: EngineError::OperationInUse
//! [`AlreadyActive`]: EngineError::AlreadyActive
//! [`Consumed`]: EngineError::Consumed
use sea_orm::DbErr;
use thiserror::Error;

use crate::OperationKind;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Another shift already holds the requested operation type. Carries the
    /// holder's user id so the caller can tell the operator who blocks them.
    #[error("operation '{operation}' is already in use by \"{holder}\"")]
    OperationInUse {
        operation: OperationKind,
        holder: String,
    },
    /// The caller already runs an active shift.
    #[error("\"{0}\" already has an active shift")]
    AlreadyActive(String),
    /// The record was consumed by a closing and is immutable.
    #[error("record already consumed by closing \"{0}\"")]
    Consumed(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    /// A lifecycle transition was requested from the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::OperationInUse {
                    operation: a,
                    holder: ha,
                },
                Self::OperationInUse {
                    operation: b,
                    holder: hb,
                },
            ) => a == b && ha == hb,
            (Self::AlreadyActive(a), Self::AlreadyActive(b)) => a == b,
            (Self::Consumed(a), Self::Consumed(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
