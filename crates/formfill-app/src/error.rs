// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::SaveStatus;
use thiserror::Error;

/// Failures reported by the backend collaborators. All of them are
/// recoverable by user action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    NetworkFailure(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("rejected by server: {0}")]
    ValidationFailure(String),
}

/// Edit-session transitions that are not valid from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no record selected; pick an identifier first")]
    NothingSelected,
    #[error("cannot start editing while {0}")]
    NotIdle(SaveStatus),
    #[error("no draft to change while {0}; enter edit mode first")]
    NotEditing(SaveStatus),
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("record is still loading; wait for it before editing")]
    Loading,
}

/// Whether an asynchronous result was applied or discarded because a newer
/// request superseded it. `Stale` never reaches user-visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Stale,
}

#[cfg(test)]
mod tests {
    use super::{ApiError, EditError};
    use crate::SaveStatus;

    #[test]
    fn messages_name_the_problem() {
        let error = ApiError::NotFound("abc-123".to_owned());
        assert_eq!(error.to_string(), "record not found: abc-123");

        let edit = EditError::NotIdle(SaveStatus::Saving);
        assert_eq!(edit.to_string(), "cannot start editing while saving");
    }
}
