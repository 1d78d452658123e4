//! Error types for the AnkiConnect bridge.
//!
//! # Design
//! AnkiConnect reports every failure through a single `error: string|null`
//! field. The client maps that flat channel into distinct variants at the
//! boundary (see `classify`) so callers can tell "rejected as a likely
//! duplicate" apart from "the service is not running" without string
//! matching of their own.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by the remote client and the operation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Caller-supplied input failed a structural precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested note type has no schema in the collection.
    #[error("note type '{0}' does not exist")]
    NoteTypeNotFound(String),

    /// The service declined to add a note without a hard failure.
    #[error("note was not added (likely a duplicate): {0}")]
    DuplicateOrRejected(String),

    /// The service could not be reached or did not answer in time.
    #[error(
        "failed to connect to AnkiConnect ({0}); ensure Anki is running with the AnkiConnect add-on enabled"
    )]
    ConnectionError(String),

    /// The service answered with a non-null `error`, preserved verbatim.
    #[error("AnkiConnect error: {0}")]
    RemoteActionError(String),

    /// Non-200 status or a body that is not a valid response envelope.
    #[error("invalid response from AnkiConnect: {0}")]
    InvalidResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BridgeError::NoteTypeNotFound(_) => ErrorKind::NoteTypeNotFound,
            BridgeError::DuplicateOrRejected(_) => ErrorKind::DuplicateOrRejected,
            BridgeError::ConnectionError(_) => ErrorKind::ConnectionError,
            BridgeError::RemoteActionError(_) => ErrorKind::RemoteActionError,
            BridgeError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            BridgeError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Serializable discriminant of `BridgeError`, carried by failed batch items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NoteTypeNotFound,
    DuplicateOrRejected,
    ConnectionError,
    RemoteActionError,
    InvalidResponse,
    Serialization,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            BridgeError::DuplicateOrRejected("x".into()).kind(),
            ErrorKind::DuplicateOrRejected
        );
        assert_eq!(
            BridgeError::ConnectionError("refused".into()).kind(),
            ErrorKind::ConnectionError
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_value(ErrorKind::NoteTypeNotFound).unwrap();
        assert_eq!(json, "note_type_not_found");
    }

    #[test]
    fn remote_message_is_preserved_verbatim() {
        let err = BridgeError::RemoteActionError("deck name is invalid".into());
        assert_eq!(err.to_string(), "AnkiConnect error: deck name is invalid");
    }
}
