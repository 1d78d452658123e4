//! Interpretation of AnkiConnect failure signals.
//!
//! AnkiConnect has one flat `error` string and, for `addNote`, a null
//! `result` when a note cannot be added. Everything that pattern-matches
//! those signals lives here so a change in the service's wording only
//! touches this module.

use serde_json::Value;

use crate::error::BridgeError;

/// Lowercased fragments AnkiConnect uses when refusing a duplicate note.
const DUPLICATE_MARKERS: &[&str] = &["duplicate"];

/// Lowercased fragments AnkiConnect uses for an unknown note type.
const MISSING_MODEL_MARKERS: &[&str] = &["model was not found", "model not found"];

/// Action whose refusals may mean a duplicate note.
const ADD_NOTE: &str = "addNote";

/// Map a non-null envelope `error` from `action` to a typed error.
///
/// The missing-model check runs first: its message echoes the note type
/// name, which may itself contain "duplicate". Duplicate wording counts
/// only for `addNote`; other actions may echo user text that contains it.
pub fn classify_remote_error(action: &str, message: &str) -> BridgeError {
    let lowered = message.to_lowercase();
    if MISSING_MODEL_MARKERS.iter().any(|m| lowered.contains(m)) {
        return BridgeError::NoteTypeNotFound(missing_model_name(message));
    }
    if action == ADD_NOTE && DUPLICATE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return BridgeError::DuplicateOrRejected(message.to_string());
    }
    BridgeError::RemoteActionError(message.to_string())
}

/// Interpret the `result` of a successful `addNote` envelope.
pub fn classify_add_note_result(result: &Value) -> Result<i64, BridgeError> {
    match result {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| BridgeError::InvalidResponse(format!("note id out of range: {n}"))),
        Value::Null => Err(BridgeError::DuplicateOrRejected(
            "AnkiConnect could not add the note".to_string(),
        )),
        other => Err(BridgeError::InvalidResponse(format!(
            "expected a note id from addNote, got {other}"
        ))),
    }
}

// "model was not found: Foo" -> "Foo"; falls back to the whole message.
fn missing_model_name(message: &str) -> String {
    message
        .rsplit_once(':')
        .map(|(_, name)| name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(message)
        .to_string()
}
