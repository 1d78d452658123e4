//! Request and result types for the operation layer.
//!
//! # Design
//! Results derive `Serialize` so an entry point can hand them to whatever
//! transport it speaks without a translation layer. `NoteRequest` derives
//! `Deserialize` with defaults for the optional parts, which is the shape
//! batch input arrives in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Field name to field text. Ordered so that case-insensitive matching
/// picks the same key on every run when several differ only in case.
pub type Fields = BTreeMap<String, String>;

/// One note the caller wants created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRequest {
    pub deck: String,
    pub note_type: String,
    pub fields: Fields,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Overrides the batch-wide default when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_duplicate: Option<bool>,
}

impl NoteRequest {
    pub fn new(deck: &str, note_type: &str, fields: Fields) -> Self {
        Self {
            deck: deck.to_string(),
            note_type: note_type.to_string(),
            fields,
            tags: Vec::new(),
            allow_duplicate: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_allow_duplicate(mut self, allow: bool) -> Self {
        self.allow_duplicate = Some(allow);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckList {
    pub decks: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckCreated {
    pub deck_id: i64,
    pub name: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteCreated {
    pub note_id: i64,
    pub deck: String,
    pub note_type: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteTypeList {
    pub note_types: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSearch {
    pub note_ids: Vec<i64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesDeleted {
    pub note_ids: Vec<i64>,
    pub count: usize,
    pub success: bool,
}

/// One field of a stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteField {
    pub value: String,
    /// Position in the note type's schema.
    pub order: u32,
}

/// A stored note as `notesInfo` reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct NoteInfo {
    pub note_id: i64,
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub fields: BTreeMap<String, NoteField>,
}

impl NoteInfo {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDetails {
    pub notes: Vec<NoteInfo>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteUpdated {
    pub note_id: i64,
    /// Field names sent, after matching against the note's own fields.
    pub fields: Vec<String>,
    pub success: bool,
}

/// What happened to one request of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NoteOutcome {
    Created { note_id: i64 },
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteResult {
    /// Position of the request in the batch input.
    pub index: usize,
    pub deck: String,
    pub note_type: String,
    #[serde(flatten)]
    pub outcome: NoteOutcome,
}

impl NoteResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, NoteOutcome::Created { .. })
    }

    pub fn note_id(&self) -> Option<i64> {
        match self.outcome {
            NoteOutcome::Created { note_id } => Some(note_id),
            NoteOutcome::Failed { .. } => None,
        }
    }
}

/// Results of a batch, aligned by position with the requests attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub results: Vec<NoteResult>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub stopped_early: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_request_optional_parts_default() {
        let req: NoteRequest = serde_json::from_str(
            r#"{"deck":"Spanish","note_type":"Basic","fields":{"Front":"hola","Back":"hello"}}"#,
        )
        .unwrap();
        assert_eq!(req.deck, "Spanish");
        assert!(req.tags.is_empty());
        assert_eq!(req.allow_duplicate, None);
        assert_eq!(req.fields["Front"], "hola");
    }

    #[test]
    fn note_request_rejects_missing_fields_key() {
        let result: Result<NoteRequest, _> =
            serde_json::from_str(r#"{"deck":"Spanish","note_type":"Basic"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn note_info_reads_camel_case_and_writes_snake_case() {
        let info: NoteInfo = serde_json::from_str(
            r#"{"noteId":7,"modelName":"Basic","tags":[],"fields":{"Front":{"value":"q","order":0}},"cards":[9]}"#,
        )
        .unwrap();
        assert_eq!(info.field("Front"), Some("q"));
        assert_eq!(info.field("Back"), None);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["note_id"], 7);
        assert_eq!(json["model_name"], "Basic");
    }

    #[test]
    fn failed_result_flattens_outcome() {
        let result = NoteResult {
            index: 2,
            deck: "Math".into(),
            note_type: "Basic".into(),
            outcome: NoteOutcome::Failed {
                kind: ErrorKind::DuplicateOrRejected,
                message: "dup".into(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "duplicate_or_rejected");
        assert!(json.get("note_id").is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn created_result_exposes_note_id() {
        let result = NoteResult {
            index: 0,
            deck: "Math".into(),
            note_type: "Basic".into(),
            outcome: NoteOutcome::Created { note_id: 42 },
        };
        assert_eq!(result.note_id(), Some(42));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["note_id"], 42);
    }
}
