//! User-facing operations on top of `RemoteClient`.
//!
//! # Design
//! Each operation is a short sequence of blocking client calls. Note
//! creation fetches the note type's schema on every call, maps caller keys
//! onto it case-insensitively and provisions the target deck when missing.
//! Batch creation is a plain sequential loop: AnkiConnect runs inside a
//! single desktop process and makes no promise about concurrent requests,
//! and results must line up with the input by position.

use tracing::{debug, info, instrument, warn};

use crate::client::{AnkiNote, AnkiNoteOptions, RemoteClient};
use crate::config::ClientConfig;
use crate::error::BridgeError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    BatchResult, DeckCreated, DeckList, Fields, NoteCreated, NoteOutcome, NoteRequest, NoteResult,
    NoteDetails, NoteSearch, NoteTypeList, NoteUpdated, NotesDeleted,
};

pub struct Operations<T = UreqTransport> {
    client: RemoteClient<T>,
}

impl Operations<UreqTransport> {
    pub fn connect(config: ClientConfig) -> Self {
        Self::new(RemoteClient::new(config))
    }
}

impl<T: Transport> Operations<T> {
    pub fn new(client: RemoteClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RemoteClient<T> {
        &self.client
    }

    pub fn check_connection(&self) -> bool {
        self.client.check_connection()
    }

    /// Deck names in the order AnkiConnect reports them.
    pub fn list_decks(&self) -> Result<DeckList, BridgeError> {
        let decks = self.client.deck_names()?;
        Ok(DeckList {
            count: decks.len(),
            decks,
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn create_deck(&self, name: &str) -> Result<DeckCreated, BridgeError> {
        require("deck name", name)?;
        let deck_id = self.client.create_deck(name)?;
        info!(deck = name, deck_id, "deck ready");
        Ok(DeckCreated {
            deck_id,
            name: name.to_string(),
            success: true,
        })
    }

    #[instrument(level = "debug", skip(self, fields, tags))]
    pub fn create_note(
        &self,
        deck: &str,
        note_type: &str,
        fields: &Fields,
        tags: &[String],
        allow_duplicate: bool,
    ) -> Result<NoteCreated, BridgeError> {
        require("deck name", deck)?;
        require("note type", note_type)?;
        if fields.is_empty() {
            return Err(BridgeError::InvalidArgument("fields are required".to_string()));
        }

        let schema = self.client.model_field_names(note_type)?;
        if schema.is_empty() {
            return Err(BridgeError::NoteTypeNotFound(note_type.to_string()));
        }
        let normalized = normalize_fields(&schema, fields);

        if !self.client.deck_names()?.iter().any(|d| d == deck) {
            debug!(deck, "deck missing, creating it");
            self.create_deck(deck)?;
        }

        let note = AnkiNote {
            deck_name: deck.to_string(),
            model_name: note_type.to_string(),
            fields: normalized,
            tags: tags.to_vec(),
            options: AnkiNoteOptions::deck_scoped(allow_duplicate),
        };
        let note_id = self.client.add_note(&note)?;
        info!(note_id, "note created");
        Ok(NoteCreated {
            note_id,
            deck: deck.to_string(),
            note_type: note_type.to_string(),
            success: true,
        })
    }

    /// Create notes one at a time, recording one result per attempted
    /// request. Notes created before a failure stay created.
    pub fn batch_create_notes(
        &self,
        notes: &[NoteRequest],
        allow_duplicate: bool,
        stop_on_error: bool,
    ) -> Result<BatchResult, BridgeError> {
        if notes.is_empty() {
            return Err(BridgeError::InvalidArgument("notes list cannot be empty".to_string()));
        }

        let mut results = Vec::with_capacity(notes.len());
        let mut succeeded = 0;
        let mut failed = 0;
        let mut stopped_early = false;

        for (index, request) in notes.iter().enumerate() {
            let outcome = self.create_note(
                &request.deck,
                &request.note_type,
                &request.fields,
                &request.tags,
                request.allow_duplicate.unwrap_or(allow_duplicate),
            );
            let outcome = match outcome {
                Ok(created) => {
                    succeeded += 1;
                    NoteOutcome::Created {
                        note_id: created.note_id,
                    }
                }
                Err(err) => {
                    failed += 1;
                    warn!(index, %err, "batch note failed");
                    NoteOutcome::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    }
                }
            };
            let is_failure = matches!(outcome, NoteOutcome::Failed { .. });
            results.push(NoteResult {
                index,
                deck: request.deck.clone(),
                note_type: request.note_type.clone(),
                outcome,
            });
            if is_failure && stop_on_error {
                stopped_early = true;
                break;
            }
        }

        info!(attempted = results.len(), succeeded, failed, stopped_early, "batch finished");
        Ok(BatchResult {
            attempted: results.len(),
            results,
            succeeded,
            failed,
            stopped_early,
        })
    }

    pub fn list_note_types(&self) -> Result<NoteTypeList, BridgeError> {
        let note_types = self.client.model_names()?;
        Ok(NoteTypeList {
            count: note_types.len(),
            note_types,
        })
    }

    /// Note ids matching an Anki search query such as `deck:Spanish`.
    pub fn find_notes(&self, query: &str) -> Result<NoteSearch, BridgeError> {
        require("query", query)?;
        let note_ids = self.client.find_notes(query)?;
        Ok(NoteSearch {
            count: note_ids.len(),
            note_ids,
        })
    }

    pub fn notes_info(&self, note_ids: &[i64]) -> Result<NoteDetails, BridgeError> {
        if note_ids.is_empty() {
            return Err(BridgeError::InvalidArgument("note ids are required".to_string()));
        }
        let notes = self.client.notes_info(note_ids)?;
        Ok(NoteDetails {
            count: notes.len(),
            notes,
        })
    }

    /// Overwrite some fields of an existing note. Keys are matched against
    /// the note's own fields the same way `create_note` matches a schema;
    /// fields not named keep their current text.
    #[instrument(level = "debug", skip(self, fields))]
    pub fn update_note_fields(&self, note_id: i64, fields: &Fields) -> Result<NoteUpdated, BridgeError> {
        if fields.is_empty() {
            return Err(BridgeError::InvalidArgument("fields are required".to_string()));
        }
        let Some(note) = self.client.notes_info(&[note_id])?.into_iter().next() else {
            return Err(BridgeError::RemoteActionError(format!("note was not found: {note_id}")));
        };
        let declared: Vec<String> = note.fields.keys().cloned().collect();
        let matched: Fields = declared
            .iter()
            .filter_map(|name| lookup_field(name, fields).map(|value| (name.clone(), value.clone())))
            .collect();
        if matched.is_empty() {
            return Err(BridgeError::InvalidArgument(format!(
                "none of the supplied fields exist on note {note_id}"
            )));
        }

        self.client.update_note_fields(note_id, &matched)?;
        info!(note_id, updated = matched.len(), "note fields updated");
        Ok(NoteUpdated {
            note_id,
            fields: matched.into_keys().collect(),
            success: true,
        })
    }

    pub fn delete_notes(&self, note_ids: &[i64]) -> Result<NotesDeleted, BridgeError> {
        if note_ids.is_empty() {
            return Err(BridgeError::InvalidArgument("note ids are required".to_string()));
        }
        self.client.delete_notes(note_ids)?;
        info!(count = note_ids.len(), "notes deleted");
        Ok(NotesDeleted {
            note_ids: note_ids.to_vec(),
            count: note_ids.len(),
            success: true,
        })
    }
}

/// Map supplied fields onto a note type's declared fields.
///
/// For each declared field an exact key wins, then the first key equal
/// ignoring case; fields with no match get `""`. Supplied keys that match
/// nothing are dropped.
pub fn normalize_fields(schema: &[String], supplied: &Fields) -> Fields {
    schema
        .iter()
        .map(|declared| {
            let value = lookup_field(declared, supplied).cloned().unwrap_or_default();
            (declared.clone(), value)
        })
        .collect()
}

fn lookup_field<'a>(declared: &str, supplied: &'a Fields) -> Option<&'a String> {
    supplied.get(declared).or_else(|| {
        let declared = declared.to_lowercase();
        supplied
            .iter()
            .find(|(key, _)| key.to_lowercase() == declared)
            .map(|(_, value)| value)
    })
}

fn require(what: &str, value: &str) -> Result<(), BridgeError> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidArgument(format!("{what} is required")));
    }
    Ok(())
}
