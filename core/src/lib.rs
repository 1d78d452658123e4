//! Bridge from a handful of flashcard operations to the AnkiConnect API.
//!
//! # Overview
//! `RemoteClient` speaks AnkiConnect's `{action, version, params}` envelope
//! over a pluggable `Transport`; `Operations` builds the user-facing calls
//! (list/create decks, create notes singly or in batches) on top of it.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`/`HttpResponse`),
//!   so envelope handling is testable without a running Anki.
//! - `ClientConfig` is fixed at construction; there is no global endpoint.
//! - AnkiConnect's single `error` string is classified into `BridgeError`
//!   variants in one place (`classify`).
//! - Everything is synchronous and sequential.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod operations;
pub mod transport;
pub mod types;

pub use client::{AnkiNote, AnkiNoteOptions, RemoteClient};
pub use config::ClientConfig;
pub use error::{BridgeError, ErrorKind};
pub use http::{HttpRequest, HttpResponse};
pub use operations::{normalize_fields, Operations};
pub use transport::{Transport, UreqTransport};
pub use types::{
    BatchResult, DeckCreated, DeckList, Fields, NoteCreated, NoteDetails, NoteField, NoteInfo,
    NoteOutcome, NoteRequest, NoteResult, NoteSearch, NoteTypeList, NoteUpdated, NotesDeleted,
};
