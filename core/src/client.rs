//! Remote client for the AnkiConnect JSON-over-HTTP API.
//!
//! # Design
//! Every AnkiConnect action is a POST of `{"action", "version", "params"}`
//! answered by `{"result", "error"}`. `build_request` and `parse_response`
//! handle that envelope as plain data; `invoke` glues them around a
//! `Transport`. The typed helpers below `invoke` only decode the
//! action-specific `result` shape.
//!
//! A failed attempt is surfaced immediately. There is no retry: the usual
//! cause is Anki not running, which a retry window will not fix.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::classify::{classify_add_note_result, classify_remote_error};
use crate::config::{ClientConfig, API_VERSION};
use crate::error::BridgeError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Fields, NoteInfo};

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    action: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a Value>,
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Payload of `addNote`, in AnkiConnect's camelCase shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnkiNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: Fields,
    pub tags: Vec<String>,
    pub options: AnkiNoteOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnkiNoteOptions {
    pub allow_duplicate: bool,
    pub duplicate_scope: String,
}

impl AnkiNoteOptions {
    /// Duplicates are checked within the target deck only.
    pub fn deck_scoped(allow_duplicate: bool) -> Self {
        Self {
            allow_duplicate,
            duplicate_scope: "deck".to_string(),
        }
    }
}

/// Synchronous client bound to one AnkiConnect endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl RemoteClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self { config, transport }
    }
}

impl<T: Transport> RemoteClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_request(&self, action: &str, params: Option<&Value>) -> Result<HttpRequest, BridgeError> {
        let envelope = RequestEnvelope {
            action,
            version: API_VERSION,
            params,
        };
        let body = serde_json::to_string(&envelope).map_err(|e| BridgeError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            url: self.config.url.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }

    /// Unwrap the response envelope of `action` into its `result`, or a
    /// classified error.
    pub fn parse_response(&self, action: &str, response: HttpResponse) -> Result<Value, BridgeError> {
        if response.status != 200 {
            return Err(BridgeError::InvalidResponse(format!(
                "HTTP {}: {}",
                response.status, response.body
            )));
        }
        let envelope: ResponseEnvelope =
            serde_json::from_str(&response.body).map_err(|e| BridgeError::InvalidResponse(e.to_string()))?;
        match envelope.error {
            Some(message) => Err(classify_remote_error(action, &message)),
            None => Ok(envelope.result),
        }
    }

    #[instrument(level = "debug", skip(self, params))]
    pub fn invoke(&self, action: &str, params: Option<Value>) -> Result<Value, BridgeError> {
        let request = self.build_request(action, params.as_ref())?;
        let response = self.transport.execute(request)?;
        let result = self.parse_response(action, response);
        match &result {
            Ok(_) => debug!("action succeeded"),
            Err(err) => debug!(%err, "action failed"),
        }
        result
    }

    /// True when the service answers a `version` query. Never fails.
    pub fn check_connection(&self) -> bool {
        match self.version() {
            Ok(version) => {
                if version != API_VERSION {
                    warn!(version, expected = API_VERSION, "unexpected AnkiConnect version");
                }
                true
            }
            Err(err) => {
                debug!(%err, url = %self.config.url, "AnkiConnect is not reachable");
                false
            }
        }
    }

    pub fn version(&self) -> Result<u32, BridgeError> {
        self.invoke_as("version", None)
    }

    pub fn deck_names(&self) -> Result<Vec<String>, BridgeError> {
        self.invoke_as("deckNames", None)
    }

    /// Create `name` if absent; returns the deck id either way.
    pub fn create_deck(&self, name: &str) -> Result<i64, BridgeError> {
        self.invoke_as("createDeck", Some(json!({ "deck": name })))
    }

    pub fn model_names(&self) -> Result<Vec<String>, BridgeError> {
        self.invoke_as("modelNames", None)
    }

    /// Declared field names of a note type, in schema order. A missing note
    /// type surfaces either as an error or as `null`/empty depending on the
    /// AnkiConnect release; both come back as an empty list or
    /// `NoteTypeNotFound`.
    pub fn model_field_names(&self, model_name: &str) -> Result<Vec<String>, BridgeError> {
        let result = self.invoke("modelFieldNames", Some(json!({ "modelName": model_name })))?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        decode("modelFieldNames", result)
    }

    pub fn add_note(&self, note: &AnkiNote) -> Result<i64, BridgeError> {
        let params = json!({ "note": note });
        let result = self.invoke("addNote", Some(params))?;
        classify_add_note_result(&result)
    }

    pub fn find_notes(&self, query: &str) -> Result<Vec<i64>, BridgeError> {
        self.invoke_as("findNotes", Some(json!({ "query": query })))
    }

    /// Full records for `note_ids`, in request order. AnkiConnect answers an
    /// unknown id with an empty object in its slot.
    pub fn notes_info(&self, note_ids: &[i64]) -> Result<Vec<NoteInfo>, BridgeError> {
        let result = self.invoke("notesInfo", Some(json!({ "notes": note_ids })))?;
        let slots: Vec<Value> = decode("notesInfo", result)?;
        slots
            .into_iter()
            .filter(|slot| slot.as_object().is_some_and(|o| !o.is_empty()))
            .map(|slot| decode("notesInfo", slot))
            .collect()
    }

    /// Overwrite the given fields of one note; fields left out keep their value.
    pub fn update_note_fields(&self, note_id: i64, fields: &Fields) -> Result<(), BridgeError> {
        let params = json!({ "note": { "id": note_id, "fields": fields } });
        self.invoke("updateNoteFields", Some(params))?;
        Ok(())
    }

    pub fn delete_notes(&self, note_ids: &[i64]) -> Result<(), BridgeError> {
        self.invoke("deleteNotes", Some(json!({ "notes": note_ids })))?;
        Ok(())
    }

    fn invoke_as<D: DeserializeOwned>(&self, action: &str, params: Option<Value>) -> Result<D, BridgeError> {
        let result = self.invoke(action, params)?;
        decode(action, result)
    }
}

fn decode<D: DeserializeOwned>(action: &str, value: Value) -> Result<D, BridgeError> {
    serde_json::from_value(value).map_err(|e| BridgeError::InvalidResponse(format!("{action}: {e}")))
}
