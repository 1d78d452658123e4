//! In-memory stand-in for the AnkiConnect add-on.
//!
//! `Collection` implements the subset of actions the bridge uses as plain
//! synchronous logic over JSON values; the axum router wraps it behind the
//! same single POST endpoint AnkiConnect exposes. Tests that do not need a
//! socket can drive `Collection::handle` directly.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

const FIRST_ID: i64 = 1_700_000_000_000;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct StoredNote {
    pub id: i64,
    pub deck: String,
    pub model: String,
    /// Field values in schema order.
    pub fields: Vec<(String, String)>,
    pub tags: Vec<String>,
}

impl StoredNote {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Collection {
    decks: Vec<(String, i64)>,
    models: Vec<(String, Vec<String>)>,
    notes: Vec<StoredNote>,
    actions: Vec<String>,
    next_id: i64,
}

impl Default for Collection {
    /// A fresh Anki profile: the `Default` deck and the stock note types.
    fn default() -> Self {
        let mut collection = Self::empty();
        collection.decks.push(("Default".to_string(), 1));
        collection.add_model("Basic", &["Front", "Back"]);
        collection.add_model("Basic (and reversed card)", &["Front", "Back"]);
        collection.add_model("Cloze", &["Text", "Back Extra"]);
        collection
    }
}

impl Collection {
    pub fn empty() -> Self {
        Self {
            decks: Vec::new(),
            models: Vec::new(),
            notes: Vec::new(),
            actions: Vec::new(),
            next_id: FIRST_ID,
        }
    }

    pub fn with_decks(mut self, names: &[&str]) -> Self {
        for name in names {
            self.ensure_deck(name);
        }
        self
    }

    pub fn add_model(&mut self, name: &str, fields: &[&str]) {
        self.models
            .push((name.to_string(), fields.iter().map(|f| f.to_string()).collect()));
    }

    pub fn deck_names(&self) -> Vec<String> {
        self.decks.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn notes(&self) -> &[StoredNote] {
        &self.notes
    }

    /// Names of every action received, in order.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Answer one request envelope with a response envelope.
    pub fn handle(&mut self, request: &Value) -> Value {
        if request.get("version").and_then(Value::as_u64) != Some(6) {
            return envelope(Err("unsupported version".to_string()));
        }
        let Some(action) = request.get("action").and_then(Value::as_str) else {
            return envelope(Err("missing action".to_string()));
        };
        let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
        self.actions.push(action.to_string());
        envelope(self.dispatch(action, &params))
    }

    fn dispatch(&mut self, action: &str, params: &Value) -> Result<Value, String> {
        match action {
            "version" => Ok(json!(6)),
            "deckNames" => Ok(json!(self.deck_names())),
            "createDeck" => {
                let name = str_param(params, "deck")?;
                if name.trim().is_empty() {
                    return Err("deck name must not be empty".to_string());
                }
                Ok(json!(self.ensure_deck(name)))
            }
            "modelNames" => Ok(json!(self
                .models
                .iter()
                .map(|(name, _)| name.clone())
                .collect::<Vec<_>>())),
            "modelFieldNames" => {
                let name = str_param(params, "modelName")?;
                self.model_fields(name)
                    .map(|fields| json!(fields))
                    .ok_or_else(|| format!("model was not found: {name}"))
            }
            "addNote" => {
                let note = params
                    .get("note")
                    .ok_or_else(|| "missing parameter: note".to_string())?;
                self.add_note(note).map(|id| json!(id))
            }
            "findNotes" => {
                let query = str_param(params, "query")?;
                Ok(json!(self.find_notes(query)))
            }
            "notesInfo" => {
                let ids = ids_param(params, "notes")?;
                Ok(json!(ids.iter().map(|id| self.note_info(*id)).collect::<Vec<_>>()))
            }
            "updateNoteFields" => {
                let note = params
                    .get("note")
                    .ok_or_else(|| "missing parameter: note".to_string())?;
                self.update_note_fields(note).map(|()| Value::Null)
            }
            "deleteNotes" => {
                let ids = ids_param(params, "notes")?;
                self.notes.retain(|n| !ids.contains(&n.id));
                Ok(Value::Null)
            }
            other => Err(format!("unsupported action: {other}")),
        }
    }

    fn ensure_deck(&mut self, name: &str) -> i64 {
        if let Some((_, id)) = self.decks.iter().find(|(n, _)| n == name) {
            return *id;
        }
        let id = self.fresh_id();
        self.decks.push((name.to_string(), id));
        id
    }

    fn model_fields(&self, name: &str) -> Option<&[String]> {
        self.models
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fields)| fields.as_slice())
    }

    fn add_note(&mut self, note: &Value) -> Result<i64, String> {
        let deck = str_param(note, "deckName")?.to_string();
        let model = str_param(note, "modelName")?.to_string();
        if !self.decks.iter().any(|(n, _)| *n == deck) {
            return Err(format!("deck was not found: {deck}"));
        }
        let schema = self
            .model_fields(&model)
            .ok_or_else(|| format!("model was not found: {model}"))?
            .to_vec();

        let supplied = note
            .get("fields")
            .and_then(Value::as_object)
            .ok_or_else(|| "missing parameter: fields".to_string())?;
        let fields: Vec<(String, String)> = schema
            .iter()
            .map(|name| {
                let value = supplied.get(name).and_then(Value::as_str).unwrap_or("");
                (name.clone(), value.to_string())
            })
            .collect();
        if fields.first().map_or(true, |(_, v)| v.is_empty()) {
            return Err("cannot create note because it is empty".to_string());
        }

        let allow_duplicate = note
            .pointer("/options/allowDuplicate")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !allow_duplicate {
            let first = &fields[0].1;
            let duplicate = self
                .notes
                .iter()
                .any(|n| n.model == model && n.deck == deck && n.fields[0].1 == *first);
            if duplicate {
                return Err("cannot create note because it is a duplicate".to_string());
            }
        }

        let tags = note
            .get("tags")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        let id = self.fresh_id();
        self.notes.push(StoredNote {
            id,
            deck,
            model,
            fields,
            tags,
        });
        Ok(id)
    }

    /// AnkiConnect's `notesInfo` record, or `{}` for an unknown id.
    fn note_info(&self, id: i64) -> Value {
        let Some(note) = self.notes.iter().find(|n| n.id == id) else {
            return json!({});
        };
        let fields: serde_json::Map<String, Value> = note
            .fields
            .iter()
            .enumerate()
            .map(|(order, (name, value))| (name.clone(), json!({ "value": value, "order": order })))
            .collect();
        json!({
            "noteId": note.id,
            "modelName": note.model,
            "tags": note.tags,
            "fields": fields,
        })
    }

    /// Overwrites named fields; names the note type lacks are ignored.
    fn update_note_fields(&mut self, note: &Value) -> Result<(), String> {
        let id = note
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| "missing parameter: id".to_string())?;
        let supplied = note
            .get("fields")
            .and_then(Value::as_object)
            .ok_or_else(|| "missing parameter: fields".to_string())?;
        let stored = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| format!("note was not found: {id}"))?;
        for (name, value) in stored.fields.iter_mut() {
            if let Some(text) = supplied.get(name.as_str()).and_then(Value::as_str) {
                *value = text.to_string();
            }
        }
        Ok(())
    }

    /// Supports `*`, `deck:NAME`, `tag:NAME` and a bare substring match on
    /// field text, which is all the tests need of Anki's search syntax.
    fn find_notes(&self, query: &str) -> Vec<i64> {
        let query = query.trim();
        let hit = |note: &StoredNote| -> bool {
            if query.is_empty() || query == "*" {
                return true;
            }
            if let Some(deck) = query.strip_prefix("deck:") {
                return note.deck == deck.trim_matches('"');
            }
            if let Some(tag) = query.strip_prefix("tag:") {
                return note.tags.iter().any(|t| t == tag.trim_matches('"'));
            }
            let needle = query.to_lowercase();
            note.fields
                .iter()
                .any(|(_, v)| v.to_lowercase().contains(&needle))
        };
        self.notes.iter().filter(|n| hit(n)).map(|n| n.id).collect()
    }

    fn fresh_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing parameter: {key}"))
}

fn ids_param(params: &Value, key: &str) -> Result<Vec<i64>, String> {
    params
        .get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .ok_or_else(|| format!("missing parameter: {key}"))
}

fn envelope(outcome: Result<Value, String>) -> Value {
    match outcome {
        Ok(result) => json!({ "result": result, "error": null }),
        Err(error) => json!({ "result": null, "error": error }),
    }
}

pub type Db = Arc<RwLock<Collection>>;

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Collection::default())))
}

/// Router over caller-owned state, so tests can inspect it afterwards.
pub fn app_with(db: Db) -> Router {
    Router::new().route("/", post(handle)).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

async fn handle(State(db): State<Db>, Json(request): Json<Value>) -> Json<Value> {
    Json(db.write().await.handle(&request))
}
