// cli/src/lib.rs
pub mod args;

use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use ankibridge_core::{ClientConfig, Fields, NoteRequest, Operations};
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::args::{Args, Command};

/// Execute the parsed command and return its result as pretty JSON.
pub fn run(args: Args) -> Result<String> {
    debug!(?args, "Starting ankibridge with arguments");

    let config = resolve_config(&args)?;
    info!(url = %config.url, "Using AnkiConnect endpoint");
    let ops = Operations::connect(config);

    let value = match args.command {
        Command::Check => {
            let url = ops.client().config().url.clone();
            if !ops.check_connection() {
                bail!("AnkiConnect is not reachable at {url}. Is Anki running with the AnkiConnect add-on?");
            }
            json!({ "connected": true, "url": url })
        }
        Command::Decks => to_json(ops.list_decks().context("Failed to list decks")?)?,
        Command::CreateDeck { name } => to_json(
            ops.create_deck(&name)
                .with_context(|| format!("Failed to create deck '{name}'"))?,
        )?,
        Command::AddNote {
            deck,
            note_type,
            fields,
            tags,
            allow_duplicate,
        } => {
            let fields: Fields = fields.into_iter().collect();
            to_json(
                ops.create_note(&deck, &note_type, &fields, &tags, allow_duplicate)
                    .with_context(|| format!("Failed to create note in deck '{deck}'"))?,
            )?
        }
        Command::Batch {
            path,
            allow_duplicate,
            stop_on_error,
        } => {
            let notes = read_batch(path.as_deref())?;
            to_json(
                ops.batch_create_notes(&notes, allow_duplicate, stop_on_error)
                    .context("Failed to batch create notes")?,
            )?
        }
        Command::NoteTypes => to_json(ops.list_note_types().context("Failed to list note types")?)?,
        Command::Find { query } => to_json(
            ops.find_notes(&query)
                .with_context(|| format!("Failed to search notes with '{query}'"))?,
        )?,
        Command::Info { note_ids } => to_json(ops.notes_info(&note_ids).context("Failed to read notes")?)?,
        Command::Update { note_id, fields } => {
            let fields: Fields = fields.into_iter().collect();
            to_json(
                ops.update_note_fields(note_id, &fields)
                    .with_context(|| format!("Failed to update note {note_id}"))?,
            )?
        }
        Command::Delete { note_ids } => to_json(ops.delete_notes(&note_ids).context("Failed to delete notes")?)?,
    };

    Ok(serde_json::to_string_pretty(&value)?)
}

/// Environment first, then command-line flags on top.
pub fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid AnkiConnect configuration in environment")?;
    if let Some(url) = &args.url {
        config = ClientConfig::new(url).with_timeout(config.timeout);
    }
    if let Some(secs) = args.timeout {
        if secs == 0 {
            bail!("--timeout must be at least 1 second");
        }
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Batch input: a JSON array of note requests from a file or stdin.
pub fn read_batch(path: Option<&Path>) -> Result<Vec<NoteRequest>> {
    let raw = match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read notes from stdin")?;
            buf
        }
    };
    parse_batch(&raw)
}

pub fn parse_batch(raw: &str) -> Result<Vec<NoteRequest>> {
    serde_json::from_str(raw).context("Batch input must be a JSON array of notes")
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
