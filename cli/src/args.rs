// cli/src/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// AnkiConnect URL (default: $ANKI_CONNECT_URL or http://localhost:8765)
    #[arg(short, long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds (default: $ANKI_CONNECT_TIMEOUT_SECS or 10)
    #[arg(short, long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check that AnkiConnect is reachable
    Check,

    /// List all decks
    Decks,

    /// Create a deck (no-op if it already exists)
    CreateDeck {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Create one note, creating its deck if needed
    AddNote {
        /// Target deck
        #[arg(short, long)]
        deck: String,

        /// Note type, e.g. "Basic" or "Cloze"
        #[arg(short, long, value_name = "NOTE_TYPE")]
        note_type: String,

        /// Field value as NAME=TEXT; names match the note type ignoring case
        #[arg(short, long = "field", value_name = "NAME=TEXT", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Tag to attach (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        #[arg(long)]
        allow_duplicate: bool,
    },

    /// Create notes from a JSON array of {deck, note_type, fields, tags?, allow_duplicate?}
    Batch {
        /// JSON file; reads stdin when omitted or "-"
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,

        #[arg(long)]
        allow_duplicate: bool,

        /// Stop at the first failed note
        #[arg(long)]
        stop_on_error: bool,
    },

    /// List note types
    NoteTypes,

    /// Find note ids with an Anki search query, e.g. "deck:Spanish"
    Find {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Show stored notes by id
    Info {
        #[arg(value_name = "NOTE_ID", required = true)]
        note_ids: Vec<i64>,
    },

    /// Overwrite fields of an existing note
    Update {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,

        /// Field value as NAME=TEXT; names match the note's fields ignoring case
        #[arg(short, long = "field", value_name = "NAME=TEXT", value_parser = parse_field, required = true)]
        fields: Vec<(String, String)>,
    },

    /// Delete notes by id
    Delete {
        #[arg(value_name = "NOTE_ID", required = true)]
        note_ids: Vec<i64>,
    },
}

/// Parse `NAME=TEXT`; the text may itself contain `=`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TEXT, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("field name missing in '{raw}'"));
    }
    Ok((name.trim().to_string(), text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_splits_on_first_equals() {
        assert_eq!(
            parse_field("Back=a=b").unwrap(),
            ("Back".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn field_allows_empty_text() {
        assert_eq!(parse_field("Back=").unwrap(), ("Back".to_string(), String::new()));
    }

    #[test]
    fn field_requires_name_and_equals() {
        assert!(parse_field("Front").is_err());
        assert!(parse_field("=text").is_err());
    }
}
