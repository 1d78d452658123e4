use ankibridge_cli::args::{Args, Command};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn given_no_subcommand_when_parsing_then_fails() {
    // Arrange
    let args = vec!["ankibridge", "--url", "http://localhost:8765"];

    // Act & Assert
    let result = Args::try_parse_from(args);
    assert!(result.is_err(), "Should fail without subcommand");
}

#[test]
fn given_decks_command_when_parsing_then_uses_defaults() {
    // Arrange
    let args = vec!["ankibridge", "decks"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    assert!(matches!(parsed.command, Command::Decks));
    assert_eq!(parsed.url, None);
    assert_eq!(parsed.timeout, None);
    assert_eq!(parsed.verbose, 0);
}

#[test]
fn given_global_flags_after_subcommand_when_parsing_then_succeeds() {
    // Arrange
    let args = vec![
        "ankibridge",
        "create-deck",
        "Spanish",
        "-u",
        "http://127.0.0.1:9000",
        "-t",
        "3",
        "-vv",
    ];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::CreateDeck { name } => assert_eq!(name, "Spanish"),
        _ => panic!("Expected CreateDeck command"),
    }
    assert_eq!(parsed.url.as_deref(), Some("http://127.0.0.1:9000"));
    assert_eq!(parsed.timeout, Some(3));
    assert_eq!(parsed.verbose, 2);
}

#[test]
fn given_add_note_with_fields_and_tags_when_parsing_then_collects_all() {
    // Arrange
    let args = vec![
        "ankibridge",
        "add-note",
        "--deck",
        "Math",
        "--note-type",
        "Basic",
        "-f",
        "front=2+2",
        "--field",
        "Back=4",
        "--tag",
        "arith",
        "--tag",
        "easy",
        "--allow-duplicate",
    ];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::AddNote {
            deck,
            note_type,
            fields,
            tags,
            allow_duplicate,
        } => {
            assert_eq!(deck, "Math");
            assert_eq!(note_type, "Basic");
            assert_eq!(
                fields,
                vec![
                    ("front".to_string(), "2+2".to_string()),
                    ("Back".to_string(), "4".to_string())
                ]
            );
            assert_eq!(tags, vec!["arith", "easy"]);
            assert!(allow_duplicate);
        }
        _ => panic!("Expected AddNote command"),
    }
}

#[test]
fn given_malformed_field_when_parsing_then_fails() {
    // Arrange
    let args = vec!["ankibridge", "add-note", "-d", "Math", "-n", "Basic", "-f", "Front"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn given_batch_flags_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["ankibridge", "batch", "notes.json", "--stop-on-error"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Batch {
            path,
            allow_duplicate,
            stop_on_error,
        } => {
            assert_eq!(path, Some(PathBuf::from("notes.json")));
            assert!(!allow_duplicate);
            assert!(stop_on_error);
        }
        _ => panic!("Expected Batch command"),
    }
}

#[test]
fn given_delete_without_ids_when_parsing_then_fails() {
    // Arrange
    let args = vec!["ankibridge", "delete"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn given_delete_with_ids_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["ankibridge", "delete", "1700000000001", "1700000000002"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Delete { note_ids } => assert_eq!(note_ids, vec![1700000000001, 1700000000002]),
        _ => panic!("Expected Delete command"),
    }
}

#[test]
fn given_update_with_fields_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["ankibridge", "update", "1700000000001", "-f", "back=four"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Update { note_id, fields } => {
            assert_eq!(note_id, 1700000000001);
            assert_eq!(fields, vec![("back".to_string(), "four".to_string())]);
        }
        _ => panic!("Expected Update command"),
    }
}

#[test]
fn given_update_without_fields_when_parsing_then_fails() {
    // Arrange
    let args = vec!["ankibridge", "update", "1700000000001"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}
