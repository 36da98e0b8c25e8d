//! Command Tests
//!
//! Tests for operator line parsing and wire text rendering.

use framelink::protocol::{Command, Verb};
use framelink::LinkError;

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_list_any_case() {
    for line in ["ls", "Ls", "LS", "  lS  \n"] {
        let command = Command::parse(line).unwrap();
        assert_eq!(command, Command::List);
        assert_eq!(command.argument(), None);
    }
}

#[test]
fn test_parse_print_dir_and_quit() {
    assert_eq!(Command::parse("pwd").unwrap(), Command::PrintDir);
    assert_eq!(Command::parse("Quit").unwrap(), Command::Quit);
}

#[test]
fn test_parse_change_dir() {
    let command = Command::parse("CD /tmp").unwrap();
    assert_eq!(command.verb(), Verb::ChangeDir);
    assert_eq!(command.argument(), Some("/tmp"));
}

#[test]
fn test_parse_change_dir_keeps_argument_case() {
    let command = Command::parse("cd /Users/Shared").unwrap();
    assert_eq!(command.argument(), Some("/Users/Shared"));
}

#[test]
fn test_parse_change_dir_folds_extra_tokens() {
    let command = Command::parse("cd   my  docs/x y \r\n").unwrap();
    assert_eq!(command.argument(), Some("my  docs/x y"));
}

#[test]
fn test_parse_change_dir_tab_separator() {
    let command = Command::parse("CD\t/srv").unwrap();
    assert_eq!(command.argument(), Some("/srv"));
}

#[test]
fn test_parse_change_dir_requires_argument() {
    for line in ["CD", "CD   ", "cd\t", "  cd  \n"] {
        match Command::parse(line) {
            Err(LinkError::InvalidArgument(_)) => {}
            other => panic!("Expected InvalidArgument for {:?}, got {:?}", line, other),
        }
    }
}

#[test]
fn test_parse_other_verbs_ignore_argument() {
    assert_eq!(Command::parse("LS -la").unwrap(), Command::List);
    assert_eq!(Command::parse("PWD now").unwrap(), Command::PrintDir);
}

#[test]
fn test_parse_unknown_command() {
    match Command::parse("FOO") {
        Err(LinkError::UnknownCommand(token)) => assert_eq!(token, "FOO"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
}

#[test]
fn test_parse_unknown_command_is_parse_error() {
    let err = Command::parse("dir /tmp").unwrap_err();
    assert!(err.is_parse_error());
    assert!(err.to_string().contains("Unknown command"));
}

#[test]
fn test_parse_empty_line() {
    assert!(matches!(Command::parse(""), Err(LinkError::UnknownCommand(_))));
    assert!(matches!(Command::parse("   "), Err(LinkError::UnknownCommand(_))));
}

#[test]
fn test_from_str() {
    let command: Command = "cd /opt".parse().unwrap();
    assert_eq!(command, Command::change_dir("/opt").unwrap());
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_wire_text() {
    assert_eq!(Command::List.to_wire(), "LS");
    assert_eq!(Command::PrintDir.to_wire(), "PWD");
    assert_eq!(Command::Quit.to_wire(), "QUIT");
    assert_eq!(Command::change_dir("/tmp").unwrap().to_wire(), "CD /tmp");
    assert_eq!(Command::List.to_string(), "LS");
}

#[test]
fn test_parse_serialize_inverse() {
    let commands = vec![
        Command::List,
        Command::PrintDir,
        Command::Quit,
        Command::change_dir("/tmp").unwrap(),
        Command::change_dir("relative/path").unwrap(),
        Command::change_dir("with  inner   spaces").unwrap(),
    ];

    for command in commands {
        let parsed = Command::parse(&command.to_wire()).unwrap();
        assert_eq!(parsed, command);
    }
}

#[test]
fn test_change_dir_constructor_trims() {
    let command = Command::change_dir("  /home  ").unwrap();
    assert_eq!(command.argument(), Some("/home"));
    assert!(Command::change_dir("   ").is_err());
}

#[test]
fn test_only_quit_is_local() {
    assert!(Command::List.is_remote());
    assert!(Command::PrintDir.is_remote());
    assert!(Command::change_dir("/").unwrap().is_remote());
    assert!(!Command::Quit.is_remote());
}

#[test]
fn test_verb_tokens() {
    assert_eq!(Verb::from_token("cd"), Some(Verb::ChangeDir));
    assert_eq!(Verb::from_token("QuIt"), Some(Verb::Quit));
    assert_eq!(Verb::from_token("cdx"), None);
    assert_eq!(Verb::PrintDir.as_str(), "PWD");
}
