//! Command definitions
//!
//! Parses operator lines into commands and renders commands as wire text.

use std::fmt;
use std::str::FromStr;

use crate::error::{LinkError, Result};

/// Command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    List,
    ChangeDir,
    PrintDir,
    Quit,
}

impl Verb {
    /// Wire spelling of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::List => "LS",
            Verb::ChangeDir => "CD",
            Verb::PrintDir => "PWD",
            Verb::Quit => "QUIT",
        }
    }

    /// Look up a verb token, ignoring case
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "LS" => Some(Verb::List),
            "CD" => Some(Verb::ChangeDir),
            "PWD" => Some(Verb::PrintDir),
            "QUIT" => Some(Verb::Quit),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the current directory
    List,

    /// Change directory; path is trimmed and never empty
    ChangeDir { path: String },

    /// Print the current directory
    PrintDir,

    /// End the session (handled locally, never sent)
    Quit,
}

impl Command {
    /// Build a CHANGE_DIR command, rejecting a blank path
    pub fn change_dir(path: impl AsRef<str>) -> Result<Self> {
        let path = path.as_ref().trim();
        if path.is_empty() {
            return Err(LinkError::InvalidArgument(
                "CD requires a directory argument".to_string(),
            ));
        }
        Ok(Command::ChangeDir {
            path: path.to_string(),
        })
    }

    /// Parse one line of operator input
    ///
    /// Only the verb is case-insensitive. Everything after the first run of
    /// whitespace is the argument, inner whitespace included. Verbs other
    /// than CD ignore their argument.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (token, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        let verb = Verb::from_token(token)
            .ok_or_else(|| LinkError::UnknownCommand(token.to_string()))?;

        match verb {
            Verb::List => Ok(Command::List),
            Verb::ChangeDir => Command::change_dir(rest),
            Verb::PrintDir => Ok(Command::PrintDir),
            Verb::Quit => Ok(Command::Quit),
        }
    }

    /// Get the command verb
    pub fn verb(&self) -> Verb {
        match self {
            Command::List => Verb::List,
            Command::ChangeDir { .. } => Verb::ChangeDir,
            Command::PrintDir => Verb::PrintDir,
            Command::Quit => Verb::Quit,
        }
    }

    /// Get the argument, if the verb carries one
    pub fn argument(&self) -> Option<&str> {
        match self {
            Command::ChangeDir { path } => Some(path),
            _ => None,
        }
    }

    /// Whether the command is sent to the server
    pub fn is_remote(&self) -> bool {
        !matches!(self, Command::Quit)
    }

    /// Render the command as wire text
    pub fn to_wire(&self) -> String {
        match self.argument() {
            Some(arg) => format!("{} {}", self.verb(), arg),
            None => self.verb().as_str().to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for Command {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        Command::parse(s)
    }
}
