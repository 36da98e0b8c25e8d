//! Client Session
//!
//! Sequential operator loop: read a line, parse it, send one request, report
//! the reply. Request failures are reported and never end the session.
//!
//! ```text
//! AwaitingInput ─► Dispatching ─► AwaitingResponse ─► Reporting ─┐
//!       ▲   │                                                    │
//!       │   └──(QUIT / EOF)──► Terminated                        │
//!       └────────────────────────────────────────────────────────┘
//! ```

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::network::Client;
use crate::protocol::Command;

/// Prompt printed before each operator line
pub const DEFAULT_PROMPT: &str = "command> ";

/// Where the session is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Dispatching,
    AwaitingResponse,
    Reporting,
    Terminated,
}

/// Result of handling one operator line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Terminated,
}

/// Interactive command session
pub struct Session {
    client: Client,
    state: SessionState,
    prompt: String,
}

impl Session {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: SessionState::AwaitingInput,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Replace the prompt (empty disables it)
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run until QUIT or end of input
    ///
    /// Only failures on the operator streams themselves are returned.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        let mut line = String::new();

        while self.state != SessionState::Terminated {
            if !self.prompt.is_empty() {
                output.write_all(self.prompt.as_bytes())?;
                output.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                tracing::debug!("Operator input closed");
                self.transition(SessionState::Terminated);
                break;
            }

            self.handle_line(&line, &mut output)?;
        }

        Ok(())
    }

    /// Handle one operator line
    pub fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<Step> {
        if line.trim().is_empty() {
            return Ok(Step::Continue);
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "error: {}", e)?;
                return Ok(Step::Continue);
            }
        };

        if !command.is_remote() {
            writeln!(output, "bye")?;
            self.transition(SessionState::Terminated);
            return Ok(Step::Terminated);
        }

        let reply = self.dispatch(&command);

        self.transition(SessionState::Reporting);
        match reply {
            Ok(text) => writeln!(output, "{}", text)?,
            Err(e) => {
                tracing::debug!("Request {} to {} failed: {}", command, self.client.server_addr(), e);
                writeln!(output, "error: {}", e)?;
            }
        }

        self.transition(SessionState::AwaitingInput);
        Ok(Step::Continue)
    }

    /// Open, send, receive; the connection drops (closes) before returning
    fn dispatch(&mut self, command: &Command) -> Result<String> {
        self.transition(SessionState::Dispatching);
        let mut stream = self.client.open()?;
        stream.send(command)?;

        self.transition(SessionState::AwaitingResponse);
        stream.receive()
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
