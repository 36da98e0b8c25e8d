//! Command Client
//!
//! One connection per request: connect, send one frame, read one frame,
//! close. Connections are never pooled or reused.

use std::io::BufReader;
use std::net::{Shutdown, TcpStream};

use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::protocol::{read_frame, write_frame, Command};

/// Sends commands to a fixed server address
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
}

impl Client {
    /// Create a client for `config.server_addr`
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Address requests are sent to
    pub fn server_addr(&self) -> &str {
        &self.config.server_addr
    }

    /// Open a fresh connection for a single request
    pub fn open(&self) -> Result<RequestStream> {
        let addr = &self.config.server_addr;
        let stream = TcpStream::connect(addr).map_err(|source| LinkError::Connection {
            addr: addr.clone(),
            source,
        })?;

        // Disable Nagle's algorithm; each request is one small write
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.config.read_timeout())?;
        stream.set_write_timeout(self.config.write_timeout())?;

        let reader = BufReader::new(stream.try_clone()?);
        tracing::debug!("Connected to {}", addr);

        Ok(RequestStream {
            stream,
            reader,
            max_frame_size: self.config.max_frame_size,
            peer_addr: addr.clone(),
        })
    }

    /// Send a command and wait for the server's reply
    ///
    /// The connection is closed before returning, on success and on error.
    pub fn request(&self, command: &Command) -> Result<String> {
        ensure_remote(command)?;
        let mut stream = self.open()?;
        stream.send(command)?;
        stream.receive()
    }
}

/// A connection owned by exactly one request; closed on drop
pub struct RequestStream {
    /// Write half
    stream: TcpStream,

    /// Read half (buffered so one frame may span many reads)
    reader: BufReader<TcpStream>,

    max_frame_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl RequestStream {
    /// Send a command as one frame
    pub fn send(&mut self, command: &Command) -> Result<()> {
        ensure_remote(command)?;

        let text = command.to_wire();
        write_frame(&mut self.stream, text.as_bytes())?;
        tracing::trace!("Sent {:?} to {}", text, self.peer_addr);
        Ok(())
    }

    /// Block for one response frame
    pub fn receive(&mut self) -> Result<String> {
        let payload = read_frame(&mut self.reader, self.max_frame_size)?;
        tracing::trace!("Received {} bytes from {}", payload.len(), self.peer_addr);
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }
}

impl Drop for RequestStream {
    fn drop(&mut self) {
        // Fails only when the peer already closed
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of connection to {} failed: {}", self.peer_addr, e);
        }
        tracing::debug!("Closed connection to {}", self.peer_addr);
    }
}

fn ensure_remote(command: &Command) -> Result<()> {
    if command.is_remote() {
        Ok(())
    } else {
        Err(LinkError::InvalidArgument(format!(
            "{} is handled locally and never sent",
            command.verb()
        )))
    }
}
