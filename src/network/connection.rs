//! Connection Handler
//!
//! Handles individual client connections on the frame responder.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::network::CommandHandler;
use crate::protocol::{read_frame, write_frame, Command};

/// Handles a single client connection
pub struct Connection<H> {
    /// TCP stream reader (buffered; may hold bytes of the next frame)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Produces replies for parsed commands
    handler: Arc<H>,

    max_frame_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl<H: CommandHandler> Connection<H> {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn new(stream: TcpStream, handler: Arc<H>, config: &Config) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            handler,
            max_frame_size: config.max_frame_size,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and answers each with one frame.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let payload = match read_frame(&mut self.reader, self.max_frame_size) {
                Ok(payload) => payload,
                Err(LinkError::IncompleteFrame { received: 0 }) => {
                    // Client disconnected between frames
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(LinkError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} lost: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(ref e) if e.is_timeout() => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    // Send error response if possible
                    if let Err(reply_err) = self.send_reply(&format!("ERROR {}", e)) {
                        tracing::debug!(
                            "Could not report read error to {}: {}",
                            self.peer_addr, reply_err
                        );
                    }
                    return Err(e);
                }
            };

            let text = String::from_utf8_lossy(&payload);
            tracing::trace!("Received frame from {}: {:?}", self.peer_addr, text);

            let reply = match Command::parse(&text) {
                Ok(command) => self.handler.handle(&command),
                Err(e) => format!("ERROR {}", e),
            };

            let sent = match self.send_reply(&reply) {
                Err(e @ LinkError::UnsafePayload { .. }) => {
                    tracing::warn!("Handler reply to {} rejected: {}", self.peer_addr, e);
                    self.send_reply(&format!("ERROR {}", e))
                }
                other => other,
            };

            if let Err(e) = sent {
                // Client went away before the reply; not a server error
                if let LinkError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before reply could be sent: {}",
                            self.peer_addr, e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a reply frame to the client
    ///
    /// Replies containing the sentinel fail with `UnsafePayload` before
    /// anything is written.
    fn send_reply(&mut self, reply: &str) -> Result<()> {
        write_frame(&mut self.writer, reply.as_bytes())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}
