//! TCP Frame Server
//!
//! Accepts connections and dispatches each to its own thread. Every command
//! frame gets exactly one reply frame from the configured `CommandHandler`.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::network::{Connection, ShutdownHandle};
use crate::protocol::{write_frame, Command};

/// Reply sent to connections turned away at `max_connections`
pub const BUSY_REPLY: &str = "ERROR server busy";

/// Produces the reply text for one command
pub trait CommandHandler: Send + Sync + 'static {
    fn handle(&self, command: &Command) -> String;
}

impl<F> CommandHandler for F
where
    F: Fn(&Command) -> String + Send + Sync + 'static,
{
    fn handle(&self, command: &Command) -> String {
        self(command)
    }
}

/// Acknowledges every command without acting on it
#[derive(Debug, Clone, Copy, Default)]
pub struct Acknowledger;

impl CommandHandler for Acknowledger {
    fn handle(&self, command: &Command) -> String {
        format!("OK {}", command)
    }
}

/// TCP server answering command frames
pub struct FrameServer<H> {
    config: Config,
    listener: TcpListener,
    handler: Arc<H>,
    active: Arc<AtomicUsize>,
    shutdown: ShutdownHandle,
}

impl<H: CommandHandler> FrameServer<H> {
    /// Bind the listener at `config.listen_addr`
    pub fn bind(config: Config, handler: H) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|source| {
            LinkError::Connection {
                addr: config.listen_addr.clone(),
                source,
            }
        })?;

        // Non-blocking accept so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            listener,
            handler: Arc::new(handler),
            active: Arc::new(AtomicUsize::new(0)),
            shutdown: ShutdownHandle::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Start the accept loop (blocking)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Frame server listening on {}", self.local_addr()?);

        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(self.config.poll_interval());
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("Accept failed, stopping frame server: {}", e);
                    return Err(LinkError::Io(e));
                }
            }
        }

        tracing::info!("Frame server stopped");
        Ok(())
    }

    /// Serve one accepted connection on its own thread
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        if self.active.load(Ordering::Acquire) >= self.config.max_connections {
            tracing::warn!(
                "Rejecting {}: {} connections already active",
                peer,
                self.config.max_connections
            );
            reject_busy(stream, peer, &self.config);
            return;
        }

        // Accepted sockets inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Could not configure connection from {}: {}", peer, e);
            return;
        }

        let mut connection = match Connection::new(stream, Arc::clone(&self.handler), &self.config) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Could not set up connection from {}: {}", peer, e);
                return;
            }
        };

        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::AcqRel);

        let spawned = thread::Builder::new()
            .name("frame-connection".to_string())
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection from {} ended with error: {}", peer, e);
                }
                active.fetch_sub(1, Ordering::AcqRel);
            });

        if let Err(e) = spawned {
            tracing::warn!("Could not spawn connection thread for {}: {}", peer, e);
            self.active.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Tell a turned-away client why before closing its connection
fn reject_busy(stream: TcpStream, peer: SocketAddr, config: &Config) {
    if let Err(e) = send_busy(stream, config) {
        tracing::debug!("Could not send busy reply to {}: {}", peer, e);
    }
}

fn send_busy(mut stream: TcpStream, config: &Config) -> Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_write_timeout(config.write_timeout())?;
    write_frame(&mut stream, BUSY_REPLY.as_bytes())
}
