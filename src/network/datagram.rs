//! Datagram Service
//!
//! UDP acknowledgment server. The receive loop never waits on a handler:
//! each datagram is handed to its own thread, which replies to the sender
//! over the shared socket.
//!
//! ## Failure Semantics
//! - A failed receive stops the service
//! - A failed send is logged by its handler and affects nothing else

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use crossbeam::sync::WaitGroup;

use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::network::limit::InFlightLimit;
use crate::network::ShutdownHandle;

// =============================================================================
// Handlers
// =============================================================================

/// Produces the reply for one datagram
///
/// Handlers run concurrently and only see their own payload.
pub trait DatagramHandler: Send + Sync + 'static {
    fn handle(&self, payload: &[u8], peer: SocketAddr) -> Bytes;
}

impl<F> DatagramHandler for F
where
    F: Fn(&[u8], SocketAddr) -> Bytes + Send + Sync + 'static,
{
    fn handle(&self, payload: &[u8], peer: SocketAddr) -> Bytes {
        self(payload, peer)
    }
}

/// Replies with the same fixed message to every datagram
#[derive(Debug, Clone)]
pub struct Acknowledge {
    message: Bytes,
}

impl Acknowledge {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Bytes::from(message.into()),
        }
    }
}

impl DatagramHandler for Acknowledge {
    fn handle(&self, payload: &[u8], peer: SocketAddr) -> Bytes {
        tracing::info!("Received from {}: {}", peer, String::from_utf8_lossy(payload));
        self.message.clone()
    }
}

// =============================================================================
// Service
// =============================================================================

/// UDP server dispatching one handler thread per datagram
pub struct DatagramService<H> {
    socket: Arc<UdpSocket>,
    handler: Arc<H>,
    config: Config,

    /// Present only when `max_in_flight` is set
    limit: Option<Arc<InFlightLimit>>,

    shutdown: ShutdownHandle,
}

impl<H: DatagramHandler> DatagramService<H> {
    /// Bind the socket at `config.datagram_addr`
    pub fn bind(config: Config, handler: H) -> Result<Self> {
        config.validate()?;

        let socket = UdpSocket::bind(&config.datagram_addr).map_err(|source| {
            LinkError::Connection {
                addr: config.datagram_addr.clone(),
                source,
            }
        })?;

        // Receive wakes up periodically so shutdown is noticed
        socket.set_read_timeout(Some(config.poll_interval()))?;
        socket.set_write_timeout(config.write_timeout())?;

        let limit = config.max_in_flight.map(InFlightLimit::new);

        Ok(Self {
            socket: Arc::new(socket),
            handler: Arc::new(handler),
            config,
            limit,
            shutdown: ShutdownHandle::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Receive loop (blocking)
    ///
    /// Returns `Ok` after shutdown once all in-flight handlers finished, or
    /// the receive error that stopped the service.
    pub fn run(&self) -> Result<()> {
        tracing::info!("Datagram service listening on {}", self.local_addr()?);

        let in_flight = WaitGroup::new();
        let mut buf = vec![0u8; self.config.max_datagram_size];

        let outcome = loop {
            if self.shutdown.is_triggered() {
                break Ok(());
            }

            let (n, peer) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(ref e) if is_poll_timeout(e) => continue,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!("Receive failed, stopping datagram service: {}", e);
                    break Err(LinkError::Io(e));
                }
            };

            tracing::debug!("Datagram of {} bytes from {}", n, peer);
            let payload = Bytes::copy_from_slice(&buf[..n]);
            self.dispatch(payload, peer, in_flight.clone());
        };

        tracing::debug!("Waiting for in-flight datagram handlers");
        in_flight.wait();
        tracing::info!("Datagram service stopped");

        outcome
    }

    /// Spawn the handler for one datagram
    fn dispatch(&self, payload: Bytes, peer: SocketAddr, done: WaitGroup) {
        // Bounded mode: intake waits here for a free slot
        let permit = self.limit.as_ref().map(|limit| limit.acquire());

        let socket = Arc::clone(&self.socket);
        let handler = Arc::clone(&self.handler);

        let spawned = thread::Builder::new()
            .name("datagram-handler".to_string())
            .spawn(move || {
                let reply = handler.handle(&payload, peer);
                if let Err(e) = socket.send_to(&reply, peer) {
                    tracing::warn!("Reply to {} failed: {}", peer, e);
                }
                drop(permit);
                drop(done);
            });

        if let Err(e) = spawned {
            tracing::warn!("Could not spawn handler for {}: {}", peer, e);
        }
    }
}

fn is_poll_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

// =============================================================================
// Client
// =============================================================================

/// Sends one datagram and waits for one reply
pub struct DatagramClient {
    socket: UdpSocket,
    max_datagram_size: usize,
}

impl DatagramClient {
    /// Bind an ephemeral port and connect it to `config.server_addr`
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = &config.server_addr;
        let connect_err = |source| LinkError::Connection {
            addr: addr.clone(),
            source,
        };

        let local = if is_ipv6_target(addr) { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(local)?;
        socket.connect(addr).map_err(connect_err)?;
        socket.set_read_timeout(config.read_timeout())?;
        socket.set_write_timeout(config.write_timeout())?;

        Ok(Self {
            socket,
            max_datagram_size: config.max_datagram_size,
        })
    }

    /// Send `payload` and return the server's reply
    pub fn exchange(&self, payload: &[u8]) -> Result<Bytes> {
        self.socket.send(payload)?;

        let mut buf = vec![0u8; self.max_datagram_size];
        let n = self.socket.recv(&mut buf)?;
        buf.truncate(n);

        Ok(Bytes::from(buf))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

fn is_ipv6_target(addr: &str) -> bool {
    addr.parse::<SocketAddr>().map(|a| a.is_ipv6()).unwrap_or(false)
}
