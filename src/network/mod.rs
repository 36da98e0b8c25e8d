//! Network Module
//!
//! TCP command client, UDP datagram service, and the TCP frame responder.
//!
//! ## Architecture
//! - Client: one connection per request, never reused
//! - Session: sequential operator loop over the client
//! - Datagram service: one receive thread, one handler thread per datagram
//! - Frame server: single acceptor thread, one thread per connection

mod client;
mod connection;
mod datagram;
mod limit;
mod server;
mod session;
mod shutdown;

pub use client::{Client, RequestStream};
pub use connection::Connection;
pub use datagram::{Acknowledge, DatagramClient, DatagramHandler, DatagramService};
pub use limit::{InFlightLimit, Permit};
pub use server::{Acknowledger, CommandHandler, FrameServer, BUSY_REPLY};
pub use session::{Session, SessionState, Step, DEFAULT_PROMPT};
pub use shutdown::ShutdownHandle;
