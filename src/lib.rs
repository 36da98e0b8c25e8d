//! # framelink
//!
//! A minimal text command protocol over two transports:
//! - Sentinel-framed request/response over TCP (one connection per request)
//! - Concurrent UDP acknowledgment service (one handler per datagram)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐  LS / CD <path> / PWD + 0x00  ┌──────────────┐
//! │   Session    │──────────────────────────────►│ Frame Server │
//! │ (operator)   │◄──────────────────────────────│  (TCP)       │
//! └──────┬───────┘        reply text + 0x00      └──────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Protocol   │  Command parse/serialize, frame encode/decode
//! └──────────────┘
//!
//! ┌──────────────┐        any payload            ┌──────────────┐
//! │ Datagram     │──────────────────────────────►│ Datagram     │
//! │ Client (UDP) │◄──────────────────────────────│ Service      │
//! └──────────────┘      acknowledgment           └──────┬───────┘
//!                                                       │ thread per datagram
//!                                                       ▼
//!                                                ┌──────────────┐
//!                                                │   Handler    │
//!                                                └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LinkError, Result};
pub use config::Config;
pub use protocol::{Command, Verb};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of framelink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
