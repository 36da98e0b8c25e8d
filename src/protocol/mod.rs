//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌─────────────────────────────────────┬──────┐
//! │          Payload (no 0x00)          │ 0x00 │
//! └─────────────────────────────────────┴──────┘
//! ```
//!
//! ### Commands (payload text)
//! - `LS`        - list directory
//! - `CD <path>` - change directory
//! - `PWD`       - print directory
//!
//! `QUIT` ends the client session and never reaches the wire.
//!
//! ### Responses
//! Free-form text, framed the same way.

mod command;
mod frame;

pub use command::{Command, Verb};
pub use frame::{
    decode_frame, decode_frame_with_limit, encode_frame, read_frame, write_frame,
    MAX_FRAME_SIZE, SENTINEL,
};
