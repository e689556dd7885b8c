//! Collecting server and tools for the compact binary log-record protocol.
//!
//! Logging clients stream structured records (text, binary and image
//! messages, markers, block delimiters and client identification) to a
//! collecting server over TCP.
//!
//! # Crate Structure
//!
//! - [`frame`] — The record codec: frame detection, decoding, encoding and
//!   streaming adapters
//!
//! The `logmate` binary (behind the `cli` feature) provides `listen`,
//! `send`, `decode` and `version` commands.

/// Re-export codec types.
pub mod frame {
    pub use logmate_frame::*;
}
