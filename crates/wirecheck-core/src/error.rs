//! Error kinds for the wire codec and the dispatch loop.

use std::time::Duration;

use thiserror::Error;

use crate::packet::{ID_LEN, MAX_PAYLOAD};

/// Errors produced by the packet codec, before any I/O happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Payload exceeds the 1 MiB minus header application ceiling.
    #[error("payload of {0} bytes exceeds the {MAX_PAYLOAD} byte maximum")]
    MessageTooLarge(usize),

    /// Identifier does not fit the fixed 13-byte header field.
    #[error("identifier of {0} bytes exceeds the {ID_LEN} byte field")]
    IdTooLong(usize),

    /// Buffer is shorter than the fixed 16-byte header.
    #[error("packet truncated: {0} bytes is shorter than the header")]
    TruncatedHeader(usize),

    /// Buffer body is shorter than the length the header declares.
    #[error("packet body truncated: header declares {declared} payload bytes, buffer holds {got}")]
    TruncatedPayload { declared: usize, got: usize },

    /// Identifier or payload bytes are not valid UTF-8.
    #[error("packet field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors surfaced by the mailbox loop and the connection.
///
/// The loop treats the single-slot invariant violation and raw mailbox
/// I/O failures as fatal; every other kind becomes a reported `bad`
/// sentinel and the loop keeps going.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// More than one pending command file in the mailbox. The external
    /// driver violated the single-slot contract.
    #[error("mailbox holds {0} pending command files, expected at most one")]
    MultipleCommands(usize),

    /// Command name with no registered test operation.
    #[error("no test operation registered for command '{0}'")]
    UnresolvedCommand(String),

    /// Argument list does not match what the operation requires.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Send or receive attempted with no open connection.
    #[error("no connection is open")]
    NotConnected,

    /// A readiness poll expired without the peer delivering data.
    #[error("timed out after {0:?} waiting for the peer")]
    Timeout(Duration),

    /// The peer closed the connection before the packet completed.
    #[error("peer closed the connection mid-packet")]
    PeerClosed,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
