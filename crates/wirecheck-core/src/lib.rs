//! Core types and logic for wirecheck.
//!
//! This crate is the pure half of the harness: the packet codec, the
//! command grammar, and the error taxonomy. It performs no I/O; the
//! mailbox loop and the connection live in the CLI crate.
//!
//! # Modules
//!
//! - [`command`]: name-and-arguments grammar for command file stems
//! - [`error`]: codec and harness error kinds
//! - [`packet`]: length-prefixed packet encode/decode

pub mod command;
pub mod error;
pub mod packet;
