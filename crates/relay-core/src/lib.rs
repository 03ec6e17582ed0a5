//! relay-core — shared types, wire format, and configuration.
//! All other relay crates depend on this one.

pub mod command;
pub mod config;
pub mod message;
pub mod wire;

pub use command::Command;
pub use message::{notice, Message, SERVER_NAME};
pub use wire::{MessageCodec, WireError};
