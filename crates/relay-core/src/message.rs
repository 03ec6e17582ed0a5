//! The message envelope exchanged between clients and the relay.
//!
//! A `Message` is immutable once built and holds no connection state, so a
//! fan-out copies the same value into every recipient's queue.

use serde::{Deserialize, Serialize};

/// Sender identifier used on every server-originated notice.
pub const SERVER_NAME: &str = "Server";

/// `{sender, recipient?, body}` — the only record on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: String,
    /// `None` means broadcast, or a command whose target is in the body.
    #[serde(default)]
    recipient: Option<String>,
    body: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipient: Option<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient,
            body: body.into(),
        }
    }

    /// A message addressed to everyone.
    pub fn broadcast(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(sender, None, body)
    }

    /// A message addressed to one named recipient.
    pub fn directed(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(sender, Some(recipient.into()), body)
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Server-originated notices. Every constructor here sets the sender to
/// [`SERVER_NAME`].
pub mod notice {
    use super::{Message, SERVER_NAME};

    pub fn joined(name: &str) -> Message {
        Message::broadcast(SERVER_NAME, format!("{name} entered the chat."))
    }

    pub fn left(name: &str) -> Message {
        Message::broadcast(SERVER_NAME, format!("{name} left the chat."))
    }

    pub fn name_taken(requested: &str) -> Message {
        Message::directed(
            SERVER_NAME,
            requested,
            "Username already in use. Connection will be closed.",
        )
    }

    pub fn invalid_name(requested: &str) -> Message {
        Message::directed(
            SERVER_NAME,
            requested,
            "Invalid username. Connection will be closed.",
        )
    }

    pub fn malformed_directed(to: &str) -> Message {
        Message::directed(SERVER_NAME, to, "Invalid format. Use /privado:user:message")
    }

    pub fn recipient_not_found(to: &str, recipient: &str) -> Message {
        Message::directed(SERVER_NAME, to, format!("User {recipient} not found."))
    }

    /// One line per name, in the order given.
    pub fn roster<S: AsRef<str>>(to: &str, names: &[S]) -> Message {
        let mut body = String::from("Connected users:\n");
        for name in names {
            body.push_str("- ");
            body.push_str(name.as_ref());
            body.push('\n');
        }
        Message::directed(SERVER_NAME, to, body)
    }
}
