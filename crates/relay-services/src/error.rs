//! Errors surfaced by the registry and by per-client delivery.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The requested display name is already registered.
    #[error("name {0:?} is already registered")]
    NameConflict(String),
    /// Empty, reserved, or unaddressable display name.
    #[error("invalid name {0:?}")]
    InvalidName(String),
}

/// Why a message could not be queued for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The client is not keeping up; this message was dropped.
    #[error("outbound queue full")]
    QueueFull,
    /// The connection's writer has stopped.
    #[error("connection closed")]
    Closed,
}
