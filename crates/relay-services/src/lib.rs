//! relay-services — the registry, per-connection sessions, and the listener
//! that ties them to TCP.

pub mod error;
pub mod listener;
pub mod peer;
pub mod registry;
pub mod session;

pub use error::{DeliveryError, RelayError};
pub use listener::Listener;
pub use peer::Peer;
pub use registry::{Directed, Fanout, Registry};
pub use session::{validate_name, LoopExit, Session, SessionState};
