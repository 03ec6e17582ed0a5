//! HTTP API handlers — exposes relay state as JSON.

pub mod status;
pub mod users;

use std::net::SocketAddr;
use std::time::Instant;

use relay_services::Registry;

#[derive(Clone)]
pub struct ApiState {
    pub registry: Registry,
    /// Address the chat listener is bound to.
    pub listen_addr: SocketAddr,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(registry: Registry, listen_addr: SocketAddr) -> Self {
        Self {
            registry,
            listen_addr,
            started_at: Instant::now(),
        }
    }
}

pub use status::handle_status;
pub use users::{handle_user_inspect, handle_users};
