//! TCP listener — accepts chat clients and spawns one session task each.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use relay_core::config::LimitsConfig;
use relay_core::MessageCodec;

use crate::registry::Registry;
use crate::session::Session;

pub struct Listener {
    listener: TcpListener,
    registry: Registry,
    codec: MessageCodec,
    outbound_queue: usize,
    shutdown: broadcast::Receiver<()>,
}

impl Listener {
    /// Bind `addr`. Failure here is the only fatal listener error.
    pub async fn bind(
        addr: SocketAddr,
        registry: Registry,
        limits: &LimitsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            registry,
            codec: MessageCodec::with_max_frame_bytes(limits.max_frame_bytes),
            outbound_queue: limits.outbound_queue,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept until shutdown. A failed accept is logged and skipped.
    pub async fn run(mut self) {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(
                %addr,
                max_frame_bytes = self.codec.max_frame_bytes(),
                outbound_queue = self.outbound_queue,
                "chat listener starting"
            );
        }

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("chat listener shutting down");
                    return;
                }

                result = self.listener.accept() => {
                    let (stream, peer_addr) = match result {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            // Back off so a persistent error (e.g. EMFILE) does not spin.
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            continue;
                        }
                    };

                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(%peer_addr, error = %e, "TCP_NODELAY failed");
                    }
                    tracing::debug!(%peer_addr, "connection accepted");

                    let (reader, writer) = stream.into_split();
                    let mut session = Session::new(
                        reader,
                        writer,
                        Some(peer_addr),
                        self.registry.clone(),
                        self.codec.clone(),
                        self.outbound_queue,
                    );
                    tokio::spawn(async move {
                        let exit = session.run().await;
                        tracing::debug!(%peer_addr, ?exit, "session finished");
                    });
                }
            }
        }
    }
}
