//! Relay integration test harness.
//!
//! Every test starts its own relay on 127.0.0.1:0 and talks to it over real
//! TCP with the same line-delimited JSON codec the server uses:
//!
//!   cargo test --test integration
//!
//! Receives are bounded by `RECV_TIMEOUT` so a routing bug fails the test
//! instead of hanging it.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

use relay_core::config::LimitsConfig;
use relay_core::{notice, Message, MessageCodec};
use relay_services::{Listener, Registry};

mod messaging;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a client waits before concluding nothing more is coming.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// A relay running in this process.
pub struct Relay {
    pub addr: SocketAddr,
    pub registry: Registry,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl Relay {
    pub async fn start() -> Result<Self> {
        Self::start_with_limits(LimitsConfig::default()).await
    }

    pub async fn start_with_limits(limits: LimitsConfig) -> Result<Self> {
        let registry = Registry::new();
        let (shutdown, rx) = broadcast::channel(1);
        let listener = Listener::bind(
            "127.0.0.1:0".parse()?,
            registry.clone(),
            &limits,
            rx,
        )
        .await
        .context("failed to bind test relay")?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(listener.run());
        Ok(Self {
            addr,
            registry,
            shutdown,
            task,
        })
    }

    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        tokio::time::timeout(RECV_TIMEOUT, self.task)
            .await
            .context("listener did not stop")??;
        Ok(())
    }
}

/// A chat client speaking the wire protocol.
pub struct Client {
    framed: Framed<TcpStream, MessageCodec>,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("failed to connect to {addr}"))?;
        Ok(Self {
            framed: Framed::new(stream, MessageCodec::new()),
        })
    }

    /// Connect, log in as `name`, and consume the client's own join notice.
    pub async fn login(addr: SocketAddr, name: &str) -> Result<Self> {
        let mut client = Self::connect(addr).await?;
        client.say(name, "Connecting...").await?;
        client.expect(&notice::joined(name)).await?;
        Ok(client)
    }

    pub async fn send(&mut self, msg: &Message) -> Result<()> {
        self.framed.send(msg).await.context("send failed")
    }

    pub async fn say(&mut self, sender: &str, body: &str) -> Result<()> {
        self.send(&Message::broadcast(sender, body)).await
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        use tokio::io::AsyncWriteExt;
        let stream = self.framed.get_mut();
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<Message> {
        match tokio::time::timeout(RECV_TIMEOUT, self.framed.next()).await {
            Ok(Some(Ok(msg))) => Ok(msg),
            Ok(Some(Err(e))) => bail!("decode failed: {e}"),
            Ok(None) => bail!("connection closed"),
            Err(_) => bail!("timed out waiting for a message"),
        }
    }

    pub async fn expect(&mut self, expected: &Message) -> Result<()> {
        let got = self.recv().await?;
        if &got != expected {
            bail!("expected {expected:?}, got {got:?}");
        }
        Ok(())
    }

    /// Nothing arrives within `QUIET_PERIOD`.
    pub async fn expect_silence(&mut self) -> Result<()> {
        match tokio::time::timeout(QUIET_PERIOD, self.framed.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(msg))) => bail!("unexpected message: {msg:?}"),
            Ok(Some(Err(e))) => bail!("unexpected decode error: {e}"),
            Ok(None) => bail!("connection closed unexpectedly"),
        }
    }

    /// The server closes this connection.
    pub async fn expect_closed(&mut self) -> Result<()> {
        match tokio::time::timeout(RECV_TIMEOUT, self.framed.next()).await {
            Ok(None) | Ok(Some(Err(_))) => Ok(()),
            Ok(Some(Ok(msg))) => bail!("expected close, got {msg:?}"),
            Err(_) => bail!("timed out waiting for close"),
        }
    }
}

/// Poll `cond` until it holds or `RECV_TIMEOUT` passes.
pub async fn wait_for(mut cond: impl FnMut() -> bool) -> Result<()> {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            bail!("condition not met within {RECV_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_relay_starts_and_stops() -> Result<()> {
    let relay = Relay::start().await?;
    assert!(relay.registry.is_empty());
    assert_ne!(relay.addr.port(), 0);
    relay.stop().await
}

#[tokio::test]
async fn test_single_client_login() -> Result<()> {
    let relay = Relay::start().await?;
    let _alice = Client::login(relay.addr, "alice").await?;
    assert_eq!(relay.registry.names(), vec!["alice"]);
    relay.stop().await
}
