//! Session — one client connection from accept to teardown.
//!
//! The first frame names the client. After a successful registration every
//! later frame is classified with [`Command::parse`] and routed through the
//! shared [`Registry`]. Whatever ends the loop, [`Session::close`] runs its
//! effects once. The loop also ends when the connection's writer stops, so a
//! client that stopped reading is unregistered like any other.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;

use relay_core::{notice, Command, Message, MessageCodec, WireError, SERVER_NAME};

use crate::error::{DeliveryError, RelayError};
use crate::peer::Peer;
use crate::registry::{Directed, Registry};

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, waiting for the login frame.
    Pending,
    /// Holds `name` in the registry.
    Registered { name: String },
    /// Teardown in progress.
    Closing,
    Closed,
}

/// Why the read loop ended.
#[derive(Debug)]
pub enum LoopExit {
    /// Client sent the quit command.
    Quit,
    /// Client closed the connection.
    Eof,
    ReadFailed(WireError),
    /// This session's own connection stopped accepting messages.
    WriteFailed(DeliveryError),
    /// Login refused; the client got one notice.
    Rejected(RelayError),
}

/// Reject names that are blank, impersonate the server, or contain `:`
/// (which directed messages could never address).
pub fn validate_name(name: &str) -> Result<(), RelayError> {
    if name.trim().is_empty() || name == SERVER_NAME || name.contains(':') {
        return Err(RelayError::InvalidName(name.to_owned()));
    }
    Ok(())
}

pub struct Session<R> {
    reader: FramedRead<R, MessageCodec>,
    peer: Arc<Peer>,
    registry: Registry,
    state: SessionState,
}

impl<R> Session<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new<W>(
        reader: R,
        writer: W,
        addr: Option<SocketAddr>,
        registry: Registry,
        codec: MessageCodec,
        outbound_queue: usize,
    ) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader: FramedRead::new(reader, codec.clone()),
            peer: Peer::new(writer, codec, addr, outbound_queue),
            registry,
            state: SessionState::Pending,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Registered { name } => Some(name),
            _ => None,
        }
    }

    /// Queue one message for this session's client.
    pub fn send(&self, msg: &Message) -> Result<(), DeliveryError> {
        self.peer.send(msg)
    }

    /// Serve the connection until it ends, then close.
    pub async fn run(&mut self) -> LoopExit {
        let exit = self.serve().await;
        match &exit {
            LoopExit::Quit | LoopExit::Eof => {
                tracing::debug!(name = ?self.name(), ?exit, "session loop ended")
            }
            LoopExit::Rejected(reason) => {
                tracing::info!(peer = ?self.peer.addr(), %reason, "login rejected")
            }
            LoopExit::ReadFailed(e) => {
                tracing::warn!(name = ?self.name(), error = %e, "session read failed")
            }
            LoopExit::WriteFailed(e) => {
                tracing::warn!(name = ?self.name(), error = %e, "session write failed")
            }
        }
        self.close().await;
        exit
    }

    /// Leave the registry (once, if registered) and release the connection.
    pub async fn close(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closing) {
            SessionState::Registered { name } => {
                self.registry.unregister(&name);
                self.registry.broadcast(&notice::left(&name));
                tracing::info!(%name, active = self.registry.len(), "client disconnected");
            }
            SessionState::Pending => {}
            // Already torn down.
            SessionState::Closing | SessionState::Closed => {
                self.state = SessionState::Closed;
                return;
            }
        }
        self.peer.shutdown().await;
        self.state = SessionState::Closed;
    }

    async fn serve(&mut self) -> LoopExit {
        let name = match self.login().await {
            Ok(name) => name,
            Err(exit) => return exit,
        };

        loop {
            let msg = match self.next_message().await {
                Ok(msg) => msg,
                Err(exit) => return exit,
            };
            if let Some(exit) = self.dispatch(&name, &msg) {
                return exit;
            }
        }
    }

    async fn login(&mut self) -> Result<String, LoopExit> {
        let first = self.next_message().await?;
        let requested = first.sender().to_owned();

        let admitted = validate_name(&requested)
            .and_then(|()| self.registry.register(&requested, self.peer.clone()));
        if let Err(reason) = admitted {
            let refusal = match reason {
                RelayError::NameConflict(_) => notice::name_taken(&requested),
                RelayError::InvalidName(_) => notice::invalid_name(&requested),
            };
            self.send(&refusal).map_err(LoopExit::WriteFailed)?;
            return Err(LoopExit::Rejected(reason));
        }

        self.state = SessionState::Registered {
            name: requested.clone(),
        };
        tracing::info!(
            name = %requested,
            peer = ?self.peer.addr(),
            active = self.registry.len(),
            "client connected"
        );
        self.registry.broadcast(&notice::joined(&requested));
        Ok(requested)
    }

    async fn next_message(&mut self) -> Result<Message, LoopExit> {
        tokio::select! {
            biased;
            frame = self.reader.next() => match frame {
                Some(Ok(msg)) => Ok(msg),
                Some(Err(e)) => Err(LoopExit::ReadFailed(e)),
                None => Err(LoopExit::Eof),
            },
            () = self.peer.closed() => Err(LoopExit::WriteFailed(DeliveryError::Closed)),
        }
    }

    /// Route one frame. `Some` ends the loop.
    fn dispatch(&self, name: &str, msg: &Message) -> Option<LoopExit> {
        let written = match Command::parse(msg.body()) {
            Command::Quit => return Some(LoopExit::Quit),
            Command::ListUsers => self.registry.list_users(name, &self.peer),
            Command::MalformedDirect => {
                tracing::debug!(%name, "malformed directed message");
                self.send(&notice::malformed_directed(name))
            }
            Command::Direct { recipient, body } => self
                .registry
                .send_directed(name, &self.peer, recipient, body)
                .map(|outcome| {
                    if outcome == Directed::RecipientNotFound {
                        tracing::debug!(%name, %recipient, "directed message to unknown user");
                    }
                }),
            Command::Text => {
                self.registry.broadcast(msg);
                Ok(())
            }
        };
        written.err().map(LoopExit::WriteFailed)
    }
}
