//! Write side of one client connection.
//!
//! Every peer owns a bounded outbound queue drained by its own writer task.
//! [`Peer::send`] only enqueues, so a client that stops reading fills its own
//! queue and further messages to it are dropped. The session delivering to
//! it never waits. Frames are written whole, in queue order.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use futures::SinkExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;

use relay_core::{Message, MessageCodec};

use crate::error::DeliveryError;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct Peer {
    /// Remote address, when the connection has one.
    addr: Option<SocketAddr>,
    connected_at: Instant,
    outbox: mpsc::Sender<Message>,
    /// Asks the writer to stop once nothing more can be written at once.
    closing: CancellationToken,
    /// Cancelled by the writer when it stops, for any reason.
    gone: CancellationToken,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl Peer {
    /// Spawn the writer task for `writer`, queueing at most `queue` messages.
    /// Must run inside a Tokio runtime.
    pub fn new<W>(
        writer: W,
        codec: MessageCodec,
        addr: Option<SocketAddr>,
        queue: usize,
    ) -> Arc<Self>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: BoxedWriter = Box::new(writer);
        let (tx, rx) = mpsc::channel(queue.max(1));
        let closing = CancellationToken::new();
        let gone = CancellationToken::new();
        let task = tokio::spawn(drain(
            rx,
            FramedWrite::new(writer, codec),
            closing.clone(),
            gone.clone(),
        ));
        Arc::new(Self {
            addr,
            connected_at: Instant::now(),
            outbox: tx,
            closing,
            gone,
            writer: Mutex::new(Some(task)),
        })
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Queue one message. Never waits on the client.
    pub fn send(&self, msg: &Message) -> Result<(), DeliveryError> {
        if self.closing.is_cancelled() {
            return Err(DeliveryError::Closed);
        }
        self.outbox.try_send(msg.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Resolves once the writer has stopped.
    pub async fn closed(&self) {
        self.gone.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.gone.is_cancelled()
    }

    /// Write out what the client accepts without blocking, then shut down
    /// the write half. Later sends fail.
    pub async fn shutdown(&self) {
        self.closing.cancel();
        let task = self.writer.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "writer task failed");
            }
        }
    }
}

async fn drain(
    mut rx: mpsc::Receiver<Message>,
    mut sink: FramedWrite<BoxedWriter, MessageCodec>,
    closing: CancellationToken,
    gone: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
            _ = closing.cancelled() => break,
        };

        // A write the client is not draining is abandoned on close.
        let written = tokio::select! {
            biased;
            result = sink.send(&msg) => result,
            _ = closing.cancelled() => break,
        };
        if let Err(e) = written {
            tracing::debug!(error = %e, "client write failed");
            break;
        }
    }

    rx.close();
    gone.cancel();
    if let Err(e) = sink.get_mut().shutdown().await {
        tracing::debug!(error = %e, "connection shutdown failed");
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("addr", &self.addr)
            .field("connected_at", &self.connected_at)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
