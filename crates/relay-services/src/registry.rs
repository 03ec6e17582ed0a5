//! Registry — the shared table of registered sessions, keyed by display name.
//!
//! Every session task holds a clone. Mutations go through `DashMap`'s
//! sharded locks. Delivery only enqueues onto each peer's outbound queue, so
//! a broadcast finishes in bounded time no matter how slow any client is.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use relay_core::{notice, Message};

use crate::error::{DeliveryError, RelayError};
use crate::peer::Peer;

/// Outcome of a directed send, as seen by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directed {
    /// Queued for the recipient (best effort) and echoed to the sender.
    Delivered,
    /// No such name; the sender got a not-found notice.
    RecipientNotFound,
}

/// Per-recipient tally of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Fanout {
    pub delivered: usize,
    /// Names the message could not be queued for. Logged, never reported to
    /// the sender.
    pub failed: Vec<String>,
}

#[derive(Clone, Default)]
pub struct Registry {
    peers: Arc<DashMap<String, Arc<Peer>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `peer` under `name` unless the name is taken. Check and insert
    /// happen under the same shard lock.
    pub fn register(&self, name: &str, peer: Arc<Peer>) -> Result<(), RelayError> {
        match self.peers.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(RelayError::NameConflict(name.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(peer);
                Ok(())
            }
        }
    }

    /// Remove `name`. Returns whether an entry was present.
    pub fn unregister(&self, name: &str) -> bool {
        self.peers.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.peers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Peer>> {
        self.peers.get(name).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.peers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn snapshot(&self) -> Vec<(String, Arc<Peer>)> {
        self.peers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Queue `msg` for every registered session, the sender included.
    pub fn broadcast(&self, msg: &Message) -> Fanout {
        let mut fanout = Fanout::default();
        for (name, peer) in self.snapshot() {
            match peer.send(msg) {
                Ok(()) => fanout.delivered += 1,
                Err(e) => {
                    tracing::warn!(recipient = %name, error = %e, "broadcast delivery failed");
                    fanout.failed.push(name);
                }
            }
        }
        fanout
    }

    /// Route `body` from `from` to `recipient`, echoing the same envelope
    /// back through `reply_to`. Only a failure on `reply_to` is returned.
    pub fn send_directed(
        &self,
        from: &str,
        reply_to: &Peer,
        recipient: &str,
        body: &str,
    ) -> Result<Directed, DeliveryError> {
        let Some(target) = self.get(recipient) else {
            reply_to.send(&notice::recipient_not_found(from, recipient))?;
            return Ok(Directed::RecipientNotFound);
        };

        let msg = Message::directed(from, recipient, body);
        if let Err(e) = target.send(&msg) {
            tracing::warn!(%recipient, error = %e, "directed delivery failed");
        }
        reply_to.send(&msg)?;
        Ok(Directed::Delivered)
    }

    /// Send the sorted roster to `requester` only.
    pub fn list_users(&self, requester: &str, reply_to: &Peer) -> Result<(), DeliveryError> {
        reply_to.send(&notice::roster(requester, &self.names()))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
