//! Connection representation
//!
//! `Connection` models one connected remote peer. It holds the sending side
//! of the per-connection channel drained by the WebSocket send loop, and the
//! remote readers created on the peer's behalf, keyed by topic.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::domain::{Domain, InstanceHandle};
use crate::transport::message::ServerMessage;

#[derive(Debug)]
pub struct Connection {
    pub id: String,
    pub sender: UnboundedSender<WsMessage>,
    pub readers: HashMap<String, InstanceHandle>,
}

impl Connection {
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("peer-{}", Uuid::new_v4()),
            sender,
            readers: HashMap::new(),
        }
    }

    /// Queue a protocol message for the peer.
    pub fn reply(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.sender.send(WsMessage::text(json)) {
                    warn!("Failed to queue reply for {}: {e}", self.id);
                }
            }
            Err(e) => warn!("Failed to serialize reply for {}: {e}", self.id),
        }
    }

    /// Delete every reader created for this peer, which unmatches them from
    /// their writers.
    pub fn close(&mut self, domain: &Domain) {
        for (topic, reader) in self.readers.drain() {
            if let Err(e) = domain.delete_remote_reader(&reader) {
                warn!("Failed to delete reader for {} on {topic}: {e}", self.id);
            }
        }
    }
}
