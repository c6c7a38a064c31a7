//! The connection handle the broadcaster delivers into.

use std::sync::Arc;

use sixgun_protocol::EventEnvelope;
use sixgun_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::BroadcastError;

/// Receiving half of a subscriber queue. The connection's writer task
/// drains it and pushes each envelope over the transport.
pub type EventReceiver = mpsc::Receiver<Arc<EventEnvelope>>;

/// One connection's registration with the broadcaster.
///
/// Delivery is a non-blocking `try_send` into a bounded queue, so a slow or
/// dead peer can only ever lose its own subscription.
#[derive(Debug, Clone)]
pub struct Subscriber {
    conn_id: ConnectionId,
    tx: mpsc::Sender<Arc<EventEnvelope>>,
}

impl Subscriber {
    /// Creates a subscriber and the receiver its connection should drain.
    pub fn channel(conn_id: ConnectionId, capacity: usize) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { conn_id, tx }, rx)
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Hands one event to the connection's queue.
    pub(crate) fn deliver(&self, envelope: &Arc<EventEnvelope>) -> Result<(), BroadcastError> {
        self.tx
            .try_send(Arc::clone(envelope))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => BroadcastError::Lagging(self.conn_id),
                mpsc::error::TrySendError::Closed(_) => BroadcastError::Closed(self.conn_id),
            })
    }
}
