//! Error types for the broadcast layer.

use sixgun_transport::ConnectionId;

/// Errors that can occur while fanning events out to subscribers.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The subscriber's queue is full; it is not keeping up.
    #[error("subscriber {0} is lagging")]
    Lagging(ConnectionId),

    /// The subscriber's receiving half was dropped (connection gone).
    #[error("subscriber {0} is closed")]
    Closed(ConnectionId),

    /// The dispatcher task has stopped.
    #[error("broadcast dispatcher is unavailable")]
    Unavailable,
}
