//! Broadcaster configuration.

use serde::{Deserialize, Serialize};

/// Settings for a [`RoomBroadcaster`](crate::RoomBroadcaster).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Per-connection queue length. A subscriber whose queue fills up is
    /// dropped rather than allowed to stall the dispatcher.
    pub subscriber_queue: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            subscriber_queue: 256,
        }
    }
}
