//! Room-scoped event broadcasting for Sixgun.
//!
//! Every game is a room. Connections subscribe to the rooms they care about
//! and receive only those rooms' events. Publishing never waits on the
//! network: events are queued to a dispatcher task, which hands each one to
//! the per-connection queues of that room's subscribers.
//!
//! # Key types
//!
//! - [`RoomBroadcaster`]: cheap-to-clone handle to the dispatcher
//! - [`Subscriber`]: the sending half of one connection's event queue
//! - [`BroadcastConfig`]: queue sizing

mod broadcaster;
mod config;
mod error;
mod subscriber;

pub use broadcaster::RoomBroadcaster;
pub use config::BroadcastConfig;
pub use error::BroadcastError;
pub use subscriber::{EventReceiver, Subscriber};
