//! Replication of [`SharedGestureState`] across the frames of one page.
//!
//! Frames form a hub-and-spoke topology: every descendant registers with
//! the root frame, the root re-broadcasts whatever it receives, and all
//! traffic travels over a [`FrameBus`] as JSON envelopes tagged with the
//! extension identifier.

pub mod bus;
pub mod message;
pub mod state;
pub mod sync;

pub use bus::{Delivery, FrameBus, FramePort};
pub use message::{Envelope, FrameId, FrameMessage};
pub use state::SharedGestureState;
pub use sync::{CrossFrameSync, SyncOutcome};
