//! Core logic: frame classification, poll state, vote selection, reconnect policy.

pub mod backoff;
pub mod classifier;
pub mod poll_state;
pub mod selector;

pub use backoff::{ExponentialBackoff, ReconnectPolicy};
pub use classifier::classify;
pub use poll_state::PollState;
pub use selector::select_votes;
