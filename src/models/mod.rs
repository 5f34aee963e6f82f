//! Data models for polls, ballots, suggestions, and wire frames.

pub mod ballot;
pub mod event;
pub mod poll;
pub mod suggestion;

pub use ballot::*;
pub use event::*;
pub use poll::*;
pub use suggestion::*;
