//! Connection-facing handlers: transport, frame dispatch, and the session loop.

pub mod dispatcher;
pub mod session;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use session::{Session, SessionState};
pub use transport::Transport;
