//! hireflow-client: Streaming session runtime for the recruiting agent
//!
//! This crate opens the agent's server-sent event stream for each turn,
//! feeds the frames through the `hireflow-core` reducer and reports state
//! changes to subscribers.

pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, RetryConfig, RetrySettings};
pub use error::{Error, Result};
pub use events::{Notification, NotificationLevel, SessionEvent, SessionPhase};
pub use handle::SessionHandle;
pub use session::{StreamSession, TurnInput};
pub use transport::{
    ChatRequest, InterruptResponse, SseTransport, Transport, TransportEvent, TransportFailure,
    TransportStream,
};
