//! Realtime Network Layer
//!
//! The realtime channel of the messaging client: transport abstraction,
//! frame encoding, reconnect policy, outbound queue and event dispatch.
//!
//! # Architecture
//!
//! - **Transport trait**: synchronous text channel (WebSocket in production,
//!   mock in tests)
//! - **Frames**: JSON envelopes and local lifecycle events
//! - **Realtime client**: connection state machine with backoff, FIFO send
//!   queue and pub/sub dispatch
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use murmur_core::network::{RealtimeClient, RealtimeConfig, WebSocketTransport};
//!
//! let mut client = RealtimeClient::new(
//!     WebSocketTransport::new(),
//!     RealtimeConfig::from(&config),
//!     Arc::new(accessor),
//! );
//! client.connect()?;
//! loop {
//!     client.poll();
//! }
//! ```

mod backoff;
mod endpoint;
mod error;
mod events;
mod frame;
mod mock;
mod queue;
mod realtime;
mod transport;
mod websocket;

pub use backoff::ReconnectBackoff;
pub use endpoint::{realtime_url, TOKEN_QUERY_PARAM};
pub use error::NetworkError;
pub use events::{
    CallbackHandler, DispatchReport, EventDispatcher, EventHandler, HandlerError, HandlerResult,
    Subscription,
};
pub use frame::{OutboundFrame, RealtimeEvent, INBOUND_MESSAGE_TYPES, MESSAGE_SEND, WS_CLOSE, WS_OPEN};
pub use mock::MockTransport;
pub use queue::{PendingQueue, PendingSend};
pub use realtime::{RealtimeClient, RealtimeConfig, SendOutcome, SendReceipt};
pub use transport::{ConnectRequest, ConnectionState, Transport, TransportConfig, TransportResult};
pub use websocket::WebSocketTransport;
