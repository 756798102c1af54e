//! Murmur Core Library
//!
//! Messaging client: stored credential, REST API, reconnecting realtime
//! channel with an offline send queue, and thread/inbox reconciliation.

pub mod config;
pub mod credential;
pub mod error;
pub mod network;
pub mod rest;
pub mod thread;
pub mod types;

pub use config::{ClientConfig, API_URL_ENV, DEFAULT_API_URL};
pub use credential::{
    AuthRecord, Credential, CredentialAccessor, FileRecordStorage, MemoryRecordStorage,
    SecureStorage, SessionWriter, StaticToken, StorageError, TokenSource,
};
pub use error::{ErrorKind, MurmurError, MurmurResult};
pub use network::{
    ConnectionState, MockTransport, NetworkError, RealtimeClient, RealtimeConfig, RealtimeEvent,
    SendOutcome, SendReceipt, Subscription, Transport, WebSocketTransport,
};
pub use rest::{ApiError, RestClient};
pub use thread::{Conversation, InboxView, LiveOutcome, PendingEntry, ThreadEntry, ThreadView};
pub use types::{Id, InboxEntry, Message, MessageQuery, UserSummary};
