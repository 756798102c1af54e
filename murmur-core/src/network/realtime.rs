// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Realtime Client
//!
//! Owns the realtime channel: connects with the stored credential,
//! reconnects with exponential backoff, queues sends while the channel is
//! down and dispatches inbound frames to subscribers.
//!
//! The client never spawns threads or sleeps. Its owner drives it by
//! calling [`RealtimeClient::poll`] from its own loop; the reconnect timer
//! is a deadline checked on every poll and cleared by
//! [`RealtimeClient::close`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::backoff::ReconnectBackoff;
use super::endpoint::realtime_url;
use super::error::NetworkError;
use super::events::{CallbackHandler, EventDispatcher, EventHandler, HandlerResult, Subscription};
use super::frame::{OutboundFrame, RealtimeEvent};
use super::queue::{PendingQueue, PendingSend};
use super::transport::{ConnectRequest, ConnectionState, Transport, TransportConfig};
use crate::config::ClientConfig;
use crate::credential::TokenSource;

/// Settings of the realtime client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// REST base URL the realtime endpoint is derived from.
    pub api_url: Url,
    /// Path of the realtime endpoint.
    pub path: String,
    /// First reconnect delay.
    pub reconnect_base: Duration,
    /// Reconnect delay cap.
    pub reconnect_max: Duration,
    /// Longest accepted body, in characters.
    pub max_body_chars: usize,
    /// Connect without a credential instead of failing fast.
    pub allow_anonymous: bool,
    /// Offer the token as a sub-protocol as well as in the query string.
    pub token_subprotocol: bool,
    /// Socket timeouts.
    pub transport: TransportConfig,
}

impl From<&ClientConfig> for RealtimeConfig {
    fn from(config: &ClientConfig) -> Self {
        RealtimeConfig {
            api_url: config.api_url.clone(),
            path: config.realtime_path.clone(),
            reconnect_base: config.reconnect_base,
            reconnect_max: config.reconnect_max,
            max_body_chars: config.max_body_chars,
            allow_anonymous: config.allow_anonymous_realtime,
            token_subprotocol: config.token_subprotocol,
            transport: config.transport.clone(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig::from(&ClientConfig::default())
    }
}

/// How a send left the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the open transport.
    Sent,
    /// Waiting in the pending queue for the next open.
    Queued,
}

/// Result of [`RealtimeClient::send`].
///
/// `Sent` only means the frame reached the transport, not that the server
/// stored the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Provisional id for the optimistic UI entry.
    pub local_id: String,
    pub peer_id: String,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
    pub outcome: SendOutcome,
}

impl SendReceipt {
    /// True if the frame went out immediately.
    pub fn is_sent(&self) -> bool {
        self.outcome == SendOutcome::Sent
    }
}

/// Reconnecting realtime client.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use murmur_core::network::{MockTransport, RealtimeClient, RealtimeConfig};
/// use murmur_core::credential::StaticToken;
///
/// let mut client = RealtimeClient::new(
///     MockTransport::new(),
///     RealtimeConfig::default(),
///     Arc::new(StaticToken::new("t0ken")),
/// );
/// let _sub = client.on(|event| {
///     println!("{:?}", event.event_type());
///     Ok(())
/// });
/// client.connect()?;
/// client.send("peer-1", "hi")?;
/// client.poll();
/// ```
pub struct RealtimeClient<T: Transport> {
    transport: T,
    config: RealtimeConfig,
    tokens: Arc<dyn TokenSource>,
    state: ConnectionState,
    closed_by_user: bool,
    backoff: ReconnectBackoff,
    reconnect_at: Option<Instant>,
    last_delay: Option<Duration>,
    queue: PendingQueue,
    events: EventDispatcher,
}

impl<T: Transport> RealtimeClient<T> {
    /// Creates a disconnected client.
    pub fn new(transport: T, config: RealtimeConfig, tokens: Arc<dyn TokenSource>) -> Self {
        let backoff = ReconnectBackoff::new(config.reconnect_base, config.reconnect_max);
        RealtimeClient {
            transport,
            config,
            tokens,
            state: ConnectionState::Disconnected,
            closed_by_user: false,
            backoff,
            reconnect_at: None,
            last_delay: None,
            queue: PendingQueue::new(),
            events: EventDispatcher::new(),
        }
    }

    /// Opens the channel, re-enabling automatic reconnection.
    ///
    /// A transport failure is not an error: it schedules a reconnect and is
    /// reported through lifecycle events. Errors are returned only when no
    /// attempt can be made (no credential, unusable API URL).
    pub fn connect(&mut self) -> Result<(), NetworkError> {
        self.connect_at(Instant::now())
    }

    /// [`connect`](Self::connect) with an explicit clock reading.
    pub fn connect_at(&mut self, now: Instant) -> Result<(), NetworkError> {
        self.closed_by_user = false;
        self.reconnect_at = None;

        if self.state == ConnectionState::Open && self.transport.is_open() {
            return Ok(());
        }

        self.attempt(now)
    }

    /// Sends a message, or queues it if the channel is not usable.
    ///
    /// Never fails because of the connection; only an invalid peer or body
    /// is rejected.
    pub fn send(&mut self, peer_id: &str, body: &str) -> Result<SendReceipt, NetworkError> {
        self.send_at(peer_id, body, Instant::now())
    }

    /// [`send`](Self::send) with an explicit clock reading.
    pub fn send_at(
        &mut self,
        peer_id: &str,
        body: &str,
        now: Instant,
    ) -> Result<SendReceipt, NetworkError> {
        if peer_id.trim().is_empty() {
            return Err(NetworkError::InvalidMessage("peer id is empty".into()));
        }
        if body.trim().is_empty() {
            return Err(NetworkError::InvalidMessage("message body is empty".into()));
        }
        let chars = body.chars().count();
        if chars > self.config.max_body_chars {
            return Err(NetworkError::InvalidMessage(format!(
                "message body is {} characters (max {})",
                chars, self.config.max_body_chars
            )));
        }

        let frame = OutboundFrame::MessageSend {
            peer_id: peer_id.to_string(),
            body: body.to_string(),
        }
        .encode()?;

        let entry = PendingSend {
            local_id: Uuid::new_v4().to_string(),
            peer_id: peer_id.to_string(),
            body: body.to_string(),
            enqueued_at: Utc::now(),
            frame,
        };

        let mut failure = None;
        if self.state == ConnectionState::Open {
            // Older sends go first.
            if let Err(e) = self.flush() {
                failure = Some(e);
            } else {
                match self.transport.send_text(entry.frame()) {
                    Ok(()) => {
                        debug!(local_id = %entry.local_id, "message sent");
                        return Ok(receipt(entry, SendOutcome::Sent));
                    }
                    Err(e) => failure = Some(e),
                }
            }
        }

        debug!(local_id = %entry.local_id, pending = self.queue.len() + 1, "message queued");
        let queued = receipt(entry.clone(), SendOutcome::Queued);
        self.queue.push(entry);

        if let Some(error) = failure {
            self.handle_send_failure(error, now);
        }

        Ok(queued)
    }

    /// Closes the channel and disables automatic reconnection.
    ///
    /// Idempotent. Errors from the transport's own close are ignored.
    /// Pending sends are kept and go out after the next `connect`.
    pub fn close(&mut self) {
        self.closed_by_user = true;
        self.reconnect_at = None;

        if self.state == ConnectionState::Disconnected && !self.transport.is_open() {
            return;
        }

        let was_open = self.state == ConnectionState::Open;
        self.state = ConnectionState::Closing;
        if let Err(e) = self.transport.disconnect() {
            debug!(error = %e, "ignoring error while closing transport");
        }
        self.state = ConnectionState::Disconnected;
        info!("realtime channel closed");

        if was_open {
            self.events.dispatch(&RealtimeEvent::Close);
        }
    }

    /// Fires a due reconnect, flushes pending sends and dispatches every
    /// inbound frame that is ready. Returns the number of frames dispatched.
    pub fn poll(&mut self) -> usize {
        self.poll_at(Instant::now())
    }

    /// [`poll`](Self::poll) with an explicit clock reading.
    pub fn poll_at(&mut self, now: Instant) -> usize {
        if self.closed_by_user {
            return 0;
        }

        if self.reconnect_at.is_some_and(|at| now >= at) {
            self.reconnect_at = None;
            if let Err(e) = self.attempt(now) {
                warn!(error = %e, "reconnect abandoned");
            }
        }

        if self.state != ConnectionState::Open {
            return 0;
        }

        if let Err(e) = self.flush() {
            self.handle_send_failure(e, now);
            if self.state != ConnectionState::Open {
                return 0;
            }
        }

        let mut dispatched = 0;
        loop {
            match self.transport.receive() {
                Ok(Some(text)) => match RealtimeEvent::parse(&text) {
                    Ok(event) => {
                        debug!(event_type = ?event.event_type(), "inbound frame");
                        self.events.dispatch(&event);
                        dispatched += 1;
                    }
                    Err(e) => warn!(error = %e, "dropping malformed frame"),
                },
                Ok(None) => break,
                Err(e) => {
                    info!(error = %e, "realtime channel lost");
                    self.connection_lost(now);
                    break;
                }
            }
        }
        dispatched
    }

    /// Registers a closure for every event. See [`EventDispatcher`].
    pub fn on<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&RealtimeEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.events.subscribe(Arc::new(CallbackHandler::new(callback)))
    }

    /// Registers a handler for every event.
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) -> Subscription {
        self.events.subscribe(handler)
    }

    /// The subscriber registry.
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// True while the channel is open and usable.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open && self.transport.is_open()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True after `close` until the next `connect`.
    pub fn is_closed_by_user(&self) -> bool {
        self.closed_by_user
    }

    /// Number of queued sends.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Queued sends, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &PendingSend> {
        self.queue.iter()
    }

    /// Time left until the scheduled reconnect, if one is scheduled.
    pub fn reconnect_scheduled_in(&self, now: Instant) -> Option<Duration> {
        self.reconnect_at
            .map(|at| at.saturating_duration_since(now))
    }

    /// Deadline of the scheduled reconnect.
    pub fn next_reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Delay used for the most recent reconnect scheduling.
    pub fn last_reconnect_delay(&self) -> Option<Duration> {
        self.last_delay
    }

    /// Consecutive failed attempts since the channel was last open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.backoff.attempts()
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn attempt(&mut self, now: Instant) -> Result<(), NetworkError> {
        self.reconnect_at = None;

        let token = self.tokens.get_token();
        if token.is_none() && !self.config.allow_anonymous {
            self.state = ConnectionState::Disconnected;
            return Err(NetworkError::NotAuthenticated);
        }

        let secret = token.as_ref().map(|t| t.expose());
        let url = match realtime_url(&self.config.api_url, &self.config.path, secret) {
            Ok(url) => url,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                return Err(e);
            }
        };
        let protocols = match secret {
            Some(secret) if self.config.token_subprotocol && !secret.is_empty() => {
                vec![secret.to_string()]
            }
            _ => Vec::new(),
        };
        let request = ConnectRequest {
            url,
            protocols,
            config: self.config.transport.clone(),
        };

        self.state = ConnectionState::Connecting;
        debug!(attempt = self.backoff.attempts() + 1, "connecting realtime channel");

        match self.transport.connect(&request) {
            Ok(()) => self.on_open(now),
            Err(e) => {
                warn!(error = %e, "realtime connect failed");
                self.state = ConnectionState::Disconnected;
                self.schedule_reconnect(now);
            }
        }
        Ok(())
    }

    fn on_open(&mut self, now: Instant) {
        self.state = ConnectionState::Open;
        self.backoff.reset();
        self.last_delay = None;
        info!(pending = self.queue.len(), "realtime channel open");

        if let Err(e) = self.flush() {
            // Nobody has seen this connection yet, so no events.
            warn!(error = %e, "flush failed right after open");
            if let Err(e) = self.transport.disconnect() {
                debug!(error = %e, "ignoring error while dropping transport");
            }
            self.state = ConnectionState::Disconnected;
            self.schedule_reconnect(now);
            return;
        }

        self.events.dispatch(&RealtimeEvent::Open);
    }

    /// Transmits queued sends in order. An entry leaves the queue only after
    /// the transport accepted it.
    fn flush(&mut self) -> Result<usize, NetworkError> {
        let mut sent = 0;
        while let Some(entry) = self.queue.front() {
            self.transport.send_text(entry.frame())?;
            self.queue.pop();
            sent += 1;
        }
        if sent > 0 {
            debug!(sent, "flushed pending sends");
        }
        Ok(sent)
    }

    fn handle_send_failure(&mut self, error: NetworkError, now: Instant) {
        warn!(error = %error, pending = self.queue.len(), "send failed; kept in queue");
        if !self.transport.is_open() {
            self.connection_lost(now);
        }
    }

    fn connection_lost(&mut self, now: Instant) {
        let was_open = self.state == ConnectionState::Open;
        if let Err(e) = self.transport.disconnect() {
            debug!(error = %e, "ignoring error while dropping transport");
        }
        self.state = ConnectionState::Disconnected;

        if was_open {
            self.events.dispatch(&RealtimeEvent::Close);
        }
        if !self.closed_by_user {
            self.schedule_reconnect(now);
        }
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        let delay = self.backoff.next_delay();
        self.reconnect_at = Some(now + delay);
        self.last_delay = Some(delay);
        warn!(
            delay_ms = delay.as_millis() as u64,
            attempt = self.backoff.attempts(),
            "realtime reconnect scheduled"
        );
    }
}

fn receipt(entry: PendingSend, outcome: SendOutcome) -> SendReceipt {
    SendReceipt {
        local_id: entry.local_id,
        peer_id: entry.peer_id,
        body: entry.body,
        submitted_at: entry.enqueued_at,
        outcome,
    }
}

// INLINE_TEST_REQUIRED: Tests private flush and reconnect deadline handling
#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticToken;
    use crate::network::mock::MockTransport;

    fn client() -> RealtimeClient<MockTransport> {
        RealtimeClient::new(
            MockTransport::new(),
            RealtimeConfig::default(),
            Arc::new(StaticToken::new("secret")),
        )
    }

    #[test]
    fn test_flush_stops_at_first_failure() {
        let mut client = client();
        client.send("p", "one").unwrap();
        client.send("p", "two").unwrap();
        client.transport_mut().set_open(true);
        client.transport_mut().inject_send_error(NetworkError::SendFailed("busy".into()));

        assert!(client.flush().is_err());
        assert_eq!(client.queue.len(), 2);

        assert_eq!(client.flush().unwrap(), 2);
        assert!(client.queue.is_empty());
    }

    #[test]
    fn test_flush_failure_on_open_reschedules_without_events() {
        let mut client = client();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        let _sub = client.on(move |event| {
            seen.lock().push(event.event_type().map(str::to_string));
            Ok(())
        });

        client.send("p", "queued").unwrap();
        client
            .transport_mut()
            .inject_send_error(NetworkError::SendFailed("reset".into()));
        client.connect().unwrap();

        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.reconnect_at.is_some());
        assert_eq!(client.pending_count(), 1);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let mut client = RealtimeClient::new(
            MockTransport::new(),
            RealtimeConfig::default(),
            Arc::new(StaticToken::absent()),
        );

        assert!(matches!(client.connect(), Err(NetworkError::NotAuthenticated)));
        assert!(client.transport().connect_requests().is_empty());
        assert!(client.reconnect_at.is_none());
    }

    #[test]
    fn test_anonymous_connect_has_no_token() {
        let config = RealtimeConfig {
            allow_anonymous: true,
            ..Default::default()
        };
        let mut client =
            RealtimeClient::new(MockTransport::new(), config, Arc::new(StaticToken::absent()));

        client.connect().unwrap();
        let request = &client.transport().connect_requests()[0];
        assert_eq!(request.url.query(), None);
        assert!(request.protocols.is_empty());
    }

    #[test]
    fn test_token_goes_in_query_and_subprotocol() {
        let mut client = client();
        client.connect().unwrap();

        let request = &client.transport().connect_requests()[0];
        assert_eq!(request.url.as_str(), "ws://localhost:8000/ws?token=secret");
        assert_eq!(request.protocols, vec!["secret".to_string()]);
    }
}
