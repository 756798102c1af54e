// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Real transport implementation using tungstenite for WebSocket connections.
//! Supports both native-tls and rustls TLS backends.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

#[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
use native_tls::TlsConnector;

#[cfg(feature = "network-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "network-rustls")]
use std::sync::Arc;

use tracing::debug;
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::error::NetworkError;
use super::transport::{ConnectRequest, Transport, TransportResult};

/// WebSocket transport for the realtime channel.
///
/// Supports both ws:// (plaintext) and wss:// (TLS) connections. Frames are
/// JSON text; the socket's read timeout bounds every `receive` call.
pub struct WebSocketTransport {
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
    open: bool,
}

impl WebSocketTransport {
    /// Creates a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport {
            socket: None,
            open: false,
        }
    }

    /// Opens a TCP connection to the first reachable address.
    fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, NetworkError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| NetworkError::ConnectionFailed(format!("resolve {}: {}", host, e)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }

        Err(NetworkError::ConnectionFailed(match last_error {
            Some(e) => e.to_string(),
            None => format!("no address for {}", host),
        }))
    }

    fn set_timeouts(
        stream: &TcpStream,
        read: Duration,
        write: Duration,
    ) -> Result<(), NetworkError> {
        stream
            .set_read_timeout(Some(read))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        stream
            .set_write_timeout(Some(write))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))
    }

    /// Create a TLS stream using native-tls
    #[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let connector = TlsConnector::new()
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS error: {}", e)))?;
        let tls_stream = connector
            .connect(host, tcp_stream)
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS handshake failed: {}", e)))?;
        Ok(MaybeTlsStream::NativeTls(tls_stream))
    }

    /// Create a TLS stream using rustls
    #[cfg(feature = "network-rustls")]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name: ServerName<'_> = host.try_into().map_err(|_| {
            NetworkError::ConnectionFailed(format!("Invalid server name: {}", host))
        })?;

        let tls_conn = rustls::ClientConnection::new(Arc::new(config), server_name.to_owned())
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS setup failed: {}", e)))?;

        let tls_stream = rustls::StreamOwned::new(tls_conn, tcp_stream);
        Ok(MaybeTlsStream::Rustls(tls_stream))
    }

    #[cfg(not(any(feature = "network-native-tls", feature = "network-rustls")))]
    fn create_tls_stream(
        _host: &str,
        _tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        Err(NetworkError::ConnectionFailed(
            "wss:// requires the network-native-tls or network-rustls feature".into(),
        ))
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, request: &ConnectRequest) -> TransportResult<()> {
        if self.open {
            return Ok(());
        }

        let url = &request.url;
        let is_tls = match url.scheme() {
            "wss" => true,
            "ws" => false,
            other => {
                return Err(NetworkError::InvalidUrl(format!(
                    "expected ws:// or wss://, got {}://",
                    other
                )))
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| NetworkError::InvalidUrl("missing host".into()))?
            .to_string();
        let port = url
            .port_or_known_default()
            .unwrap_or(if is_tls { 443 } else { 80 });

        let config = &request.config;
        let tcp_stream = Self::connect_tcp(&host, port, config.connect_timeout)?;

        // The handshake gets the full connect timeout; receive() later uses
        // the short read timeout as its poll interval.
        let timeout_handle = tcp_stream
            .try_clone()
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        Self::set_timeouts(&timeout_handle, config.connect_timeout, config.write_timeout)?;

        let stream: MaybeTlsStream<TcpStream> = if is_tls {
            Self::create_tls_stream(&host, tcp_stream)?
        } else {
            MaybeTlsStream::Plain(tcp_stream)
        };

        let mut ws_request = url
            .as_str()
            .into_client_request()
            .map_err(|e| NetworkError::ConnectionFailed(format!("Invalid WebSocket request: {}", e)))?;

        if !request.protocols.is_empty() {
            let value = HeaderValue::from_str(&request.protocols.join(", ")).map_err(|_| {
                NetworkError::ConnectionFailed("token is not a valid sub-protocol value".into())
            })?;
            ws_request
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", value);
        }

        let (socket, _response) = tungstenite::client(ws_request, stream).map_err(|e| {
            NetworkError::ConnectionFailed(format!("WebSocket handshake failed: {}", e))
        })?;

        Self::set_timeouts(&timeout_handle, config.read_timeout, config.write_timeout)?;

        self.socket = Some(socket);
        self.open = true;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        self.open = false;
        if let Some(mut socket) = self.socket.take() {
            socket
                .close(None)
                .map_err(|e| NetworkError::ConnectionFailed(format!("close failed: {}", e)))?;
            // Push the close frame out; the peer's reply is not awaited.
            let _ = socket.flush();
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_text(&mut self, frame: &str) -> TransportResult<()> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        socket.send(Message::Text(frame.to_string())).map_err(|e| {
            if matches!(
                e,
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
            ) {
                self.open = false;
                NetworkError::ConnectionClosed
            } else {
                NetworkError::SendFailed(e.to_string())
            }
        })
    }

    fn receive(&mut self) -> TransportResult<Option<String>> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        // Control frames are not data; keep reading so a ping inside a
        // burst does not end the caller's drain.
        loop {
            match socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => debug!("dropping non-UTF-8 binary frame"),
                },
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {
                    // tungstenite queues the pong itself; flush sends it.
                    let _ = socket.flush();
                }
                Ok(Message::Close(_)) => {
                    self.open = false;
                    return Err(NetworkError::ConnectionClosed);
                }
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return Ok(None);
                }
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.open = false;
                    return Err(NetworkError::ConnectionClosed);
                }
                Err(e) => {
                    self.open = false;
                    return Err(NetworkError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }
}
