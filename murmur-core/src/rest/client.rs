// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! REST messaging client
//!
//! Fetches users, the inbox and thread history, and provides the HTTP send
//! path used when the realtime channel is unavailable.

use std::sync::Arc;

use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::error::ApiError;
use crate::config::ClientConfig;
use crate::credential::{Credential, SessionWriter, TokenSource};
use crate::types::{InboxEntry, Message, MessageQuery, UserSummary};

#[derive(Deserialize)]
struct InboxResponse {
    chats: Vec<InboxEntry>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct SendResponse {
    message: Message,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    peer_id: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authenticated client for the messaging REST API.
///
/// Every call reads the current credential first and fails with
/// [`ApiError::NotAuthenticated`] without touching the network when there
/// is none. Failures are never retried.
pub struct RestClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
    session: Option<SessionWriter>,
    inbox_limit: u32,
    max_body_chars: usize,
}

impl RestClient {
    /// Creates a client reading credentials from `tokens`.
    ///
    /// Without a session writer, `log_in` returns the token without
    /// persisting it.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!(
                "Murmur/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()?;

        Ok(RestClient {
            http,
            base_url: config.api_url.clone(),
            tokens,
            session: None,
            inbox_limit: config.inbox_limit,
            max_body_chars: config.max_body_chars,
        })
    }

    /// Creates a client that reads and writes the stored session.
    pub fn with_session(config: &ClientConfig, session: SessionWriter) -> Result<Self, ApiError> {
        let mut client = Self::new(config, Arc::new(session.accessor()))?;
        client.session = Some(session);
        Ok(client)
    }

    /// REST base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /users/{handle}`.
    pub async fn get_user_by_handle(&self, handle: &str) -> Result<UserSummary, ApiError> {
        let credential = self.credential()?;
        let url = self.endpoint(&["users", handle])?;
        self.execute(self.http.get(url), Some(&credential)).await
    }

    /// `GET /inbox?limit=N`. Uses the configured default when `limit` is `None`.
    pub async fn get_inbox(&self, limit: Option<u32>) -> Result<Vec<InboxEntry>, ApiError> {
        let credential = self.credential()?;
        let limit = limit.unwrap_or(self.inbox_limit);
        let url = self.endpoint(&["inbox"])?;
        let request = self.http.get(url).query(&[("limit", limit.to_string())]);

        let response: InboxResponse = self.execute(request, Some(&credential)).await?;
        Ok(response.chats)
    }

    /// `GET /messages`. Exactly one of `chat_id` and `peer_id` must be set.
    pub async fn get_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, ApiError> {
        let params = message_query_params(query)?;
        let credential = self.credential()?;
        let url = self.endpoint(&["messages"])?;
        let request = self.http.get(url).query(&params);

        let response: MessagesResponse = self.execute(request, Some(&credential)).await?;
        Ok(response.messages)
    }

    /// `POST /messages/send`. Returns the stored message.
    pub async fn send_message(&self, peer_id: &str, body: &str) -> Result<Message, ApiError> {
        if body.trim().is_empty() {
            return Err(ApiError::InvalidBody("message body is empty".into()));
        }
        let chars = body.chars().count();
        if chars > self.max_body_chars {
            return Err(ApiError::InvalidBody(format!(
                "message body is {} characters (max {})",
                chars, self.max_body_chars
            )));
        }
        let credential = self.credential()?;
        let url = self.endpoint(&["messages", "send"])?;
        let request = self.http.post(url).json(&SendRequest { peer_id, body });

        let response: SendResponse = self.execute(request, Some(&credential)).await?;
        Ok(response.message)
    }

    /// `POST /auth` with the password grant. Persists the token when a
    /// session writer is attached.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let url = self.endpoint(&["auth"])?;
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_secret", password),
        ];
        let request = self.http.post(url).form(&form);

        let response: TokenResponse = self.execute(request, None).await?;
        if response.access_token.is_empty() {
            return Err(ApiError::Decode("empty access_token".into()));
        }
        let credential = Credential::new(response.access_token);

        if let Some(session) = &self.session {
            session.store_login(&credential)?;
        }
        info!("signed in");
        Ok(credential)
    }

    /// Forgets the stored token. No request is made.
    pub fn log_out(&self) -> Result<(), ApiError> {
        if let Some(session) = &self.session {
            session.store_logout()?;
        }
        info!("signed out");
        Ok(())
    }

    fn credential(&self) -> Result<Credential, ApiError> {
        self.tokens.get_token().ok_or(ApiError::NotAuthenticated)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidQuery(format!("API URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError> {
        let request = match credential {
            Some(credential) => request.header(reqwest::header::AUTHORIZATION, credential.bearer()),
            None => request,
        };
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).await?;
        let status = response.status();
        debug!(%method, %path, status = status.as_u16(), "api response");

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn message_query_params(query: &MessageQuery) -> Result<Vec<(&'static str, String)>, ApiError> {
    let mut params = Vec::new();
    match (&query.peer_id, &query.chat_id) {
        (Some(peer_id), None) => params.push(("peer_id", peer_id.clone())),
        (None, Some(chat_id)) => params.push(("chat_id", chat_id.clone())),
        (None, None) => {
            return Err(ApiError::InvalidQuery(
                "one of chat_id or peer_id is required".into(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(ApiError::InvalidQuery(
                "chat_id and peer_id are mutually exclusive".into(),
            ))
        }
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(before) = query.before {
        params.push(("before", before.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticToken;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_query_params_for_peer() {
        let before = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let query = MessageQuery::with_peer("u1").limit(10).before(before);
        let params = message_query_params(&query).unwrap();
        assert_eq!(
            params,
            vec![
                ("peer_id", "u1".to_string()),
                ("limit", "10".to_string()),
                ("before", "2026-03-01T10:00:00.000Z".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_requires_exactly_one_selector() {
        assert!(matches!(
            message_query_params(&MessageQuery::default()),
            Err(ApiError::InvalidQuery(_))
        ));

        let both = MessageQuery {
            chat_id: Some("c1".into()),
            peer_id: Some("u1".into()),
            ..Default::default()
        };
        assert!(matches!(
            message_query_params(&both),
            Err(ApiError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_endpoint_encodes_handle_and_keeps_base_path() {
        let config = ClientConfig::new("https://api.example.com/v1/").unwrap();
        let client = RestClient::new(&config, Arc::new(StaticToken::absent())).unwrap();

        let url = client.endpoint(&["users", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users/a%20b%2Fc");
    }
}
