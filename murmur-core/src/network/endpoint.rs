// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Realtime endpoint derivation.
//!
//! The realtime endpoint lives on the same host as the REST API:
//! `http` becomes `ws`, `https` becomes `wss`, the path is replaced and the
//! bearer token travels as the `token` query parameter.

use url::Url;

use super::error::NetworkError;

/// Query parameter carrying the bearer token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Derives the realtime endpoint from the REST base URL.
pub fn realtime_url(api_url: &Url, path: &str, token: Option<&str>) -> Result<Url, NetworkError> {
    let scheme = match api_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(NetworkError::InvalidUrl(format!(
                "unsupported scheme '{}' (expected http, https, ws or wss)",
                other
            )))
        }
    };

    if api_url.host_str().is_none() {
        return Err(NetworkError::InvalidUrl(format!(
            "missing host in '{}'",
            api_url
        )));
    }

    let mut url = api_url.clone();
    url.set_scheme(scheme)
        .map_err(|_| NetworkError::InvalidUrl(format!("cannot switch '{}' to {}", api_url, scheme)))?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair(TOKEN_QUERY_PARAM, token);
    }

    Ok(url)
}

// INLINE_TEST_REQUIRED: covers each scheme mapping of the private transform
#[cfg(test)]
mod tests {
    use super::*;

    fn derive(base: &str, token: Option<&str>) -> Result<String, NetworkError> {
        let base = Url::parse(base).unwrap();
        realtime_url(&base, "/ws", token).map(|u| u.to_string())
    }

    #[test]
    fn test_http_becomes_ws() {
        assert_eq!(
            derive("http://localhost:8000", Some("abc")).unwrap(),
            "ws://localhost:8000/ws?token=abc"
        );
    }

    #[test]
    fn test_https_becomes_wss() {
        assert_eq!(
            derive("https://api.example.com", Some("abc")).unwrap(),
            "wss://api.example.com/ws?token=abc"
        );
    }

    #[test]
    fn test_ws_input_is_kept() {
        assert_eq!(
            derive("ws://10.0.2.2:8000/", None).unwrap(),
            "ws://10.0.2.2:8000/ws"
        );
        assert_eq!(
            derive("wss://chat.example.com:9443", Some("t")).unwrap(),
            "wss://chat.example.com:9443/ws?token=t"
        );
    }

    #[test]
    fn test_existing_path_and_query_are_replaced() {
        assert_eq!(
            derive("https://api.example.com/v1/?debug=1#frag", Some("t")).unwrap(),
            "wss://api.example.com/ws?token=t"
        );
    }

    #[test]
    fn test_token_is_percent_encoded() {
        assert_eq!(
            derive("http://localhost", Some("a b&c")).unwrap(),
            "ws://localhost/ws?token=a+b%26c"
        );
    }

    #[test]
    fn test_empty_token_is_omitted() {
        assert_eq!(derive("http://localhost", Some("")).unwrap(), "ws://localhost/ws");
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let result = derive("ftp://example.com", Some("t"));
        assert!(matches!(result, Err(NetworkError::InvalidUrl(_))));
    }
}
