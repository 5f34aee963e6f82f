//! WebSocket transport: handshake with browser-like headers, auth, ack, send, receive.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{
    HeaderName, HeaderValue, CACHE_CONTROL, CONNECTION, COOKIE, ORIGIN, PRAGMA, USER_AGENT,
};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::ConnectionConfig;
use crate::error::{AppError, AppResult};
use crate::models::event::Outbound;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Generate a unique connection id for log correlation.
pub fn generate_connection_id() -> String {
    format!("{}.{}", std::process::id(), Uuid::new_v4().as_simple())
}

/// Build the upgrade request with the headers the service expects from a browser.
pub fn build_request(config: &ConnectionConfig) -> AppResult<Request> {
    let mut request = config
        .endpoint
        .as_str()
        .into_client_request()
        .map_err(|e| AppError::Config(format!("endpoint {}: {}", config.endpoint, e)))?;

    let mut extra: Vec<(HeaderName, String)> = vec![
        (ORIGIN, config.origin.clone()),
        (CACHE_CONTROL, "no-cache".to_string()),
        (PRAGMA, "no-cache".to_string()),
        (CONNECTION, "keep-alive, Upgrade".to_string()),
        (HeaderName::from_static("sec-fetch-dest"), "empty".to_string()),
        (HeaderName::from_static("sec-fetch-mode"), "websocket".to_string()),
        (HeaderName::from_static("sec-fetch-site"), "same-origin".to_string()),
        (USER_AGENT, config.user_agent.clone()),
    ];
    if let Some(cookie) = &config.session_cookie {
        extra.push((COOKIE, format!("sesh={}", cookie)));
    }

    let headers = request.headers_mut();
    for (name, value) in extra {
        let value = HeaderValue::from_str(&value)
            .map_err(|e| AppError::InvalidHeader(format!("{}: {}", name, e)))?;
        headers.insert(name, value);
    }
    Ok(request)
}

/// One live connection to the polling service.
pub struct Transport {
    connection_id: String,
    stream: WsStream,
}

impl Transport {
    /// Perform the WebSocket handshake.
    #[instrument(skip_all, fields(endpoint = %config.endpoint))]
    pub async fn connect(config: &ConnectionConfig) -> AppResult<Self> {
        let request = build_request(config)?;
        let connection_id = generate_connection_id();
        info!(connection_id = %connection_id, "connecting");
        let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
        info!(connection_id = %connection_id, "connected");
        Ok(Self {
            connection_id,
            stream,
        })
    }

    /// Send `auth: <token>`. The service does not confirm it.
    pub async fn authenticate(&mut self, token: &str) -> AppResult<()> {
        info!(connection_id = %self.connection_id, "authenticating");
        self.send(&Outbound::Auth(token.to_string())).await
    }

    /// Send the `ack` the service requires after every inbound frame.
    pub async fn acknowledge(&mut self) -> AppResult<()> {
        self.send(&Outbound::Ack).await
    }

    pub async fn send(&mut self, frame: &Outbound) -> AppResult<()> {
        let text = frame.to_text();
        debug!(connection_id = %self.connection_id, frame = %text, "send");
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Next application frame. `None` once the remote closes the connection.
    /// Ping/pong are answered by the websocket layer and never surface here.
    pub async fn next_frame(&mut self) -> Option<AppResult<String>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(AppError::Connection(e))),
            };
            let raw = match msg {
                Message::Text(text) => text.as_str().to_owned(),
                Message::Binary(data) => String::from_utf8_lossy(&data).into_owned(),
                Message::Close(frame) => {
                    debug!(connection_id = %self.connection_id, ?frame, "remote close");
                    return None;
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };
            debug!(connection_id = %self.connection_id, frame = %raw, "recv");
            return Some(Ok(raw));
        }
    }

    /// Close the connection cleanly.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(connection_id = %self.connection_id, error = %e, "close failed");
        }
        info!(connection_id = %self.connection_id, "connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointMode;

    fn config(cookie: Option<&str>) -> ConnectionConfig {
        ConnectionConfig {
            mode: EndpointMode::Voter,
            endpoint: "wss://tkpolls.com/voter".to_string(),
            auth_token: Some("tok".to_string()),
            session_cookie: cookie.map(String::from),
            origin: "https://tkpolls.com".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn request_carries_browser_headers() {
        let request = build_request(&config(Some("abc"))).unwrap();
        let headers = request.headers();
        assert_eq!(headers[ORIGIN], "https://tkpolls.com");
        assert_eq!(headers[COOKIE], "sesh=abc");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[CONNECTION], "keep-alive, Upgrade");
        assert_eq!(headers[USER_AGENT], "test-agent");
        assert_eq!(headers["sec-fetch-mode"], "websocket");
        assert!(headers.contains_key("sec-websocket-key"));
    }

    #[test]
    fn no_cookie_header_without_cookie() {
        let request = build_request(&config(None)).unwrap();
        assert!(!request.headers().contains_key(COOKIE));
    }

    #[test]
    fn bad_header_value_rejected() {
        let mut cfg = config(None);
        cfg.user_agent = "bad\nagent".to_string();
        assert!(matches!(build_request(&cfg), Err(AppError::InvalidHeader(_))));
    }

    #[test]
    fn bad_endpoint_rejected() {
        let mut cfg = config(None);
        cfg.endpoint = "not a url".to_string();
        assert!(matches!(build_request(&cfg), Err(AppError::Config(_))));
    }
}
