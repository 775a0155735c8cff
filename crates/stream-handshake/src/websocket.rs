//! [`DuplexConnection`] over an upgraded axum WebSocket.

use crate::connection::{ConnectionMetadata, DuplexConnection, Received};
use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::http::{HeaderMap, Uri};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

enum State {
    Pending(WebSocket, ConnectionMetadata),
    Open(WebSocket),
    Closed,
}

/// Server side of a WebSocket connection.
///
/// The HTTP upgrade has already happened by the time this exists; the
/// request path and headers are captured with [`metadata_from`] before the
/// upgrade and handed back by [`DuplexConnection::accept`].
pub struct WebSocketConnection {
    state: State,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket, metadata: ConnectionMetadata) -> Self {
        Self {
            state: State::Pending(socket, metadata),
        }
    }

    fn open(&mut self) -> TransportResult<&mut WebSocket> {
        match &mut self.state {
            State::Open(socket) => Ok(socket),
            State::Pending(..) => Err(TransportError::State("not accepted")),
            State::Closed => Err(TransportError::State("closed")),
        }
    }
}

/// Path and UTF-8 headers of an upgrade request.
pub fn metadata_from(uri: &Uri, headers: &HeaderMap) -> ConnectionMetadata {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    ConnectionMetadata {
        path: uri.path().to_string(),
        headers,
    }
}

#[async_trait]
impl DuplexConnection for WebSocketConnection {
    async fn accept(&mut self) -> TransportResult<ConnectionMetadata> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Pending(socket, metadata) => {
                debug!(path = %metadata.path, "WebSocket accepted");
                self.state = State::Open(socket);
                Ok(metadata)
            }
            other => {
                self.state = other;
                Err(TransportError::State("already accepted"))
            }
        }
    }

    async fn send(&mut self, text: String) -> TransportResult<()> {
        self.open()?.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn receive(&mut self, timeout: Option<Duration>) -> TransportResult<Received> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let socket = self.open()?;

        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, socket.recv()).await {
                    Ok(next) => next,
                    Err(_) => return Ok(Received::TimedOut),
                },
                None => socket.recv().await,
            };

            match next {
                Some(Ok(Message::Text(text))) => return Ok(Received::Text(text.as_str().to_string())),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Ok(Received::Text(text)),
                    Err(_) => debug!("Ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(_))) | None => return Ok(Received::Closed),
                // Pongs are queued by the socket while reading.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!(error = %e, "WebSocket read failed");
                    return Ok(Received::Closed);
                }
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) -> TransportResult<()> {
        let mut socket = match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(socket) | State::Pending(socket, _) => socket,
            State::Closed => return Ok(()),
        };

        let frame = CloseFrame {
            code,
            reason: reason.to_string().into(),
        };
        socket.send(Message::Close(Some(frame))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_metadata_from_request() {
        let uri: Uri = "/channels/general/messages_ws?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        headers.insert("host", HeaderValue::from_static("localhost"));

        let metadata = metadata_from(&uri, &headers);
        assert_eq!(metadata.path, "/channels/general/messages_ws");
        assert_eq!(metadata.header("Authorization"), Some("Basic abc"));
        assert_eq!(metadata.headers.len(), 2);
    }

    #[test]
    fn test_non_utf8_header_is_skipped() {
        let uri: Uri = "/".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-raw", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        assert!(metadata_from(&uri, &headers).headers.is_empty());
    }
}
