//! `/channels/{slug}/messages_ws`: authenticate, then stream the channel.
//!
//! Every message of the channel (backlog first) is sent as one JSON text
//! frame. Text frames from the client of the form `{"body": {"text": ..}}`
//! are published to the channel as the authenticated user; anything else is
//! ignored. The stream ends when the client closes.

use crate::error::ServerResult;
use chat_protocol_types::{MessageBase, Notification, UserBase};
use chat_service::{ChatError, ChatService};
use futures_util::StreamExt;
use std::time::Duration;
use stream_handshake::{
    reject, DuplexConnection, Handshake, Received, INTERNAL_ERROR, POLICY_VIOLATION,
};
use tracing::{debug, error, info};

/// Serves the channel message stream.
#[derive(Clone)]
pub struct MessagesEndpoint {
    chat: ChatService,
    handshake: Handshake,
    idle_timeout: Duration,
}

impl MessagesEndpoint {
    pub fn new(chat: ChatService, handshake: Handshake, idle_timeout: Duration) -> Self {
        Self {
            chat,
            handshake,
            idle_timeout,
        }
    }

    /// Run one connection to channel `slug` to completion. Rejections
    /// (failed authentication, unknown channel) close the connection and
    /// return `Ok`.
    pub async fn serve<C>(&self, connection: &mut C, slug: &str) -> ServerResult<()>
    where
        C: DuplexConnection + ?Sized,
    {
        let metadata = connection.accept().await?;

        let Ok(user) = self.handshake.run(connection, &metadata).await else {
            return Ok(());
        };

        let subscription = match self
            .chat
            .subscribe(slug, Some(self.idle_timeout), true)
            .await
        {
            Ok(subscription) => subscription,
            Err(ChatError::ChannelNotFound(_)) => {
                debug!(channel = %slug, "Channel not found");
                reject(connection, POLICY_VIOLATION, "Channel not found").await;
                return Ok(());
            }
            Err(e) => {
                reject(connection, INTERNAL_ERROR, "Internal error").await;
                return Err(e.into());
            }
        };

        info!(channel = %slug, username = %user.username(), "Streaming channel");
        let notifications = subscription.into_stream();
        tokio::pin!(notifications);

        loop {
            // Outbound first so a chatty client cannot starve its own feed.
            tokio::select! {
                biased;

                notification = notifications.next() => match notification {
                    Some(Ok(Notification::Message(message))) => {
                        if let Err(e) = connection.send(message.to_json()?).await {
                            debug!(channel = %slug, error = %e, "Send failed, client gone");
                            return Ok(());
                        }
                    }
                    Some(Ok(Notification::IdleTick)) => {}
                    Some(Err(e)) => {
                        error!(channel = %slug, error = %e, "Subscription failed");
                        reject(connection, INTERNAL_ERROR, "Internal error").await;
                        return Err(e.into());
                    }
                    None => return Ok(()),
                },
                received = connection.receive(None) => match received {
                    Ok(Received::Text(text)) => {
                        if let Err(e) = self.publish(slug, &user, &text).await {
                            error!(channel = %slug, error = %e, "Publish failed");
                            reject(connection, INTERNAL_ERROR, "Internal error").await;
                            return Err(e);
                        }
                    }
                    Ok(Received::TimedOut) => {}
                    Ok(Received::Closed) | Err(_) => {
                        debug!(channel = %slug, "Client disconnected");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn publish(&self, slug: &str, user: &UserBase, text: &str) -> ServerResult<()> {
        let Ok(message) = serde_json::from_str::<MessageBase>(text) else {
            debug!(channel = %slug, "Ignoring frame that is not a message");
            return Ok(());
        };
        self.chat.send_message(slug, user, message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_auth::{AuthGate, Credentials, MemoryAuthService};
    use chat_protocol_types::{Message, User};
    use std::sync::Arc;
    use stream_handshake::{ConnectionMetadata, TransportResult};
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    #[derive(Debug, PartialEq)]
    enum Outbound {
        Text(String),
        Close(u16, String),
    }

    /// Connection driven over channels: the test feeds inbound frames and
    /// watches what the endpoint sends. Dropping the inbound sender is a
    /// client close.
    struct ChannelConnection {
        metadata: ConnectionMetadata,
        incoming: mpsc::UnboundedReceiver<String>,
        outgoing: mpsc::UnboundedSender<Outbound>,
    }

    struct Client {
        inbound: mpsc::UnboundedSender<String>,
        outbound: mpsc::UnboundedReceiver<Outbound>,
        served: JoinHandle<ServerResult<()>>,
    }

    impl Client {
        async fn next(&mut self) -> Outbound {
            tokio::time::timeout(Duration::from_secs(2), self.outbound.recv())
                .await
                .expect("nothing sent")
                .expect("endpoint dropped the connection")
        }

        async fn next_text(&mut self) -> String {
            match self.next().await {
                Outbound::Text(json) => Message::from_json(&json).unwrap().body.text,
                other => panic!("expected a message, got {:?}", other),
            }
        }

        fn send(&self, text: &str) {
            self.inbound.send(text.to_string()).unwrap();
        }

        async fn leave(self) -> ServerResult<()> {
            drop(self.inbound);
            self.served.await.unwrap()
        }
    }

    #[async_trait]
    impl DuplexConnection for ChannelConnection {
        async fn accept(&mut self) -> TransportResult<ConnectionMetadata> {
            Ok(self.metadata.clone())
        }

        async fn send(&mut self, text: String) -> TransportResult<()> {
            let _ = self.outgoing.send(Outbound::Text(text));
            Ok(())
        }

        async fn receive(&mut self, timeout: Option<Duration>) -> TransportResult<Received> {
            let next = match timeout {
                Some(timeout) => match tokio::time::timeout(timeout, self.incoming.recv()).await {
                    Ok(next) => next,
                    Err(_) => return Ok(Received::TimedOut),
                },
                None => self.incoming.recv().await,
            };
            Ok(next.map(Received::Text).unwrap_or(Received::Closed))
        }

        async fn close(&mut self, code: u16, reason: &str) -> TransportResult<()> {
            let _ = self.outgoing.send(Outbound::Close(code, reason.to_string()));
            Ok(())
        }
    }

    async fn endpoint() -> (MessagesEndpoint, ChatService) {
        let chat = ChatService::in_memory();
        chat.create_channel("testslug", "test").await.unwrap();
        let gate = AuthGate::new(Arc::new(MemoryAuthService::new()));
        gate.create_user(User::new("test", "test").unwrap())
            .await
            .unwrap();
        let handshake = Handshake::new(gate, Duration::from_millis(100));
        let endpoint = MessagesEndpoint::new(chat.clone(), handshake, Duration::from_millis(10));
        (endpoint, chat)
    }

    fn connect(endpoint: &MessagesEndpoint, slug: &str, password: Option<&str>) -> Client {
        let mut metadata = ConnectionMetadata::new(format!("/channels/{slug}/messages_ws"));
        if let Some(password) = password {
            let authorization = Credentials::new("test", password).to_basic_header();
            metadata = metadata.with_header("Authorization", authorization);
        }
        let (inbound, incoming) = mpsc::unbounded_channel();
        let (outgoing, outbound) = mpsc::unbounded_channel();
        let mut connection = ChannelConnection {
            metadata,
            incoming,
            outgoing,
        };

        let endpoint = endpoint.clone();
        let slug = slug.to_string();
        let served = tokio::spawn(async move { endpoint.serve(&mut connection, &slug).await });
        Client {
            inbound,
            outbound,
            served,
        }
    }

    #[tokio::test]
    async fn test_streams_backlog_then_stops_when_client_leaves() {
        let (endpoint, chat) = endpoint().await;
        let user = UserBase::new("test").unwrap();
        chat.send_message("testslug", &user, MessageBase::text("one"))
            .await
            .unwrap();
        chat.send_message("testslug", &user, MessageBase::text("two"))
            .await
            .unwrap();

        let mut client = connect(&endpoint, "testslug", Some("test"));
        assert_eq!(client.next_text().await, "one");
        assert_eq!(client.next_text().await, "two");

        // Several idle ticks pass, then the client goes.
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.leave().await.unwrap();
    }

    #[tokio::test]
    async fn test_inbound_message_is_published_and_echoed() {
        let (endpoint, chat) = endpoint().await;
        let mut client = connect(&endpoint, "testslug", Some("test"));

        client.send(r#"{"body": {"text": "from the socket"}}"#);
        assert_eq!(client.next_text().await, "from the socket");

        let stored = chat.get_messages("testslug").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].sender_username, "test");
        assert_eq!(stored[0].channel_slug, "testslug");
        client.leave().await.unwrap();
    }

    #[tokio::test]
    async fn test_frames_that_are_not_messages_are_ignored() {
        let (endpoint, chat) = endpoint().await;
        let mut client = connect(&endpoint, "testslug", Some("test"));

        client.send("hello");
        client.send(r#"{"text": "no body"}"#);
        client.send(r#"{"body": {"text": "kept"}}"#);
        assert_eq!(client.next_text().await, "kept");

        assert_eq!(chat.get_messages("testslug").await.unwrap().len(), 1);
        client.leave().await.unwrap();
    }

    #[tokio::test]
    async fn test_first_message_auth_then_publish() {
        let (endpoint, chat) = endpoint().await;
        let mut client = connect(&endpoint, "testslug", None);

        let authorization = Credentials::new("test", "test").to_basic_header();
        client.send(&serde_json::json!({ "Authorization": authorization }).to_string());
        client.send(r#"{"body": {"text": "after auth"}}"#);
        assert_eq!(client.next_text().await, "after auth");

        // The credential frame itself was not published.
        assert_eq!(chat.get_messages("testslug").await.unwrap().len(), 1);
        client.leave().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_channel_is_rejected_after_auth() {
        let (endpoint, _chat) = endpoint().await;
        let mut client = connect(&endpoint, "missing", Some("test"));

        assert_eq!(
            client.next().await,
            Outbound::Close(POLICY_VIOLATION, "Channel not found".to_string())
        );
        client.leave().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_auth_never_streams() {
        let (endpoint, chat) = endpoint().await;
        let user = UserBase::new("test").unwrap();
        chat.send_message("testslug", &user, MessageBase::text("secret"))
            .await
            .unwrap();

        let mut client = connect(&endpoint, "testslug", Some("wrong"));
        assert_eq!(
            client.next().await,
            Outbound::Close(POLICY_VIOLATION, "Invalid credentials.".to_string())
        );
        client.leave().await.unwrap();
    }
}
