//! HTTP routes.
//!
//! | Method | Path | Auth | Result |
//! |---|---|---|---|
//! | POST | `/users` | no | created user |
//! | GET | `/users/me` | yes | the caller |
//! | GET / POST | `/channels` | yes | channel list / created channel |
//! | GET / POST | `/channels/{slug}/messages` | yes | history / published message |
//! | GET | `/channels/{slug}/messages_ws` | handshake | WebSocket stream |
//!
//! Authenticated routes take `Authorization: Basic ...`. Errors are JSON
//! `{"detail": "..."}`; a 401 also carries `WWW-Authenticate: Basic`.

use crate::config::ServerConfig;
use crate::endpoint::MessagesEndpoint;
use crate::services::Services;
use axum::extract::{FromRequestParts, Path, State, WebSocketUpgrade};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chat_auth::{AuthError, AuthGate};
use chat_protocol_types::{Channel, Message, MessageBase, User, UserBase};
use chat_service::{ChatError, ChatService};
use stream_handshake::{metadata_from, Handshake, WebSocketConnection};
use thiserror::Error;
use tracing::{error, warn, Instrument, Span};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    chat: ChatService,
    auth: AuthGate,
    messages: MessagesEndpoint,
}

impl AppState {
    pub fn new(services: Services, config: &ServerConfig) -> Self {
        let handshake = Handshake::new(services.auth.clone(), config.handshake_timeout);
        let messages =
            MessagesEndpoint::new(services.chat.clone(), handshake, config.idle_timeout);
        Self {
            chat: services.chat,
            auth: services.auth,
            messages,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/me", get(current_user))
        .route("/channels", get(list_channels).post(create_channel))
        .route(
            "/channels/{slug}/messages",
            get(list_messages).post(send_message),
        )
        .route("/channels/{slug}/messages_ws", get(messages_ws))
        .with_state(state)
}

/// A request error rendered as `{"detail": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials | AuthError::NotAuthenticated) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Auth(AuthError::DuplicateUser(_))
            | ApiError::Chat(ChatError::DuplicateChannel(_)) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::Validation(_))
            | ApiError::Chat(ChatError::InvalidChannel(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Chat(ChatError::ChannelNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self.status() {
            StatusCode::NOT_FOUND => "Channel not found".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(serde_json::json!({ "detail": self.detail() }));
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}

/// The caller, authenticated from the `Authorization` header.
pub struct Authenticated(pub UserBase);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        Ok(Self(state.auth.authenticate_header(authorization).await?))
    }
}

async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<UserBase>, ApiError> {
    Ok(Json(state.auth.create_user(user).await?))
}

async fn current_user(Authenticated(user): Authenticated) -> Json<UserBase> {
    Json(user)
}

async fn list_channels(
    State(state): State<AppState>,
    _: Authenticated,
) -> Result<Json<Vec<Channel>>, ApiError> {
    Ok(Json(state.chat.get_channels().await?))
}

async fn create_channel(
    State(state): State<AppState>,
    _: Authenticated,
    Json(channel): Json<Channel>,
) -> Result<Json<Channel>, ApiError> {
    let created = state
        .chat
        .create_channel(channel.slug(), channel.name())
        .await?;
    Ok(Json(created))
}

async fn list_messages(
    State(state): State<AppState>,
    _: Authenticated,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.chat.get_messages(&slug).await?))
}

async fn send_message(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(slug): Path<String>,
    Json(message): Json<MessageBase>,
) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.chat.send_message(&slug, &user, message).await?))
}

/// Upgrades unconditionally; authentication happens over the socket.
async fn messages_ws(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let metadata = metadata_from(&uri, &headers);
    let span = Span::current();
    ws.on_upgrade(move |socket| {
        async move {
            let mut connection = WebSocketConnection::new(socket, metadata);
            if let Err(e) = state.messages.serve(&mut connection, &slug).await {
                warn!(channel = %slug, error = %e, "Stream ended with error");
            }
        }
        .instrument(span)
    })
}
