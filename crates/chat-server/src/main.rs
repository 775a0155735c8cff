//! Chat server binary entry point.
//!
//! Usage:
//!   chat-server [serve]
//!   chat-server create-user --username <name> --password <password>
//!   chat-server create-channel --slug <slug> --name <name>

use chat_protocol_types::User;
use chat_server::{router, AppState, ChatServer, ServerConfig, ServerError, ServerResult, Services};
use chat_service::BackendKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Channel chat server.
#[derive(Parser, Debug)]
#[command(name = "chat-server")]
#[command(about = "Channel chat: HTTP and WebSocket messaging over memory or Redis")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "CHAT_HOST", default_value = chat_server::config::DEFAULT_HOST)]
    host: String,

    /// Port to bind.
    #[arg(long, env = "CHAT_PORT", default_value_t = chat_server::config::DEFAULT_PORT)]
    port: u16,

    /// Channel and message storage (memory, redis).
    #[arg(long, env = "CHAT_BACKEND", default_value = "memory")]
    chat_backend: BackendKind,

    /// User storage (memory, redis).
    #[arg(long, env = "AUTH_BACKEND", default_value = "memory")]
    auth_backend: BackendKind,

    /// Redis connection URL.
    #[arg(long, env = "REDIS_URL", default_value = chat_server::config::DEFAULT_REDIS_URL)]
    redis_url: String,

    /// Idle timeout for message subscriptions, in milliseconds.
    #[arg(long, env = "CHAT_IDLE_TIMEOUT_MS", default_value = "1000")]
    idle_timeout_ms: u64,

    /// Time allowed for a WebSocket client to authenticate, in seconds.
    #[arg(long, env = "CHAT_HANDSHAKE_TIMEOUT_SECS", default_value = "10")]
    handshake_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CHAT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write JSON logs to this file.
    #[arg(long, env = "CHAT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Write JSON logs to ~/.channel-chat/logs/chat.jsonl (ignored with --log-file).
    #[arg(long, env = "CHAT_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server (default).
    Serve,
    /// Register a user.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create a channel.
    CreateChannel {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        name: String,
    },
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            chat_backend: self.chat_backend,
            auth_backend: self.auth_backend,
            redis_url: self.redis_url.clone(),
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
        }
    }
}

async fn serve(config: ServerConfig, services: Services) -> ServerResult<()> {
    if config.idle_timeout.is_zero() {
        return Err(ServerError::Config(
            "idle timeout must be greater than zero".to_string(),
        ));
    }

    let app = router(AppState::new(services, &config));
    let server = ChatServer::bind(&config.bind_addr(), app).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "Server exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting...");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ServerResult<()> {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "chat-server".into(),
        default_level: args.log_level.clone(),
        log_path: args
            .log_file
            .clone()
            .or_else(|| args.log_json.then(observability::default_log_path)),
        also_stderr: true,
    });

    let config = args.server_config();
    info!(
        bind = %config.bind_addr(),
        chat_backend = %config.chat_backend,
        auth_backend = %config.auth_backend,
        idle_timeout_ms = config.idle_timeout.as_millis() as u64,
        handshake_timeout_secs = config.handshake_timeout.as_secs(),
        "Configuration loaded"
    );

    let services = Services::connect(&config).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, services).await,
        Command::CreateUser { username, password } => {
            if config.auth_backend == BackendKind::Memory {
                warn!("Auth backend is memory; the user will not outlive this command");
            }
            let user = User::new(username, password)
                .map_err(chat_auth::AuthError::from)?;
            let created = services.auth.create_user(user).await?;
            info!(username = %created.username(), "User created");
            Ok(())
        }
        Command::CreateChannel { slug, name } => {
            if config.chat_backend == BackendKind::Memory {
                warn!("Chat backend is memory; the channel will not outlive this command");
            }
            let channel = services.chat.create_channel(&slug, &name).await?;
            info!(channel = %channel.slug(), name = %channel.name(), "Channel created");
            Ok(())
        }
    }
}
