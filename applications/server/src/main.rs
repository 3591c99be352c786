/// Wavecast Server - Multi-user audio sharing server
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wavecast_core::{CreateUser, CredentialStore, PlayStore, Username};
use wavecast_server::{
    api,
    config::ServerConfig,
    services::{AuthService, MediaStore, PlayTracker, RateLimiter, SessionManager},
    state::AppState,
};
use wavecast_storage::Database;

#[derive(Parser)]
#[command(name = "wavecast-server")]
#[command(about = "Wavecast multi-user audio sharing server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavecast_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config.as_deref()).await?;
        }
        Commands::AddUser {
            username,
            password,
            email,
        } => {
            add_user(&username, &password, email).await?;
        }
        Commands::ListUsers => {
            list_users().await?;
        }
    }

    Ok(())
}

async fn serve(config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load(config_path)?;
    config.validate()?;

    tracing::info!("Starting Wavecast Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let db = Arc::new(Database::new(&config.storage.database_url).await?);
    tracing::info!("Database connected");

    // Initialize media storage
    let media_store = MediaStore::new(config.storage.media_dir.clone());
    media_store.initialize().await?;
    let media_store = Arc::new(media_store);

    // Initialize auth and sessions
    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.access_ttl_minutes,
        config.auth.refresh_ttl_days,
    ));
    let sessions = Arc::new(SessionManager::new(
        Arc::clone(&auth_service),
        Arc::clone(&db) as Arc<dyn CredentialStore>,
    ));
    tracing::info!("Auth service initialized");

    // Upload rate limiting with periodic eviction of idle windows
    let window = Duration::from_secs(config.uploads.window_secs);
    let upload_limiter = Arc::new(RateLimiter::new(window, config.uploads.max_per_window));
    Arc::clone(&upload_limiter).start_sweeper(window);
    tracing::info!(
        "Upload limiter: {} per {}s window",
        config.uploads.max_per_window,
        config.uploads.window_secs
    );

    // Play accounting
    let play_tracker = Arc::new(PlayTracker::new(
        Duration::from_secs(config.playback.count_threshold_secs),
        Arc::clone(&db) as Arc<dyn PlayStore>,
    ));

    // Build application state and router
    let app_state = AppState::new(
        db,
        auth_service,
        sessions,
        media_store,
        upload_limiter,
        play_tracker,
    );
    let app = api::router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // The connect-info make-service keeps client addresses available to
    // the upload rate limiter.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn add_user(username: &str, password: &str, email: Option<String>) -> anyhow::Result<()> {
    let config = ServerConfig::load(None)?;
    let db = Database::new(&config.storage.database_url).await?;

    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.access_ttl_minutes,
        config.auth.refresh_ttl_days,
    );

    let username = Username::new(username.trim());
    if username.is_blank() {
        anyhow::bail!("Username must not be empty");
    }

    let password_hash = auth_service.hash_password(password)?;
    let created = db
        .create_user(&CreateUser {
            username: username.clone(),
            email,
            display_name: None,
            password_hash,
        })
        .await?;

    if !created {
        anyhow::bail!("Username already taken: {}", username);
    }

    println!("Created user: {}", username);
    Ok(())
}

async fn list_users() -> anyhow::Result<()> {
    let config = ServerConfig::load(None)?;
    let db = Database::new(&config.storage.database_url).await?;

    let users = db.get_all_users().await?;

    println!("Users:");
    for user in users {
        let display_name = user.display_name.as_deref().unwrap_or("-");
        println!("  {} ({})", user.username, display_name);
    }

    Ok(())
}
