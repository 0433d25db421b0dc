use std::sync::Arc;

use auth::ApiKey;
use auth::Authenticator;
use auth::SystemClock;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::chirp::service::ChirpService;
use user_service::domain::session::service::SessionService;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::PostgresChirpRepository;
use user_service::outbound::repositories::PostgresRefreshTokenRepository;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        auth = ?config.auth,
        "Configuration loaded"
    );

    if config.webhook.polka_key.is_empty() {
        tracing::warn!("No webhook key configured, payment provider callbacks will be rejected");
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let refresh_token_repository = Arc::new(PostgresRefreshTokenRepository::new(pg_pool.clone()));
    let chirp_repository = Arc::new(PostgresChirpRepository::new(pg_pool));

    let authenticator = Arc::new(Authenticator::new(
        &config.auth,
        Arc::clone(&user_repository),
        refresh_token_repository,
        Arc::new(SystemClock),
    ));

    let session_service = Arc::new(SessionService::new(
        authenticator,
        ApiKey::new(config.webhook.polka_key.clone()),
    ));
    let user_service = Arc::new(UserService::new(user_repository));
    let chirp_service = Arc::new(ChirpService::new(chirp_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, session_service, chirp_service);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
