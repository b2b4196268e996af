use std::sync::Arc;

use account_service::bootstrap::seed_initial_admin;
use account_service::config::Config;
use account_service::domain::auth::service::AuthService;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::AppState;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Argon2Config;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenIssuer;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        environment = config.environment.as_str(),
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        access_token_expire_minutes = config.jwt.access_token_expire_minutes,
        refresh_token_expire_days = config.jwt.refresh_token_expire_days,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::new(&Argon2Config::from(&config.argon2))?;
    let token_issuer = TokenIssuer::new(config.jwt.secret.as_bytes())
        .with_access_ttl(config.jwt.access_ttl()?)
        .with_refresh_ttl(config.jwt.refresh_ttl()?);
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_issuer));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));

    seed_initial_admin(user_repository.as_ref(), &authenticator, &config.admin).await?;

    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            Arc::clone(&user_repository),
            Arc::clone(&authenticator),
        )),
        user_service: Arc::new(UserService::new(
            Arc::clone(&user_repository),
            Arc::clone(&authenticator),
        )),
        health_probe: user_repository,
        password_policy: Arc::new(config.password_policy()),
        environment: config.environment,
    };

    let http_address = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state, &config.server.cors_origins);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
