mod middleware;
mod response;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use encore_core::{QueueConfig, QueueEngine, Settings};
use encore_kv::{KvClient, RateLimiter, ReadCache, SeatLocks};
use middleware::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Encore API server...");

    let settings = Arc::new(Settings::from_env()?);

    let port = std::env::var("API_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()?;

    let frontend_url = std::env::var("FRONTEND_URL")
        .unwrap_or_else(|_| "http://localhost:5173".to_string());

    // Initialize database pool
    let pool = encore_db::create_pool(&settings.database_url).await?;
    tracing::info!("✓ Database connection established");

    // Initialize Redis handle; locks, queue, caches and the rate limiter
    // all share the one connection manager
    let kv = KvClient::connect(&settings.redis_url).await?;
    if kv.ping().await {
        tracing::info!("✓ Redis connection established");
    } else {
        tracing::warn!("Redis is not answering PING; queue and locking will fail until it does");
    }

    let locks = SeatLocks::new(kv.clone(), settings.seat_lock_timeout);
    let cache = ReadCache::new(kv.clone());
    let queue = QueueEngine::new(kv.clone(), QueueConfig::from_settings(&settings));
    let limiter = RateLimiter::new(
        kv.clone(),
        settings.rate_limit_max,
        settings.rate_limit_window,
    );

    // Create app state
    let state = AppState {
        db: pool,
        locks,
        cache,
        queue,
        limiter,
        settings,
    };

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        // Auth routes
        .route("/api/v1/auth/register", post(routes::auth::register))
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/refresh", post(routes::auth::refresh))
        .route("/api/v1/auth/logout", post(routes::auth::logout))
        .route(
            "/api/v1/auth/me",
            get(routes::auth::me).put(routes::auth::update_me),
        )
        // Public event catalog (rate limited, cached)
        .route("/api/v1/events", get(routes::events::list_events))
        // Queue routes
        .route(
            "/api/v1/queue/enter/:event_id",
            post(routes::queue::enter_queue),
        )
        .route(
            "/api/v1/queue/status/:event_id",
            get(routes::queue::queue_status),
        )
        // Reservation routes
        .route(
            "/api/v1/events/:event_id/tickets",
            get(routes::tickets::get_event_tickets),
        )
        .route("/api/v1/seats/lock", post(routes::tickets::lock_seats))
        .route("/api/v1/bookings", post(routes::tickets::create_bookings))
        .route("/api/v1/bookings/my", get(routes::tickets::my_bookings))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(frontend_url.parse::<axum::http::HeaderValue>()?)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("✓ Server listening on {}", addr);
    tracing::info!("📡 API ready at http://{}:{}/api/v1", addr.ip(), port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
