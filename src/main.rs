use axum::http::{header, HeaderName, HeaderValue, Method};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use openwebui_dashboard::cache::ResponseCache;
use openwebui_dashboard::config::{AppConfig, AuthMode};
use openwebui_dashboard::middleware::AuthContext;
use openwebui_dashboard::{database, handlers, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep SQL logging quiet unless asked for
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("openwebui_dashboard=info,sqlx=warn,tower_http=info,info")
        }))
        .init();

    let config = AppConfig::from_env()?;

    let pool = database::create_pool(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;

    if config.skip_migrations {
        warn!("⚠️ Skipping migrations due to SKIP_MIGRATIONS=true");
    } else {
        match sqlx::migrate!("./migrations").run(&pool).await {
            Ok(_) => info!("✅ Migrations completed successfully"),
            Err(sqlx::migrate::MigrateError::VersionMismatch(version)) => {
                warn!("⚠️  Migration version mismatch: {}", version);
                warn!("Package request tables may be out of date");
            }
            Err(e) => {
                warn!("❌ Failed to run migrations: {}", e);
                warn!("Continuing without migrations (set SKIP_MIGRATIONS=true to suppress this warning)");
            }
        }
    }

    if config.auth_mode == AuthMode::Mock {
        warn!(
            "🔓 AUTH_MODE=mock: trusting the X-Auth-User header for @{} accounts",
            config.allowed_domain
        );
    }

    let cache = Arc::new(ResponseCache::new(config.cache_ttl));
    spawn_cache_cleanup(cache.clone());

    let state = AppState {
        db: pool,
        cache,
        auth: Arc::new(AuthContext::from_config(&config)),
    };

    let app = handlers::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config)),
    );

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("🚀 Server starting on http://{}:{}", config.host, config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = if config.debug_mode {
        info!("🔓 Development mode: Using permissive CORS");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("⚠️ Ignoring invalid origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();

        info!("🔒 CORS configured for {} origins", origins.len());
        for origin in &origins {
            info!("  - Allowed origin: {:?}", origin);
        }

        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
    };

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::ACCEPT,
        HeaderName::from_static("x-auth-user"),
    ])
}

fn spawn_cache_cleanup(cache: Arc<ResponseCache>) {
    let period = cache.ttl().max(Duration::from_secs(30));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            cache.cleanup_expired();
        }
    });
}
