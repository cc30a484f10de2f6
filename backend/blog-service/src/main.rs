use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use blog_service::config::StoreBackend;
use blog_service::db::{self, DbConfig, Store};
use blog_service::{handlers, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Store> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Store::in_memory())
        }
        StoreBackend::Postgres => {
            let db_cfg = DbConfig::from(&config.database);
            db_cfg.log_config();

            let pool = db::create_pool(&db_cfg)
                .await
                .context("Failed to create database pool")?;
            if config.database.run_migrations {
                db::run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
            }
            Ok(Store::postgres(pool))
        }
    }
}

/// Blog Service
///
/// Serves the Yatube feeds, post pages and follow endpoints.
///
/// # Routes
///
/// - `/`, `/group/{slug}/`, `/profile/{username}/`, `/follow/` - paginated feeds
/// - `/posts/{id}/` - post detail with comments
/// - `/create/`, `/posts/{id}/edit/`, `/posts/{id}/delete/` - author-only mutations
/// - `/posts/{id}/comment/` - add a comment
/// - `/profile/{username}/follow/`, `/profile/{username}/unfollow/` - subscriptions
/// - `/health`, `/metrics`, `/openapi.json` - operational endpoints
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config).await?;
    let state = web::Data::new(AppState::new(store, config.site.clone()));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        result = &mut server_task => {
            result
                .context("HTTP server task panicked")?
                .context("HTTP server failed")?;
        }
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received, stopping HTTP server");
            server_handle.stop(true).await;
            server_task
                .await
                .context("HTTP server task panicked")?
                .context("HTTP server failed")?;
        }
    }

    tracing::info!("blog-service stopped");
    Ok(())
}
