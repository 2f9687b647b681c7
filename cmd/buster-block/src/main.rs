//! # Buster Block server
//!
//! Assembles the application from configuration and the compiled-in adapters.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{build_router, AppState};
use auth_adapters::{AuthError, JwtVerifier};
use configs::{AuthSettings, LogFormat, LogSettings, Settings, StorageBackend};
use domains::{MovieRepository, ReviewRepository, TokenVerifier};
use secrecy::ExposeSecret;
use storage_adapters::{MemoryMovieRepository, MemoryReviewRepository};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

type Repositories = (Arc<dyn MovieRepository>, Arc<dyn ReviewRepository>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    let (movies, reviews) = repositories(&settings).await?;
    let verifier = verifier(&settings.auth)?;
    let state = AppState::new(movies, reviews, verifier);
    let app = build_router(state, &settings.cors.allowed_origins);

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, backend = ?settings.storage.backend, "buster-block listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

/// `RUST_LOG` overrides `log.filter` when set.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(MemoryMovieRepository::new()),
                Arc::new(MemoryReviewRepository::new()),
            ))
        }
        StorageBackend::Postgres => postgres_repositories(settings).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn postgres_repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    use storage_adapters::postgres::{connect, migrate};
    use storage_adapters::{PgMovieRepository, PgReviewRepository};

    let url = settings
        .database
        .url
        .as_ref()
        .context("database.url is not set")?;
    let pool = connect(url.expose_secret(), settings.database.max_connections)
        .await
        .context("connecting to postgres")?;
    migrate(&pool).await.context("running migrations")?;
    info!(max_connections = settings.database.max_connections, "postgres ready");

    Ok((
        Arc::new(PgMovieRepository::new(pool.clone())),
        Arc::new(PgReviewRepository::new(pool)),
    ))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_repositories(_settings: &Settings) -> anyhow::Result<Repositories> {
    anyhow::bail!("storage.backend = \"postgres\" but this build lacks the db-postgres feature")
}

/// RS256 wins when both keys are configured.
fn verifier(auth: &AuthSettings) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    let issuer = auth.issuer.as_deref();
    if let Some(pem) = &auth.jwt_public_key_pem {
        let verifier = JwtVerifier::rs256_pem(pem.as_bytes(), issuer).context("auth.jwt_public_key_pem")?;
        return Ok(Arc::new(verifier));
    }
    let secret = auth.jwt_secret.as_ref().ok_or(AuthError::MissingKey)?;
    Ok(Arc::new(JwtVerifier::hs256(secret.expose_secret().as_bytes(), issuer)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
