mod api;
mod middleware;

use std::sync::Arc;

use iluma_backend::{BackendClient, TelegramNotifier};
use iluma_catalog::{CatalogService, CatalogSettings, CheckoutService};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, order_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = iluma_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let facets = Arc::new(iluma_core::load_facets(&config.facets_path)?);
    let backend = BackendClient::from_config(&config)?;
    let notifier = match &config.telegram {
        Some(telegram) => Some(TelegramNotifier::new(
            telegram.clone(),
            config.backend_timeout(),
        )?),
        None => {
            tracing::warn!("Telegram credentials not set; order notifications disabled");
            None
        }
    };

    let state = AppState {
        catalog: CatalogService::new(backend.clone(), CatalogSettings::from_config(&config)),
        checkout: CheckoutService::from_config(backend, notifier, &config),
        facets,
    };
    let app = build_app(state, order_rate_limit_state(config.order_rate_limit_per_min));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        backend = %config.backend_url,
        "iluma-server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
