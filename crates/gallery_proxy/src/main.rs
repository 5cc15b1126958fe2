#![forbid(unsafe_code)]

use std::env;
use std::process::ExitCode;

use gallery_host::GalleryConfig;
use gallery_proxy::{
    app_state_from_config, build_router, BIND_ADDR_KEY, DEFAULT_BIND_ADDR, LOG_JSON_KEY,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool(LOG_JSON_KEY, false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match GalleryConfig::from_lookup(|key| env::var(key).ok()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "gallery proxy configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    let bind_addr = env::var(BIND_ADDR_KEY)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, %bind_addr, "gallery proxy bind failed");
            return ExitCode::FAILURE;
        }
    };
    info!(
        %bind_addr,
        container = %config.container,
        page_size = config.page_size,
        "gallery proxy listening"
    );

    let app = build_router(app_state_from_config(&config));
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
    {
        error!(error = %err, "gallery proxy server failed");
        return ExitCode::FAILURE;
    }
    info!("gallery proxy stopped");
    ExitCode::SUCCESS
}
