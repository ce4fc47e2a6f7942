// ██╗  ██╗ █████╗ ██████╗ ██╗   ██╗███████╗███████╗████████╗
// ██║  ██║██╔══██╗██╔══██╗██║   ██║██╔════╝██╔════╝╚══██╔══╝
// ███████║███████║██████╔╝██║   ██║█████╗  ███████╗   ██║
// ██╔══██║██╔══██║██╔══██╗╚██╗ ██╔╝██╔══╝  ╚════██║   ██║
// ██║  ██║██║  ██║██║  ██║ ╚████╔╝ ███████╗███████║   ██║
// ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝  ╚═══╝  ╚══════╝╚══════╝   ╚═╝
//
// E N G I N E
//
// Hand it a pile of URLs. It fetches all of them at once, boils the HTML
// down to text, and gives you back whatever survived the trip.

mod config;
mod coordinator;
mod error;
mod extractor;
mod fetcher;
mod metrics;
mod models;
mod server;
mod state;

#[cfg(test)]
mod test_support;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, PROXY_ENV};
use crate::fetcher::redact_proxy;
use crate::state::AppState;

fn print_banner() {
    let banner = r#"

    ╔══════════════════════════════════════════════════════════╗
    ║                                                          ║
    ║        ⚡ HARVEST ENGINE - URLS IN, TEXT OUT ⚡          ║
    ║                                                          ║
    ║   Fan-out:     one tokio task per URL                    ║
    ║   Sink:        bounded crossbeam channel                 ║
    ║   Extraction:  html2text                                 ║
    ║   Failures:    dropped quietly, counted loudly           ║
    ║                                                          ║
    ╚══════════════════════════════════════════════════════════╝

    "#;
    println!("{}", banner);
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .init();
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    init_tracing(config.log_json);
    print_banner();

    info!("🌾 HARVEST ENGINE initializing...");
    info!(
        bind = %config.bind_addr(),
        fetch_timeout_secs = config.fetch_timeout.as_secs_f64(),
        max_in_flight = ?config.max_in_flight,
        text_width = config.text_width,
        "✅ Configuration loaded"
    );
    match config.current_proxy() {
        Some(proxy) => info!(proxy = %redact_proxy(&proxy), "✅ Outbound proxy set via {}", PROXY_ENV),
        None => info!("✅ No {} set, fetching directly", PROXY_ENV),
    }

    let addr = config.bind_addr();
    let state = AppState::from_config(config)?;
    let app = server::create_router(state);

    let listener = TcpListener::bind(&addr).await?;

    // Shutdown signal
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => warn!("🛑 Shutdown signal received!"),
            Err(err) => error!("❌ Signal listener error: {}", err),
        }
        let _ = shutdown_tx.send(true);
    });

    info!("═══════════════════════════════════════════════════════");
    info!("  🟢 HARVEST ENGINE listening on http://{}", addr);
    info!("  📥 POST /fetch   📊 GET /metrics   💓 GET /health");
    info!("  ⚡ Press Ctrl+C for graceful shutdown");
    info!("═══════════════════════════════════════════════════════");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("⏳ Letting in-flight batches finish...");
        })
        .await?;

    info!("💤 HARVEST ENGINE: OFFLINE");
    Ok(())
}
