//! Medication Reminder Service: standalone binary that texts caregivers when
//! a scheduled medication reminder comes due.
//!
//! Hosts the reminder API and a dashboard UI on the same port.
//! Default: http://127.0.0.1:3000/

mod config;
mod dashboard;
mod error;
mod intake;
mod phone;
mod routes;
mod scanner;
mod sms_api;
mod store;
mod worker;

use anyhow::Context;
use med_reminder_types::TriggerMode;
use routes::AppState;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = config::ServiceConfig::from_env().context("Invalid configuration")?;

    let store = Arc::new(store::ReminderStore::new());
    let channel = Arc::new(
        sms_api::IprogSmsClient::new(config.sms.clone())
            .context("Failed to build SMS gateway client")?,
    );
    let scanner = Arc::new(scanner::DueReminderScanner::new(
        store.clone(),
        channel,
        config.mark_delivered_on,
    ));

    let state = Arc::new(AppState {
        store,
        scanner: scanner.clone(),
        start_time: Instant::now(),
        trigger_mode: config.trigger_mode,
        scan_interval_secs: config.scan_interval_secs,
    });

    let shutdown = CancellationToken::new();

    let mut app = axum::Router::new()
        .route("/", axum::routing::get(dashboard::dashboard))
        .route("/add-reminder", axum::routing::post(routes::add_reminder))
        .route("/reminders", axum::routing::get(routes::list_reminders))
        .route("/status", axum::routing::get(routes::status));

    let worker_handle = match config.trigger_mode {
        TriggerMode::Timer => {
            let handle = tokio::spawn(worker::run_worker(
                scanner,
                config.scan_interval_secs,
                shutdown.clone(),
            ));
            log::info!(
                "Background worker started (scan interval: {}s)",
                config.scan_interval_secs
            );
            Some(handle)
        }
        TriggerMode::Endpoint => {
            app = app.route(
                "/send-due-reminders",
                axum::routing::get(routes::send_due_reminders),
            );
            log::info!("On-demand trigger enabled at /send-due-reminders");
            None
        }
    };

    log::info!(
        "Reminders marked delivered on: {}",
        config.mark_delivered_on
    );

    let cors = tower_http::cors::CorsLayer::permissive();
    let app = app.with_state(state).layer(cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Medication Reminder Service listening on http://{}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            log::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Some(handle) = worker_handle {
        handle.await.ok();
    }

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
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
