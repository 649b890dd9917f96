//! Courtbook Server — court booking and tournament engine
//!
//! Main entry point that wires stores, services, and the background
//! worker together. HTTP controllers live in a separate deployment layer
//! and call into the same services this binary constructs.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use courtbook_core::config::AppConfig;
use courtbook_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("COURTBOOK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Courtbook v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Initialize stores ────────────────────────────────
    let booking_store = Arc::new(courtbook_store::memory::MemoryBookingStore::new());
    let court_store = Arc::new(courtbook_store::memory::MemoryCourtStore::new());
    let loyalty_ledger = Arc::new(courtbook_store::memory::MemoryLoyaltyLedger::new());
    let free_slot_ledger = Arc::new(courtbook_store::memory::MemoryFreeSlotLedger::new(
        config.booking.daily_free_slots,
    ));
    let tournament_store = Arc::new(courtbook_store::memory::MemoryTournamentStore::new());
    let registration_store = Arc::new(courtbook_store::memory::MemoryRegistrationStore::new());
    tracing::info!("Stores initialized");

    // ── Step 2: External collaborators ───────────────────────────
    let gateway = Arc::new(courtbook_service::gateway::HttpPaymentGateway::new(
        config.gateway.clone(),
    )?);
    let notifier = Arc::new(courtbook_service::notification::LogNotifier::new());
    tracing::info!("Payment gateway adapter ready (base: {})", config.gateway.base_url);

    // ── Step 3: Services ─────────────────────────────────────────
    let coordinator = Arc::new(courtbook_service::booking::ReservationCoordinator::new(
        booking_store.clone(),
        court_store.clone(),
        loyalty_ledger.clone(),
        free_slot_ledger.clone(),
        registration_store.clone(),
        tournament_store.clone(),
        gateway.clone(),
        notifier.clone(),
        config.booking.clone(),
        config.gateway.clone(),
    ));
    let tournament_service = Arc::new(courtbook_service::tournament::TournamentService::new(
        tournament_store.clone(),
        registration_store.clone(),
        gateway.clone(),
        notifier.clone(),
        config.booking.clone(),
        config.gateway.clone(),
    ));
    tracing::info!("Services initialized");

    // ── Step 4: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 5: Background worker ────────────────────────────────
    let worker_handle = if config.worker.enabled {
        let mut runner = courtbook_worker::TaskRunner::new();
        runner.register(Arc::new(courtbook_worker::jobs::ExpirySweepTask::new(
            coordinator.clone(),
            config.worker.expiry_sweep_seconds,
        )));
        runner.register(Arc::new(courtbook_worker::jobs::BookingLifecycleTask::new(
            coordinator.clone(),
            config.worker.lifecycle_seconds,
        )));
        runner.register(Arc::new(courtbook_worker::jobs::TournamentStatusTask::new(
            tournament_service.clone(),
            config.worker.tournament_status_seconds,
        )));

        let worker_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(worker_cancel).await;
        });
        tracing::info!("Background worker started");
        Some(handle)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    tracing::info!("Courtbook engine running; press Ctrl+C to stop");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("Courtbook shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
