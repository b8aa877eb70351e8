use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default seconds between generation passes (1 hour).
const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domari_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = domari_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    let interval_secs: u64 = std::env::var("GENERATION_INTERVAL_SECS")
        .unwrap_or_else(|_| DEFAULT_INTERVAL_SECS.to_string())
        .parse()
        .expect("GENERATION_INTERVAL_SECS must be a valid u64");

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT, shutting down");
            cancel_on_signal.cancel();
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_pass(&pool).await;
            }
            () = cancel.cancelled() => {
                break;
            }
        }
    }

    tracing::info!("Worker stopped");
}

/// One generation pass: recurring transactions, then fund accruals.
/// Failures are logged and the loop keeps going; the next tick retries.
async fn run_pass(pool: &domari_db::DbPool) {
    let today = chrono::Utc::now().date_naive();

    if let Err(e) = domari_worker::generate_recurring(pool, today).await {
        tracing::error!(error = %e, "Recurring generation pass failed");
    }
    if let Err(e) = domari_worker::accrue_funds(pool, today).await {
        tracing::error!(error = %e, "Fund accrual pass failed");
    }
}
