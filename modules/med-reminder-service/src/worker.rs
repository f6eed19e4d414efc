//! Background timer for scan passes.
//!
//! Runs one scan every N seconds until the shutdown token fires. Cancellation
//! is only observed between passes, so an in-flight pass always completes.

use crate::scanner::DueReminderScanner;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub async fn run_worker(
    scanner: Arc<DueReminderScanner>,
    scan_interval_secs: u64,
    shutdown: CancellationToken,
) {
    log::info!(
        "[MED_REMINDER] Worker started (scan interval: {}s)",
        scan_interval_secs
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(scan_interval_secs)) => {}
        }

        scanner.scan(chrono::Utc::now()).await;
    }

    log::info!("[MED_REMINDER] Worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::test_support::RecordingChannel;
    use crate::store::{sample, ReminderStore};
    use med_reminder_types::DeliveryPolicy;

    #[tokio::test(start_paused = true)]
    async fn test_worker_scans_on_interval_and_stops() {
        let store = Arc::new(ReminderStore::new());
        let channel = Arc::new(RecordingChannel::default());
        let scanner = Arc::new(DueReminderScanner::new(
            store.clone(),
            channel.clone(),
            DeliveryPolicy::Attempt,
        ));
        let reminder = store.append(sample("Ana", chrono::Utc::now()));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_worker(scanner.clone(), 60, shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(store.get(reminder.id).unwrap().delivered);
        assert_eq!(channel.calls().len(), 1);

        shutdown.cancel();
        handle.await.unwrap();
        assert!(scanner.last_scan().await.is_some());
    }

    #[tokio::test]
    async fn test_worker_exits_immediately_when_cancelled() {
        let store = Arc::new(ReminderStore::new());
        let scanner = Arc::new(DueReminderScanner::new(
            store,
            Arc::new(RecordingChannel::default()),
            DeliveryPolicy::Attempt,
        ));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        run_worker(scanner.clone(), 3600, shutdown).await;
        assert!(scanner.last_scan().await.is_none());
    }
}
