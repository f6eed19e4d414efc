//! Due-reminder scanner.
//!
//! One pass selects every undelivered reminder whose scheduled time has come,
//! sends each through the notification channel in store order, and flips the
//! `delivered` flag according to the configured [`DeliveryPolicy`]. Passes
//! are serialized, so overlapping triggers never dispatch a reminder twice.

use crate::phone;
use crate::sms_api::NotificationChannel;
use crate::store::ReminderStore;
use chrono::{DateTime, Local, Utc};
use med_reminder_types::{DeliveryPolicy, Reminder, ScanReport};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of the most recent completed pass
#[derive(Debug, Clone)]
pub struct LastScan {
    pub finished_at: DateTime<Utc>,
    pub report: ScanReport,
}

pub struct DueReminderScanner {
    store: Arc<ReminderStore>,
    channel: Arc<dyn NotificationChannel>,
    policy: DeliveryPolicy,
    pass_lock: Mutex<()>,
    last_scan: Mutex<Option<LastScan>>,
}

impl DueReminderScanner {
    pub fn new(
        store: Arc<ReminderStore>,
        channel: Arc<dyn NotificationChannel>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            store,
            channel,
            policy,
            pass_lock: Mutex::new(()),
            last_scan: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    pub async fn last_scan(&self) -> Option<LastScan> {
        self.last_scan.lock().await.clone()
    }

    /// Run one scan pass as of `now`.
    pub async fn scan(&self, now: DateTime<Utc>) -> ScanReport {
        let _pass = self.pass_lock.lock().await;

        // Selected after acquiring the lock so a waiting pass sees the previous pass's flips.
        let due = self.store.due(now);
        let mut report = ScanReport::default();

        if !due.is_empty() {
            log::debug!("[MED_REMINDER] Scan: {} reminder(s) due", due.len());
        }

        for reminder in &due {
            report.checked += 1;
            let accepted = self.dispatch(reminder).await;
            if accepted {
                report.sent += 1;
            } else {
                report.failed += 1;
            }

            let should_mark = match self.policy {
                DeliveryPolicy::Attempt => true,
                DeliveryPolicy::Success => accepted,
            };
            if should_mark && !self.store.mark_delivered(reminder.id) {
                log::warn!(
                    "[MED_REMINDER] Reminder #{} was already marked delivered",
                    reminder.id
                );
            }
        }

        if report.checked > 0 {
            log::info!(
                "[MED_REMINDER] Scan complete: {} checked, {} sent, {} failed",
                report.checked,
                report.sent,
                report.failed
            );
        }

        *self.last_scan.lock().await = Some(LastScan {
            finished_at: Utc::now(),
            report,
        });

        report
    }

    async fn dispatch(&self, reminder: &Reminder) -> bool {
        let number = phone::normalize(&reminder.phone_number);
        let message = format_message(reminder);

        match self.channel.send(&number, &message).await {
            Ok(receipt) => {
                log::info!(
                    "[MED_REMINDER] SMS sent for reminder #{} (status {}, id {})",
                    reminder.id,
                    receipt.status,
                    receipt.message_id.as_deref().unwrap_or("-")
                );
                log::debug!("[MED_REMINDER] Gateway response: {}", receipt.body);
                true
            }
            Err(e) => {
                log::warn!(
                    "[MED_REMINDER] SMS failed for reminder #{} ({}): {}",
                    reminder.id,
                    self.policy,
                    e
                );
                false
            }
        }
    }
}

/// Human-readable SMS body for a reminder
pub fn format_message(reminder: &Reminder) -> String {
    let notes = if reminder.notes.trim().is_empty() {
        "None"
    } else {
        reminder.notes.trim()
    };
    let when = reminder
        .scheduled_at
        .with_timezone(&Local)
        .format("%b %-d, %Y %-I:%M %p");
    format!(
        "Medical Alert for {}: Take {} ({}) scheduled {}. Notes: {}",
        reminder.patient_name, reminder.medicine, reminder.dosage, when, notes
    )
}
