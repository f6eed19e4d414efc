//! In-memory reminder store.
//!
//! Insertion-ordered table keyed by a generated sequential id. Every operation
//! copies data out under the lock, so callers always hold a consistent
//! snapshot and the lock never spans an `.await`.

use chrono::{DateTime, Utc};
use med_reminder_types::{Reminder, ReminderStats};
use std::sync::{Mutex, MutexGuard};

/// A validated reminder that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub patient_name: String,
    pub medicine: String,
    pub dosage: String,
    pub notes: String,
    pub phone_number: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: Vec<Reminder>,
}

#[derive(Default)]
pub struct ReminderStore {
    table: Mutex<Table>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // Table stays valid even if a holder panicked; every write is a single push or flag set.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, new: NewReminder) -> Reminder {
        let mut table = self.lock();
        table.next_id += 1;
        let reminder = Reminder {
            id: table.next_id,
            patient_name: new.patient_name,
            medicine: new.medicine,
            dosage: new.dosage,
            notes: new.notes,
            phone_number: new.phone_number,
            scheduled_at: new.scheduled_at,
            delivered: false,
            created_at: Utc::now(),
        };
        table.rows.push(reminder.clone());
        reminder
    }

    pub fn list(&self) -> Vec<Reminder> {
        self.lock().rows.clone()
    }

    /// Undelivered reminders scheduled at or before `now`, in store order
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        self.lock()
            .rows
            .iter()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect()
    }

    /// Flip `delivered` from false to true. Returns false if the reminder is
    /// unknown or was already delivered.
    pub fn mark_delivered(&self, id: u64) -> bool {
        let mut table = self.lock();
        match table.rows.iter_mut().find(|r| r.id == id) {
            Some(r) if !r.delivered => {
                r.delivered = true;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: u64) -> Option<Reminder> {
        self.lock().rows.iter().find(|r| r.id == id).cloned()
    }

    pub fn stats(&self) -> ReminderStats {
        let table = self.lock();
        let delivered = table.rows.iter().filter(|r| r.delivered).count();
        ReminderStats {
            total: table.rows.len(),
            pending: table.rows.len() - delivered,
            delivered,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(patient: &str, scheduled_at: DateTime<Utc>) -> NewReminder {
    NewReminder {
        patient_name: patient.to_string(),
        medicine: "Metformin".to_string(),
        dosage: "500mg".to_string(),
        notes: String::new(),
        phone_number: "09171234567".to_string(),
        scheduled_at,
    }
}
