//! Shared types for the medication reminder service and its HTTP clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =====================================================
// Domain Types
// =====================================================

/// A scheduled medication reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: u64,
    pub patient_name: String,
    pub medicine: String,
    pub dosage: String,
    pub notes: String,
    pub phone_number: String,
    #[serde(rename = "datetime")]
    pub scheduled_at: DateTime<Utc>,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Due means scheduled at or before `now` and not yet delivered.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.delivered && self.scheduled_at <= now
    }
}

/// Counts over the reminder store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderStats {
    pub total: usize,
    pub pending: usize,
    pub delivered: usize,
}

/// Outcome of one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Due reminders the pass processed
    pub checked: usize,
    /// Sends the gateway accepted
    pub sent: usize,
    /// Sends that failed
    pub failed: usize,
}

// =====================================================
// Policy / Mode Enums
// =====================================================

/// When a dispatched reminder gets its `delivered` flag set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPolicy {
    /// After any send attempt, successful or not
    #[default]
    Attempt,
    /// Only after the gateway accepted the message; failures retry next pass
    Success,
}

impl FromStr for DeliveryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attempt" => Ok(DeliveryPolicy::Attempt),
            "success" => Ok(DeliveryPolicy::Success),
            other => Err(format!(
                "unknown delivery policy '{}' (expected 'attempt' or 'success')",
                other
            )),
        }
    }
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryPolicy::Attempt => f.write_str("attempt"),
            DeliveryPolicy::Success => f.write_str("success"),
        }
    }
}

/// What drives scan passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Background timer scans on a fixed interval
    #[default]
    Timer,
    /// An outside caller hits `/send-due-reminders`
    Endpoint,
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timer" => Ok(TriggerMode::Timer),
            "endpoint" => Ok(TriggerMode::Endpoint),
            other => Err(format!(
                "unknown trigger mode '{}' (expected 'timer' or 'endpoint')",
                other
            )),
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerMode::Timer => f.write_str("timer"),
            TriggerMode::Endpoint => f.write_str("endpoint"),
        }
    }
}

// =====================================================
// Request Types
// =====================================================

/// Body of `POST /add-reminder`. Every field is optional on the wire so a
/// missing field surfaces as a validation failure rather than a decode error.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddReminderRequest {
    pub patient_name: Option<String>,
    pub medicine: Option<String>,
    pub dosage: Option<String>,
    pub notes: Option<String>,
    pub phone_number: Option<String>,
    pub datetime: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

/// Envelope for intake and trigger responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<Reminder>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReminderResponse {
    pub fn ok(reminders: Vec<Reminder>) -> Self {
        Self {
            success: true,
            message: None,
            reminders: Some(reminders),
            error: None,
        }
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            reminders: None,
            error: Some(msg.into()),
        }
    }
}

/// Body of `GET /reminders`
#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderListing {
    pub reminders: Vec<Reminder>,
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub total_reminders: usize,
    pub pending_reminders: usize,
    pub delivered_reminders: usize,
    pub trigger_mode: TriggerMode,
    pub scan_interval_secs: Option<u64>,
    pub mark_delivered_on: DeliveryPolicy,
    pub last_scan_at: Option<String>,
    pub last_scan: Option<ScanReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reminder(delivered: bool) -> Reminder {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        Reminder {
            id: 1,
            patient_name: "Lola Nena".to_string(),
            medicine: "Losartan".to_string(),
            dosage: "50mg".to_string(),
            notes: String::new(),
            phone_number: "09171234567".to_string(),
            scheduled_at: at,
            delivered,
            created_at: at,
        }
    }

    #[test]
    fn test_reminder_wire_names() {
        let json = serde_json::to_value(reminder(false)).unwrap();
        assert_eq!(json["patientName"], "Lola Nena");
        assert_eq!(json["phoneNumber"], "09171234567");
        assert_eq!(json["datetime"], "2025-03-01T08:00:00Z");
        assert_eq!(json["delivered"], false);
    }

    #[test]
    fn test_is_due() {
        let r = reminder(false);
        assert!(r.is_due(r.scheduled_at));
        assert!(!r.is_due(r.scheduled_at - chrono::Duration::seconds(1)));
        assert!(!reminder(true).is_due(r.scheduled_at));
    }

    #[test]
    fn test_add_request_missing_fields_decode() {
        let req: AddReminderRequest =
            serde_json::from_str(r#"{"patientName":"A","medicine":""}"#).unwrap();
        assert_eq!(req.patient_name.as_deref(), Some("A"));
        assert_eq!(req.medicine.as_deref(), Some(""));
        assert!(req.dosage.is_none());
    }

    #[test]
    fn test_policy_and_mode_parse() {
        assert_eq!("Attempt".parse::<DeliveryPolicy>(), Ok(DeliveryPolicy::Attempt));
        assert_eq!(" success ".parse::<DeliveryPolicy>(), Ok(DeliveryPolicy::Success));
        assert!("always".parse::<DeliveryPolicy>().is_err());
        assert_eq!("endpoint".parse::<TriggerMode>(), Ok(TriggerMode::Endpoint));
        assert!("cron".parse::<TriggerMode>().is_err());
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ReminderResponse::err("Missing required fields")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Missing required fields");
        assert!(json.get("reminders").is_none());
    }
}
