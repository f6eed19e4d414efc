//! Reminder submission: field presence checks and timestamp parsing.

use crate::error::ValidationError;
use crate::store::{NewReminder, ReminderStore};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use med_reminder_types::{AddReminderRequest, Reminder};

/// Naive layouts sent by `datetime-local` inputs and hand-written clients.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Zoned layouts that RFC 3339 rejects, mostly timestamps without seconds.
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%#z", "%Y-%m-%d %H:%M%#z"];

/// Validate and store a submission, returning the full listing afterwards.
pub fn submit(
    store: &ReminderStore,
    req: AddReminderRequest,
) -> Result<Vec<Reminder>, ValidationError> {
    let new = validate(req)?;
    let stored = store.append(new);
    log::info!(
        "[MED_REMINDER] Reminder #{} added for {} at {}",
        stored.id,
        stored.patient_name,
        stored.scheduled_at.to_rfc3339()
    );
    Ok(store.list())
}

pub fn validate(req: AddReminderRequest) -> Result<NewReminder, ValidationError> {
    let mut missing = Vec::new();
    let mut take = |name: &'static str, value: Option<String>| -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                missing.push(name);
                String::new()
            }
        }
    };

    let patient_name = take("patientName", req.patient_name);
    let medicine = take("medicine", req.medicine);
    let dosage = take("dosage", req.dosage);
    let phone_number = take("phoneNumber", req.phone_number);
    let datetime = take("datetime", req.datetime);

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(NewReminder {
        patient_name,
        medicine,
        dosage,
        notes: req.notes.unwrap_or_default(),
        phone_number,
        scheduled_at: parse_datetime(&datetime)?,
    })
}

/// Explicit offsets and a `Z` suffix are honoured, a bare date is UTC midnight,
/// and naive timestamps are read as server-local time.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(dt) = ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(naive) = raw.strip_suffix(['Z', 'z']).and_then(parse_naive) {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    let naive =
        parse_naive(raw).ok_or_else(|| ValidationError::InvalidDatetime(raw.to_string()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::InvalidDatetime(raw.to_string()))
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
