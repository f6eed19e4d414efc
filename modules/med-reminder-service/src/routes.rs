//! Axum route handlers for the reminder HTTP API.

use crate::error::ValidationError;
use crate::intake;
use crate::scanner::DueReminderScanner;
use crate::store::ReminderStore;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use med_reminder_types::*;
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub store: Arc<ReminderStore>,
    pub scanner: Arc<DueReminderScanner>,
    pub start_time: Instant,
    pub trigger_mode: TriggerMode,
    pub scan_interval_secs: u64,
}

// POST /add-reminder
pub async fn add_reminder(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddReminderRequest>, JsonRejection>,
) -> (StatusCode, Json<ReminderResponse>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let e = ValidationError::InvalidBody(rejection.body_text());
            log::debug!("[MED_REMINDER] Rejected submission: {}", e);
            return (StatusCode::BAD_REQUEST, Json(ReminderResponse::err(e.to_string())));
        }
    };

    match intake::submit(&state.store, req) {
        Ok(reminders) => (StatusCode::OK, Json(ReminderResponse::ok(reminders))),
        Err(e) => {
            if let ValidationError::MissingFields(fields) = &e {
                log::debug!("[MED_REMINDER] Rejected submission, missing {:?}", fields);
            }
            (StatusCode::BAD_REQUEST, Json(ReminderResponse::err(e.to_string())))
        }
    }
}

// GET /reminders
pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Json<ReminderListing> {
    Json(ReminderListing {
        reminders: state.store.list(),
    })
}

// GET /send-due-reminders
pub async fn send_due_reminders(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReminderResponse>) {
    // A dropped request must not abandon a pass between send and mark.
    let scanner = state.scanner.clone();
    let now = chrono::Utc::now();
    let report = match tokio::spawn(async move { scanner.scan(now).await }).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("[MED_REMINDER] Scan pass aborted: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReminderResponse::err("Scan pass failed")),
            );
        }
    };
    let message = format!("Checked reminders. {} SMS sent.", report.sent);
    (
        StatusCode::OK,
        Json(ReminderResponse::ok(state.store.list()).with_message(message)),
    )
}

// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    let stats = state.store.stats();
    let last = state.scanner.last_scan().await;

    Json(ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_reminders: stats.total,
        pending_reminders: stats.pending,
        delivered_reminders: stats.delivered,
        trigger_mode: state.trigger_mode,
        scan_interval_secs: match state.trigger_mode {
            TriggerMode::Timer => Some(state.scan_interval_secs),
            TriggerMode::Endpoint => None,
        },
        mark_delivered_on: state.scanner.policy(),
        last_scan_at: last.as_ref().map(|l| l.finished_at.to_rfc3339()),
        last_scan: last.map(|l| l.report),
    })
}
