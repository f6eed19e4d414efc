//! Dashboard HTML page handler.
//!
//! Serves a self-contained HTML page with inline CSS showing reminders,
//! delivery counts, and scanner status.

use crate::routes::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Local;
use med_reminder_types::TriggerMode;
use std::sync::Arc;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.store.stats();
    let reminders = state.store.list();
    let last_scan = state.scanner.last_scan().await;
    let uptime = state.start_time.elapsed().as_secs();

    let uptime_str = format_uptime(uptime);
    let last_scan_str = match &last_scan {
        Some(l) => format!(
            "{} ({} checked, {} sent, {} failed)",
            l.finished_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            l.report.checked,
            l.report.sent,
            l.report.failed
        ),
        None => "Never".to_string(),
    };
    let trigger_str = match state.trigger_mode {
        TriggerMode::Timer => format!("timer, every {}s", state.scan_interval_secs),
        TriggerMode::Endpoint => "endpoint (/send-due-reminders)".to_string(),
    };

    let mut reminder_rows = String::new();
    for r in reminders.iter().rev() {
        let (cls, label) = if r.delivered {
            ("sent", "Delivered")
        } else {
            ("pending", "Pending")
        };
        reminder_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            r.id,
            escape_html(&r.patient_name),
            escape_html(&r.medicine),
            escape_html(&r.dosage),
            escape_html(if r.notes.is_empty() { "-" } else { r.notes.as_str() }),
            escape_html(&r.phone_number),
            r.scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            cls,
            label,
        ));
    }
    if reminder_rows.is_empty() {
        reminder_rows.push_str("<tr><td colspan=\"8\">No reminders yet.</td></tr>");
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Medication Reminders</title>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, sans-serif; background: #0f1115; color: #e6e6e6; margin: 0; padding: 24px; }}
    h1 {{ font-size: 20px; margin: 0 0 4px; }}
    .meta {{ color: #8a8f98; font-size: 13px; margin-bottom: 20px; }}
    .stats {{ display: flex; gap: 12px; margin-bottom: 24px; }}
    .stat {{ background: #171a21; border-radius: 8px; padding: 12px 16px; min-width: 110px; }}
    .val {{ display: block; font-size: 22px; font-weight: 600; }}
    .lbl {{ color: #8a8f98; font-size: 12px; }}
    table {{ width: 100%; border-collapse: collapse; font-size: 13px; }}
    th, td {{ text-align: left; padding: 6px 8px; border-bottom: 1px solid #222632; }}
    th {{ color: #8a8f98; font-weight: 500; }}
    .sent {{ color: #4ade80; }}
    .pending {{ color: #facc15; }}
  </style>
</head>
<body>
  <h1>Medication Reminders</h1>
  <div class="meta">Uptime {uptime_str} &middot; Trigger: {trigger_str} &middot; Mark delivered on: {policy} &middot; Last scan: {last_scan_str}</div>

  <div class="stats">
    <div class="stat"><span class="val">{total}</span><span class="lbl">Total</span></div>
    <div class="stat"><span class="val">{pending}</span><span class="lbl">Pending</span></div>
    <div class="stat"><span class="val">{delivered}</span><span class="lbl">Delivered</span></div>
  </div>

  <table>
    <thead><tr><th>#</th><th>Patient</th><th>Medicine</th><th>Dosage</th><th>Notes</th><th>Phone</th><th>Scheduled</th><th>Status</th></tr></thead>
    <tbody>{reminder_rows}</tbody>
  </table>

  <script>
    // Auto-refresh every 30 seconds
    setTimeout(() => location.reload(), 30000);
  </script>
</body>
</html>"#,
        uptime_str = uptime_str,
        trigger_str = trigger_str,
        policy = state.scanner.policy(),
        last_scan_str = last_scan_str,
        total = stats.total,
        pending = stats.pending,
        delivered = stats.delivered,
        reminder_rows = reminder_rows,
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
