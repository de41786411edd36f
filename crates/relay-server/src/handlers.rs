//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use relay_dispatch::SendParams;
use relay_model::{Alert, AlertRecord, AlertStatus, Platform, WebhookEnvelope};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{RelayError, RelayResult};
use crate::extract::RelayJson;
use crate::state::AppState;

/// Response body of the webhook endpoint.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    /// Always `"ok"` when the request was accepted.
    pub status: &'static str,
    /// How many alerts the payload carried.
    pub received: usize,
    /// How many messages reached their destination.
    pub dispatched: usize,
    /// How many deliveries failed. Failures are logged, not retried.
    pub failed: usize,
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `POST /{platform}` — the webhook receiver.
///
/// The destination is resolved before any state is touched, so credential
/// errors are clean 400s with no side effects. Alerts are then processed in
/// payload order: state update, render, send. A failed send or a storage
/// error degrades that alert only and the batch keeps going; if any storage
/// error occurred, the whole request answers 500 after the batch so
/// Alertmanager re-delivers.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
    Query(params): Query<SendParams>,
    RelayJson(envelope): RelayJson<WebhookEnvelope>,
) -> RelayResult<Json<RelayResponse>> {
    let platform = Platform::from_path_segment(&platform)?;
    let destination = relay_dispatch::resolve(platform, &params, &state.credentials(platform))?;

    info!(
        %platform,
        tier = %destination.tier(),
        firing = envelope.firing_count(),
        resolved = envelope.resolved_count(),
        "webhook received"
    );

    let mut dispatched = 0usize;
    let mut failed = 0usize;
    let mut storage_error: Option<RelayError> = None;

    for alert in &envelope.alerts {
        let record = match update_state(&state, alert).await {
            Ok(record) => record,
            Err(err) => {
                warn!(fingerprint = %alert.fingerprint, error = %err, "storage failed for alert");
                failed += 1;
                if storage_error.is_none() {
                    storage_error = Some(RelayError::Storage(err));
                }
                continue;
            }
        };

        let message = state.transformer().render(alert, &record, platform)?;
        let body = message.to_json()?;
        let outcome = state.sender().send(&destination, &body).await;
        let delivered = outcome.is_success();
        if delivered {
            dispatched += 1;
        } else {
            failed += 1;
        }
        // Audit trail only; a failure here must not fail the alert.
        if let Err(err) = state
            .store()
            .record_send_outcome(&alert.fingerprint, delivered, Utc::now())
            .await
        {
            warn!(fingerprint = %alert.fingerprint, error = %err, "send history update failed");
        }
    }

    if let Some(err) = storage_error {
        return Err(err);
    }
    Ok(Json(RelayResponse {
        status: "ok",
        received: envelope.alerts.len(),
        dispatched,
        failed,
    }))
}

/// Applies one alert to the store and returns the record to render from.
async fn update_state(state: &AppState, alert: &Alert) -> relay_store::Result<AlertRecord> {
    match alert.status {
        AlertStatus::Firing => {
            state
                .store()
                .upsert_firing(&alert.fingerprint, alert.starts_at)
                .await
        }
        AlertStatus::Resolved => {
            let resolved_at = alert.end_time().unwrap_or_else(Utc::now);
            match state
                .store()
                .mark_resolved(&alert.fingerprint, resolved_at)
                .await?
            {
                Some(record) => Ok(record),
                // Never-seen fingerprint: still forward the recovery
                // notice with a single-count record.
                None => {
                    debug!(fingerprint = %alert.fingerprint, "resolve for unknown fingerprint");
                    Ok(AlertRecord::synthetic_resolved(
                        &alert.fingerprint,
                        alert.starts_at,
                        resolved_at,
                    ))
                }
            }
        }
    }
}
