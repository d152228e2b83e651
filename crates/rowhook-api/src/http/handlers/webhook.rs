//! Webhook receiver handler.
//!
//! Classifies each delivery from the table service. Probes are answered with
//! a plain-text acknowledgment and go no further; everything else is handed
//! to the event sink as a single-item batch.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use rowhook_core::delivery::{classify_body, respond};
use rowhook_types::delivery::DeliveryResponse;

use crate::http::error::AppError;
use crate::sink::EmittedBatch;
use crate::state::WebhookState;

/// POST /webhooks/{trigger} - Receive a delivery for a configured trigger.
pub async fn receive_webhook(
    State(state): State<WebhookState>,
    Path(trigger): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    if !state.triggers.contains(&trigger) {
        tracing::warn!(%trigger, "delivery for unknown trigger");
        return Err(AppError::UnknownTrigger(trigger));
    }

    match respond(classify_body(&body)) {
        DeliveryResponse::Acknowledge(text) => {
            tracing::debug!(%trigger, "acknowledged connectivity probe");
            Ok(text.into_response())
        }
        DeliveryResponse::Emit(batch) => {
            let accepted = batch.items.len();
            let delivery_id = Uuid::now_v7().to_string();
            tracing::debug!(%trigger, %delivery_id, accepted, "accepted delivery");

            state
                .events
                .send(EmittedBatch {
                    delivery_id,
                    trigger,
                    received_at: Utc::now(),
                    batch,
                })
                .map_err(|_| AppError::Internal("event sink is not running".to_string()))?;

            Ok(Json(json!({ "accepted": accepted })).into_response())
        }
    }
}
