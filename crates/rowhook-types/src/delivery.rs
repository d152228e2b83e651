//! Inbound delivery types.
//!
//! Every HTTP callback from the table service becomes either a probe (a
//! connectivity check) or an event that is handed downstream unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plain-text body returned for probe deliveries.
pub const PROBE_ACKNOWLEDGMENT: &str = "OK";

/// Payload key carrying the service's webhook identifier.
pub const HOOK_ID_FIELD: &str = "hook_id";

/// Payload key carrying the event discriminator (`rows.created`, ...).
pub const ACTION_FIELD: &str = "action";

/// One normalized event item handed to the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// The delivery body, exactly as received.
    pub json: Value,
}

/// Result of classifying a single inbound delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Connectivity check: has a hook id and no action.
    Probe { hook_id: Value },
    /// Anything else.
    Event(TriggerEvent),
}

/// A batch of events for the workflow engine. Deliveries always produce
/// exactly one item; batches never span deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    pub items: Vec<TriggerEvent>,
}

/// What the receiving endpoint should do with a delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryResponse {
    /// Reply with this text and emit nothing.
    Acknowledge(&'static str),
    /// Hand this batch to the workflow engine.
    Emit(EventBatch),
}
