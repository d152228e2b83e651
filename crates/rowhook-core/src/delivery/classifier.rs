//! Delivery classifier.
//!
//! Decides whether a callback is a connectivity probe or a row change event.
//! Classification reads only the payload, never fails, and takes no locks, so
//! deliveries can be processed concurrently and independently.
//!
//! Event payloads are forwarded verbatim: the service already includes the
//! action discriminator and full row data, and shaping it further is the
//! workflow's job.

use serde_json::Value;

use rowhook_types::delivery::{
    ACTION_FIELD, Delivery, DeliveryResponse, EventBatch, HOOK_ID_FIELD, PROBE_ACKNOWLEDGMENT,
    TriggerEvent,
};

/// Classify a decoded delivery body.
///
/// An object with a `hook_id` key and no `action` key is a probe; any other
/// shape, including non-objects, is an event.
pub fn classify(payload: Value) -> Delivery {
    if let Value::Object(fields) = &payload {
        if !fields.contains_key(ACTION_FIELD) {
            if let Some(hook_id) = fields.get(HOOK_ID_FIELD) {
                return Delivery::Probe {
                    hook_id: hook_id.clone(),
                };
            }
        }
    }

    Delivery::Event(TriggerEvent { json: payload })
}

/// Classify a raw HTTP body.
///
/// Bodies that are not JSON are wrapped as a JSON string and treated as events.
pub fn classify_body(body: &[u8]) -> Delivery {
    let payload = serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
    classify(payload)
}

/// Turn a classified delivery into the endpoint's response.
pub fn respond(delivery: Delivery) -> DeliveryResponse {
    match delivery {
        Delivery::Probe { hook_id } => {
            tracing::debug!(%hook_id, "probe delivery acknowledged");
            DeliveryResponse::Acknowledge(PROBE_ACKNOWLEDGMENT)
        }
        Delivery::Event(event) => DeliveryResponse::Emit(EventBatch { items: vec![event] }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_yields_no_events() {
        let delivery = classify(json!({"hook_id": "42"}));
        assert_eq!(delivery, Delivery::Probe { hook_id: json!("42") });
        assert_eq!(respond(delivery), DeliveryResponse::Acknowledge("OK"));
    }

    #[test]
    fn test_event_is_forwarded_verbatim() {
        let payload = json!({
            "hook_id": "42",
            "action": "rows.created",
            "table_id": 345,
            "items": [{"id": 1, "Name": "Widget"}],
        });

        let DeliveryResponse::Emit(batch) = respond(classify(payload.clone())) else {
            panic!("expected an event batch");
        };
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.items[0].json, payload);
    }

    #[test]
    fn test_null_hook_id_without_action_is_probe() {
        assert!(matches!(
            classify(json!({"hook_id": null})),
            Delivery::Probe { .. }
        ));
    }

    #[test]
    fn test_action_without_hook_id_is_event() {
        assert!(matches!(
            classify(json!({"action": "rows.deleted", "row_ids": [3]})),
            Delivery::Event(_)
        ));
    }

    #[test]
    fn test_unrecognized_shapes_fall_through_to_event() {
        for payload in [json!({}), json!([1, 2]), json!("hello"), json!(null)] {
            let DeliveryResponse::Emit(batch) = respond(classify(payload.clone())) else {
                panic!("expected an event batch for {payload}");
            };
            assert_eq!(batch.items, vec![TriggerEvent { json: payload }]);
        }
    }

    #[test]
    fn test_classify_body_parses_json() {
        assert!(matches!(
            classify_body(br#"{"hook_id": 7}"#),
            Delivery::Probe { .. }
        ));
    }

    #[test]
    fn test_classify_body_wraps_non_json() {
        assert_eq!(
            classify_body(b"not json"),
            Delivery::Event(TriggerEvent {
                json: json!("not json")
            })
        );
    }

    #[test]
    fn test_classify_empty_body_is_event() {
        assert_eq!(
            classify_body(b""),
            Delivery::Event(TriggerEvent { json: json!("") })
        );
    }
}
