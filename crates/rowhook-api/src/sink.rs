//! Downstream event sink.
//!
//! The webhook handlers push accepted batches onto an unbounded channel; the
//! sink task drains it and writes one JSON line per event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use rowhook_types::delivery::EventBatch;

/// A batch accepted by the receiver, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct EmittedBatch {
    pub delivery_id: String,
    pub trigger: String,
    pub received_at: DateTime<Utc>,
    pub batch: EventBatch,
}

#[derive(Serialize)]
struct EventLine<'a> {
    delivery_id: &'a str,
    trigger: &'a str,
    received_at: &'a DateTime<Utc>,
    event: &'a Value,
}

/// Write every event received on `rx` to `out` until all senders are dropped.
///
/// Returns the number of lines written.
pub async fn run_sink<W: AsyncWrite + Unpin>(
    mut rx: mpsc::UnboundedReceiver<EmittedBatch>,
    out: &mut W,
) -> usize {
    let mut written = 0;

    while let Some(emitted) = rx.recv().await {
        for item in &emitted.batch.items {
            let line = EventLine {
                delivery_id: &emitted.delivery_id,
                trigger: &emitted.trigger,
                received_at: &emitted.received_at,
                event: &item.json,
            };

            match write_line(out, &line).await {
                Ok(()) => written += 1,
                Err(e) => tracing::error!(
                    trigger = %emitted.trigger,
                    delivery_id = %emitted.delivery_id,
                    error = %e,
                    "failed to write event"
                ),
            }
        }

        tracing::info!(
            trigger = %emitted.trigger,
            delivery_id = %emitted.delivery_id,
            items = emitted.batch.items.len(),
            "event batch emitted"
        );
    }

    tracing::debug!(written, "event sink closed");
    written
}

async fn write_line<W: AsyncWrite + Unpin>(
    out: &mut W,
    line: &EventLine<'_>,
) -> std::io::Result<()> {
    let mut json = serde_json::to_vec(line).map_err(std::io::Error::other)?;
    json.push(b'\n');
    out.write_all(&json).await?;
    out.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowhook_types::delivery::TriggerEvent;
    use serde_json::json;

    fn emitted(trigger: &str, delivery_id: &str, event: Value) -> EmittedBatch {
        EmittedBatch {
            delivery_id: delivery_id.to_string(),
            trigger: trigger.to_string(),
            received_at: Utc::now(),
            batch: EventBatch {
                items: vec![TriggerEvent { json: event }],
            },
        }
    }

    #[tokio::test]
    async fn test_writes_one_line_per_event() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(emitted("orders", "d1", json!({"action": "rows.created", "items": [{"id": 1}]})))
            .unwrap();
        tx.send(emitted("invoices", "d2", json!("plain text body")))
            .unwrap();
        drop(tx);

        let mut out = Vec::new();
        let written = run_sink(rx, &mut out).await;
        assert_eq!(written, 2);

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["trigger"], "orders");
        assert_eq!(lines[0]["delivery_id"], "d1");
        assert_eq!(lines[0]["event"]["action"], "rows.created");
        assert_eq!(lines[1]["trigger"], "invoices");
        assert_eq!(lines[1]["event"], "plain text body");
    }

    #[tokio::test]
    async fn test_write_errors_are_logged_not_counted() {
        struct Closed;

        impl AsyncWrite for Closed {
            fn poll_write(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
                _: &[u8],
            ) -> std::task::Poll<std::io::Result<usize>> {
                std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
            }

            fn poll_flush(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn poll_shutdown(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(emitted("orders", "d1", json!({"id": 1}))).unwrap();
        drop(tx);

        assert_eq!(run_sink(rx, &mut Closed).await, 0);
    }

    #[tokio::test]
    async fn test_returns_when_senders_dropped() {
        let (tx, rx) = mpsc::unbounded_channel::<EmittedBatch>();
        drop(tx);

        let mut out = Vec::new();
        assert_eq!(run_sink(rx, &mut out).await, 0);
        assert!(out.is_empty());
    }
}
