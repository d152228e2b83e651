//! Observability setup for rowhook: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
