//! Observability setup for Memoria: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
