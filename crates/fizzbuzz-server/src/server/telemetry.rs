//! # Telemetry
//!
//! Structured logging is always on: a `tracing-subscriber` registry filtered by
//! `RUST_LOG` (default `info`) prints human-readable events with thread ids,
//! file and line numbers, and RFC 3339 local timestamps.
//!
//! Metrics are optional and exported via OpenTelemetry.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry metrics (counters, histograms).
//! - `stdout`: Enables the stdout metrics exporter.
//!
//! ## Feature constraints
//!
//! - `stdout` requires `metrics`.
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --features metrics,stdout
//! ```
//!
//! Without `metrics`, every `increment_*`/`record_*` function in this module
//! compiles to a no-op.

// Disallow using `stdout` without `metrics`
#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires 'metrics' to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter, UpDownCounter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down every exporter. Errors are reported on stderr
    /// since the subscriber may already be gone.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        );

    #[cfg(feature = "metrics")]
    {
        let scope = InstrumentationScope::builder("fizzbuzz")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
    }

    registry.try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("fizzbuzz")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REQUESTS_REJECTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REQUESTS_INFLIGHT: OnceLock<UpDownCounter<i64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REQUEST_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static SLOTS_SKIPPED: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total range requests")
            .build(),
    );

    let _ = REQUESTS_REJECTED.set(
        meter
            .u64_counter("requests_rejected")
            .with_description("Requests rejected during validation")
            .build(),
    );

    let _ = REQUESTS_INFLIGHT.set(
        meter
            .i64_up_down_counter("requests_inflight")
            .with_description("Concurrent range evaluations")
            .build(),
    );

    let _ = REQUEST_DURATION_MS.set(
        meter
            .f64_histogram("request_duration")
            .with_unit("ms")
            .with_description("End-to-end request duration")
            .build(),
    );

    let _ = SLOTS_SKIPPED.set(
        meter
            .u64_counter("slots_skipped")
            .with_description("Numbers left unevaluated after a deadline elapsed")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_requests() {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests() {}

#[cfg(feature = "metrics")]
pub fn increment_requests_rejected() {
    if let Some(counter) = REQUESTS_REJECTED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests_rejected() {}

#[cfg(feature = "metrics")]
fn add_requests_inflight(delta: i64) {
    if let Some(counter) = REQUESTS_INFLIGHT.get() {
        counter.add(delta, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
fn add_requests_inflight(_delta: i64) {}

#[cfg(feature = "metrics")]
pub fn record_request_duration(duration_ms: f64) {
    if let Some(histogram) = REQUEST_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_request_duration(_duration_ms: f64) {}

#[cfg(feature = "metrics")]
pub fn increment_slots_skipped(count: u64) {
    if let Some(counter) = SLOTS_SKIPPED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_slots_skipped(_count: u64) {}

/// Counts one in-flight evaluation for as long as it is alive, including when
/// the request future is dropped early.
pub struct InflightGuard(());

impl InflightGuard {
    pub fn start() -> Self {
        add_requests_inflight(1);
        Self(())
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        add_requests_inflight(-1);
    }
}
