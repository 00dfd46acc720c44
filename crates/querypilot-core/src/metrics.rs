//! Shared `OpenTelemetry` metrics initialisation.
//!
//! Only compiled when the `metrics` Cargo feature is enabled. Sets up an
//! OTLP metric exporter sending to a configurable endpoint (e.g. an
//! `OpenTelemetry` Collector).

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;

/// Errors that can occur during metrics pipeline initialisation.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to build an OTLP exporter.
    #[error("failed to build OTLP exporter: {0}")]
    ExporterBuild(#[from] opentelemetry_otlp::ExporterBuildError),

    /// Failed during `OTel` SDK shutdown or flush.
    #[error("OpenTelemetry SDK error: {0}")]
    Sdk(#[from] opentelemetry_sdk::error::OTelSdkError),
}

/// Opaque handle that keeps the meter provider alive.
///
/// Call [`MetricsGuard::shutdown`] for a graceful flush before exiting.
pub struct MetricsGuard {
    meter_provider: SdkMeterProvider,
}

impl MetricsGuard {
    /// Gracefully shut down the provider, flushing buffered telemetry.
    pub fn shutdown(self) -> Result<(), MetricsError> {
        self.meter_provider.shutdown()?;
        Ok(())
    }
}

/// Initialise the `OpenTelemetry` OTLP metrics pipeline.
///
/// * `endpoint` -- OTLP receiver URL, e.g. `"http://localhost:4317"` (gRPC).
///
/// Returns a [`MetricsGuard`] that must be kept alive for the lifetime of
/// the application.
pub fn init_metrics(endpoint: &str) -> Result<MetricsGuard, MetricsError> {
    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .build();

    global::set_meter_provider(meter_provider.clone());

    Ok(MetricsGuard { meter_provider })
}
