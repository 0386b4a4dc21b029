// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use whales_config::AppConfig;

const SERVICE_NAME: &str = "whales";

/// Logging for the cases where no configuration could be loaded
pub fn setup_simple_tracing(log_level: Level) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(LevelFilter::from_level(log_level))
        .try_init();
}

/// Install the global subscriber. When an otel endpoint is configured the returned provider
/// must be shut down before exit so buffered spans get flushed.
pub fn setup_tracing(config: &AppConfig, log_level: Level) -> Result<Option<SdkTracerProvider>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let level = LevelFilter::from_level(log_level);

    match config.otel() {
        Some(endpoint) => {
            let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .with_protocol(Protocol::Grpc)
                .build()?;

            let service_name =
                std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());
            let resource = Resource::builder().with_service_name(service_name).build();

            let provider = SdkTracerProvider::builder()
                .with_batch_exporter(otlp_exporter)
                .with_resource(resource)
                .build();

            let tracer = provider.tracer(SERVICE_NAME);
            let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(telemetry)
                .with(level)
                .try_init()?;
            Ok(Some(provider))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(level)
                .try_init()?;
            Ok(None)
        }
    }
}
