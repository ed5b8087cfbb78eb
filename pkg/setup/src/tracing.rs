use std::error::Error;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable that switches on span export over OTLP.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const DEFAULT_FILTER: &str = "info,h2=error,hyper=error,reqwest=warn,tower=error";

/// Handle to the installed tracer. Flushes pending spans on [`Tracer::shutdown`].
#[derive(Debug)]
pub struct Tracer {
    provider: Option<SdkTracerProvider>,
}

impl Tracer {
    /// Flushes and shuts down the span exporter, if any.
    pub fn shutdown(self) -> Result<(), Box<dyn Error>> {
        if let Some(provider) = self.provider {
            provider.shutdown()?;
        }
        Ok(())
    }
}

/// Initializes the global tracing subscriber.
///
/// Log lines are written to stderr, filtered by `RUST_LOG` (default `info`).
/// When [`OTLP_ENDPOINT_ENV`] is set, spans are additionally exported to an
/// OpenTelemetry collector, e.g. Jaeger.
pub fn init_tracer(service_name: &'static str) -> Result<Tracer, Box<dyn Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let provider = match std::env::var(OTLP_ENDPOINT_ENV) {
        Ok(endpoint) if !endpoint.is_empty() => Some(init_provider(service_name)?),
        _ => None,
    };

    let otel_layer = provider.as_ref().map(|provider| {
        let tracer = provider.tracer(service_name);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(Tracer { provider })
}

fn init_provider(service_name: &'static str) -> Result<SdkTracerProvider, Box<dyn Error>> {
    // The exporter reads the endpoint from the environment itself.
    let span_exporter = SpanExporter::builder().with_tonic().build()?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(Resource::builder().with_service_name(service_name).build())
        .with_batch_exporter(span_exporter)
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());
    global::set_tracer_provider(tracer_provider.clone());

    Ok(tracer_provider)
}
