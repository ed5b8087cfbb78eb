use http::{Request, Response};
use opentelemetry::{global, trace::TraceContextExt as _};
use opentelemetry_http::HeaderExtractor;
use std::time::Duration;
use tower::Layer;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, Trace, TraceLayer};
use tracing::{Span, field, info, info_span};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

type HttpTraceService<S> =
    Trace<S, SharedClassifier<ServerErrorsAsFailures>, MakeSpan, DefaultOnRequest, RecordStatus>;

/// A HTTP tracing layer. Starts a span per request, linked to the caller's
/// trace context, and records the response status on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHttpServiceLayer;

impl<S> Layer<S> for TracingHttpServiceLayer {
    type Service = HttpTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceLayer::new_for_http()
            .make_span_with(MakeSpan)
            .on_response(RecordStatus)
            .layer(inner)
    }
}

/// Creates the request span and sets its parent from the `traceparent` header.
#[derive(Debug, Clone, Copy)]
pub struct MakeSpan;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        let span = info_span!(
            "request",
            method = %req.method(),
            uri = %req.uri(),
            status = field::Empty,
            trace_id = field::Empty
        );

        let parent_context = global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(req.headers()))
        });
        span.set_parent(parent_context);

        let trace_id = span.context().span().span_context().trace_id();
        span.record("trace_id", trace_id.to_string());
        span
    }
}

/// Records the status code on the request span and logs the response.
#[derive(Debug, Clone, Copy)]
pub struct RecordStatus;

impl<B> tower_http::trace::OnResponse<B> for RecordStatus {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status().as_u16();
        span.record("status", status);
        info!(parent: span, status, latency_ms = latency.as_millis() as u64, "response sent");
    }
}
