use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
    routing::get,
};
use oauth::OAuthProvider;
use setup::middleware::TracingHttpServiceLayer;
use std::sync::Arc;
use tracing::{Instrument as _, error, info, instrument};

use crate::{console::Console, report, signal::Completion};

/// Everything the callback listener's handlers share.
pub(crate) struct CallbackState<P> {
    pub(crate) provider: Arc<P>,
    pub(crate) state: String,
    pub(crate) console: Arc<dyn Console>,
    pub(crate) completion: Completion,
}

impl<P> Clone for CallbackState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            state: self.state.clone(),
            console: self.console.clone(),
            completion: self.completion.clone(),
        }
    }
}

/// The routes of the local listener the provider redirects back to.
pub(crate) fn router<P>(state: CallbackState<P>) -> Router
where
    P: OAuthProvider + 'static,
{
    Router::new()
        .route(
            "/login",
            get(login::<P>).head(noop).fallback(method_not_allowed),
        )
        .route(
            "/callback",
            get(callback::<P>).head(noop).fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(TracingHttpServiceLayer)
}

/// Redirects the user agent to the provider's authorization endpoint.
#[instrument(skip_all)]
async fn login<P>(State(s): State<CallbackState<P>>) -> Response
where
    P: OAuthProvider,
{
    match s.provider.generate_authorization_url(&s.state) {
        Ok(url) => {
            info!(%url, "redirecting client");
            (StatusCode::FOUND, [(LOCATION, url)]).into_response()
        }
        Err(err) => {
            error!(%err, "failed to build authorization url");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Shows whatever the provider sent back, then completes the flow.
///
/// `code`, `id_token` and `token` are handled independently and in that
/// order. Only the first callback of a run is processed. Processing runs in
/// its own task, so the flow still completes when the client disconnects
/// while the code is being exchanged.
#[instrument(skip_all)]
async fn callback<P>(
    State(s): State<CallbackState<P>>,
    Query(params): Query<Vec<(String, String)>>,
) -> &'static str
where
    P: OAuthProvider + 'static,
{
    let Some(resolver) = s.completion.claim() else {
        info!("ignoring callback, flow already completed");
        return "done";
    };

    let task = tokio::spawn(
        async move {
            process(&s, &params).await;
            resolver.resolve(Ok(()));
        }
        .in_current_span(),
    );
    if let Err(err) = task.await {
        error!(%err, "callback processing failed");
    }
    "done"
}

async fn process<P>(s: &CallbackState<P>, params: &[(String, String)])
where
    P: OAuthProvider,
{
    let console = s.console.as_ref();
    if let Some(code) = param(params, "code") {
        report::show_code(console, s.provider.as_ref(), code).await;
    }
    if let Some(id_token) = param(params, "id_token") {
        report::show_token(console, id_token);
    }
    if let Some(token) = param(params, "token") {
        report::show_token(console, token);
    }
}

/// The first value of `key`. Empty values count as absent.
fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

async fn noop() {}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
