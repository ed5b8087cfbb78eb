use axum::{
    extract::{Query, Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode, Uri,
        header::{CACHE_CONTROL, CONTENT_TYPE, HOST, PRAGMA},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use common::Now;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{error::MockError, metadata::well_known_metadata, signing::TokenIssuer};

/// Path of the authorization endpoint.
pub const AUTH_PATH: &str = "/oauth2/auth";

/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// The authorization code handed out by the authorization endpoint.
pub const AUTHORIZATION_CODE: &str = "token-please";

const ACCESS_TOKEN: &str = "let-me-in";
const REFRESH_TOKEN: &str = "another-token-please";
const EXPIRES_IN: u32 = 5 * 60;

/// Serves the discovery document for the host the request was sent to.
#[instrument(skip_all)]
pub(crate) async fn well_known(headers: HeaderMap) -> Response {
    let Some(host) = headers.get(HOST).and_then(|h| h.to_str().ok()) else {
        return (StatusCode::BAD_REQUEST, "request missing Host header").into_response();
    };

    let body = well_known_metadata("http", host).to_string();
    ([(CONTENT_TYPE, "application/json")], body).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthQuery {
    redirect_uri: Option<String>,
}

/// Redirects straight back to the client with a fixed authorization code.
#[instrument(skip_all)]
pub(crate) async fn authorize(Query(query): Query<AuthQuery>) -> Response {
    let callback = match query.redirect_uri {
        Some(uri) if !uri.is_empty() => uri,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "request missing redirect_uri parameter",
            )
                .into_response();
        }
    };

    // The redirect URI is assumed to carry no query string yet.
    let location = format!("{callback}?code={AUTHORIZATION_CODE}");
    info!(%location, "redirecting to client");
    Redirect::to(&location).into_response()
}

#[derive(Debug, Serialize)]
struct TokenResponseBody<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    token_type: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    id_token: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    access_token: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    refresh_token: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    scope: Vec<&'a str>,
    #[serde(skip_serializing_if = "is_zero")]
    expires_in: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Mints a fresh ID token. The grant parameters are not validated.
#[instrument(skip_all, err)]
pub(crate) async fn token<N: Now>(
    State(issuer): State<Arc<TokenIssuer<N>>>,
) -> Result<Response, MockError> {
    let id_token = issuer.mint()?;

    let body = TokenResponseBody {
        token_type: "Bearer",
        id_token: &id_token,
        access_token: ACCESS_TOKEN,
        refresh_token: REFRESH_TOKEN,
        scope: vec!["openid"],
        expires_in: EXPIRES_IN,
    };
    let mut json = serde_json::to_string_pretty(&body)?;
    json.push('\n');

    Ok((
        [
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
            (PRAGMA, HeaderValue::from_static("no-cache")),
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
        ],
        json,
    )
        .into_response())
}

pub(crate) async fn not_found(method: Method, uri: Uri) -> (StatusCode, String) {
    warn!(%method, %uri, "no route");
    (
        StatusCode::NOT_FOUND,
        format!("URL [{uri}] not found for [{method}]"),
    )
}

/// Rejects every request whose method differs from the expected one.
pub(crate) async fn assert_method(
    State(expected): State<Method>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != expected {
        let msg = format!(
            "method [{}] not allowed for URL [{}]",
            request.method(),
            request.uri()
        );
        return (StatusCode::METHOD_NOT_ALLOWED, msg).into_response();
    }
    next.run(request).await
}
