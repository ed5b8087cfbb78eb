use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use std::{collections::BTreeMap, marker::PhantomData};
use tracing::info;
use url::Url;

use crate::{error::Error, models::TokenResponse, random::RandomSource};

/// Generic OAuth 2.0 helper that abstracts state generation, authorization URL
/// creation, and the code exchange.
#[derive(Debug, Default, Clone)]
pub struct OAuth<R> {
    _phantom: PhantomData<R>,
}

/// The parameters of an authorization request (RFC 6749 section 4.1.1).
#[derive(Debug, Clone)]
pub struct AuthorizationRequest<'a> {
    pub auth_endpoint: &'a str,
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub scopes: &'a [String],
    pub state: &'a str,
    /// Additional query parameters; every value of a key is sent.
    pub extra_params: &'a BTreeMap<String, Vec<String>>,
}

impl<R: RandomSource> OAuth<R> {
    /// Generates the OAuth `state` (anti-replay marker).
    #[must_use]
    pub fn generate_state() -> String {
        R::base64_url(32)
    }

    /// Constructs the OAuth 2.0 authorization URL.
    pub fn generate_authorization_url(req: &AuthorizationRequest<'_>) -> Result<String, Error> {
        let scopes = req.scopes.join(" ");
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", req.client_id),
            ("redirect_uri", req.redirect_uri),
            ("state", req.state),
        ];

        if !scopes.is_empty() {
            params.push(("scope", scopes.as_str()));
        }
        params.push(("access_type", "online"));

        for (key, values) in req.extra_params {
            for value in values {
                params.push((key.as_str(), value.as_str()));
            }
        }

        let url = Url::parse_with_params(req.auth_endpoint, &params)?;
        Ok(url.into())
    }

    /// Exchanges an authorization code for a token response.
    ///
    /// Client credentials are sent with HTTP basic authentication.
    pub async fn exchange_code(
        client: &Client,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        code: &str,
    ) -> Result<TokenResponse, Error> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        let body = serde_urlencoded::to_string(params)?;

        info!(endpoint = token_endpoint, "exchanging authorization code");
        let response = client
            .post(token_endpoint)
            .basic_auth(client_id, Some(client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Error::UnexpectedStatusCode {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let token: TokenResponse = serde_json::from_slice(&body)?;
        if token.access_token.as_deref().unwrap_or_default().is_empty() {
            return Err(Error::MissingAccessToken);
        }

        Ok(token)
    }
}

/// Trait implemented by OAuth 2.0 providers the authorization code flow can run against.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// The provider's error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generates the authorization URL the user agent is redirected to.
    fn generate_authorization_url(&self, state: &str) -> Result<String, Self::Error>;

    /// Exchanges an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Self::Error>;
}
