use async_trait::async_trait;
use oauth::{
    AuthorizationRequest, OAuth, OAuthProvider, ProviderMetadata, RandomSource, TokenResponse,
};
use reqwest::Client;
use std::{collections::BTreeMap, marker::PhantomData, time::Duration};

use crate::config::Config;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const KEEP_ALIVE: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const MAX_IDLE_PER_HOST: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the HTTP client shared by discovery and the code exchange.
///
/// With `insecure` set the provider's certificate is not verified.
pub fn http_client(insecure: bool) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(KEEP_ALIVE)
        .pool_idle_timeout(IDLE_TIMEOUT)
        .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
        .timeout(REQUEST_TIMEOUT)
        .danger_accept_invalid_certs(insecure)
        .build()
}

/// An OpenID provider whose endpoints were resolved through discovery.
pub struct OidcProvider<R> {
    client: Client,
    metadata: ProviderMetadata,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    extra_params: BTreeMap<String, Vec<String>>,
    _phantom: PhantomData<R>,
}

impl<R: RandomSource> OidcProvider<R> {
    /// Creates a provider client that sends the user agent back to `redirect_uri`.
    pub fn new(
        client: Client,
        metadata: ProviderMetadata,
        config: &Config,
        redirect_uri: String,
    ) -> Self {
        Self {
            client,
            metadata,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri,
            scopes: config.scopes(),
            extra_params: config.extra_params(),
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<R> OAuthProvider for OidcProvider<R>
where
    R: RandomSource,
{
    type Error = oauth::Error;

    fn generate_authorization_url(&self, state: &str) -> Result<String, Self::Error> {
        OAuth::<R>::generate_authorization_url(&AuthorizationRequest {
            auth_endpoint: &self.metadata.authorization_endpoint,
            client_id: &self.client_id,
            redirect_uri: &self.redirect_uri,
            scopes: &self.scopes,
            state,
            extra_params: &self.extra_params,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Self::Error> {
        OAuth::<R>::exchange_code(
            &self.client,
            &self.metadata.token_endpoint,
            &self.client_id,
            &self.client_secret,
            &self.redirect_uri,
            code,
        )
        .await
    }
}
