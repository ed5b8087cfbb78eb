use oauth::{OAuth, ProviderMetadata, RandomSource, SecureRandom};
use reqwest::Client;
use std::{marker::PhantomData, sync::Arc};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tracing::{error, info, instrument};

use crate::{
    browser::Browser,
    config::{Config, ConfigError},
    console::Console,
    error::FlowError,
    provider::{OidcProvider, http_client},
    report,
    server::{CallbackState, router},
    signal::Completion,
};

const CALLBACK_HOST: &str = "localhost";

/// Drives one authorization code flow from discovery to the decoded ID token.
///
/// `R` is the source of the anti-replay `state` sent with the authorization
/// request.
pub struct Flow<B, R = SecureRandom> {
    browser: B,
    console: Arc<dyn Console>,
    _phantom: PhantomData<R>,
}

impl<B, R> Flow<B, R>
where
    B: Browser,
    R: RandomSource,
{
    pub fn new(browser: B, console: Arc<dyn Console>) -> Self {
        Self {
            browser,
            console,
            _phantom: PhantomData,
        }
    }

    /// Fetches the provider's discovery document.
    ///
    /// # Errors
    /// - the document is unreachable, not JSON or lacks a required endpoint
    /// - the document names a different issuer
    pub async fn discover(
        &self,
        client: &Client,
        issuer: &str,
    ) -> Result<ProviderMetadata, FlowError> {
        oauth::discover(client, issuer)
            .await
            .map_err(FlowError::Discovery)
    }

    /// Runs the flow and blocks until the provider called back.
    ///
    /// Exchange and decoding failures are reported on the console but do not
    /// fail the run.
    ///
    /// # Errors
    /// - the config is invalid
    /// - discovery fails
    /// - the callback listener cannot be bound or fails while serving
    /// - the browser cannot be opened
    #[instrument(skip_all, fields(issuer = %config.issuer_url))]
    pub async fn start(&self, config: &Config) -> Result<(), FlowError> {
        let console = self.console.as_ref();

        report::show_config(console, config);
        if let Err(err) = config.validate() {
            console.println("Configuration errors:");
            console.println(&err.to_string());
            return Err(err.into());
        }
        let port = config
            .port()
            .ok_or_else(|| ConfigError::invalid_port(config.client_port))?;

        let client = http_client(config.insecure).map_err(FlowError::HttpClient)?;
        let metadata = self.discover(&client, &config.issuer_url).await?;
        report::show_provider(console, &metadata);

        let base_url = format!("http://{CALLBACK_HOST}:{port}");
        let provider = OidcProvider::<R>::new(
            client,
            metadata,
            config,
            format!("{base_url}/callback"),
        );
        let state = OAuth::<R>::generate_state();
        info!(%state, "generated state");

        let listener = TcpListener::bind((CALLBACK_HOST, port))
            .await
            .map_err(|source| FlowError::ListenerBind {
                addr: format!("{CALLBACK_HOST}:{port}"),
                source,
            })?;

        let (completion, done) = Completion::new();
        let app = router(CallbackState {
            provider: Arc::new(provider),
            state,
            console: self.console.clone(),
            completion: completion.clone(),
        });
        let listener = Listener::spawn(listener, app, completion);

        if let Err(err) = self.browser.open(&format!("{base_url}/login")).await {
            listener.shutdown().await;
            return Err(err.into());
        }

        let outcome = done.await.unwrap_or(Err(FlowError::Aborted));
        listener.shutdown().await;
        outcome
    }
}

/// The callback listener running in the background.
struct Listener {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Listener {
    fn spawn(listener: TcpListener, app: axum::Router, completion: Completion) -> Self {
        let (shutdown, signal) = oneshot::channel::<()>();
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "callback listener started");
        }

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await;

            if let Err(err) = result {
                error!(%err, "callback listener failed");
                completion.complete(Err(FlowError::Serve(err)));
            }
        });

        Self { shutdown, handle }
    }

    async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.handle.await {
            error!(%err, "callback listener task failed");
        }
    }
}
