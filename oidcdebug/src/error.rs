use crate::{browser::BrowserError, config::ConfigError};

/// Fatal errors of a flow run. Each one ends the run with a non-zero exit.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create http client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{0}")]
    Discovery(#[source] oauth::Error),

    #[error("failed to listen on {addr}: {source}")]
    ListenerBind {
        addr: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    BrowserLaunch(#[from] BrowserError),

    #[error("callback listener failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("callback listener stopped before the flow completed")]
    Aborted,
}
