use async_trait::async_trait;
use tracing::info;

/// Navigates a user agent to a URL.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), BrowserError>;
}

/// Opens URLs in the user's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

#[async_trait]
impl Browser for SystemBrowser {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        info!(url, "opening browser");
        let url = url.to_string();
        tokio::task::spawn_blocking(move || open::that(url))
            .await?
            .map_err(BrowserError::Launch)
    }
}

/// Navigates by following redirects with an HTTP client, no browser needed.
/// Only suitable for providers that authenticate without user interaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectFollower;

#[async_trait]
impl Browser for RedirectFollower {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        testmock::open_url(url)
            .await
            .map_err(|err| BrowserError::Navigate(Box::new(err)))
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(#[source] std::io::Error),

    #[error("browser task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Navigate(#[source] Box<dyn std::error::Error + Send + Sync>),
}
