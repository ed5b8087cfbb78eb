use reqwest::{Client, StatusCode};
use tracing::info;

use crate::error::MockError;

/// Mimics a browser by requesting `url` and following the redirects.
///
/// Every response except the last one is expected to be a redirect; the last
/// one must be a 200. Up to 10 redirects are followed, enough for the
/// authorization code dance against [`crate::MockProvider`].
pub async fn open_url(url: &str) -> Result<(), MockError> {
    info!(url, "opening url");
    let response = Client::new().get(url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await?;
        return Err(MockError::UnexpectedResponse { status, body });
    }
    Ok(())
}
