use reqwest::{Client, header::ACCEPT};
use tracing::info;

use crate::{error::Error, models::ProviderMetadata};

/// Path of the OpenID Connect discovery document relative to the issuer.
pub const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// Fetches and parses the discovery document of the provider at `issuer`.
///
/// # Errors
/// - the document cannot be fetched or the provider responds with a non-2xx status
/// - the document is not valid JSON or lacks a required endpoint
/// - the `issuer` in the document differs from `issuer`
pub async fn discover(client: &Client, issuer: &str) -> Result<ProviderMetadata, Error> {
    let well_known = format!("{}{WELL_KNOWN_PATH}", issuer.trim_end_matches('/'));
    info!(url = %well_known, "fetching provider metadata");

    let response = client
        .get(&well_known)
        .header(ACCEPT, "application/json")
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

    let metadata = ProviderMetadata::from_slice(&body)?;
    if metadata.issuer != issuer {
        return Err(Error::IssuerMismatch {
            expected: issuer.to_string(),
            actual: metadata.issuer,
        });
    }

    Ok(metadata)
}
