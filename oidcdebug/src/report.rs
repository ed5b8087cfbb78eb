//! Renders the artifacts of a flow run for the operator.
use oauth::{CLAIMS_PREFIX, OAuthProvider, ProviderMetadata, decode_claims};
use tracing::warn;

use crate::{config::Config, console::Console};

const CONFIG_PREFIX: &str = "  | ";

pub(crate) fn show_config(console: &dyn Console, config: &Config) {
    console.println("The config is");
    match config.to_display_string(CONFIG_PREFIX) {
        Ok(yaml) => console.println(&yaml),
        Err(err) => console.println(&format!("  Error displaying config: {err}")),
    }
}

pub(crate) fn show_provider(console: &dyn Console, metadata: &ProviderMetadata) {
    console.println("Resolved provider endpoint");
    console.println(&format!("  AuthURL:   {}", metadata.authorization_endpoint));
    console.println(&format!("  TokenURL:  {}", metadata.token_endpoint));

    match metadata.claims(CLAIMS_PREFIX) {
        Ok(claims) => {
            console.println("Claims supported by provider");
            console.println(&claims);
        }
        Err(err) => {
            warn!(%err, "failed to render provider claims");
            console.println(&format!("Error getting claims from provider: {err}"));
        }
    }
}

/// Exchanges `code` and shows the claims of the returned ID token.
/// Failures are reported, never propagated.
pub(crate) async fn show_code<P>(console: &dyn Console, provider: &P, code: &str)
where
    P: OAuthProvider + ?Sized,
{
    console.println("Exchanging code for token");
    let token = match provider.exchange_code(code).await {
        Ok(token) => token,
        Err(err) => {
            warn!(%err, "token exchange failed");
            console.println(&format!("Error exchanging code for token: {err}"));
            return;
        }
    };

    match token.id_token() {
        Ok(id_token) => show_token(console, id_token),
        Err(err) => console.println(&err.to_string()),
    }
}

/// Shows the claims of a JWT. The signature is not verified.
pub(crate) fn show_token(console: &dyn Console, token: &str) {
    match decode_claims(token) {
        Ok(claims) => console.println(&claims),
        Err(err) => {
            warn!(%err, "failed to decode token");
            console.println(&format!("Failed to decode jwt: {err}"));
        }
    }
}
