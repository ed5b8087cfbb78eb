use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{
    error::{Error, IdTokenError},
    pretty,
};

/// The subset of an OpenID provider's discovery document needed to run the
/// authorization code flow.
///
/// The full document is kept as raw bytes for display.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer Identifier, must match the URL the document was fetched for.
    pub issuer: String,

    /// Where the user agent is sent to authenticate.
    pub authorization_endpoint: String,

    /// Where authorization codes are exchanged for tokens.
    pub token_endpoint: String,

    /// URL of the provider's JSON Web Key Set.
    #[serde(default)]
    pub jwks_uri: Option<String>,

    /// URL of the UserInfo endpoint.
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,

    /// Algorithms the provider signs ID tokens with.
    #[serde(default, rename = "id_token_signing_alg_values_supported")]
    pub algorithms: Vec<String>,

    #[serde(skip)]
    raw: Vec<u8>,
}

impl ProviderMetadata {
    /// Parses a discovery document.
    ///
    /// # Errors
    /// - the document is not valid JSON
    /// - a required endpoint is absent or empty
    pub fn from_slice(document: &[u8]) -> Result<Self, Error> {
        let mut metadata: Self = serde_json::from_slice(document)?;

        if metadata.issuer.is_empty() {
            return Err(Error::MissingEndpoint("issuer"));
        }
        if metadata.authorization_endpoint.is_empty() {
            return Err(Error::MissingEndpoint("authorization_endpoint"));
        }
        if metadata.token_endpoint.is_empty() {
            return Err(Error::MissingEndpoint("token_endpoint"));
        }

        metadata.raw = document.to_vec();
        Ok(metadata)
    }

    /// Renders the full discovery document as indented JSON.
    pub fn claims(&self, prefix: &str) -> Result<String, serde_json::Error> {
        pretty::indent(&self.raw, prefix)
    }
}

/// Token endpoint response (RFC 6749 section 5.1).
///
/// Provider specific fields, including the OpenID Connect `id_token`, are
/// collected in [`TokenResponse::extra`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Granted scopes. Accepts a space delimited string or a list.
    #[serde(default, deserialize_with = "deserialize_scope")]
    pub scope: Vec<String>,

    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenResponse {
    /// Returns an extra field of the response.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns the OpenID Connect ID token.
    ///
    /// # Errors
    /// - the field is absent (or null)
    /// - the field is not a string
    /// - the field is an empty string
    pub fn id_token(&self) -> Result<&str, IdTokenError> {
        match self.extra("id_token") {
            None | Some(Value::Null) => Err(IdTokenError::Missing),
            Some(Value::String(token)) if token.is_empty() => Err(IdTokenError::Empty),
            Some(Value::String(token)) => Ok(token),
            Some(_) => Err(IdTokenError::NotAString),
        }
    }
}

fn deserialize_scope<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scope {
        List(Vec<String>),
        Delimited(String),
    }

    Ok(match Option::<Scope>::deserialize(deserializer)? {
        Some(Scope::List(scopes)) => scopes,
        Some(Scope::Delimited(scopes)) => {
            scopes.split_whitespace().map(str::to_string).collect()
        }
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_provider_metadata_from_slice() {
        let document = json!({
            "issuer": "http://op.test/",
            "authorization_endpoint": "http://op.test/oauth2/auth",
            "token_endpoint": "http://op.test/oauth2/token",
            "id_token_signing_alg_values_supported": ["RS256"],
            "claims_supported": ["sub", "group"]
        })
        .to_string();

        let metadata = ProviderMetadata::from_slice(document.as_bytes()).unwrap();

        assert_eq!(metadata.issuer, "http://op.test/");
        assert_eq!(metadata.authorization_endpoint, "http://op.test/oauth2/auth");
        assert_eq!(metadata.token_endpoint, "http://op.test/oauth2/token");
        assert_eq!(metadata.algorithms, vec!["RS256"]);
        assert_eq!(metadata.jwks_uri, None);
        assert!(metadata.claims("  ").unwrap().contains(r#""claims_supported": ["#));
    }

    #[rstest]
    #[case::missing_token_endpoint(
        json!({"issuer": "i", "authorization_endpoint": "a"}),
        "token_endpoint"
    )]
    #[case::empty_authorization_endpoint(
        json!({"issuer": "i", "authorization_endpoint": "", "token_endpoint": "t"}),
        "authorization_endpoint"
    )]
    #[case::empty_issuer(
        json!({"issuer": "", "authorization_endpoint": "a", "token_endpoint": "t"}),
        "issuer"
    )]
    fn test_provider_metadata_rejects_incomplete_documents(
        #[case] document: Value,
        #[case] field: &str,
    ) {
        let err = ProviderMetadata::from_slice(document.to_string().as_bytes()).unwrap_err();

        assert!(err.to_string().contains(field), "unexpected error: {err}");
    }

    #[test]
    fn test_provider_metadata_rejects_invalid_json() {
        let err = ProviderMetadata::from_slice(b"<html>").unwrap_err();

        assert!(matches!(err, Error::DecodeResponse(_)));
    }

    #[rstest]
    #[case::string(json!({"id_token": "a.b.c"}), Ok("a.b.c"))]
    #[case::missing(json!({}), Err(IdTokenError::Missing))]
    #[case::null(json!({"id_token": null}), Err(IdTokenError::Missing))]
    #[case::number(json!({"id_token": 42}), Err(IdTokenError::NotAString))]
    #[case::empty(json!({"id_token": ""}), Err(IdTokenError::Empty))]
    fn test_id_token(#[case] body: Value, #[case] want: Result<&str, IdTokenError>) {
        let token: TokenResponse = serde_json::from_value(body).unwrap();

        assert_eq!(token.id_token(), want);
    }

    #[rstest]
    #[case::list(json!({"scope": ["openid", "email"]}), vec!["openid", "email"])]
    #[case::delimited(json!({"scope": "openid email"}), vec!["openid", "email"])]
    #[case::null(json!({"scope": null}), vec![])]
    #[case::absent(json!({}), vec![])]
    fn test_token_response_scope(#[case] body: Value, #[case] want: Vec<&str>) {
        let token: TokenResponse = serde_json::from_value(body).unwrap();

        assert_eq!(token.scope, want);
    }

    #[test]
    fn test_token_response_fields() {
        let token: TokenResponse = serde_json::from_value(json!({
            "token_type": "Bearer",
            "access_token": "let-me-in",
            "refresh_token": "another-token-please",
            "expires_in": 300,
            "id_token": "a.b.c"
        }))
        .unwrap();

        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.access_token.as_deref(), Some("let-me-in"));
        assert_eq!(token.refresh_token.as_deref(), Some("another-token-please"));
        assert_eq!(token.expires_in, Some(300));
        assert!(token.extra("access_token").is_none());
    }
}
