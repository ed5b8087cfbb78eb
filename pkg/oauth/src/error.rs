/// OAuth errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to build request body")]
    BuildRequestBody(#[from] serde_urlencoded::ser::Error),

    #[error("failed to send request: {0}")]
    SendRequest(#[from] reqwest::Error),

    #[error("unexpected HTTP status code: {status}: {body}")]
    UnexpectedStatusCode {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    DecodeResponse(#[from] serde_json::Error),

    #[error("provider metadata is missing {0}")]
    MissingEndpoint(&'static str),

    #[error("issuer did not match the issuer returned by provider, expected {expected:?} got {actual:?}")]
    IssuerMismatch { expected: String, actual: String },

    #[error("server response missing access_token")]
    MissingAccessToken,

    #[error("parse URL: {0}")]
    ParseURL(#[from] url::ParseError),
}

/// Why the `id_token` of a token response could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdTokenError {
    #[error("Result did not contain an id_token")]
    Missing,

    #[error("id_token was not of type string")]
    NotAString,

    #[error("id_token was empty")]
    Empty,
}

/// Errors decoding the payload of a JWT.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("jws: invalid token received")]
    InvalidTokenFormat,

    #[error("illegal base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}
