use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors of the mock provider and its browser substitute.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MockError {
    #[error("could not load signing key : {0}")]
    SigningKey(#[source] jsonwebtoken::errors::Error),

    #[error("could not sign jwt : {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("could not encode response : {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not bind listener : {0}")]
    Bind(#[source] std::io::Error),

    #[error("server failed : {0}")]
    Serve(#[source] std::io::Error),

    #[error("server task failed : {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("request failed : {0}")]
    Request(#[from] reqwest::Error),

    #[error("server response {status} : {body}")]
    UnexpectedResponse {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
