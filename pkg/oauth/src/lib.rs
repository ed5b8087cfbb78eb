mod discovery;
mod error;
mod jwt;
mod models;
mod oauth;
pub mod pretty;
mod random;
pub use discovery::{WELL_KNOWN_PATH, discover};
pub use error::{DecodeError, Error, IdTokenError};
pub use jwt::{CLAIMS_PREFIX, decode_claims};
pub use models::{ProviderMetadata, TokenResponse};
pub use oauth::AuthorizationRequest;
pub use oauth::OAuth;
pub use oauth::OAuthProvider;
pub use random::RandomSource;
pub use random::SecureRandom;

#[cfg(feature = "mock")]
pub use random::mock;
