//! A minimal OpenID Connect provider replying with pre-canned responses.
//!
//! The provider skips authentication entirely: the authorization endpoint
//! redirects straight back with a fixed code and the token endpoint mints a
//! signed ID token for a fixed identity, whatever the request contains.
mod browser;
mod error;
mod handlers;
mod metadata;
mod server;
mod signing;
pub use browser::open_url;
pub use error::MockError;
pub use handlers::{AUTHORIZATION_CODE, AUTH_PATH, TOKEN_PATH};
pub use metadata::well_known_metadata;
pub use server::{MockProvider, MockServer};
pub use signing::{ALGORITHM, AUDIENCE, GROUPS, IdTokenClaims, SUBJECT, TEST_PUBLIC_KEY};
