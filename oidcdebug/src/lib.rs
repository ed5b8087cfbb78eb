//! Runs a single OpenID Connect authorization code flow against a provider
//! and prints every artifact along the way: the resolved endpoints, the
//! provider's discovery document and the claims of the issued ID token.
mod browser;
pub mod config;
mod console;
mod error;
mod flow;
mod provider;
mod report;
mod server;
mod signal;
pub use browser::{Browser, BrowserError, RedirectFollower, SystemBrowser};
pub use config::Config;
pub use console::{Buffer, Console, Stdout};
pub use error::FlowError;
pub use flow::Flow;
pub use provider::{OidcProvider, http_client};
