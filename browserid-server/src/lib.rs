//! BrowserID primary trust server
//!
//! Decides whether email domains are BrowserID primaries and verifies the
//! identity assertions they back, behind a small wsapi surface.

pub mod config;
pub mod directory;
pub mod error;
pub mod fetcher;
pub mod primary;
pub mod routes;
pub mod state;
pub mod verifier;

pub use config::{Config, ConfigError, HttpProxy};
pub use directory::{EmailDirectory, InMemoryEmailDirectory};
pub use error::ServerError;
pub use fetcher::HttpWellKnownFetcher;
pub use primary::PrimarySupport;
pub use state::AppState;
pub use verifier::{AssertionVerifier, VerificationResult, VerifiedIdentity};
