//! BrowserID Core Library
//!
//! Primary identity authority discovery and assertion primitives:
//! - Domains publish a `/.well-known/browserid` document, possibly
//!   delegating to another authority
//! - Authorities sign certificates binding a user key to an email
//! - Users sign assertions for a relying party, bundled with their certificate

pub mod assertion;
pub mod certificate;
pub mod discovery;
pub mod error;
mod jws;
pub mod keys;
pub mod origin;
pub mod proxy_idp;
pub mod shim;
pub mod well_known;

pub use assertion::{Assertion, AssertionBundle};
pub use certificate::Certificate;
pub use discovery::{
    domain_from_email, DelegationChain, Resolver, WellKnown, WellKnownFetcher,
    MAX_AUTHORITY_DELEGATIONS,
};
pub use error::Error;
pub use keys::{KeyPair, PublicKey};
pub use origin::{normalize_origin, same_origin};
pub use proxy_idp::ProxyIdpRouter;
pub use shim::ShimTable;
pub use well_known::{PrimaryAuthorityInfo, SupportDocument, WELL_KNOWN_PATH};

/// Result type for browserid-core operations
pub type Result<T> = std::result::Result<T, Error>;
