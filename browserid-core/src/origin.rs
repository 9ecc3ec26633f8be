//! Origin normalization for audience comparison
//!
//! Audiences are compared as `scheme://host[:port]`: paths, queries and
//! fragments are dropped, scheme and host are lowercased, and the default
//! port for the scheme is elided.

use url::Url;

use crate::{Error, Result};

/// Port assumed for schemes `url` has no default for (e.g. `app://`)
const FALLBACK_DEFAULT_PORT: u16 = 80;

/// Reduce a URL to its origin-only form
pub fn normalize_origin(input: &str) -> Result<String> {
    let url = Url::parse(input.trim()).map_err(|e| Error::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    let host = url.host_str().ok_or_else(|| Error::InvalidUrl {
        url: input.to_string(),
        reason: "missing host".into(),
    })?;

    let default_port = default_port(url.scheme());
    Ok(match url.port_or_known_default() {
        Some(port) if port != default_port => format!("{}://{}:{}", url.scheme(), host, port),
        _ => format!("{}://{}", url.scheme(), host),
    })
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "https" | "wss" => 443,
        "ftp" => 21,
        _ => FALLBACK_DEFAULT_PORT,
    }
}

/// Compare two audiences by origin. Unparseable input never matches.
pub fn same_origin(a: &str, b: &str) -> bool {
    match (normalize_origin(a), normalize_origin(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
