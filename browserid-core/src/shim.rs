//! Shimmed primaries for local development and tests
//!
//! `SHIMMED_PRIMARIES` holds comma-separated `domain|origin|path` triples.
//! Each shimmed domain is answered from the file at `path` instead of the
//! network, and its URLs are rooted at `origin` instead of `https://domain`:
//!
//! ```text
//! SHIMMED_PRIMARIES=eyedee.me|http://127.0.0.1:10005|example/primary/.well-known/browserid
//! ```
//!
//! The table is built once at startup and never changes afterwards.

use std::collections::HashMap;
use std::path::Path;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shim {
    pub origin: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShimTable {
    shims: HashMap<String, Shim>,
}

impl ShimTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `SHIMMED_PRIMARIES` value, reading every referenced file
    pub fn parse(spec: &str) -> Result<Self> {
        let mut table = Self::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let fields: Vec<&str> = entry.split('|').collect();
            let [domain, origin, path] = fields[..] else {
                return Err(Error::InvalidShim(entry.to_string()));
            };
            if domain.is_empty() || origin.is_empty() {
                return Err(Error::InvalidShim(entry.to_string()));
            }
            let body = std::fs::read_to_string(Path::new(path))
                .map_err(|e| Error::InvalidShim(format!("{}: {}", entry, e)))?;
            table = table.with_shim(domain, origin, body);
        }
        Ok(table)
    }

    /// Add a shim with an in-memory body
    pub fn with_shim(
        mut self,
        domain: impl Into<String>,
        origin: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let domain = domain.into();
        let origin = origin.into();
        tracing::info!(%domain, %origin, "inserted shimmed primary");
        self.shims.insert(
            domain,
            Shim {
                origin,
                body: body.into(),
            },
        );
        self
    }

    pub fn get(&self, domain: &str) -> Option<&Shim> {
        self.shims.get(domain)
    }

    pub fn len(&self) -> usize {
        self.shims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shims.is_empty()
    }
}
