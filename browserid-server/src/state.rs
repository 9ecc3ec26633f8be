//! Shared application state

use std::sync::Arc;

use browserid_core::{ProxyIdpRouter, Resolver, ShimTable, WellKnownFetcher};

use crate::config::Config;
use crate::directory::EmailDirectory;
use crate::primary::PrimarySupport;
use crate::verifier::AssertionVerifier;

pub struct AppState<D, F> {
    pub config: Config,
    pub primary: Arc<PrimarySupport<F>>,
    pub verifier: AssertionVerifier<F>,
    pub proxy_idps: ProxyIdpRouter,
    pub directory: Arc<D>,
}

impl<D: EmailDirectory, F: WellKnownFetcher> AppState<D, F> {
    pub fn new(config: Config, fetcher: F, shims: Arc<ShimTable>, directory: D) -> Self {
        Self::new_with_arcs(config, fetcher, shims, Arc::new(directory))
    }

    /// Build with a shared directory handle, so callers can inspect it
    pub fn new_with_arcs(
        config: Config,
        fetcher: F,
        shims: Arc<ShimTable>,
        directory: Arc<D>,
    ) -> Self {
        let primary = Arc::new(
            PrimarySupport::new(Resolver::with_shims(fetcher, shims))
                .with_disabled(config.disable_primary_support),
        );
        let verifier = AssertionVerifier::new(primary.clone(), config.hostname());
        let proxy_idps = ProxyIdpRouter::new(config.proxy_idps.clone());

        Self {
            config,
            primary,
            verifier,
            proxy_idps,
            directory,
        }
    }

    /// Origin assertions presented to this service must be addressed to
    pub fn audience(&self) -> String {
        self.config.public_url.origin().ascii_serialization()
    }
}
