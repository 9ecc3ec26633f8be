//! Server configuration, read from the environment

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

/// HTTP proxy (typically a caching Squid) used for well-known lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProxy {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Public URL of this service; its origin is the audience for
    /// assertions presented to us
    pub public_url: Url,

    /// Hard-disable primary support (no well-known lookups at all)
    pub disable_primary_support: bool,

    pub http_proxy: Option<HttpProxy>,

    /// Raw `SHIMMED_PRIMARIES` value, parsed into a shim table at startup
    pub shimmed_primaries: Option<String>,

    /// Email domain → BigTent URL
    pub proxy_idps: HashMap<String, String>,

    /// Connect + read timeout for well-known fetches
    pub well_known_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            public_url: Url::parse("http://localhost:3000").expect("static url"),
            disable_primary_support: false,
            http_proxy: None,
            shimmed_primaries: None,
            proxy_idps: HashMap::new(),
            well_known_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep their
    /// defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            config.port = port.trim().parse().map_err(|e| invalid("PORT", e))?;
        }
        if let Some(url) = var("PUBLIC_URL") {
            config.public_url = Url::parse(url.trim()).map_err(|e| invalid("PUBLIC_URL", e))?;
            if !config.public_url.has_host() {
                return Err(invalid("PUBLIC_URL", "missing host"));
            }
        }
        if let Some(flag) = var("DISABLE_PRIMARY_SUPPORT") {
            config.disable_primary_support = parse_flag(&flag)
                .ok_or_else(|| invalid("DISABLE_PRIMARY_SUPPORT", "expected true or false"))?;
        }
        config.http_proxy = match (var("HTTP_PROXY_HOST"), var("HTTP_PROXY_PORT")) {
            (Some(host), Some(port)) => Some(HttpProxy {
                host: host.trim().to_string(),
                port: port.trim().parse().map_err(|e| invalid("HTTP_PROXY_PORT", e))?,
            }),
            (None, None) => None,
            _ => {
                return Err(invalid(
                    "HTTP_PROXY_HOST",
                    "HTTP_PROXY_HOST and HTTP_PROXY_PORT must be set together",
                ))
            }
        };
        config.shimmed_primaries = var("SHIMMED_PRIMARIES");
        if let Some(proxies) = var("PROXY_IDPS") {
            config.proxy_idps = parse_proxy_idps(&proxies)?;
        }
        if let Some(secs) = var("WELL_KNOWN_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| invalid("WELL_KNOWN_TIMEOUT_SECS", e))?;
            config.well_known_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// `host[:port]` of the public URL; certificates issued under this name
    /// are never accepted by this service
    pub fn hostname(&self) -> String {
        let host = self.public_url.host_str().unwrap_or_default();
        match self.public_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_proxy_idps(value: &str) -> Result<HashMap<String, String>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('|') {
            Some((domain, url)) if !domain.is_empty() && Url::parse(url).is_ok() => {
                Ok((domain.to_lowercase(), url.to_string()))
            }
            _ => Err(invalid("PROXY_IDPS", format!("bad entry '{}'", entry))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.hostname(), "localhost:3000");
        assert!(!config.disable_primary_support);
        assert!(config.http_proxy.is_none());
        assert!(config.proxy_idps.is_empty());
    }

    #[test]
    fn test_full_environment() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("PUBLIC_URL", "https://login.persona.org"),
            ("DISABLE_PRIMARY_SUPPORT", "true"),
            ("HTTP_PROXY_HOST", "squid.internal"),
            ("HTTP_PROXY_PORT", "3128"),
            ("SHIMMED_PRIMARIES", "eyedee.me|http://127.0.0.1:10005|/tmp/bid"),
            ("PROXY_IDPS", "gmail.com|https://gmail.login.persona.org"),
            ("WELL_KNOWN_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.hostname(), "login.persona.org");
        assert!(config.disable_primary_support);
        assert_eq!(
            config.http_proxy,
            Some(HttpProxy {
                host: "squid.internal".into(),
                port: 3128
            })
        );
        assert!(config.shimmed_primaries.is_some());
        assert_eq!(
            config.proxy_idps.get("gmail.com").map(String::as_str),
            Some("https://gmail.login.persona.org")
        );
        assert_eq!(config.well_known_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISABLE_PRIMARY_SUPPORT", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup(&[("HTTP_PROXY_HOST", "squid")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PROXY_IDPS", "gmail.com")])).is_err());
    }
}
