//! Search endpoint derivation from the configured URI
//!
//! The endpoint URI is a single string of the form `scheme://host[:port][/index]`.
//! Connection parameters are derived from it on every access rather than stored.

use std::sync::LazyLock;

use regex::Regex;

/// Index used when the URI carries no path segment
pub const DEFAULT_INDEX: &str = "trivy-scanning-result";

/// Port used when no URI is configured at all
pub const DEFAULT_PORT: u16 = 9200;

/// Port used when the URI matches but has no port segment
pub const PORTLESS_PORT: u16 = 80;

static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?P<host>[A-Za-z0-9\-.]+)(?::(?P<port>[0-9]+))?(?:/(?P<path>.*))?$",
    )
    .expect("endpoint pattern is valid")
});

/// Connection parameters derived from an endpoint URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub index: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            scheme: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            index: DEFAULT_INDEX.to_string(),
        }
    }
}

impl Endpoint {
    /// Derive connection parameters from an optional URI.
    ///
    /// A blank or non-matching URI yields the defaults (empty scheme and host,
    /// port 9200, default index). A matching URI without a port yields port 80.
    pub fn derive(uri: Option<&str>) -> Self {
        let Some(uri) = uri.map(str::trim).filter(|u| !u.is_empty()) else {
            return Self::default();
        };

        let Some(caps) = URI_PATTERN.captures(uri) else {
            log::debug!("Endpoint URI '{}' does not match, using defaults", uri);
            return Self::default();
        };

        let port = match caps.name("port") {
            Some(m) => match m.as_str().parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    log::debug!("Port '{}' out of range, using defaults", m.as_str());
                    return Self::default();
                }
            },
            None => PORTLESS_PORT,
        };

        let index = caps
            .name("path")
            .map(|m| m.as_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_INDEX)
            .to_string();

        Self {
            scheme: caps["scheme"].to_string(),
            host: caps["host"].to_string(),
            port,
            index,
        }
    }

    /// Whether a host was derived, i.e. the endpoint can be contacted
    pub fn is_addressable(&self) -> bool {
        !self.scheme.is_empty() && !self.host.is_empty()
    }

    /// Base URL of the cluster, without the index
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_uri_segments() {
        let endpoint = Endpoint::derive(Some("http://search.internal:9201/scans-prod"));
        assert_eq!(endpoint.scheme, "http");
        assert_eq!(endpoint.host, "search.internal");
        assert_eq!(endpoint.port, 9201);
        assert_eq!(endpoint.index, "scans-prod");
    }

    #[test]
    fn test_scheme_host_port() {
        let endpoint = Endpoint::derive(Some("https://example.elasticsearch.com:8080"));
        assert_eq!(endpoint.scheme, "https");
        assert_eq!(endpoint.host, "example.elasticsearch.com");
        assert_eq!(endpoint.port, 8080);
        assert_eq!(endpoint.index, DEFAULT_INDEX);
    }

    #[test]
    fn test_portless_uri_defaults_to_80() {
        let endpoint = Endpoint::derive(Some("https://example.elasticsearch.com/index-name"));
        assert_eq!(endpoint.port, 80);
        assert_eq!(endpoint.index, "index-name");
    }

    #[test]
    fn test_no_uri_defaults() {
        let endpoint = Endpoint::derive(None);
        assert_eq!(endpoint.scheme, "");
        assert_eq!(endpoint.host, "");
        assert_eq!(endpoint.port, 9200);
        assert_eq!(endpoint.index, "trivy-scanning-result");
        assert!(!endpoint.is_addressable());
    }

    #[test]
    fn test_blank_uri_defaults() {
        assert_eq!(Endpoint::derive(Some("   ")), Endpoint::default());
    }

    #[test]
    fn test_unmatched_uri_defaults() {
        assert_eq!(Endpoint::derive(Some("not a uri")), Endpoint::default());
        assert_eq!(
            Endpoint::derive(Some("http://host_with_underscore:9200")),
            Endpoint::default()
        );
    }

    #[test]
    fn test_trailing_slash_uses_default_index() {
        let endpoint = Endpoint::derive(Some("http://localhost:9200/"));
        assert_eq!(endpoint.index, DEFAULT_INDEX);
    }

    #[test]
    fn test_path_used_verbatim() {
        let endpoint = Endpoint::derive(Some("http://localhost:9200/trivy-2024.01"));
        assert_eq!(endpoint.index, "trivy-2024.01");
    }

    #[test]
    fn test_out_of_range_port_defaults() {
        assert_eq!(Endpoint::derive(Some("http://localhost:99999")), Endpoint::default());
    }

    #[test]
    fn test_base_url() {
        let endpoint = Endpoint::derive(Some("http://localhost:9200/scans"));
        assert_eq!(endpoint.base_url(), "http://localhost:9200");
        assert!(endpoint.is_addressable());
    }
}
