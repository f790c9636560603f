//! Trust-ordered host selection
//!
//! The order encodes the proxy topology: nginx sets `X-Original-Host` on auth
//! subrequests, other proxies set `X-Forwarded-Host`, and the request's own
//! host is the last resort. Falling through to the next source happens only
//! when a source is absent or empty.

use std::fmt;
use std::str::FromStr;

use axum::http::{header, HeaderMap, HeaderName, Uri};
use tenantgate_shared::{X_FORWARDED_HOST, X_ORIGINAL_HOST};

/// Token used in `TRUSTED_HOST_HEADERS` for the request's own host
const REQUEST_HOST_TOKEN: &str = "host";

/// One place a host can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    /// A request header, e.g. `X-Original-Host`
    Header(HeaderName),
    /// The request's own host: the `Host` header, else the URI authority
    RequestHost,
}

impl HostSource {
    fn read<'a>(&self, headers: &'a HeaderMap, uri: &'a Uri) -> Candidate<'a> {
        match self {
            HostSource::Header(name) => Candidate::from_header(headers, name),
            HostSource::RequestHost => match Candidate::from_header(headers, &header::HOST) {
                Candidate::Absent => uri
                    .authority()
                    .map(|authority| authority.as_str())
                    .filter(|host| !host.is_empty())
                    .map_or(Candidate::Absent, Candidate::Present),
                other => other,
            },
        }
    }
}

impl fmt::Display for HostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostSource::Header(name) => f.write_str(name.as_str()),
            HostSource::RequestHost => f.write_str(REQUEST_HOST_TOKEN),
        }
    }
}

enum Candidate<'a> {
    Absent,
    Present(&'a str),
    /// Present but not UTF-8
    Unreadable,
}

impl<'a> Candidate<'a> {
    fn from_header(headers: &'a HeaderMap, name: &HeaderName) -> Self {
        match headers.get(name) {
            None => Candidate::Absent,
            Some(value) if value.is_empty() => Candidate::Absent,
            Some(value) => std::str::from_utf8(value.as_bytes())
                .map_or(Candidate::Unreadable, Candidate::Present),
        }
    }
}

/// Ordered list of host sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPolicy {
    sources: Vec<HostSource>,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self {
            sources: vec![
                HostSource::Header(HeaderName::from_static(X_ORIGINAL_HOST)),
                HostSource::Header(HeaderName::from_static(X_FORWARDED_HOST)),
                HostSource::RequestHost,
            ],
        }
    }
}

impl HostPolicy {
    pub fn new(sources: Vec<HostSource>) -> Result<Self, HostPolicyError> {
        if sources.is_empty() {
            return Err(HostPolicyError::Empty);
        }
        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[HostSource] {
        &self.sources
    }

    /// Select the host for a request.
    ///
    /// Returns the first present, non-empty source, byte for byte. A source
    /// that is present but not UTF-8 ends the chain with `None` rather than falling through
    /// to a less trusted source.
    pub fn select<'a>(&self, headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
        for source in &self.sources {
            match source.read(headers, uri) {
                Candidate::Absent => continue,
                Candidate::Present(host) => return Some(host),
                Candidate::Unreadable => {
                    tracing::debug!(source = %source, "Host source is not UTF-8");
                    return None;
                }
            }
        }
        None
    }
}

impl fmt::Display for HostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{source}")?;
        }
        Ok(())
    }
}

/// Parses a comma separated list such as `x-original-host,x-forwarded-host,host`
impl FromStr for HostPolicy {
    type Err = HostPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sources = s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                if token.eq_ignore_ascii_case(REQUEST_HOST_TOKEN) {
                    Ok(HostSource::RequestHost)
                } else {
                    HeaderName::from_bytes(token.as_bytes())
                        .map(HostSource::Header)
                        .map_err(|_| HostPolicyError::InvalidHeader(token.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(sources)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HostPolicyError {
    #[error("host policy must name at least one source")]
    Empty,

    #[error("invalid header name in host policy: {0}")]
    InvalidHeader(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_priority_order() {
        let policy = HostPolicy::default();
        let uri = Uri::from_static("/");

        let all = headers(&[
            ("x-original-host", "a.example.com"),
            ("x-forwarded-host", "b.example.com"),
            ("host", "c.example.com"),
        ]);
        assert_eq!(policy.select(&all, &uri), Some("a.example.com"));

        let no_original = headers(&[
            ("x-forwarded-host", "b.example.com"),
            ("host", "c.example.com"),
        ]);
        assert_eq!(policy.select(&no_original, &uri), Some("b.example.com"));

        let host_only = headers(&[("host", "c.example.com")]);
        assert_eq!(policy.select(&host_only, &uri), Some("c.example.com"));
    }

    #[test]
    fn test_empty_values_fall_through() {
        let policy = HostPolicy::default();
        let uri = Uri::from_static("/");

        let map = headers(&[
            ("x-original-host", ""),
            ("x-forwarded-host", ""),
            ("host", "c.example.com"),
        ]);
        assert_eq!(policy.select(&map, &uri), Some("c.example.com"));

        let nothing = headers(&[("x-original-host", ""), ("host", "")]);
        assert_eq!(policy.select(&nothing, &uri), None);
    }

    #[test]
    fn test_request_host_falls_back_to_authority() {
        let policy = HostPolicy::default();
        let uri = Uri::from_static("http://d.example.com/path");
        assert_eq!(policy.select(&HeaderMap::new(), &uri), Some("d.example.com"));
    }

    #[test]
    fn test_utf8_host_is_selected_verbatim() {
        let policy = HostPolicy::default();
        let uri = Uri::from_static("/");
        let mut map = headers(&[("host", "c.example.com")]);
        map.insert(
            "x-original-host",
            HeaderValue::from_bytes("café.example.com".as_bytes()).unwrap(),
        );
        assert_eq!(policy.select(&map, &uri), Some("café.example.com"));
    }

    #[test]
    fn test_non_utf8_header_stops_chain() {
        let policy = HostPolicy::default();
        let uri = Uri::from_static("/");
        let mut map = headers(&[("host", "c.example.com")]);
        map.insert(
            "x-original-host",
            HeaderValue::from_bytes(b"caf\xe9.example.com").unwrap(),
        );
        assert_eq!(policy.select(&map, &uri), None);
    }

    #[test]
    fn test_host_is_not_normalized() {
        let policy = HostPolicy::default();
        let uri = Uri::from_static("/");
        let map = headers(&[("x-original-host", "Shop.Example.COM:8443")]);
        assert_eq!(policy.select(&map, &uri), Some("Shop.Example.COM:8443"));
    }

    #[test]
    fn test_parse_policy() {
        let policy: HostPolicy = "X-Original-Host, host".parse().unwrap();
        assert_eq!(
            policy.sources(),
            &[
                HostSource::Header(HeaderName::from_static("x-original-host")),
                HostSource::RequestHost,
            ]
        );
        assert_eq!(policy.to_string(), "x-original-host,host");

        let default: HostPolicy = "x-original-host,x-forwarded-host,host".parse().unwrap();
        assert_eq!(default, HostPolicy::default());
    }

    #[test]
    fn test_parse_policy_errors() {
        assert_eq!(" , ".parse::<HostPolicy>(), Err(HostPolicyError::Empty));
        assert_eq!(
            "x-original-host,bad header".parse::<HostPolicy>(),
            Err(HostPolicyError::InvalidHeader("bad header".to_string()))
        );
    }

    #[test]
    fn test_custom_policy_ignores_unlisted_sources() {
        let policy: HostPolicy = "x-forwarded-host".parse().unwrap();
        let uri = Uri::from_static("/");
        let map = headers(&[("x-original-host", "a.example.com"), ("host", "c.example.com")]);
        assert_eq!(policy.select(&map, &uri), None);
    }
}
