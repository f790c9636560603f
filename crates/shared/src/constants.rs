//! Header names and limits shared across the tenant edge

/// Header carrying the resolved tenant identifier.
///
/// Set as a response header by the resolver; the edge proxy copies it onto the
/// upstream request where the context middleware reads it.
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Original host as seen by the ingress (nginx `auth-url` subrequests)
pub const X_ORIGINAL_HOST: &str = "x-original-host";

/// Host forwarded by an intermediate proxy
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Prefix of every domain mapping key in the store
pub const DOMAIN_KEY_PREFIX: &str = "domain:";

/// Shortest accepted tenant identifier (bytes)
pub const TENANT_ID_MIN_LEN: usize = 3;

/// Longest accepted tenant identifier (bytes)
pub const TENANT_ID_MAX_LEN: usize = 128;

/// Build the store key for a host.
///
/// The host is used verbatim: no lowercasing, no port stripping. Mappings are
/// exact-match and case-sensitive.
pub fn domain_key(host: &str) -> String {
    format!("{DOMAIN_KEY_PREFIX}{host}")
}
