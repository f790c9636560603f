//! Tenant identifier type

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{TENANT_ID_MAX_LEN, TENANT_ID_MIN_LEN};
use crate::error::TenantIdError;

/// A validated tenant identifier.
///
/// Opaque apart from its length, which is always within
/// `TENANT_ID_MIN_LEN..=TENANT_ID_MAX_LEN` bytes. The only way to obtain one is
/// through [`TenantId::parse`] (or the `FromStr`/`TryFrom` impls built on it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Validate a raw identifier.
    ///
    /// An empty value is `Missing`, not `InvalidLength`: callers report the two
    /// differently.
    pub fn parse(raw: &str) -> Result<Self, TenantIdError> {
        Self::check(raw)?;
        Ok(Self(raw.to_owned()))
    }

    fn check(raw: &str) -> Result<(), TenantIdError> {
        if raw.is_empty() {
            return Err(TenantIdError::Missing);
        }
        let len = raw.len();
        if !(TENANT_ID_MIN_LEN..=TENANT_ID_MAX_LEN).contains(&len) {
            return Err(TenantIdError::InvalidLength { len });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for TenantId {
    type Err = TenantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::check(&value)?;
        Ok(Self(value))
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}
