//! Error types for tenant identifiers

use thiserror::Error;

use crate::constants::{TENANT_ID_MAX_LEN, TENANT_ID_MIN_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantIdError {
    #[error("Tenant identifier is missing")]
    Missing,

    #[error(
        "Tenant identifier must be between {} and {} characters, got {len}",
        TENANT_ID_MIN_LEN,
        TENANT_ID_MAX_LEN
    )]
    InvalidLength { len: usize },
}
