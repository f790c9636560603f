//! Tenantgate Shared Types
//!
//! This crate contains the identifier format and header names shared by the
//! domain resolver and the tenant context middleware.

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::*;
pub use types::*;
