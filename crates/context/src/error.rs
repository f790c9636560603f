//! Tenant context rejections

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tenantgate_shared::TenantIdError;

/// Why the middleware refused a request.
///
/// Both variants are client errors and are logged at debug level only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantRejection {
    #[error("Missing tenant identifier")]
    TenantIdRequired,

    #[error("Invalid tenant identifier")]
    InvalidTenantIdFormat,
}

impl TenantRejection {
    pub fn code(&self) -> &'static str {
        match self {
            TenantRejection::TenantIdRequired => "TENANT_ID_REQUIRED",
            TenantRejection::InvalidTenantIdFormat => "INVALID_TENANT_ID",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            TenantRejection::TenantIdRequired => {
                "X-Tenant-ID header is required for all tenant operations"
            }
            TenantRejection::InvalidTenantIdFormat => {
                "X-Tenant-ID must be between 3 and 128 characters"
            }
        }
    }
}

impl From<TenantIdError> for TenantRejection {
    fn from(err: TenantIdError) -> Self {
        match err {
            TenantIdError::Missing => TenantRejection::TenantIdRequired,
            TenantIdError::InvalidLength { .. } => TenantRejection::InvalidTenantIdFormat,
        }
    }
}

/// JSON body shared by every rejection
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub code: &'static str,
}

impl IntoResponse for TenantRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            message: self.message().to_string(),
            code: self.code(),
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// A handler asked for the tenant on a route the middleware does not cover.
///
/// This is a wiring defect, not a client error: the request fails with 500 and
/// the defect is logged. Other requests are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Tenant context missing - ensure the tenant middleware is applied to this route")]
pub struct MissingTenantContext;

impl IntoResponse for MissingTenantContext {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);

        let body = ErrorBody {
            error: "Internal server error".to_string(),
            message: "Tenant context is not available for this route".to_string(),
            code: "TENANT_CONTEXT_MISSING",
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
