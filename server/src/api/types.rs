//! Shared API types
//!
//! Response envelope, error mapping and pagination used by every endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use validator::ValidationError;

use crate::data::{DataError, ErrorKind};
use crate::utils::time::{RangeBound, parse_date_bound};

/// Maximum items per page for paginated endpoints
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Default page number
pub const DEFAULT_PAGE: u32 = 1;
/// Default items per page
pub const DEFAULT_LIMIT: u32 = 20;
/// Deepest row (`page * limit`) the aggregated feed will page to
pub const MAX_FEED_DEPTH: u64 = 10_000;
/// Maximum grants accepted in one permission request
pub const MAX_GRANTS_PER_REQUEST: usize = 500;

/// Validator function for page parameter
pub fn validate_page(page: u32) -> Result<(), ValidationError> {
    if page < 1 {
        return Err(ValidationError::new("page_min").with_message("Page must be >= 1".into()));
    }
    Ok(())
}

/// Validator function for limit parameter
pub fn validate_limit(limit: u32) -> Result<(), ValidationError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::new("limit_range")
            .with_message(format!("Limit must be between 1 and {}", MAX_PAGE_LIMIT).into()));
    }
    Ok(())
}

pub fn default_page() -> u32 {
    DEFAULT_PAGE
}

pub fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Parse an optional `start_date`/`end_date` parameter into unix seconds.
///
/// Accepts `YYYY-MM-DD` (whole day, inclusive) or an RFC 3339 instant.
pub fn parse_date_param(
    name: &str,
    value: Option<&str>,
    bound: RangeBound,
) -> Result<Option<i64>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date_bound(raw, bound).map(Some).ok_or_else(|| {
            ApiError::bad_request(
                "INVALID_DATE",
                format!("Invalid {}: {}. Use YYYY-MM-DD or RFC 3339.", name, raw),
            )
        }),
    }
}

/// Success envelope: `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data: Some(data),
        message: None,
    })
}

pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data: Some(data),
        message: Some(message.into()),
    })
}

/// Pagination metadata in list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: crate::domain::page_count(total, limit),
        }
    }
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    Unauthorized { code: String, message: String },
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Unprocessable { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a data error onto its HTTP form.
    ///
    /// Store messages stay in the log; clients only see a generic text for
    /// internal and availability failures.
    pub fn from_data(e: DataError) -> Self {
        match e.kind() {
            ErrorKind::NotFound => Self::NotFound {
                code: "NOT_FOUND".to_string(),
                message: e.to_string(),
            },
            ErrorKind::InvalidReference => Self::Unprocessable {
                code: "INVALID_REFERENCE".to_string(),
                message: e.to_string(),
            },
            ErrorKind::Forbidden => Self::Forbidden {
                code: "FORBIDDEN".to_string(),
                message: match e {
                    DataError::Forbidden(message) => message,
                    other => other.to_string(),
                },
            },
            ErrorKind::Conflict => {
                tracing::warn!(error = %e, "Write conflict");
                Self::Conflict {
                    code: "CONFLICT".to_string(),
                    message: "The request conflicted with a concurrent change".to_string(),
                }
            }
            ErrorKind::StoreUnavailable => {
                tracing::error!(error = %e, "Store unavailable");
                Self::ServiceUnavailable {
                    message: "Storage is temporarily unavailable".to_string(),
                }
            }
            ErrorKind::Internal => {
                tracing::error!(error = %e, "Data error");
                Self::Internal {
                    message: "Database operation failed".to_string(),
                }
            }
        }
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        Self::from_data(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            Self::Unauthorized { code, message } => (StatusCode::UNAUTHORIZED, code, message),
            Self::Forbidden { code, message } => (StatusCode::FORBIDDEN, code, message),
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            Self::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            Self::Unprocessable { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, code, message)
            }
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "success": false,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(2, 20, 41);
        assert_eq!(meta.pages, 3);
        assert_eq!(PaginationMeta::new(1, 20, 0).pages, 0);
    }

    #[test]
    fn test_error_kinds_map_to_status() {
        let cases = [
            (DataError::not_found("resource", 1), StatusCode::NOT_FOUND),
            (
                DataError::InvalidReference {
                    entity: "subject",
                    id: 9,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DataError::forbidden("no"), StatusCode::FORBIDDEN),
            (DataError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                DataError::StoreUnavailable("no such table: activity_logs".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (DataError::Config("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from_data(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_parse_date_param() {
        assert_eq!(
            parse_date_param("start_date", Some("2024-01-01"), RangeBound::Start).unwrap(),
            Some(1_704_067_200)
        );
        assert_eq!(
            parse_date_param("end_date", Some("2024-01-01"), RangeBound::End).unwrap(),
            Some(1_704_153_599)
        );
        assert!(parse_date_param("start_date", None, RangeBound::Start)
            .unwrap()
            .is_none());
        assert!(parse_date_param("start_date", Some("yesterday"), RangeBound::Start).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(100).is_ok());
        assert!(validate_limit(101).is_err());
        assert!(validate_page(0).is_err());
    }
}
