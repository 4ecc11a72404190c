//! Resource API types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::types::{
    ApiError, PaginationMeta, default_limit, default_page, validate_limit, validate_page,
};
use crate::data::types::{ListResourcesParams, ResourceStatus, ResourceSummary};
use crate::domain::ResourcePage;

/// Query parameters for resource listings
#[derive(Debug, Deserialize, Validate)]
pub struct ListResourcesQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
    pub subject_id: Option<i64>,
    pub grade_id: Option<i64>,
    pub type_id: Option<i64>,
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub search: Option<String>,
    /// Admin listing only
    pub status: Option<String>,
}

impl ListResourcesQuery {
    pub fn to_params(&self) -> ListResourcesParams {
        ListResourcesParams {
            status: None,
            granted_to: None,
            subject_id: self.subject_id,
            grade_id: self.grade_id,
            type_id: self.type_id,
            search: self.search.clone(),
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn parsed_status(&self) -> Result<Option<ResourceStatus>, ApiError> {
        match self.status.as_deref() {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => ResourceStatus::parse(raw).map(Some).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_STATUS",
                    "status must be one of: draft, published, archived, all",
                )
            }),
        }
    }
}

/// `{ resources: [...], pagination: {...} }`
#[derive(Debug, Serialize)]
pub struct ResourceListResponse {
    pub resources: Vec<ResourceSummary>,
    pub pagination: PaginationMeta,
}

impl From<ResourcePage> for ResourceListResponse {
    fn from(page: ResourcePage) -> Self {
        Self {
            pagination: PaginationMeta::new(page.page, page.limit, page.total),
            resources: page.resources,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub resource_id: i64,
    pub view_count: i64,
}
