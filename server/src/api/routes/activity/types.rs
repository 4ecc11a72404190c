//! Activity API types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::types::{
    ApiError, MAX_FEED_DEPTH, PaginationMeta, default_limit, default_page, parse_date_param,
    validate_limit, validate_page,
};
use crate::data::types::{
    ActivityEvent, ActivityFilter, ActivitySortField, ListActivityParams,
    ListSchoolActivityParams, SchoolActivityFilter, SchoolActivityRow, SchoolActivitySortField,
    SchoolActivityType, SortOrder,
};
use crate::domain::{ActivityPage, SchoolActivityPage};
use crate::utils::time::RangeBound;

fn parse_order(order: Option<&str>) -> Result<SortOrder, ApiError> {
    match order.filter(|o| !o.is_empty()) {
        None => Ok(SortOrder::default()),
        Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
            ApiError::bad_request("INVALID_ORDER", "order must be one of: asc, desc")
        }),
    }
}

/// Query parameters for the aggregated feed
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ActivityQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
    #[validate(length(max = 64, message = "action must be at most 64 characters"))]
    pub action: Option<String>,
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ActivityQuery {
    pub fn to_params(&self) -> Result<ListActivityParams, ApiError> {
        // Every source is read up to the requested row, so depth is bounded
        if u64::from(self.page) * u64::from(self.limit) > MAX_FEED_DEPTH {
            return Err(ApiError::bad_request(
                "PAGE_TOO_DEEP",
                format!(
                    "page * limit must be at most {}; narrow the filter instead",
                    MAX_FEED_DEPTH
                ),
            ));
        }
        let sort = match self.sort.as_deref().filter(|s| !s.is_empty()) {
            None => ActivitySortField::default(),
            Some(raw) => ActivitySortField::parse(raw).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_SORT",
                    "sort must be one of: created_at, action, user_name",
                )
            })?,
        };

        Ok(ListActivityParams {
            filter: ActivityFilter {
                user_id: self.user_id,
                action: self
                    .action
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty() && *a != "all")
                    .map(str::to_string),
                from: parse_date_param("start_date", self.start_date.as_deref(), RangeBound::Start)?,
                to: parse_date_param("end_date", self.end_date.as_deref(), RangeBound::End)?,
            },
            sort,
            order: parse_order(self.order.as_deref())?,
            page: self.page,
            limit: self.limit,
        })
    }
}

/// Query parameters for the school activity feed
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SchoolActivityQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
    pub activity_type: Option<String>,
    pub school_id: Option<i64>,
    #[validate(length(max = 200, message = "school_name must be at most 200 characters"))]
    pub school_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl SchoolActivityQuery {
    pub fn to_params(&self) -> Result<ListSchoolActivityParams, ApiError> {
        let activity_type = match self.activity_type.as_deref() {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(SchoolActivityType::parse(raw).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_ACTIVITY_TYPE",
                    "activity_type must be one of: login, view, download, upload",
                )
            })?),
        };
        let sort = match self.sort.as_deref().filter(|s| !s.is_empty()) {
            None => SchoolActivitySortField::default(),
            Some(raw) => SchoolActivitySortField::parse(raw).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_SORT",
                    "sort must be one of: created_at, activity_type, school_name, file_size",
                )
            })?,
        };

        Ok(ListSchoolActivityParams {
            filter: SchoolActivityFilter {
                school_id: self.school_id,
                school_name: self
                    .school_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                activity_type,
                from: parse_date_param("start_date", self.start_date.as_deref(), RangeBound::Start)?,
                to: parse_date_param("end_date", self.end_date.as_deref(), RangeBound::End)?,
            },
            sort,
            order: parse_order(self.order.as_deref())?,
            page: self.page,
            limit: self.limit,
        })
    }
}

/// `{ logs: [...], pagination: {...} }`
#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub logs: Vec<ActivityEvent>,
    pub pagination: PaginationMeta,
}

impl From<ActivityPage> for ActivityListResponse {
    fn from(page: ActivityPage) -> Self {
        Self {
            pagination: PaginationMeta::new(page.page, page.limit, page.total),
            logs: page.events,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SchoolActivityListResponse {
    pub logs: Vec<SchoolActivityRow>,
    pub pagination: PaginationMeta,
}

impl From<SchoolActivityPage> for SchoolActivityListResponse {
    fn from(page: SchoolActivityPage) -> Self {
        Self {
            pagination: PaginationMeta::new(page.page, page.limit, page.total),
            logs: page.logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ActivityQuery {
        ActivityQuery {
            page: 1,
            limit: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_activity_query_defaults() {
        let params = query().to_params().unwrap();
        assert_eq!(params.sort, ActivitySortField::CreatedAt);
        assert_eq!(params.order, SortOrder::Desc);
        assert_eq!(params.filter, ActivityFilter::default());
    }

    #[test]
    fn test_activity_query_date_bounds_are_inclusive_days() {
        let mut q = query();
        q.start_date = Some("2024-01-01".to_string());
        q.end_date = Some("2024-01-01".to_string());
        let params = q.to_params().unwrap();
        assert_eq!(params.filter.from, Some(1_704_067_200));
        assert_eq!(params.filter.to, Some(1_704_153_599));
    }

    #[test]
    fn test_activity_query_all_action_is_no_filter() {
        for action in ["all", " all ", ""] {
            let mut q = query();
            q.action = Some(action.to_string());
            assert_eq!(q.to_params().unwrap().filter.action, None, "{:?}", action);
        }

        let mut q = query();
        q.action = Some("permissions_set".to_string());
        assert_eq!(
            q.to_params().unwrap().filter.action.as_deref(),
            Some("permissions_set")
        );
    }

    #[test]
    fn test_activity_query_depth_limit() {
        let mut q = query();
        q.limit = 100;
        q.page = 100;
        assert!(q.to_params().is_ok());

        q.page = 101;
        assert!(q.to_params().is_err());

        q.page = u32::MAX;
        assert!(q.to_params().is_err());
    }

    #[test]
    fn test_activity_query_rejects_unknown_sort_and_order() {
        let mut q = query();
        q.sort = Some("password".to_string());
        assert!(q.to_params().is_err());

        let mut q = query();
        q.order = Some("sideways".to_string());
        assert!(q.to_params().is_err());
    }

    #[test]
    fn test_school_activity_query_type() {
        let q = SchoolActivityQuery {
            page: 1,
            limit: 20,
            activity_type: Some("download".to_string()),
            ..Default::default()
        };
        let params = q.to_params().unwrap();
        assert_eq!(
            params.filter.activity_type,
            Some(SchoolActivityType::Download)
        );

        let q = SchoolActivityQuery {
            activity_type: Some("print".to_string()),
            ..Default::default()
        };
        assert!(q.to_params().is_err());
    }
}
