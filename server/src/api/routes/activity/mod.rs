//! Admin activity endpoints: aggregated feed, school feed and dashboard
//!
//! Mounted at `/api/admin`.

pub mod types;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;

use types::{ActivityListResponse, ActivityQuery, SchoolActivityListResponse, SchoolActivityQuery};

use crate::api::auth::AdminActor;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, ok};
use crate::domain::ActivityService;

#[derive(Clone)]
pub struct ActivityApiState {
    pub activity: ActivityService,
}

pub fn routes(activity: ActivityService) -> Router<()> {
    let state = ActivityApiState { activity };

    Router::new()
        .route("/activity", get(list_activity))
        .route("/school-activity", get(list_school_activity))
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

pub async fn list_activity(
    State(state): State<ActivityApiState>,
    AdminActor(_admin): AdminActor,
    ValidatedQuery(query): ValidatedQuery<ActivityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query.to_params()?;
    let page = state.activity.list(&params).await?;
    Ok(ok(ActivityListResponse::from(page)))
}

pub async fn list_school_activity(
    State(state): State<ActivityApiState>,
    AdminActor(_admin): AdminActor,
    ValidatedQuery(query): ValidatedQuery<SchoolActivityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query.to_params()?;
    let page = state.activity.school_feed(&params).await?;
    Ok(ok(SchoolActivityListResponse::from(page)))
}

pub async fn dashboard(
    State(state): State<ActivityApiState>,
    AdminActor(admin): AdminActor,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.activity.dashboard(admin.id).await;
    Ok(ok(summary))
}
