//! Resource API endpoints
//!
//! Listings for each audience plus the gated view/download/like actions.

pub mod types;

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use axum::response::IntoResponse;

use types::{ListResourcesQuery, ResourceListResponse, ViewResponse};

use crate::api::auth::{AdminActor, AuthActor, SchoolActor};
use crate::api::extractors::{IdPath, ValidatedQuery};
use crate::api::types::{ApiError, ok};
use crate::data::types::ResourceScope;
use crate::domain::{AccessGate, CatalogService, ClientInfo, EngagementService};

/// Shared state for resource endpoints
#[derive(Clone)]
pub struct ResourcesApiState {
    pub catalog: CatalogService,
    pub gate: AccessGate,
    pub engagement: EngagementService,
}

/// Unauthenticated published catalog, mounted at `/api/resources`
pub fn public_routes(state: ResourcesApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_public))
        .with_state(state)
}

/// Actions on one resource, mounted at `/api/resources` behind auth
pub fn member_routes(state: ResourcesApiState) -> Router<()> {
    Router::new()
        .route("/{id}/view", post(view_resource))
        .route("/{id}/download", post(download_resource))
        .route("/{id}/like", post(toggle_like))
        .with_state(state)
}

/// Gated listing for school accounts, mounted at `/api/school`
pub fn school_routes(state: ResourcesApiState) -> Router<()> {
    Router::new()
        .route("/resources", get(list_for_school))
        .with_state(state)
}

/// All-status listing and counter inspection, mounted at `/api/admin`
pub fn admin_routes(state: ResourcesApiState) -> Router<()> {
    Router::new()
        .route("/resources", get(list_for_admin))
        .route("/resources/{id}/stats", get(resource_stats))
        .with_state(state)
}

pub async fn list_public(
    State(state): State<ResourcesApiState>,
    ValidatedQuery(query): ValidatedQuery<ListResourcesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .catalog
        .list(ResourceScope::Public, query.to_params())
        .await?;
    Ok(ok(ResourceListResponse::from(page)))
}

pub async fn list_for_school(
    State(state): State<ResourcesApiState>,
    SchoolActor(actor): SchoolActor,
    ValidatedQuery(query): ValidatedQuery<ListResourcesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .catalog
        .list(
            ResourceScope::School {
                school_id: actor.id,
            },
            query.to_params(),
        )
        .await?;
    Ok(ok(ResourceListResponse::from(page)))
}

pub async fn list_for_admin(
    State(state): State<ResourcesApiState>,
    AdminActor(_admin): AdminActor,
    ValidatedQuery(query): ValidatedQuery<ListResourcesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.parsed_status()?;
    let page = state
        .catalog
        .list(ResourceScope::Admin { status }, query.to_params())
        .await?;
    Ok(ok(ResourceListResponse::from(page)))
}

pub async fn resource_stats(
    State(state): State<ResourcesApiState>,
    AdminActor(_admin): AdminActor,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.catalog.stats(id).await?;
    Ok(ok(stats))
}

pub async fn view_resource(
    State(state): State<ResourcesApiState>,
    AuthActor(actor): AuthActor,
    IdPath(id): IdPath,
    client: ClientInfo,
) -> Result<impl IntoResponse, ApiError> {
    let view_count = state.gate.view(&actor, id, &client).await?;
    Ok(ok(ViewResponse {
        resource_id: id,
        view_count,
    }))
}

pub async fn download_resource(
    State(state): State<ResourcesApiState>,
    AuthActor(actor): AuthActor,
    IdPath(id): IdPath,
    client: ClientInfo,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = state.gate.download(&actor, id, &client).await?;
    Ok(ok(ticket))
}

pub async fn toggle_like(
    State(state): State<ResourcesApiState>,
    AuthActor(actor): AuthActor,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let toggle = state.engagement.toggle_like(id, actor.id).await?;
    Ok(ok(toggle))
}
