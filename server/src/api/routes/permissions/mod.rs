//! School permission endpoints
//!
//! Mounted at `/api/admin/schools`; every handler requires an admin.

pub mod types;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;

use types::GrantsRequest;

use crate::api::auth::AdminActor;
use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::types::{ApiError, ok, ok_with_message};
use crate::domain::{ClientInfo, PermissionMatrix};

#[derive(Clone)]
pub struct PermissionsApiState {
    pub matrix: PermissionMatrix,
}

pub fn routes(matrix: PermissionMatrix) -> Router<()> {
    let state = PermissionsApiState { matrix };

    Router::new()
        .route(
            "/{id}/permissions",
            get(get_permissions)
                .put(set_permissions)
                .post(add_permissions)
                .delete(remove_permissions),
        )
        .with_state(state)
}

pub async fn get_permissions(
    State(state): State<PermissionsApiState>,
    AdminActor(_admin): AdminActor,
    IdPath(school_id): IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = state.matrix.get(school_id).await?;
    Ok(ok(permissions))
}

pub async fn set_permissions(
    State(state): State<PermissionsApiState>,
    AdminActor(admin): AdminActor,
    IdPath(school_id): IdPath,
    client: ClientInfo,
    ValidatedJson(body): ValidatedJson<GrantsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = state
        .matrix
        .set(&admin, school_id, &body.permissions, &client)
        .await?;
    Ok(ok_with_message(permissions, "Permissions updated"))
}

pub async fn add_permissions(
    State(state): State<PermissionsApiState>,
    AdminActor(admin): AdminActor,
    IdPath(school_id): IdPath,
    client: ClientInfo,
    ValidatedJson(body): ValidatedJson<GrantsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = state
        .matrix
        .add(&admin, school_id, &body.permissions, &client)
        .await?;
    Ok(ok_with_message(permissions, "Permissions added"))
}

pub async fn remove_permissions(
    State(state): State<PermissionsApiState>,
    AdminActor(admin): AdminActor,
    IdPath(school_id): IdPath,
    client: ClientInfo,
    ValidatedJson(body): ValidatedJson<GrantsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = state
        .matrix
        .remove(&admin, school_id, &body.permissions, &client)
        .await?;
    Ok(ok_with_message(permissions, "Permissions removed"))
}
