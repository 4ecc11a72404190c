//! Actor extractors for Axum handlers
//!
//! The auth middleware injects the [`Actor`]; these extractors add the role
//! checks handlers rely on.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::types::ApiError;
use crate::data::types::{Actor, UserRole};

fn extract_actor(parts: &Parts) -> Result<Actor, ApiError> {
    parts
        .extensions
        .get::<Actor>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("AUTH_REQUIRED", "Authentication required"))
}

/// Any active, authenticated actor
#[derive(Debug, Clone)]
pub struct AuthActor(pub Actor);

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_actor(parts).map(Self)
    }
}

/// Administrator; other roles get 403
#[derive(Debug, Clone)]
pub struct AdminActor(pub Actor);

impl<S> FromRequestParts<S> for AdminActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = extract_actor(parts)?;
        if !actor.is_admin() {
            return Err(ApiError::forbidden(
                "ADMIN_REQUIRED",
                "Administrator access required",
            ));
        }
        Ok(Self(actor))
    }
}

/// School account; other roles get 403
#[derive(Debug, Clone)]
pub struct SchoolActor(pub Actor);

impl<S> FromRequestParts<S> for SchoolActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = extract_actor(parts)?;
        if actor.role != UserRole::School {
            return Err(ApiError::forbidden(
                "SCHOOL_REQUIRED",
                "School account required",
            ));
        }
        Ok(Self(actor))
    }
}
