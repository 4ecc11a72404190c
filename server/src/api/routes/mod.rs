//! API route handlers and router composition

pub mod activity;
pub mod health;
pub mod permissions;
pub mod resources;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use resources::ResourcesApiState;

use super::auth::{AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::Database;
use crate::domain::{
    AccessGate, AccessPolicy, ActivityService, CatalogService, EngagementService,
    PermissionMatrix,
};

/// Domain services shared by the HTTP handlers
#[derive(Clone)]
pub struct ApiServices {
    pub database: Arc<Database>,
    pub signing_key: Arc<Vec<u8>>,
    pub catalog: CatalogService,
    pub gate: AccessGate,
    pub engagement: EngagementService,
    pub permissions: PermissionMatrix,
    pub activity: ActivityService,
}

impl ApiServices {
    pub fn new(
        database: Arc<Database>,
        signing_key: Vec<u8>,
        uploads_dir: PathBuf,
        policy: AccessPolicy,
    ) -> Self {
        let engagement = EngagementService::new(database.clone(), uploads_dir);
        Self {
            signing_key: Arc::new(signing_key),
            catalog: CatalogService::new(database.clone(), policy),
            gate: AccessGate::new(database.clone(), engagement.clone(), policy),
            permissions: PermissionMatrix::new(database.clone()),
            activity: ActivityService::new(database.clone()),
            engagement,
            database,
        }
    }
}

/// Full API router: public catalog, authenticated actions, school and admin
/// surfaces, with CORS, tracing and the JSON 404 fallback.
pub fn build_router(services: ApiServices, allowed_origins: &AllowedOrigins) -> Router {
    let auth = axum::middleware::from_fn_with_state(
        AuthState {
            database: services.database.clone(),
            signing_key: services.signing_key.clone(),
        },
        require_auth,
    );

    let resources_state = ResourcesApiState {
        catalog: services.catalog,
        gate: services.gate,
        engagement: services.engagement,
    };

    let resource_routes = resources::public_routes(resources_state.clone())
        .merge(resources::member_routes(resources_state.clone()).layer(auth.clone()));

    let school_routes = resources::school_routes(resources_state.clone()).layer(auth.clone());

    let admin_routes = resources::admin_routes(resources_state)
        .nest("/schools", permissions::routes(services.permissions))
        .merge(activity::routes(services.activity))
        .layer(auth);

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/resources", resource_routes)
        .nest("/api/school", school_routes)
        .nest("/api/admin", admin_routes)
        .fallback(middleware::handle_404)
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}
