//! Authentication module

mod extractors;
pub mod jwt;
pub mod middleware;

pub use extractors::{AdminActor, AuthActor, SchoolActor};
pub use middleware::{AuthError, AuthState, require_auth};
