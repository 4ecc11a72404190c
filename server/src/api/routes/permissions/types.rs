//! Permission API types

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::api::types::MAX_GRANTS_PER_REQUEST;
use crate::data::types::GrantRef;

/// Body for set, add and remove: `{ "permissions": [{subject_id, grade_id}] }`
#[derive(Debug, Deserialize, Validate)]
pub struct GrantsRequest {
    #[validate(custom(function = "validate_grants"))]
    pub permissions: Vec<GrantRef>,
}

fn validate_grants(grants: &[GrantRef]) -> Result<(), ValidationError> {
    if grants.len() > MAX_GRANTS_PER_REQUEST {
        return Err(ValidationError::new("grants_max").with_message(
            format!("At most {} permissions per request", MAX_GRANTS_PER_REQUEST).into(),
        ));
    }
    if grants.iter().any(|g| g.subject_id < 1 || g.grade_id < 1) {
        return Err(ValidationError::new("grant_ids")
            .with_message("subject_id and grade_id must be positive integers".into()));
    }
    Ok(())
}
