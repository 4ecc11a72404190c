//! Permission grant types

use serde::{Deserialize, Serialize};

/// One `(subject, grade)` pair of a school's grant set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrantRef {
    pub subject_id: i64,
    pub grade_id: i64,
}

impl GrantRef {
    pub fn new(subject_id: i64, grade_id: i64) -> Self {
        Self {
            subject_id,
            grade_id,
        }
    }
}

/// Stored grant with catalog names, ordered by subject then grade level
#[derive(Debug, Clone)]
pub struct GrantRow {
    pub subject_id: i64,
    pub subject_name: String,
    pub grade_id: i64,
    pub grade_name: String,
    pub grade_level: i64,
    pub created_at: i64,
}
