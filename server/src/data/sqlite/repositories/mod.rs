//! SQLite repositories
//!
//! Row and parameter types are imported from `crate::data::types`.

pub mod activity;
pub mod activity_log;
pub mod catalog;
pub mod engagement;
pub mod permission;
pub mod resource;
pub mod school_activity;
pub mod summary;
pub mod user;

