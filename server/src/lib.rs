//! EduShare server: access grants, engagement counters and activity
//! aggregation for a school resource portal

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
