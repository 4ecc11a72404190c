//! Shared data types for the store, domain services and API

mod activity;
mod catalog;
mod enums;
mod permission;
mod summary;

pub use enums::{
    ActivityKind, ResourceStatus, SchoolActivityType, SortOrder, UserRole, UserStatus,
};

pub use catalog::{
    Actor, ListResourcesParams, ResourceRow, ResourceScope, ResourceStats, ResourceSummary,
    UserRow,
};

pub use permission::{GrantRef, GrantRow};

pub use activity::{
    ActivityActor, ActivityEvent, ActivityFilter, ActivityResource, ActivityRow,
    ActivitySortField, Interaction, LikeToggle, ListActivityParams, ListSchoolActivityParams,
    NewLogEntry, NewSchoolActivity, SchoolActivityFilter, SchoolActivityRow, SchoolActivitySortField,
};

pub use summary::{ActionCount, AdminActivitySummary, DashboardTotals, EngagementFact};
