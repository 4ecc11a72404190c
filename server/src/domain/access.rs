//! Resource access gate
//!
//! Decides whether an actor may read a resource, then hands the interaction
//! to the engagement service. Denied requests record nothing.

use std::sync::Arc;

use super::ClientInfo;
use super::engagement::{DownloadTicket, EngagementService};
use crate::data::types::{Actor, GrantRef, ResourceRow};
use crate::data::{DataError, Database};

/// Deployment switches for the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Schools need a matching grant even for published resources
    pub require_grant_for_published: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            require_grant_for_published: true,
        }
    }
}

#[derive(Clone)]
pub struct AccessGate {
    database: Arc<Database>,
    engagement: EngagementService,
    policy: AccessPolicy,
}

impl AccessGate {
    pub fn new(database: Arc<Database>, engagement: EngagementService, policy: AccessPolicy) -> Self {
        Self {
            database,
            engagement,
            policy,
        }
    }

    /// Whether `actor` may read `resource_id`. Fails with `NotFound` when
    /// the resource does not exist.
    pub async fn can_access(&self, actor: &Actor, resource_id: i64) -> Result<bool, DataError> {
        let resource = self.load(resource_id).await?;
        self.allows(actor, &resource).await
    }

    /// Check access and record a view. Returns the new `view_count`.
    pub async fn view(
        &self,
        actor: &Actor,
        resource_id: i64,
        client: &ClientInfo,
    ) -> Result<i64, DataError> {
        let resource = self.authorize(actor, resource_id).await?;
        self.engagement
            .record_view(resource.id, Some(actor), client)
            .await
    }

    /// Check access and record a download
    pub async fn download(
        &self,
        actor: &Actor,
        resource_id: i64,
        client: &ClientInfo,
    ) -> Result<DownloadTicket, DataError> {
        let resource = self.authorize(actor, resource_id).await?;
        self.engagement
            .record_download(&resource, Some(actor), client)
            .await
    }

    async fn authorize(&self, actor: &Actor, resource_id: i64) -> Result<ResourceRow, DataError> {
        let resource = self.load(resource_id).await?;
        if !self.allows(actor, &resource).await? {
            tracing::info!(actor_id = actor.id, resource_id, "Resource access denied");
            return Err(DataError::forbidden("You do not have access to this resource"));
        }
        Ok(resource)
    }

    async fn load(&self, resource_id: i64) -> Result<ResourceRow, DataError> {
        self.database
            .repository()
            .get_resource(resource_id)
            .await?
            .ok_or_else(|| DataError::not_found("resource", resource_id))
    }

    async fn allows(&self, actor: &Actor, resource: &ResourceRow) -> Result<bool, DataError> {
        if actor.is_admin() {
            return Ok(true);
        }
        // Grants only open published resources; drafts and archives stay admin-only
        if !resource.is_published() {
            return Ok(false);
        }
        if !self.policy.require_grant_for_published {
            return Ok(true);
        }
        self.database
            .repository()
            .has_grant(actor.id, GrantRef::new(resource.subject_id, resource.grade_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::testing::{
        count_rows, insert_grade, insert_resource, insert_subject, insert_user, setup_test_pool,
    };
    use crate::data::types::{UserRole, UserStatus};
    use crate::domain::permissions::PermissionMatrix;
    use sqlx::SqlitePool;

    struct Fixture {
        pool: SqlitePool,
        database: Arc<Database>,
        admin: Actor,
        school: Actor,
        math: i64,
        grade5: i64,
        r1: i64,
        r2: i64,
        draft: i64,
    }

    fn actor(id: i64, role: UserRole) -> Actor {
        Actor {
            id,
            role,
            status: UserStatus::Active,
            name: format!("user-{}", id),
            organization: None,
        }
    }

    async fn fixture() -> Fixture {
        let pool = setup_test_pool().await;
        let admin = insert_user(&pool, "Ada Admin", "admin", None).await;
        let school = insert_user(&pool, "North High", "school", Some("North District")).await;
        let math = insert_subject(&pool, "Math").await;
        let science = insert_subject(&pool, "Science").await;
        let grade5 = insert_grade(&pool, "Grade 5", 5).await;
        let r1 = insert_resource(&pool, "Fractions", math, grade5, admin, "published", 1000).await;
        let r2 = insert_resource(&pool, "Plants", science, grade5, admin, "published", 1000).await;
        let draft = insert_resource(&pool, "Decimals", math, grade5, admin, "draft", 1000).await;

        Fixture {
            database: Arc::new(Database::from_pool(pool.clone())),
            pool,
            admin: actor(admin, UserRole::Admin),
            school: actor(school, UserRole::School),
            math,
            grade5,
            r1,
            r2,
            draft,
        }
    }

    fn gate(f: &Fixture, policy: AccessPolicy) -> AccessGate {
        let engagement = EngagementService::new(f.database.clone(), std::env::temp_dir());
        AccessGate::new(f.database.clone(), engagement, policy)
    }

    #[tokio::test]
    async fn test_grant_scenario() {
        let f = fixture().await;
        let gate = gate(&f, AccessPolicy::default());
        let matrix = PermissionMatrix::new(f.database.clone());
        let client = ClientInfo::default();

        matrix
            .set(&f.admin, f.school.id, &[GrantRef::new(f.math, f.grade5)], &client)
            .await
            .unwrap();
        assert!(gate.can_access(&f.school, f.r1).await.unwrap());
        assert!(!gate.can_access(&f.school, f.r2).await.unwrap());

        let held = matrix
            .remove(&f.admin, f.school.id, &[GrantRef::new(f.math, f.grade5)], &client)
            .await
            .unwrap();
        assert_eq!(held.total, 0);
        assert!(!gate.can_access(&f.school, f.r1).await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_bypasses_matrix() {
        let f = fixture().await;
        let gate = gate(&f, AccessPolicy::default());
        assert!(gate.can_access(&f.admin, f.r2).await.unwrap());
        assert!(gate.can_access(&f.admin, f.draft).await.unwrap());
    }

    #[tokio::test]
    async fn test_draft_hidden_from_schools() {
        let f = fixture().await;
        let gate = gate(
            &f,
            AccessPolicy {
                require_grant_for_published: false,
            },
        );
        assert!(gate.can_access(&f.school, f.r2).await.unwrap());
        assert!(!gate.can_access(&f.school, f.draft).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_resource() {
        let f = fixture().await;
        let gate = gate(&f, AccessPolicy::default());
        let err = gate.can_access(&f.school, 31337).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { entity: "resource", .. }));
    }

    #[tokio::test]
    async fn test_denied_view_records_nothing() {
        let f = fixture().await;
        let gate = gate(&f, AccessPolicy::default());

        let err = gate
            .view(&f.school, f.r2, &ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Forbidden(_)));
        assert_eq!(count_rows(&f.pool, "resource_views").await, 0);
        assert_eq!(count_rows(&f.pool, "school_activity_logs").await, 0);

        let err = gate
            .download(&f.school, f.r2, &ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Forbidden(_)));
        assert_eq!(count_rows(&f.pool, "resource_downloads").await, 0);
    }

    #[tokio::test]
    async fn test_granted_view_is_recorded() {
        let f = fixture().await;
        let gate = gate(&f, AccessPolicy::default());
        PermissionMatrix::new(f.database.clone())
            .add(
                &f.admin,
                f.school.id,
                &[GrantRef::new(f.math, f.grade5)],
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        let count = gate
            .view(&f.school, f.r1, &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(count_rows(&f.pool, "school_activity_logs").await, 1);
    }
}
