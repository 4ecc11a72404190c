//! Scoped resource listings

use std::sync::Arc;

use super::access::AccessPolicy;
use crate::data::types::{
    ListResourcesParams, ResourceScope, ResourceStats, ResourceStatus, ResourceSummary,
};
use crate::data::{DataError, Database};

/// One page of resources
#[derive(Debug, Clone)]
pub struct ResourcePage {
    pub resources: Vec<ResourceSummary>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    database: Arc<Database>,
    policy: AccessPolicy,
}

impl CatalogService {
    pub fn new(database: Arc<Database>, policy: AccessPolicy) -> Self {
        Self { database, policy }
    }

    /// List resources visible in `scope`.
    ///
    /// `params.status` and `params.granted_to` are derived from the scope;
    /// the remaining filters are taken as given.
    pub async fn list(
        &self,
        scope: ResourceScope,
        mut params: ListResourcesParams,
    ) -> Result<ResourcePage, DataError> {
        match scope {
            ResourceScope::Public => {
                params.status = Some(ResourceStatus::Published);
                params.granted_to = None;
            }
            ResourceScope::Admin { status } => {
                params.status = status;
                params.granted_to = None;
            }
            ResourceScope::School { school_id } => {
                params.status = Some(ResourceStatus::Published);
                params.granted_to = self
                    .policy
                    .require_grant_for_published
                    .then_some(school_id);
            }
        }

        let (resources, total) = self
            .database
            .repository()
            .list_resources(&params)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "list_resources", scope = ?scope, error = %e, "Resource listing failed")
            })?;

        Ok(ResourcePage {
            resources,
            page: params.page,
            limit: params.limit,
            total,
        })
    }

    /// Counters next to the live fact-row counts
    pub async fn stats(&self, resource_id: i64) -> Result<ResourceStats, DataError> {
        let stats = self
            .database
            .repository()
            .resource_stats(resource_id)
            .await?
            .ok_or_else(|| DataError::not_found("resource", resource_id))?;

        if !stats.is_consistent() {
            tracing::warn!(resource_id, ?stats, "Resource counters drifted from fact rows");
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::testing::{
        insert_grade, insert_resource, insert_subject, insert_user, setup_test_pool,
    };
    use sqlx::SqlitePool;

    struct Fixture {
        pool: SqlitePool,
        database: Arc<Database>,
        school: i64,
        math: i64,
        grade5: i64,
    }

    async fn fixture() -> Fixture {
        let pool = setup_test_pool().await;
        let admin = insert_user(&pool, "Ada Admin", "admin", None).await;
        let school = insert_user(&pool, "North High", "school", None).await;
        let math = insert_subject(&pool, "Math").await;
        let science = insert_subject(&pool, "Science").await;
        let grade5 = insert_grade(&pool, "Grade 5", 5).await;
        insert_resource(&pool, "Fractions", math, grade5, admin, "published", 1000).await;
        insert_resource(&pool, "Plants", science, grade5, admin, "published", 2000).await;
        insert_resource(&pool, "Decimals", math, grade5, admin, "draft", 3000).await;
        insert_resource(&pool, "Old Maps", science, grade5, admin, "archived", 4000).await;

        Fixture {
            database: Arc::new(Database::from_pool(pool.clone())),
            pool,
            school,
            math,
            grade5,
        }
    }

    fn params() -> ListResourcesParams {
        ListResourcesParams {
            page: 1,
            limit: 20,
            ..Default::default()
        }
    }

    fn titles(page: &ResourcePage) -> Vec<&str> {
        page.resources.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_public_scope_lists_published_newest_first() {
        let f = fixture().await;
        let catalog = CatalogService::new(f.database.clone(), AccessPolicy::default());
        let page = catalog.list(ResourceScope::Public, params()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(titles(&page), vec!["Plants", "Fractions"]);
    }

    #[tokio::test]
    async fn test_admin_scope_sees_all_statuses() {
        let f = fixture().await;
        let catalog = CatalogService::new(f.database.clone(), AccessPolicy::default());

        let page = catalog
            .list(ResourceScope::Admin { status: None }, params())
            .await
            .unwrap();
        assert_eq!(page.total, 4);

        let page = catalog
            .list(
                ResourceScope::Admin {
                    status: Some(ResourceStatus::Draft),
                },
                params(),
            )
            .await
            .unwrap();
        assert_eq!(titles(&page), vec!["Decimals"]);
    }

    #[tokio::test]
    async fn test_school_scope_follows_grants() {
        let f = fixture().await;
        sqlx::query(
            "INSERT INTO school_subject_permissions (school_id, subject_id, grade_id, created_at) VALUES (?, ?, ?, 0)",
        )
        .bind(f.school)
        .bind(f.math)
        .bind(f.grade5)
        .execute(&f.pool)
        .await
        .unwrap();

        let gated = CatalogService::new(f.database.clone(), AccessPolicy::default());
        let page = gated
            .list(ResourceScope::School { school_id: f.school }, params())
            .await
            .unwrap();
        assert_eq!(titles(&page), vec!["Fractions"]);

        let open = CatalogService::new(
            f.database.clone(),
            AccessPolicy {
                require_grant_for_published: false,
            },
        );
        let page = open
            .list(ResourceScope::School { school_id: f.school }, params())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_school_scope_without_grants_is_empty() {
        let f = fixture().await;
        let catalog = CatalogService::new(f.database.clone(), AccessPolicy::default());
        let page = catalog
            .list(ResourceScope::School { school_id: f.school }, params())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.resources.is_empty());
    }

    #[tokio::test]
    async fn test_stats_for_unknown_resource() {
        let f = fixture().await;
        let catalog = CatalogService::new(f.database.clone(), AccessPolicy::default());
        let err = catalog.stats(777).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }
}
