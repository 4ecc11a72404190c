//! Permission matrix: which school may access which subject/grade pair

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::ClientInfo;
use crate::data::types::{Actor, GrantRef, GrantRow, NewLogEntry, UserRole};
use crate::data::{DataError, Database};

/// One grade held for a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeGrant {
    pub grade_id: i64,
    pub grade_name: String,
    pub level: i64,
}

/// Grants for one subject, grades ordered by level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectGrants {
    pub subject_id: i64,
    pub subject_name: String,
    pub grades: Vec<GradeGrant>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolPermissions {
    pub school_id: i64,
    pub subjects: Vec<SubjectGrants>,
    pub total: usize,
}

impl SchoolPermissions {
    /// Flat set of `(subject, grade)` pairs
    pub fn grant_set(&self) -> BTreeSet<GrantRef> {
        self.subjects
            .iter()
            .flat_map(|s| {
                s.grades
                    .iter()
                    .map(move |g| GrantRef::new(s.subject_id, g.grade_id))
            })
            .collect()
    }
}

/// Rows arrive ordered by subject, then grade level
fn group_by_subject(school_id: i64, rows: Vec<GrantRow>) -> SchoolPermissions {
    let total = rows.len();
    let mut subjects: Vec<SubjectGrants> = Vec::new();

    for row in rows {
        let grade = GradeGrant {
            grade_id: row.grade_id,
            grade_name: row.grade_name,
            level: row.grade_level,
        };
        match subjects.last_mut() {
            Some(current) if current.subject_id == row.subject_id => {
                current.grades.push(grade);
                current.count += 1;
            }
            _ => subjects.push(SubjectGrants {
                subject_id: row.subject_id,
                subject_name: row.subject_name,
                grades: vec![grade],
                count: 1,
            }),
        }
    }

    SchoolPermissions {
        school_id,
        subjects,
        total,
    }
}

/// Duplicate pairs in a request collapse to one grant
fn dedup(grants: &[GrantRef]) -> Vec<GrantRef> {
    grants
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone)]
pub struct PermissionMatrix {
    database: Arc<Database>,
}

impl PermissionMatrix {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Grants held by a school, grouped by subject.
    ///
    /// Fails with `NotFound` unless `school_id` is a school account.
    pub async fn get(&self, school_id: i64) -> Result<SchoolPermissions, DataError> {
        let repo = self.database.repository();

        let is_school = repo
            .get_user(school_id)
            .await?
            .is_some_and(|user| UserRole::parse(&user.role) == Some(UserRole::School));
        if !is_school {
            return Err(DataError::not_found("school", school_id));
        }

        let rows = repo.list_grants(school_id).await.inspect_err(|e| {
            tracing::warn!(step = "list_grants", school_id, error = %e, "Permission lookup failed")
        })?;
        Ok(group_by_subject(school_id, rows))
    }

    /// Replace the full grant set. Returns the resulting permissions.
    pub async fn set(
        &self,
        actor: &Actor,
        school_id: i64,
        grants: &[GrantRef],
        client: &ClientInfo,
    ) -> Result<SchoolPermissions, DataError> {
        let grants = dedup(grants);
        let audit = audit_entry(actor, "permissions_set", school_id, grants.len(), client);

        let held = self
            .database
            .repository()
            .replace_grants(school_id, &grants, &audit)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "replace_grants", school_id, error = %e, "Permission replace failed")
            })?;

        tracing::info!(school_id, actor_id = actor.id, grants = held, "Permissions replaced");
        self.get(school_id).await
    }

    /// Add grants; pairs already held are left untouched.
    pub async fn add(
        &self,
        actor: &Actor,
        school_id: i64,
        grants: &[GrantRef],
        client: &ClientInfo,
    ) -> Result<SchoolPermissions, DataError> {
        let grants = dedup(grants);
        let audit = audit_entry(actor, "permissions_added", school_id, grants.len(), client);

        let added = self
            .database
            .repository()
            .add_grants(school_id, &grants, &audit)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "add_grants", school_id, error = %e, "Permission add failed")
            })?;

        tracing::info!(school_id, actor_id = actor.id, added, "Permissions added");
        self.get(school_id).await
    }

    /// Remove the named grants; pairs not held are ignored.
    pub async fn remove(
        &self,
        actor: &Actor,
        school_id: i64,
        grants: &[GrantRef],
        client: &ClientInfo,
    ) -> Result<SchoolPermissions, DataError> {
        let grants = dedup(grants);
        let audit = audit_entry(actor, "permissions_removed", school_id, grants.len(), client);

        let removed = self
            .database
            .repository()
            .remove_grants(school_id, &grants, &audit)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "remove_grants", school_id, error = %e, "Permission remove failed")
            })?;

        tracing::info!(school_id, actor_id = actor.id, removed, "Permissions removed");
        self.get(school_id).await
    }
}

fn audit_entry(
    actor: &Actor,
    action: &str,
    school_id: i64,
    grant_count: usize,
    client: &ClientInfo,
) -> NewLogEntry {
    NewLogEntry {
        user_id: Some(actor.id),
        action: action.to_string(),
        resource_id: None,
        details: json!({ "school_id": school_id, "grant_count": grant_count }),
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::testing::{
        count_rows, insert_grade, insert_subject, insert_user, setup_core_pool, setup_test_pool,
    };
    use crate::data::types::UserStatus;
    use sqlx::SqlitePool;

    struct Fixture {
        pool: SqlitePool,
        matrix: PermissionMatrix,
        admin: Actor,
        school: i64,
        math: i64,
        science: i64,
        grade4: i64,
        grade5: i64,
    }

    async fn fixture(pool: SqlitePool) -> Fixture {
        let admin_id = insert_user(&pool, "Ada Admin", "admin", None).await;
        let school = insert_user(&pool, "North High", "school", Some("North District")).await;
        let math = insert_subject(&pool, "Math").await;
        let science = insert_subject(&pool, "Science").await;
        // Inserted out of level order on purpose
        let grade5 = insert_grade(&pool, "Grade 5", 5).await;
        let grade4 = insert_grade(&pool, "Grade 4", 4).await;

        let database = Arc::new(Database::from_pool(pool.clone()));
        Fixture {
            pool,
            matrix: PermissionMatrix::new(database),
            admin: Actor {
                id: admin_id,
                role: UserRole::Admin,
                status: UserStatus::Active,
                name: "Ada Admin".to_string(),
                organization: None,
            },
            school,
            math,
            science,
            grade4,
            grade5,
        }
    }

    #[tokio::test]
    async fn test_get_rejects_non_school() {
        let f = fixture(setup_test_pool().await).await;
        let err = f.matrix.get(f.admin.id).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { entity: "school", .. }));
        let err = f.matrix.get(9999).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_then_get_is_exact() {
        let f = fixture(setup_test_pool().await).await;
        let client = ClientInfo::default();
        let wanted = vec![
            GrantRef::new(f.science, f.grade5),
            GrantRef::new(f.math, f.grade5),
            GrantRef::new(f.math, f.grade4),
        ];

        let result = f
            .matrix
            .set(&f.admin, f.school, &wanted, &client)
            .await
            .unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(
            result.grant_set(),
            wanted.iter().copied().collect::<BTreeSet<_>>()
        );

        let math = result
            .subjects
            .iter()
            .find(|s| s.subject_id == f.math)
            .unwrap();
        assert_eq!(math.count, 2);
        let levels: Vec<i64> = math.grades.iter().map(|g| g.level).collect();
        assert_eq!(levels, vec![4, 5]);

        // Replace with a smaller set
        let result = f
            .matrix
            .set(&f.admin, f.school, &[GrantRef::new(f.science, f.grade4)], &client)
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.subjects[0].subject_id, f.science);
    }

    #[tokio::test]
    async fn test_set_with_unknown_grade_keeps_previous_grants() {
        let f = fixture(setup_test_pool().await).await;
        let client = ClientInfo::default();
        f.matrix
            .set(&f.admin, f.school, &[GrantRef::new(f.math, f.grade5)], &client)
            .await
            .unwrap();

        let err = f
            .matrix
            .set(
                &f.admin,
                f.school,
                &[GrantRef::new(f.science, f.grade4), GrantRef::new(f.math, 777)],
                &client,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidReference {
                entity: "grade",
                id: 777
            }
        ));

        let held = f.matrix.get(f.school).await.unwrap();
        assert_eq!(
            held.grant_set(),
            [GrantRef::new(f.math, f.grade5)]
                .into_iter()
                .collect::<BTreeSet<_>>()
        );
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let f = fixture(setup_test_pool().await).await;
        let client = ClientInfo::default();
        let grant = [GrantRef::new(f.math, f.grade5)];

        let once = f
            .matrix
            .add(&f.admin, f.school, &grant, &client)
            .await
            .unwrap();
        let twice = f
            .matrix
            .add(&f.admin, f.school, &grant, &client)
            .await
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.total, 1);
    }

    #[tokio::test]
    async fn test_remove_missing_grant_is_noop() {
        let f = fixture(setup_test_pool().await).await;
        let client = ClientInfo::default();
        f.matrix
            .add(&f.admin, f.school, &[GrantRef::new(f.math, f.grade5)], &client)
            .await
            .unwrap();

        let result = f
            .matrix
            .remove(
                &f.admin,
                f.school,
                &[GrantRef::new(f.science, f.grade4)],
                &client,
            )
            .await
            .unwrap();
        assert_eq!(result.total, 1);

        let result = f
            .matrix
            .remove(&f.admin, f.school, &[GrantRef::new(f.math, f.grade5)], &client)
            .await
            .unwrap();
        assert_eq!(result.total, 0);
        assert!(result.subjects.is_empty());
    }

    #[tokio::test]
    async fn test_changes_write_audit_entries() {
        let f = fixture(setup_test_pool().await).await;
        let client = ClientInfo {
            ip_address: Some("10.1.1.1".to_string()),
            user_agent: Some("tests".to_string()),
        };
        let grant = [GrantRef::new(f.math, f.grade5)];

        f.matrix.set(&f.admin, f.school, &grant, &client).await.unwrap();
        f.matrix.add(&f.admin, f.school, &grant, &client).await.unwrap();
        f.matrix
            .remove(&f.admin, f.school, &grant, &client)
            .await
            .unwrap();

        let actions: Vec<String> =
            sqlx::query_scalar("SELECT action FROM activity_logs ORDER BY id")
                .fetch_all(&f.pool)
                .await
                .unwrap();
        assert_eq!(
            actions,
            vec!["permissions_set", "permissions_added", "permissions_removed"]
        );
    }

    #[tokio::test]
    async fn test_changes_commit_without_audit_tables() {
        let f = fixture(setup_core_pool().await).await;
        let result = f
            .matrix
            .set(
                &f.admin,
                f.school,
                &[GrantRef::new(f.math, f.grade5)],
                &ClientInfo::default(),
            )
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(count_rows(&f.pool, "school_subject_permissions").await, 1);
    }

    #[test]
    fn test_group_by_subject() {
        let row = |subject_id: i64, grade_id: i64, level: i64| GrantRow {
            subject_id,
            subject_name: format!("S{}", subject_id),
            grade_id,
            grade_name: format!("G{}", grade_id),
            grade_level: level,
            created_at: 0,
        };
        let grouped = group_by_subject(3, vec![row(1, 10, 1), row(1, 11, 2), row(2, 10, 1)]);
        assert_eq!(grouped.total, 3);
        assert_eq!(grouped.subjects.len(), 2);
        assert_eq!(grouped.subjects[0].count, 2);
        assert_eq!(grouped.subjects[1].grades[0].grade_id, 10);
    }
}
