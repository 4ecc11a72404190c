use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use sqlx::SqlitePool;

use super::*;
use crate::data::sqlite::testing::{
    insert_grade, insert_resource, insert_resource_type, insert_subject, insert_user,
    setup_core_pool, setup_test_pool,
};
use crate::data::types::{
    ActivityFilter, ActivitySortField, Interaction, SchoolActivityFilter, SchoolActivityType,
    SortOrder,
};

struct Fixture {
    pool: SqlitePool,
    database: Arc<Database>,
    service: ActivityService,
    admin: i64,
    school: i64,
    resource: i64,
}

async fn fixture(pool: SqlitePool) -> Fixture {
    let admin = insert_user(&pool, "Ada Admin", "admin", None).await;
    let school = insert_user(&pool, "North High", "school", Some("North District")).await;
    let math = insert_subject(&pool, "Math").await;
    let grade = insert_grade(&pool, "Grade 5", 5).await;
    let resource = insert_resource(&pool, "Fractions", math, grade, admin, "published", 1000).await;

    let database = Arc::new(Database::from_pool(pool.clone()));
    Fixture {
        service: ActivityService::new(database.clone()),
        database,
        pool,
        admin,
        school,
        resource,
    }
}

fn interaction(f: &Fixture, actor_id: Option<i64>) -> Interaction {
    Interaction {
        resource_id: f.resource,
        actor_id,
        log_school_activity: actor_id == Some(f.school),
        ip_address: Some("10.0.0.7".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

async fn set_times(pool: &SqlitePool, table: &str, times: &[i64]) {
    for (i, at) in times.iter().enumerate() {
        sqlx::query(&format!("UPDATE {} SET created_at = ? WHERE id = ?", table))
            .bind(at)
            .bind(i as i64 + 1)
            .execute(pool)
            .await
            .unwrap();
    }
}

async fn log_entry(pool: &SqlitePool, user_id: i64, action: &str, at: i64) {
    sqlx::query(
        "INSERT INTO activity_logs (user_id, action, details, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(action)
    .bind(json!({ "note": action }).to_string())
    .bind(at)
    .execute(pool)
    .await
    .unwrap();
}

fn params(page: u32, limit: u32) -> ListActivityParams {
    ListActivityParams {
        filter: ActivityFilter::default(),
        sort: ActivitySortField::CreatedAt,
        order: SortOrder::Desc,
        page,
        limit,
    }
}

/// Populates every source with events sharing some timestamps
async fn populate(f: &Fixture) {
    let repo = f.database.repository();
    for _ in 0..4 {
        repo.record_view(&interaction(f, Some(f.school))).await.unwrap();
    }
    for _ in 0..3 {
        repo.record_download(&interaction(f, None)).await.unwrap();
    }
    set_times(&f.pool, "resource_views", &[2000, 2000, 3000, 3500]).await;
    set_times(&f.pool, "resource_downloads", &[2000, 2500, 3000]).await;

    sqlx::query("UPDATE users SET last_login = 3000, last_login_ip = '10.0.0.9' WHERE id = ?")
        .bind(f.school)
        .execute(&f.pool)
        .await
        .unwrap();

    log_entry(&f.pool, f.admin, "password_change", 2000).await;
    log_entry(&f.pool, f.admin, "permissions_set", 4000).await;
    // Audit rows named like a derived kind are still audit events
    log_entry(&f.pool, f.admin, "resource_view", 4100).await;
}

#[tokio::test]
async fn test_pages_cover_total_without_duplicates() {
    let f = fixture(setup_test_pool().await).await;
    populate(&f).await;

    for limit in [1, 2, 3, 5, 20] {
        let first = f.service.list(&params(1, limit)).await.unwrap();
        // 4 views, 3 downloads, 1 login, 1 upload, 3 log entries
        assert_eq!(first.total, 12);

        let pages = crate::domain::page_count(first.total, limit);
        let mut seen = HashSet::new();
        let mut collected = 0;
        for page in 1..=pages {
            let result = f.service.list(&params(page as u32, limit)).await.unwrap();
            assert_eq!(result.total, first.total);
            for event in &result.events {
                assert!(seen.insert(event.id.clone()), "duplicate {}", event.id);
            }
            collected += result.events.len() as u64;
        }
        assert_eq!(collected, first.total, "limit {}", limit);
    }
}

#[test]
fn test_window_sizes_are_bounded() {
    // In range: each source is read up to offset + limit, never past its count
    assert_eq!(window_sizes(&[4, 0, 30, 2], 10, 5), vec![4, 0, 15, 2]);
    // Starting past the total reads nothing
    assert_eq!(window_sizes(&[4, 0, 30, 2], 36, 5), vec![0, 0, 0, 0]);
    assert_eq!(window_sizes(&[4, 3], u64::MAX - 1, 100), vec![0, 0]);
    assert_eq!(window_sizes(&[], 0, 20), Vec::<u64>::new());
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let f = fixture(setup_test_pool().await).await;
    populate(&f).await;

    let result = f.service.list(&params(4_000_000_000, 100)).await.unwrap();
    assert!(result.events.is_empty());
    assert_eq!(result.total, 12);

    // Last partial page still returns the tail
    let result = f.service.list(&params(3, 5)).await.unwrap();
    assert_eq!(result.events.len(), 2);
}

#[tokio::test]
async fn test_feed_is_ordered_and_stable() {
    let f = fixture(setup_test_pool().await).await;
    populate(&f).await;

    let a = f.service.list(&params(1, 20)).await.unwrap();
    let b = f.service.list(&params(1, 20)).await.unwrap();
    let ids = |page: &ActivityPage| page.events.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&b));

    assert_eq!(a.events[0].id, "log-3");
    assert_eq!(a.events[0].kind, ActivityKind::ActivityLog);
    for pair in a.events.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_filters_apply_across_sources() {
    let f = fixture(setup_test_pool().await).await;
    populate(&f).await;

    let mut p = params(1, 50);
    p.filter.user_id = Some(f.school);
    let result = f.service.list(&p).await.unwrap();
    // 4 views and the login
    assert_eq!(result.total, 5);
    assert!(result.events.iter().all(|e| e.actor.user_id == Some(f.school)));

    let mut p = params(1, 50);
    p.filter.action = Some("permissions_set".to_string());
    let result = f.service.list(&p).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.events[0].kind, ActivityKind::ActivityLog);

    let mut p = params(1, 50);
    p.filter.action = Some("resource_view".to_string());
    let result = f.service.list(&p).await.unwrap();
    // 4 views and the audit row with the same action
    assert_eq!(result.total, 5);
    let logged: Vec<_> = result
        .events
        .iter()
        .filter(|e| e.kind == ActivityKind::ActivityLog)
        .collect();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].actor.user_id, Some(f.admin));

    let mut p = params(1, 50);
    p.filter.user_id = Some(f.admin);
    let result = f.service.list(&p).await.unwrap();
    // Upload plus every audit row written by the admin
    assert_eq!(result.total, 4);

    let mut p = params(1, 50);
    p.filter.from = Some(3000);
    p.filter.to = Some(3000);
    let result = f.service.list(&p).await.unwrap();
    // One view, one download, the login
    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn test_sort_by_action_ascending() {
    let f = fixture(setup_test_pool().await).await;
    populate(&f).await;

    let mut p = params(1, 50);
    p.sort = ActivitySortField::Action;
    p.order = SortOrder::Asc;
    let result = f.service.list(&p).await.unwrap();
    let actions: Vec<&str> = result.events.iter().map(|e| e.action.as_str()).collect();
    let mut sorted = actions.clone();
    sorted.sort();
    assert_eq!(actions, sorted);
    assert_eq!(actions[0], "password_change");
}

#[tokio::test]
async fn test_downloads_and_views_scenario() {
    let f = fixture(setup_test_pool().await).await;
    let repo = f.database.repository();

    for _ in 0..3 {
        repo.record_download(&interaction(&f, Some(f.school)))
            .await
            .unwrap();
    }
    for _ in 0..2 {
        repo.record_view(&interaction(&f, Some(f.school))).await.unwrap();
    }
    set_times(&f.pool, "resource_downloads", &[5001, 5003, 5005]).await;
    set_times(&f.pool, "resource_views", &[5002, 5004]).await;

    let row = repo.get_resource(f.resource).await.unwrap().unwrap();
    assert_eq!(row.download_count, 3);
    assert_eq!(row.view_count, 2);

    let mut p = params(1, 20);
    p.filter.user_id = Some(f.school);
    let page = f.service.list(&p).await.unwrap();
    let ids: Vec<&str> = page.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["download-3", "view-2", "download-2", "view-1", "download-1"]
    );
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn test_feed_without_audit_tables_is_unavailable() {
    let f = fixture(setup_core_pool().await).await;

    let err = f.service.list(&params(1, 20)).await.unwrap_err();
    assert_eq!(err.kind(), crate::data::ErrorKind::StoreUnavailable);

    // Any action may appear in the audit log, so filtering does not avoid it
    let mut p = params(1, 20);
    p.filter.action = Some("resource_upload".to_string());
    let err = f.service.list(&p).await.unwrap_err();
    assert_eq!(err.kind(), crate::data::ErrorKind::StoreUnavailable);
}

#[tokio::test]
async fn test_school_feed_details() {
    let f = fixture(setup_test_pool().await).await;
    let worksheet = insert_resource_type(&f.pool, "Worksheet").await;
    sqlx::query("UPDATE resources SET type_id = ? WHERE id = ?")
        .bind(worksheet)
        .bind(f.resource)
        .execute(&f.pool)
        .await
        .unwrap();

    let repo = f.database.repository();
    repo.record_download(&interaction(&f, Some(f.school)))
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO school_activity_logs (school_id, activity_type, created_at) VALUES (?, 'login', 1)",
    )
    .bind(f.school)
    .execute(&f.pool)
    .await
    .unwrap();

    let page = f
        .service
        .school_feed(&ListSchoolActivityParams {
            page: 1,
            limit: 20,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.logs[0].resource_details, "Fractions (Worksheet)");
    assert_eq!(page.logs[1].resource_details, "Login Activity");

    let page = f
        .service
        .school_feed(&ListSchoolActivityParams {
            filter: SchoolActivityFilter {
                activity_type: Some(SchoolActivityType::Login),
                school_name: Some("north".to_string()),
                ..Default::default()
            },
            page: 1,
            limit: 20,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.logs[0].activity_type, "login");
}

#[tokio::test]
async fn test_dashboard_summary() {
    let f = fixture(setup_test_pool().await).await;
    populate(&f).await;

    let summary = f.service.dashboard(f.admin).await;
    assert!(summary.degraded.is_empty());
    assert_eq!(summary.totals.users, 2);
    assert_eq!(summary.totals.schools, 1);
    assert_eq!(summary.totals.published, 1);
    assert_eq!(summary.totals.views, 4);
    assert_eq!(summary.totals.downloads, 3);
    assert_eq!(summary.recent_activity.len(), 10);
    assert_eq!(summary.admin_activity.admin_id, f.admin);
    assert_eq!(summary.admin_activity.total_actions, 3);
    assert_eq!(summary.admin_activity.last_action_at, Some(4100));
}

#[tokio::test]
async fn test_dashboard_degrades_without_audit_tables() {
    let f = fixture(setup_core_pool().await).await;
    let repo = f.database.repository();
    repo.record_view(&interaction(&f, None)).await.unwrap();

    let summary = f.service.dashboard(f.admin).await;
    assert!(summary.degraded.contains(&"activity_log"));
    assert!(summary.degraded.contains(&"admin_activity"));
    assert_eq!(summary.totals.views, 1);
    assert_eq!(summary.totals.resources, 1);
    // The view and the upload still surface
    assert_eq!(summary.recent_activity.len(), 2);
    assert_eq!(summary.admin_activity.total_actions, 0);
}
