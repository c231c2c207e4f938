//! Repository tests against throwaway SQLite files.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use devstats_common::{DevStatsError, DeviceType, HttpStatusCode, RegistrationKey};
use devstats_db::{
    health_routes, DbClient, DbError, DeviceRegistrationRepository,
    DeviceRegistrationRepositoryFactory, RepositoryFactory, SqlDeviceRegistrationRepository,
};
use std::path::PathBuf;
use tower::ServiceExt;

struct TestDb {
    url: String,
    path: PathBuf,
}

impl TestDb {
    fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("devstats-db-{}.db", uuid::Uuid::new_v4()));
        Self {
            url: format!("sqlite://{}", path.display()),
            path,
        }
    }

    async fn repository(&self) -> SqlDeviceRegistrationRepository {
        let client = DbClient::from_url(&self.url).await.unwrap();
        let repository = DeviceRegistrationRepositoryFactory::new().create_repository(client);
        repository.init_schema().await.unwrap();
        repository
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.path).ok();
    }
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let db = TestDb::new();
    let repository = db.repository().await;

    repository.init_schema().await.unwrap();
    repository.init_schema().await.unwrap();

    assert_eq!(
        repository.count_by_device_type(DeviceType::Ios).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_upsert_creates_then_touches() {
    let db = TestDb::new();
    let repository = db.repository().await;
    let key = RegistrationKey::new("u1", DeviceType::Ios);

    let first = repository.upsert(&key).await.unwrap();
    assert!(first.is_created());
    let created = first.into_registration();
    assert!(created.id.is_some());
    assert_eq!(created.created_at, created.updated_at);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let second = repository.upsert(&key).await.unwrap();
    assert!(!second.is_created());
    let touched = second.into_registration();
    assert_eq!(touched.id, created.id);
    assert_eq!(touched.created_at, created.created_at);
    assert!(touched.updated_at > created.updated_at);

    let stored = repository
        .find_by_user_and_device("u1", DeviceType::Ios)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.created_at, created.created_at);
    assert_eq!(stored.updated_at, touched.updated_at);
    assert!(stored.updated_at >= stored.created_at);

    assert_eq!(
        repository.count_by_device_type(DeviceType::Ios).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_count_matches_distinct_users_per_device_type() {
    let db = TestDb::new();
    let repository = db.repository().await;

    for (user, device_type) in [
        ("u1", DeviceType::Ios),
        ("u2", DeviceType::Ios),
        ("u3", DeviceType::Android),
        ("u1", DeviceType::Android),
        ("u1", DeviceType::Ios),
        ("u2", DeviceType::Ios),
    ] {
        repository
            .upsert(&RegistrationKey::new(user, device_type))
            .await
            .unwrap();
    }

    assert_eq!(
        repository.count_by_device_type(DeviceType::Ios).await.unwrap(),
        2
    );
    assert_eq!(
        repository
            .count_by_device_type(DeviceType::Android)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        repository.count_by_device_type(DeviceType::Tv).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_find_missing_pair() {
    let db = TestDb::new();
    let repository = db.repository().await;
    repository
        .upsert(&RegistrationKey::new("u1", DeviceType::Watch))
        .await
        .unwrap();

    assert!(repository
        .find_by_user_and_device("u1", DeviceType::Tv)
        .await
        .unwrap()
        .is_none());
    assert!(repository
        .find_by_user_and_device("u2", DeviceType::Watch)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_insert_is_classified_as_unique_violation() {
    let db = TestDb::new();
    let repository = db.repository().await;
    repository
        .upsert(&RegistrationKey::new("u1", DeviceType::Tv))
        .await
        .unwrap();

    let err = sqlx::query(
        "INSERT INTO device_registrations (userKey, deviceType, createdAt, updatedAt) \
         VALUES ('u1', 'TV', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
    )
    .execute(repository.db_client().pool())
    .await
    .map_err(DbError::from)
    .unwrap_err();

    assert!(err.is_unique_violation(), "{}", err);
    let err: DevStatsError = err.into();
    assert!(matches!(err, DevStatsError::ConflictError(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_schema_rejects_unknown_device_type() {
    let db = TestDb::new();
    let repository = db.repository().await;

    let err = sqlx::query(
        "INSERT INTO device_registrations (userKey, deviceType, createdAt, updatedAt) \
         VALUES ('u1', 'Desktop', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
    )
    .execute(repository.db_client().pool())
    .await
    .map_err(DbError::from)
    .unwrap_err();

    assert!(!err.is_unique_violation());
    for device_type in DeviceType::ALL {
        assert_eq!(
            repository.count_by_device_type(device_type).await.unwrap(),
            0
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_leave_one_row() {
    let db = TestDb::new();
    let repository = db.repository().await;
    let key = RegistrationKey::new("racer", DeviceType::Android);

    for round in 0..5 {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = repository.clone();
                let key = key.clone();
                tokio::spawn(async move { repository.upsert(&key).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(outcome) => {
                    if outcome.is_created() {
                        created += 1;
                    }
                }
                Err(err) => {
                    assert!(err.is_unique_violation(), "round {}: {}", round, err);
                    assert_eq!(DevStatsError::from(err).status_code(), 400);
                }
            }
        }

        assert!(created <= 1, "round {}: {} rows created", round, created);
    }

    assert_eq!(
        repository
            .count_by_device_type(DeviceType::Android)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_of_distinct_pairs_all_succeed() {
    let db = TestDb::new();
    let repository = db.repository().await;

    for round in 0..5 {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repository = repository.clone();
                let key = RegistrationKey::new(format!("user-{}-{}", round, i), DeviceType::Ios);
                tokio::spawn(async move { repository.upsert(&key).await })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(outcome.is_ok(), "round {}: {:?}", round, outcome.err());
        }
    }

    assert_eq!(
        repository.count_by_device_type(DeviceType::Ios).await.unwrap(),
        40
    );
}

#[tokio::test]
async fn test_count_without_schema_is_a_storage_error() {
    let db = TestDb::new();
    let client = DbClient::from_url(&db.url).await.unwrap();
    let repository = SqlDeviceRegistrationRepository::new(client);

    let err = repository
        .count_by_device_type(DeviceType::Ios)
        .await
        .unwrap_err();
    assert!(!err.is_unique_violation());
    let err: DevStatsError = err.into();
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_empty_url_is_rejected() {
    assert!(matches!(
        DbClient::from_url("").await,
        Err(DbError::UrlError(_))
    ));
}

#[tokio::test]
async fn test_health_route_reports_up() {
    let db = TestDb::new();
    let client = DbClient::from_url(&db.url).await.unwrap();

    let response = health_routes(client)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({"status": "UP"}));
}

#[tokio::test]
async fn test_failed_upsert_releases_the_write_lock() {
    let db = TestDb::new();
    let repository = db.repository().await;

    // Bypasses request validation, so only the CHECK constraint stops it.
    let oversize = RegistrationKey::new("k".repeat(256), DeviceType::Tv);
    let err = repository.upsert(&oversize).await.unwrap_err();
    assert!(!err.is_unique_violation());

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        repository.upsert(&RegistrationKey::new("u1", DeviceType::Tv)),
    )
    .await
    .expect("write lock still held")
    .unwrap();

    assert!(outcome.is_created());
    assert_eq!(
        repository.count_by_device_type(DeviceType::Tv).await.unwrap(),
        1
    );
}
