//! SQL implementation of the device registration repository

use crate::error::DbError;
use crate::repositories::device_registration::{
    DeviceRegistrationRepository, RegistrationOutcome,
};
use crate::DbClient;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use devstats_common::{DeviceRegistration, DeviceType, RegistrationKey};
use sqlx::any::AnyRow;
use sqlx::AnyConnection;
use sqlx::Row;
use tracing::{debug, info, warn};

/// Statements run by `init_schema`, in order. Each is idempotent.
const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS device_registrations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        userKey VARCHAR(255) NOT NULL CHECK (length(userKey) BETWEEN 1 AND 255),
        deviceType VARCHAR(50) NOT NULL CHECK (deviceType IN ('iOS', 'Android', 'Watch', 'TV')),
        createdAt TEXT NOT NULL,
        updatedAt TEXT NOT NULL,
        CONSTRAINT uk_user_device UNIQUE (userKey, deviceType)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_device_type ON device_registrations (deviceType)",
    "CREATE INDEX IF NOT EXISTS idx_user_key ON device_registrations (userKey)",
    "CREATE INDEX IF NOT EXISTS idx_created_at ON device_registrations (createdAt)",
];

const SELECT_BY_KEY: &str = r#"
    SELECT id, userKey, deviceType, createdAt, updatedAt
    FROM device_registrations
    WHERE userKey = $1 AND deviceType = $2
"#;

/// SQL implementation of the device registration repository
#[derive(Debug, Clone)]
pub struct SqlDeviceRegistrationRepository {
    db_client: DbClient,
}

impl SqlDeviceRegistrationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub fn db_client(&self) -> &DbClient {
        &self.db_client
    }
}

impl DeviceRegistrationRepository for SqlDeviceRegistrationRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device registration schema");

        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }

        info!("Device registration schema initialized successfully");
        Ok(())
    }

    async fn upsert(&self, key: &RegistrationKey) -> Result<RegistrationOutcome, DbError> {
        debug!("Upserting registration for device type {}", key.device_type);

        let mut tx = self.db_client.begin_immediate().await?;

        let result = upsert_locked(tx.connection()?, key).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed upsert also failed: {}", rollback_err);
                }
                return Err(err);
            }
        };

        tx.commit().await?;

        debug!(
            "Registration {:?} {}",
            outcome.registration().id,
            if outcome.is_created() { "created" } else { "touched" }
        );
        Ok(outcome)
    }

    async fn find_by_user_and_device(
        &self,
        user_key: &str,
        device_type: DeviceType,
    ) -> Result<Option<DeviceRegistration>, DbError> {
        debug!("Finding registration for device type {}", device_type);

        let row = sqlx::query(SELECT_BY_KEY)
            .bind(user_key)
            .bind(device_type.as_str())
            .fetch_optional(self.db_client.pool())
            .await?;

        row.as_ref().map(row_to_registration).transpose()
    }

    async fn count_by_device_type(&self, device_type: DeviceType) -> Result<i64, DbError> {
        debug!("Counting registrations for device type {}", device_type);

        let row = sqlx::query(
            "SELECT COUNT(*) AS registrations FROM device_registrations WHERE deviceType = $1",
        )
        .bind(device_type.as_str())
        .fetch_one(self.db_client.pool())
        .await?;

        Ok(row.try_get::<i64, _>("registrations")?)
    }
}

/// Find-then-insert-or-touch on a connection that already holds the write lock.
///
/// A unique violation can still surface here if another writer bypassed the
/// lock; it is reported as [`DbError::UniqueViolation`].
async fn upsert_locked(
    conn: &mut AnyConnection,
    key: &RegistrationKey,
) -> Result<RegistrationOutcome, DbError> {
    let existing = sqlx::query(SELECT_BY_KEY)
        .bind(key.user_key.as_str())
        .bind(key.device_type.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    match existing {
        Some(row) => {
            let mut registration = row_to_registration(&row)?;
            let id = registration
                .id
                .ok_or_else(|| DbError::MappingError("stored row has no id".to_string()))?;
            registration.touch(now());

            sqlx::query("UPDATE device_registrations SET updatedAt = $1 WHERE id = $2")
                .bind(format_timestamp(registration.updated_at))
                .bind(id)
                .execute(&mut *conn)
                .await?;

            Ok(RegistrationOutcome::Touched(registration))
        }
        None => {
            let mut registration = DeviceRegistration::new(key.clone(), now());
            let stamp = format_timestamp(registration.created_at);

            let row = sqlx::query(
                r#"
                INSERT INTO device_registrations (userKey, deviceType, createdAt, updatedAt)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(key.user_key.as_str())
            .bind(key.device_type.as_str())
            .bind(stamp.clone())
            .bind(stamp)
            .fetch_one(&mut *conn)
            .await?;

            registration.id = Some(row.try_get::<i64, _>("id")?);
            Ok(RegistrationOutcome::Created(registration))
        }
    }
}

// Stored precision is microseconds; truncate up front so returned rows
// compare equal to what a later read produces.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// Timestamps are stored as RFC 3339 text: the Any driver cannot decode
// DateTime<Utc>, and fixed-width UTC text sorts chronologically.
fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.unwrap_or_else(now)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(format!("{} is not a timestamp: {}", column, e)))
}

fn row_to_registration(row: &AnyRow) -> Result<DeviceRegistration, DbError> {
    let device_type: String = row.try_get("deviceType")?;
    let device_type = DeviceType::parse(&device_type)
        .ok_or_else(|| DbError::MappingError(format!("unknown device type {:?}", device_type)))?;
    let created_at: String = row.try_get("createdAt")?;
    let updated_at: String = row.try_get("updatedAt")?;

    Ok(DeviceRegistration {
        id: Some(row.try_get::<i64, _>("id")?),
        user_key: row.try_get("userKey")?,
        device_type,
        created_at: Some(parse_timestamp("createdAt", &created_at)?),
        updated_at: Some(parse_timestamp("updatedAt", &updated_at)?),
    })
}
