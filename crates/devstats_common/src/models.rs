//! Wire contracts and the registration entity shared by both services.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{validation_error, DevStatsError, HttpStatusCode};

/// Longest accepted `userKey`, in characters.
pub const MAX_USER_KEY_LENGTH: usize = 255;

/// Header the public service sets on every call to the internal service.
pub const INTERNAL_SERVICE_HEADER: &str = "X-Internal-Service";
/// Value of [`INTERNAL_SERVICE_HEADER`] sent by the public service.
pub const INTERNAL_SERVICE_NAME: &str = "statistics-api";

/// Sentinel `count` for invalid device types and failed queries.
pub const ERROR_COUNT: i64 = -1;

/// The closed set of device types a user can log in from.
///
/// Serialized as the exact literals `iOS`, `Android`, `Watch` and `TV`.
/// Parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DeviceType {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Watch,
    #[serde(rename = "TV")]
    Tv,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Ios,
        DeviceType::Android,
        DeviceType::Watch,
        DeviceType::Tv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Ios => "iOS",
            DeviceType::Android => "Android",
            DeviceType::Watch => "Watch",
            DeviceType::Tv => "TV",
        }
    }

    /// Exact, case-sensitive match against the four literals.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = DevStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            validation_error("deviceType must be one of iOS, Android, Watch, TV")
        })
    }
}

/// True iff `value` is exactly one of `iOS`, `Android`, `Watch`, `TV`.
pub fn is_valid_device_type(value: &str) -> bool {
    DeviceType::parse(value).is_some()
}

/// Body of `POST /Log/auth`.
///
/// Both fields are optional on the wire so that missing values surface as
/// validation errors instead of deserialization failures. Unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_key: Option<String>,
    pub device_type: Option<String>,
}

/// Body of `POST /Device/register`; same shape as a login.
pub type DeviceRegistrationRequest = LoginRequest;

impl LoginRequest {
    pub fn new(user_key: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            user_key: Some(user_key.into()),
            device_type: Some(device_type.into()),
        }
    }

    /// Checks the request and returns the `(userKey, deviceType)` pair it names.
    ///
    /// `userKey` must be present, non-blank after trimming and at most
    /// [`MAX_USER_KEY_LENGTH`] characters. `deviceType` must parse as a
    /// [`DeviceType`]. The key is kept as sent, without trimming.
    pub fn validate(&self) -> Result<RegistrationKey, DevStatsError> {
        let user_key = self
            .user_key
            .as_deref()
            .ok_or_else(|| validation_error("userKey is required"))?;
        if user_key.trim().is_empty() {
            return Err(validation_error("userKey must not be blank"));
        }
        if user_key.chars().count() > MAX_USER_KEY_LENGTH {
            return Err(validation_error(format!(
                "userKey must be at most {} characters",
                MAX_USER_KEY_LENGTH
            )));
        }

        let device_type = self
            .device_type
            .as_deref()
            .ok_or_else(|| validation_error("deviceType is required"))?
            .parse::<DeviceType>()?;

        Ok(RegistrationKey {
            user_key: user_key.to_string(),
            device_type,
        })
    }
}

/// A validated `(userKey, deviceType)` pair: the identity of a registration.
///
/// Serializes to the same `{userKey, deviceType}` shape as [`LoginRequest`],
/// which is what the public service forwards to the internal one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationKey {
    pub user_key: String,
    pub device_type: DeviceType,
}

impl RegistrationKey {
    pub fn new(user_key: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            user_key: user_key.into(),
            device_type,
        }
    }
}

/// Reply of `POST /Log/auth`. `status_code` always equals the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status_code: u16,
    pub message: String,
}

impl LoginResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            message: "success".to_string(),
        }
    }

    pub fn bad_request() -> Self {
        Self {
            status_code: 400,
            message: "bad_request".to_string(),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            message: "internal_error".to_string(),
        }
    }

    /// Picks the reply for an error by its HTTP class; the error text is not exposed.
    pub fn from_error(err: &DevStatsError) -> Self {
        match err.status_code() {
            400 => Self::bad_request(),
            _ => Self::internal_error(),
        }
    }
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Reply of `POST /Device/register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistrationResponse {
    pub status_code: u16,
}

impl DeviceRegistrationResponse {
    pub fn success() -> Self {
        Self { status_code: 200 }
    }

    pub fn bad_request() -> Self {
        Self { status_code: 400 }
    }

    pub fn internal_error() -> Self {
        Self { status_code: 500 }
    }

    pub fn from_error(err: &DevStatsError) -> Self {
        match err.status_code() {
            400 => Self::bad_request(),
            _ => Self::internal_error(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl IntoResponse for DeviceRegistrationResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Reply of `GET /Log/auth/statistics`.
///
/// `device_type` echoes the query parameter as received (null when absent).
/// `count` is [`ERROR_COUNT`] for invalid input or a failed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub device_type: Option<String>,
    pub count: i64,
}

impl StatisticsResponse {
    pub fn new(device_type: Option<String>, count: i64) -> Self {
        Self { device_type, count }
    }

    pub fn error(device_type: Option<String>) -> Self {
        Self {
            device_type,
            count: ERROR_COUNT,
        }
    }

    pub fn is_error(&self) -> bool {
        self.count == ERROR_COUNT
    }
}

/// A row of `device_registrations`.
///
/// Two registrations are equal when their `(user_key, device_type)` pairs
/// match; `id` and the timestamps do not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub id: Option<i64>,
    pub user_key: String,
    pub device_type: DeviceType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeviceRegistration {
    /// A not yet persisted registration stamped with `now`.
    pub fn new(key: RegistrationKey, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_key: key.user_key,
            device_type: key.device_type,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Refreshes `updated_at`. Never moves it before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.created_at.unwrap_or(now);
        self.updated_at = Some(now.max(floor));
    }

    pub fn key(&self) -> RegistrationKey {
        RegistrationKey::new(self.user_key.clone(), self.device_type)
    }
}

impl PartialEq for DeviceRegistration {
    fn eq(&self, other: &Self) -> bool {
        self.user_key == other.user_key && self.device_type == other.device_type
    }
}

impl Eq for DeviceRegistration {}

impl Hash for DeviceRegistration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user_key.hash(state);
        self.device_type.hash(state);
    }
}
