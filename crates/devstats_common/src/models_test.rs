#[cfg(test)]
mod tests {
    use crate::models::*;
    use crate::DevStatsError;
    use axum::{http::StatusCode, response::IntoResponse};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_device_type_literals_round_trip() {
        for device_type in DeviceType::ALL {
            assert_eq!(DeviceType::parse(device_type.as_str()), Some(device_type));
            assert_eq!(device_type.to_string(), device_type.as_str());
        }
        assert_eq!(
            serde_json::to_value(DeviceType::Ios).unwrap(),
            json!("iOS")
        );
        assert_eq!(serde_json::to_value(DeviceType::Tv).unwrap(), json!("TV"));
    }

    #[test]
    fn test_device_type_is_case_sensitive() {
        assert!(is_valid_device_type("iOS"));
        assert!(is_valid_device_type("Android"));
        assert!(is_valid_device_type("Watch"));
        assert!(is_valid_device_type("TV"));

        for candidate in ["ios", "IOS", "android", "tv", "Tv", " iOS", "iOS ", "", "Desktop"] {
            assert!(!is_valid_device_type(candidate), "{:?} accepted", candidate);
        }
        assert!("watch".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let key = LoginRequest::new("u1", "iOS").validate().unwrap();
        assert_eq!(key, RegistrationKey::new("u1", DeviceType::Ios));
    }

    #[test]
    fn test_validate_keeps_user_key_untrimmed() {
        let key = LoginRequest::new("  u1 ", "Watch").validate().unwrap();
        assert_eq!(key.user_key, "  u1 ");
    }

    #[test]
    fn test_validate_rejects_bad_user_keys() {
        let missing = LoginRequest {
            user_key: None,
            device_type: Some("iOS".to_string()),
        };
        let blank = LoginRequest::new("   ", "iOS");
        let empty = LoginRequest::new("", "iOS");
        let oversize = LoginRequest::new("k".repeat(MAX_USER_KEY_LENGTH + 1), "iOS");

        for request in [missing, blank, empty, oversize] {
            assert!(matches!(
                request.validate(),
                Err(DevStatsError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_validate_length_counts_characters() {
        let at_limit = LoginRequest::new("k".repeat(MAX_USER_KEY_LENGTH), "TV");
        assert!(at_limit.validate().is_ok());

        // 255 two-byte characters are still 255 characters.
        let multibyte = LoginRequest::new("é".repeat(MAX_USER_KEY_LENGTH), "TV");
        assert!(multibyte.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_device_types() {
        let missing = LoginRequest {
            user_key: Some("u1".to_string()),
            device_type: None,
        };
        assert!(missing.validate().is_err());
        assert!(LoginRequest::new("u1", "Desktop").validate().is_err());
        assert!(LoginRequest::new("u1", "ios").validate().is_err());
    }

    #[test]
    fn test_login_request_wire_format() {
        let request: LoginRequest = serde_json::from_value(json!({
            "userKey": "u1",
            "deviceType": "Android",
            "somethingElse": true
        }))
        .unwrap();
        assert_eq!(request, LoginRequest::new("u1", "Android"));

        let empty: LoginRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, LoginRequest::default());

        let key = RegistrationKey::new("u1", DeviceType::Tv);
        assert_eq!(
            serde_json::to_value(&key).unwrap(),
            json!({"userKey": "u1", "deviceType": "TV"})
        );
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(
            serde_json::to_value(LoginResponse::success()).unwrap(),
            json!({"statusCode": 200, "message": "success"})
        );
        assert_eq!(
            serde_json::to_value(DeviceRegistrationResponse::bad_request()).unwrap(),
            json!({"statusCode": 400})
        );
        assert_eq!(
            serde_json::to_value(StatisticsResponse::new(Some("iOS".to_string()), 2)).unwrap(),
            json!({"deviceType": "iOS", "count": 2})
        );
        assert_eq!(
            serde_json::to_value(StatisticsResponse::error(None)).unwrap(),
            json!({"deviceType": null, "count": -1})
        );
    }

    #[test]
    fn test_login_response_factories() {
        assert_eq!(LoginResponse::bad_request().message, "bad_request");
        assert_eq!(LoginResponse::internal_error().status_code, 500);
        assert_eq!(
            LoginResponse::from_error(&DevStatsError::ValidationError("x".into())),
            LoginResponse::bad_request()
        );
        assert_eq!(
            LoginResponse::from_error(&DevStatsError::HttpError("refused".into())),
            LoginResponse::internal_error()
        );
        assert_eq!(
            DeviceRegistrationResponse::from_error(&DevStatsError::ConflictError("dup".into())),
            DeviceRegistrationResponse::bad_request()
        );
    }

    #[tokio::test]
    async fn test_status_code_field_matches_http_status() {
        for body in [
            LoginResponse::success(),
            LoginResponse::bad_request(),
            LoginResponse::internal_error(),
        ] {
            let expected = body.status_code;
            let response = body.into_response();
            assert_eq!(response.status().as_u16(), expected);
        }

        let response = DeviceRegistrationResponse::internal_error().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"statusCode": 500}));
    }

    #[test]
    fn test_statistics_sentinel() {
        assert!(StatisticsResponse::error(Some("Desktop".to_string())).is_error());
        assert!(!StatisticsResponse::new(Some("TV".to_string()), 0).is_error());
    }

    #[test]
    fn test_registration_equality_ignores_id_and_timestamps() {
        let now = Utc::now();
        let mut a = DeviceRegistration::new(RegistrationKey::new("u1", DeviceType::Ios), now);
        let mut b = DeviceRegistration::new(
            RegistrationKey::new("u1", DeviceType::Ios),
            now + Duration::hours(1),
        );
        a.id = Some(1);
        b.id = Some(2);
        assert_eq!(a, b);

        let c = DeviceRegistration::new(RegistrationKey::new("u1", DeviceType::Android), now);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_touch_never_moves_before_creation() {
        let created = Utc::now();
        let mut registration =
            DeviceRegistration::new(RegistrationKey::new("u1", DeviceType::Watch), created);

        registration.touch(created + Duration::seconds(5));
        assert_eq!(registration.updated_at, Some(created + Duration::seconds(5)));
        assert_eq!(registration.created_at, Some(created));

        registration.touch(created - Duration::seconds(30));
        assert_eq!(registration.updated_at, Some(created));
    }
}
