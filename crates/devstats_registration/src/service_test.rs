#[cfg(test)]
mod tests {
    use crate::service::DeviceRegistrationService;
    use chrono::Utc;
    use devstats_common::{
        DevStatsError, DeviceRegistration, DeviceRegistrationResponse, DeviceType,
        HttpStatusCode, LoginRequest, RegistrationKey,
    };
    use devstats_db::{DbError, DeviceRegistrationRepository, RegistrationOutcome};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behaviour {
        Create,
        LoseRace,
        Fail,
    }

    struct StubRepository {
        behaviour: Behaviour,
        upserts: AtomicUsize,
    }

    impl StubRepository {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                upserts: AtomicUsize::new(0),
            }
        }
    }

    impl DeviceRegistrationRepository for StubRepository {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn upsert(&self, key: &RegistrationKey) -> Result<RegistrationOutcome, DbError> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Create => {
                    let mut registration = DeviceRegistration::new(key.clone(), Utc::now());
                    registration.id = Some(1);
                    Ok(RegistrationOutcome::Created(registration))
                }
                Behaviour::LoseRace => Err(DbError::UniqueViolation(
                    "UNIQUE constraint failed: device_registrations.userKey".to_string(),
                )),
                Behaviour::Fail => Err(DbError::QueryError("disk I/O error".to_string())),
            }
        }

        async fn find_by_user_and_device(
            &self,
            _user_key: &str,
            _device_type: DeviceType,
        ) -> Result<Option<DeviceRegistration>, DbError> {
            Ok(None)
        }

        async fn count_by_device_type(&self, _device_type: DeviceType) -> Result<i64, DbError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_valid_request_is_upserted() {
        let service = DeviceRegistrationService::new(StubRepository::new(Behaviour::Create));

        let outcome = service
            .register_device(&LoginRequest::new("u1", "Watch"))
            .await
            .unwrap();

        assert!(outcome.is_created());
        assert_eq!(
            outcome.registration().key(),
            RegistrationKey::new("u1", DeviceType::Watch)
        );
        assert_eq!(service.repository().upserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_the_store() {
        let service = DeviceRegistrationService::new(StubRepository::new(Behaviour::Create));

        for request in [
            LoginRequest::new("u1", "Desktop"),
            LoginRequest::new(" ", "iOS"),
            LoginRequest::default(),
        ] {
            let err = service.register_device(&request).await.unwrap_err();
            assert!(matches!(err, DevStatsError::ValidationError(_)));
        }
        assert_eq!(service.repository().upserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lost_insert_race_is_a_bad_request() {
        let service = DeviceRegistrationService::new(StubRepository::new(Behaviour::LoseRace));

        let err = service
            .register_device(&LoginRequest::new("u1", "iOS"))
            .await
            .unwrap_err();

        assert!(matches!(err, DevStatsError::ConflictError(_)));
        assert_eq!(
            DeviceRegistrationResponse::from_error(&err),
            DeviceRegistrationResponse::bad_request()
        );
        assert_eq!(service.repository().upserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_storage_failures_are_internal_errors() {
        let service = DeviceRegistrationService::new(StubRepository::new(Behaviour::Fail));

        let err = service
            .register_device(&LoginRequest::new("u1", "iOS"))
            .await
            .unwrap_err();

        assert!(matches!(err, DevStatsError::DatabaseError(_)));
        assert_eq!(err.status_code(), 500);
    }
}
