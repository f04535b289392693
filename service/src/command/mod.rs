//! [`Command`] definition.

pub mod approve_ride;
pub mod authorize_user_session;
pub mod cancel_ride;
pub mod complete_ride;
pub mod create_pricing;
pub mod create_user;
pub mod create_user_session;
pub mod deactivate_user;
pub mod mark_notification_read;
pub mod rate_ride;
pub mod register_driver;
pub mod reject_ride;
pub mod request_ride;
pub mod start_ride;
pub mod update_user_password;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    approve_ride::ApproveRide, authorize_user_session::AuthorizeUserSession,
    cancel_ride::CancelRide, complete_ride::CompleteRide,
    create_pricing::CreatePricing, create_user::CreateUser,
    create_user_session::CreateUserSession, deactivate_user::DeactivateUser,
    mark_notification_read::MarkNotificationRead, rate_ride::RateRide,
    register_driver::RegisterDriver, reject_ride::RejectRide,
    request_ride::RequestRide, start_ride::StartRide,
    update_user_password::UpdateUserPassword,
};

#[cfg(test)]
mod spec {
    use std::{sync::Arc, time::Duration};

    use common::DateTime;
    use secrecy::SecretBox;

    use crate::{
        domain::{
            pricing, ride,
            user::{self, session},
            vehicle, Pricing,
        },
        infra::{notifier, session::NoOp, InMemory},
        read, Command as _, Query as _, Service,
    };

    use super::{
        authorize_user_session, create_user_session, ApproveRide,
        AuthorizeUserSession, CancelRide, CreatePricing, CreateUser,
        CreateUserSession, RequestRide, UpdateUserPassword,
    };

    fn service() -> Service<InMemory> {
        let secret = b"test-secret";
        let (service, _bg) = Service::new(
            crate::Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
                deliver_notifications: crate::task::deliver_notifications::Config {
                    interval: Duration::from_secs(60),
                },
            },
            InMemory::new(),
            Arc::new(NoOp),
            Arc::new(notifier::Log),
        );
        service
    }

    fn password(s: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(s).unwrap()))
    }

    async fn create_user(
        service: &Service<InMemory>,
        email: &str,
    ) -> crate::domain::User {
        service
            .execute(CreateUser {
                name: user::Name::new("Bob Doe").unwrap(),
                email: user::Email::new(email).unwrap(),
                password: password("correct-horse"),
                role: user::Role::Employee,
                phone: None,
                department: None,
                employee_id: None,
            })
            .await
            .unwrap()
    }

    async fn create_pricing(service: &Service<InMemory>) {
        let now = DateTime::now();
        let pricing = Pricing {
            valid_from: (now - Duration::from_secs(60)).coerce(),
            ..crate::domain::pricing::spec::pricing(now)
        };
        drop(service.execute(CreatePricing { pricing }).await.unwrap());
    }

    #[tokio::test]
    async fn locks_account_after_repeated_failed_logins() {
        let service = service();
        let user = create_user(&service, "bob@corp.example").await;

        for _ in 0..user::User::MAX_LOGIN_ATTEMPTS {
            let err = service
                .execute(CreateUserSession {
                    email: user.email.clone(),
                    password: password("wrong-password"),
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err.split().0,
                create_user_session::ExecutionError::WrongCredentials,
            ));
        }

        // Even the correct password is rejected now.
        let err = service
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: password("correct-horse"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.split().0,
            create_user_session::ExecutionError::AccountLocked,
        ));
    }

    #[tokio::test]
    async fn authorizes_issued_session() {
        let service = service();
        let user = create_user(&service, "bob@corp.example").await;

        let out = service
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: password("correct-horse"),
            })
            .await
            .unwrap();

        let authorized = service
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(authorized.user.id, user.id);
        assert!(authorized.user.last_login.is_some());
    }

    #[tokio::test]
    async fn password_change_invalidates_outstanding_sessions() {
        let service = service();
        let user = create_user(&service, "bob@corp.example").await;

        let out = service
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: password("correct-horse"),
            })
            .await
            .unwrap();

        drop(
            service
                .execute(UpdateUserPassword {
                    user_id: user.id,
                    new_password: password("battery-staple"),
                    old_password: password("correct-horse"),
                })
                .await
                .unwrap(),
        );

        let err = service
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap_err();
        assert!(matches!(
            err.split().0,
            authorize_user_session::ExecutionError::Rejected(
                session::Rejection::PasswordChanged,
            ),
        ));
    }

    #[tokio::test]
    async fn ride_goes_through_request_approve_cancel() {
        let service = service();
        let user = create_user(&service, "bob@corp.example").await;
        create_pricing(&service).await;

        let ride = service
            .execute(RequestRide {
                requested_by: user.id,
                kind: ride::Kind::OneWay,
                vehicle: vehicle::Category::Sedan,
                pickup: ride::Location::new("HQ").unwrap(),
                dropoff: ride::Location::new("Airport").unwrap(),
                scheduled_at: (DateTime::now()
                    + Duration::from_secs(3 * 60 * 60))
                .coerce(),
                distance_km: 10.into(),
                duration_minutes: 20.into(),
                passengers: 1,
                purpose: None,
                is_corporate: false,
            })
            .await
            .unwrap();
        assert_eq!(ride.status, ride::Status::Pending);
        assert_eq!(
            ride.fare.map(|f| f.amount),
            Some("35.00".parse().unwrap()),
        );

        let ride = service
            .execute(ApproveRide {
                ride_id: ride.id,
                driver_id: None,
            })
            .await
            .unwrap();
        assert_eq!(ride.status, ride::Status::Approved);

        let ride = service
            .execute(CancelRide {
                ride_id: ride.id,
                by: ride::CancelledBy::Requester,
                reason: Some("plans changed".into()),
            })
            .await
            .unwrap();
        assert_eq!(ride.status, ride::Status::Cancelled);
        // Cancelled 3 hours before pickup: the 4-hour bracket applies.
        assert_eq!(
            ride.cancellation.and_then(|c| {
                (c.by == ride::CancelledBy::Requester).then_some(c.fee.amount)
            }),
            Some(10.into()),
        );

        // Both status changes notified the requester.
        let notifications = service
            .execute(crate::query::notifications::List::by(
                read::notification::list::Filter {
                    user_id: Some(user.id),
                    unread_only: false,
                },
            ))
            .await
            .unwrap();
        assert_eq!(notifications.len(), 3);
    }

    #[tokio::test]
    async fn requesting_a_ride_without_active_pricing_fails() {
        let service = service();
        let user = create_user(&service, "bob@corp.example").await;

        let err = service
            .execute(RequestRide {
                requested_by: user.id,
                kind: ride::Kind::OneWay,
                vehicle: vehicle::Category::Sedan,
                pickup: ride::Location::new("HQ").unwrap(),
                dropoff: ride::Location::new("Airport").unwrap(),
                scheduled_at: DateTime::now().coerce(),
                distance_km: 10.into(),
                duration_minutes: 20.into(),
                passengers: 1,
                purpose: None,
                is_corporate: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.split().0,
            super::request_ride::ExecutionError::NoActivePricing,
        ));
    }

    #[tokio::test]
    async fn duplicate_pricing_name_is_rejected() {
        let service = service();
        create_pricing(&service).await;

        let now = DateTime::now();
        let duplicate = Pricing {
            id: pricing::Id::new(),
            ..crate::domain::pricing::spec::pricing(now)
        };
        let err = service
            .execute(CreatePricing { pricing: duplicate })
            .await
            .unwrap_err();
        assert!(matches!(
            err.split().0,
            super::create_pricing::ExecutionError::NameOccupied(_),
        ));
    }
}
