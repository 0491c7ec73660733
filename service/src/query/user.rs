//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::domain::{user::session, User};
#[cfg(doc)]
use crate::{domain::user::Session, Query};

use super::IdentityQuery;

/// Queries the [`User`] owning the [`Session`] with the provided
/// [`session::Secret`].
///
/// Invalid or expired [`Session`]s result in [`None`].
pub type BySession = IdentityQuery<By<Option<User>, session::Secret>>;

#[cfg(test)]
mod spec {
    use crate::{
        domain::{user, User},
        infra::mock::{op, Mock},
        Query as _, Service,
    };

    use super::BySession;

    #[tokio::test]
    async fn returns_session_owner() {
        let user = User {
            id: "user-1".into(),
            name: user::Name::new("Ada Lovelace").unwrap(),
            email: user::Email::new("ada@example.com").unwrap(),
            dwolla_customer_id: Some("customer-1".into()),
        };
        let mock = Mock::new().with_user(user.clone());

        let found = Service::mocked(&mock)
            .execute(BySession::by("secret-1".into()))
            .await
            .unwrap();

        assert_eq!(found, Some(user));
        assert_eq!(mock.calls(), [op::SESSION_GET]);
    }

    #[tokio::test]
    async fn returns_none_for_unknown_session() {
        let mock = Mock::new();

        let found = Service::mocked(&mock)
            .execute(BySession::by("expired".into()))
            .await
            .unwrap();

        assert_eq!(found, None);
    }
}
