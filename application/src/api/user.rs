//! [`User`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar, ScalarValue, Value};
use service::domain;

use crate::{api::scalar, Context};

/// A [`User`] of the dashboard.
#[derive(Clone, Debug, From)]
pub struct User(domain::User);

/// A `User` of the dashboard.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.clone().into()
    }

    /// Full name of this `User`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Email of this `User`.
    #[must_use]
    pub fn email(&self) -> Email {
        self.0.email.clone().into()
    }

    /// ID of this `User` as a customer of the payment rails, if registered.
    #[must_use]
    pub fn dwolla_customer_id(&self) -> Option<String> {
        self.0.dwolla_customer_id.as_ref().map(ToString::to_string)
    }
}

/// Unique identifier of a `User`.
#[derive(Clone, Debug, Display, Eq, GraphQLScalar, PartialEq)]
#[graphql(name = "UserId", transparent)]
pub struct Id(String);

impl From<domain::user::Id> for Id {
    fn from(id: domain::user::Id) -> Self {
        Self(id.into())
    }
}

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Password of a `User`.
///
/// Accepted as input only, and never rendered back.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    to_output_with = redact,
    from_input_with = scalar::Via::<domain::user::Password>::from_input,
    parse_token(String),
)]
pub struct Password(domain::user::Password);

/// Renders a [`Password`] without exposing it.
fn redact<S: ScalarValue>(_: &Password) -> Value<S> {
    Value::scalar(String::from("********"))
}

pub mod session {
    //! [`Session`]-related definitions.

    use common::DateTime;
    use juniper::GraphQLObject;
    use service::domain;

    use crate::Context;

    use super::Id;

    /// `Session` of a signed in `User`.
    ///
    /// Its secret is carried by the HTTP-only session cookie only.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "UserSession")]
    pub struct Session {
        /// ID of the `User` this `Session` belongs to.
        pub user_id: Id,

        /// `DateTime` when this `Session` expires.
        pub expires_at: DateTime,
    }

    impl From<domain::user::Session> for Session {
        fn from(session: domain::user::Session) -> Self {
            Self {
                user_id: session.user_id.into(),
                expires_at: session.expires_at.coerce(),
            }
        }
    }
}
