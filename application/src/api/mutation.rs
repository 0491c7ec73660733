//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use secrecy::SecretBox;
use service::{command, infra::identity, Command as _};
use tracing as log;

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Signs in the `User` with the provided credentials.
    ///
    /// Sets the session cookie on success.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials don't match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "signIn",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sign_in(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::Session, Error> {
        let session = ctx
            .service()
            .execute(command::CreateUserSession {
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_session_cookie(session.secret.clone());

        Ok(session.into())
    }

    /// Registers a new `User` and signs it in.
    ///
    /// Sets the session cookie on success.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_EXISTS` - a `User` with the provided `UserEmail` is already
    ///                   registered;
    /// - `NAME_TOO_LONG` - the full name composed of the provided ones is too
    ///                     long.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            first_name = %first_name,
            gql.name = "signUp",
            last_name = %last_name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sign_up(
        first_name: api::user::Name,
        last_name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUser {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                password: SecretBox::init_with(move || password.into()),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_session_cookie(output.session.secret);

        Ok(output.user.into())
    }

    /// Signs out the current `User`.
    ///
    /// Always removes the session cookie, and never fails: `false` is
    /// returned if the session couldn't be deleted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "logoutAccount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn logout_account(ctx: &Context) -> bool {
        ctx.remove_session_cookie();

        let Some(secret) = ctx.session_secret().cloned() else {
            log::warn!("no `Session` to delete");
            return false;
        };
        ctx.service()
            .execute(command::DeleteUserSession { secret })
            .await
            .map_err(|e| log::error!("failed to delete `Session`: {e}"))
            .is_ok()
    }

    /// Creates a new `LinkToken` for the current `User` to link a bank with.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - there is no valid session.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createLinkToken",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_link_token(
        ctx: &Context,
    ) -> Result<api::link::CreateTokenResult, Error> {
        let me = ctx.current_user().await?.clone();
        ctx.service()
            .execute(command::CreateLinkToken { user: me })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|token| api::link::CreateTokenResult {
                link_token: token.into(),
            })
    }

    /// Exchanges the provided `LinkPublicToken` into a linked bank account
    /// of the current `User`, backed by a funding source.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - there is no valid session;
    /// - `NO_ACCOUNTS` - the linked bank has no accounts;
    /// - `NOT_PAYMENTS_CUSTOMER` - the current `User` is not registered in
    ///                             the payment rails;
    /// - `FUNDING_SOURCE_NOT_CREATED` - the payment rails didn't create a
    ///                                  funding source.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "exchangePublicToken",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn exchange_public_token(
        public_token: api::link::PublicToken,
        ctx: &Context,
    ) -> Result<api::link::ExchangeResult, Error> {
        let me = ctx.current_user().await?.clone();
        ctx.service()
            .execute(command::ExchangePublicToken {
                public_token: public_token.into(),
                user: me,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|completion| api::link::ExchangeResult {
                public_token_exchange: completion.to_string(),
            })
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials don't match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Identity(identity::Error::Remote(e))
                if e.is_unauthorized() =>
            {
                Some(Error::WrongCredentials.into())
            }
            Self::Identity(e) => e.try_as_error(),
            Self::MissingSecret => None,
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_EXISTS"]
                #[status = CONFLICT]
                #[message = "`User` with the provided `UserEmail` already \
                             exists"]
                Exists,

                #[code = "NAME_TOO_LONG"]
                #[status = BAD_REQUEST]
                #[message = "Full name composed of the provided ones is too \
                             long"]
                NameTooLong,
            }
        }

        match self {
            Self::AccountCreation(identity::Error::Remote(e))
                if e.status() == Some(http::StatusCode::CONFLICT) =>
            {
                Some(Error::Exists.into())
            }
            Self::AccountCreation(e) => e.try_as_error(),
            Self::SessionCreation(e) => e.try_as_error(),
            Self::NameTooLong => Some(Error::NameTooLong.into()),
        }
    }
}

impl AsError for command::create_link_token::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Aggregator(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_bank_account::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Identity(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::exchange_public_token::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_ACCOUNTS"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "Linked bank has no accounts"]
                NoAccounts,

                #[code = "NOT_PAYMENTS_CUSTOMER"]
                #[status = CONFLICT]
                #[message = "`User` is not registered in the payment rails"]
                MissingCustomer,

                #[code = "FUNDING_SOURCE_NOT_CREATED"]
                #[status = BAD_GATEWAY]
                #[message = "Payment rails didn't create a funding source"]
                FundingSourceNotCreated,
            }
        }

        match self {
            Self::Aggregator(e) => e.try_as_error(),
            Self::NoAccounts(_) => Some(Error::NoAccounts.into()),
            Self::MissingCustomer => Some(Error::MissingCustomer.into()),
            Self::Payments(e) => e.try_as_error(),
            Self::FundingSourceNotCreated => {
                Some(Error::FundingSourceNotCreated.into())
            }
            Self::BankAccount(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command, infra::identity};

    use crate::AsError as _;

    fn rejected(status: http::StatusCode) -> identity::Error {
        identity::Error::Remote(service::infra::http::Error::Status {
            operation: "test",
            status,
            detail: String::new(),
        })
    }

    #[test]
    fn reports_wrong_credentials() {
        let err = command::create_user_session::ExecutionError::Identity(
            rejected(http::StatusCode::UNAUTHORIZED),
        )
        .as_error();

        assert_eq!(err.code, "WRONG_CREDENTIALS");
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn reports_existing_user() {
        let err = command::create_user::ExecutionError::AccountCreation(
            rejected(http::StatusCode::CONFLICT),
        )
        .as_error();

        assert_eq!(err.code, "USER_EXISTS");
    }

    #[test]
    fn hides_backend_failures() {
        let err = command::create_user::ExecutionError::AccountCreation(
            rejected(http::StatusCode::BAD_GATEWAY),
        )
        .as_error();

        assert_eq!(err.code, crate::Error::INTERNAL);
        assert_eq!(
            err.status_code,
            http::StatusCode::INTERNAL_SERVER_ERROR,
        );
    }

    #[test]
    fn reports_pipeline_preconditions() {
        use command::exchange_public_token::ExecutionError as E;

        assert_eq!(
            E::NoAccounts("item-1".into()).as_error().code,
            "NO_ACCOUNTS",
        );
        assert_eq!(
            E::MissingCustomer.as_error().code,
            "NOT_PAYMENTS_CUSTOMER",
        );
        assert_eq!(
            E::FundingSourceNotCreated.as_error().code,
            "FUNDING_SOURCE_NOT_CREATED",
        );
    }
}
