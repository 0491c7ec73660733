//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently signed in `User`.
    ///
    /// Never fails: `null` is returned when there is no valid session, or the
    /// identity backend is unavailable.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "loggedInUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn logged_in_user(ctx: &Context) -> Option<api::User> {
        ctx.try_current_user().await.cloned().map(Into::into)
    }

    /// Returns the summary of all the `Account`s linked by the currently
    /// signed in `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - there is no valid session.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "accounts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn accounts(
        ctx: &Context,
    ) -> Result<api::AccountsSummary, Error> {
        let my_id = ctx.current_user().await?.id.clone();
        ctx.service()
            .execute(query::Accounts::of(my_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Account` linked by the currently signed in `User` with
    /// the provided `AccountItemId`.
    ///
    /// Falls back to the first linked `Account` if no `AccountItemId` is
    /// provided, or it doesn't match any. Returns `null` if the `User` has
    /// no linked `Account`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - there is no valid session.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "account",
            id = ?id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn account(
        id: Option<api::account::ItemId>,
        ctx: &Context,
    ) -> Result<Option<api::Account>, Error> {
        let my_id = ctx.current_user().await?.id.clone();
        ctx.service()
            .execute(query::accounts::ById::new(my_id, id.map(Into::into)))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|entry| entry.map(Into::into))
    }
}

impl AsError for query::accounts::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Identity(e) => e.try_as_error(),
            Self::Aggregator(e) => e.try_as_error(),
        }
    }
}
