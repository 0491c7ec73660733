//! [`Query`] of the linked [`Account`]s of a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{bank_account, user, Account, BankAccount},
    infra::{
        aggregator::{self, AccountsGet},
        identity, Aggregator, Identity,
    },
    read::accounts::{Entry, Summary},
    Service,
};

use super::Query;

/// Queries the [`Summary`] of all the [`Account`]s linked by a [`User`].
///
/// Computed [`Summary`]s are cached for the configured time, until the
/// [`User`] links a new account.
#[derive(Clone, Debug)]
pub struct Accounts {
    /// ID of the [`User`] to summarize the [`Account`]s of.
    user_id: user::Id,
}

impl Accounts {
    /// Creates a new [`Accounts`] query of the [`User`] with the provided ID.
    #[must_use]
    pub fn of(user_id: user::Id) -> Self {
        Self { user_id }
    }
}

impl<Idp, Agg, Pay> Query<Accounts> for Service<Idp, Agg, Pay>
where
    Idp: Identity<
        Select<By<Vec<BankAccount>, user::Id>>,
        Ok = Vec<BankAccount>,
        Err = Traced<identity::Error>,
    >,
    Agg: Aggregator<
        AccountsGet,
        Ok = Vec<Account>,
        Err = Traced<aggregator::Error>,
    >,
{
    type Ok = Summary;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Accounts { user_id }: Accounts,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let generation = self.home_views().generation().await;
        if let Some(summary) = self.home_views().get(&user_id).await {
            return Ok(summary);
        }

        let linked = self
            .identity()
            .execute(Select(By::new(user_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut entries = Vec::with_capacity(linked.len());
        for bank_account in linked {
            let mut accounts = self
                .aggregator()
                .execute(AccountsGet {
                    access_token: bank_account.access_token.clone(),
                })
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let pos = accounts
                .iter()
                .position(|a| a.id == bank_account.account_id)
                .unwrap_or_default();
            if pos >= accounts.len() {
                log::warn!(
                    "`BankAccount(id: {})` has no accounts in its item",
                    bank_account.id,
                );
                continue;
            }

            entries.push(Entry {
                document_id: bank_account.id,
                bank_id: bank_account.bank_id,
                sharable_id: bank_account.sharable_id,
                account: accounts.swap_remove(pos),
            });
        }

        let summary = Summary::new(entries);
        self.home_views()
            .put(
                user_id,
                summary.clone(),
                self.config().home_view_ttl,
                generation,
            )
            .await;

        Ok(summary)
    }
}

/// Queries a single linked [`Entry`] of a [`User`] by the ID of its
/// [`BankAccount`] document.
///
/// The first linked [`Entry`] is returned when no ID is provided, or when it
/// doesn't match any of the [`User`]'s [`BankAccount`]s.
#[derive(Clone, Debug)]
pub struct ById {
    /// ID of the [`User`] the [`Entry`] is linked by.
    user_id: user::Id,

    /// ID of the [`BankAccount`] document to select.
    document_id: Option<bank_account::Id>,
}

impl ById {
    /// Creates a new [`ById`] query of the [`User`] with the provided ID.
    #[must_use]
    pub fn new(
        user_id: user::Id,
        document_id: Option<bank_account::Id>,
    ) -> Self {
        Self {
            user_id,
            document_id,
        }
    }
}

impl<Idp, Agg, Pay> Query<ById> for Service<Idp, Agg, Pay>
where
    Self: Query<Accounts, Ok = Summary, Err = Traced<ExecutionError>>,
{
    type Ok = Option<Entry>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ById {
            user_id,
            document_id,
        }: ById,
    ) -> Result<Self::Ok, Self::Err> {
        let Summary { mut accounts, .. } = self
            .execute(Accounts::of(user_id))
            .await
            .map_err(tracerr::wrap!())?;

        let pos = document_id
            .and_then(|id| accounts.iter().position(|e| e.document_id == id))
            .unwrap_or_default();
        Ok((pos < accounts.len()).then(|| accounts.swap_remove(pos)))
    }
}

/// Error of [`Accounts`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Identity`] backend error.
    #[display("`Identity` operation failed: {_0}")]
    Identity(identity::Error),

    /// [`Aggregator`] error.
    #[display("`Aggregator` operation failed: {_0}")]
    Aggregator(aggregator::Error),
}
