//! [`Command`] for creating a new [`BankAccount`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        account, bank_account, funding_source, item, user, BankAccount,
    },
    infra::{identity, Identity},
    Service,
};

use super::Command;

/// [`Command`] for recording a new [`BankAccount`] linked by a [`User`].
///
/// Every execution creates a new document: linking the same account twice
/// results in two [`BankAccount`]s.
#[derive(Clone, Debug)]
pub struct CreateBankAccount {
    /// ID of the [`User`] who linked the account.
    pub user_id: user::Id,

    /// ID of the aggregator item.
    pub bank_id: item::Id,

    /// ID of the aggregator account.
    pub account_id: account::Id,

    /// Access token to the aggregator item.
    pub access_token: item::AccessToken,

    /// URL of the funding source backed by the account.
    pub funding_source_url: funding_source::Url,

    /// [`bank_account::SharableId`] of the account.
    pub sharable_id: bank_account::SharableId,
}

impl<Idp, Agg, Pay> Command<CreateBankAccount> for Service<Idp, Agg, Pay>
where
    Idp: Identity<
        Insert<BankAccount>,
        Ok = BankAccount,
        Err = Traced<identity::Error>,
    >,
{
    type Ok = BankAccount;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBankAccount,
    ) -> Result<Self::Ok, Self::Err> {
        let CreateBankAccount {
            user_id,
            bank_id,
            account_id,
            access_token,
            funding_source_url,
            sharable_id,
        } = cmd;

        self.identity()
            .execute(Insert(BankAccount {
                id: bank_account::Id::new(),
                user_id,
                bank_id,
                account_id,
                access_token,
                funding_source_url,
                sharable_id,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`CreateBankAccount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Identity`] backend error.
    #[display("`Identity` operation failed: {_0}")]
    Identity(identity::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::bank_account::SharableId,
        infra::mock::{op, Mock},
        Command as _, Service,
    };

    use super::CreateBankAccount;

    fn cmd() -> CreateBankAccount {
        CreateBankAccount {
            user_id: "user-1".into(),
            bank_id: "item-1".into(),
            account_id: "account-1".into(),
            access_token: "access-1".into(),
            funding_source_url:
                "https://api-sandbox.dwolla.com/funding-sources/fs-1"
                    .parse()
                    .unwrap(),
            sharable_id: SharableId::encrypt(&"account-1".into()),
        }
    }

    #[tokio::test]
    async fn creates_new_document_every_time() {
        let mock = Mock::new();
        let service = Service::mocked(&mock);

        let first = service.execute(cmd()).await.unwrap();
        let second = service.execute(cmd()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.account_id, second.account_id);
        assert_eq!(mock.bank_accounts(), [first, second]);
        assert_eq!(mock.count(op::BANK_ACCOUNT_CREATE), 2);
    }
}
