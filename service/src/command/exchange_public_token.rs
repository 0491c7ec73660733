//! [`Command`] for exchanging a [`link::PublicToken`] into a linked
//! [`BankAccount`].

use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    command::create_bank_account::{self, CreateBankAccount},
    domain::{
        bank_account::SharableId, funding_source, item, link, processor,
        Account, BankAccount, User,
    },
    infra::{
        aggregator::{
            self, AccountsGet, ItemPublicTokenExchange, ProcessorTokenCreate,
        },
        payments::{self, AddFundingSource},
        Aggregator, Payments,
    },
    Service,
};

use super::Command;

/// [`Command`] for exchanging a [`link::PublicToken`] obtained by the client
/// widget into a recorded [`BankAccount`] backed by a funding source.
///
/// Steps are performed strictly in sequence, and the first failing one aborts
/// the rest without rolling back the previous ones.
#[derive(Clone, Debug)]
pub struct ExchangePublicToken {
    /// [`link::PublicToken`] to exchange.
    pub public_token: link::PublicToken,

    /// [`User`] who linked the bank.
    pub user: User,
}

/// Marker of a successfully completed [`ExchangePublicToken`] [`Command`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("complete")]
pub struct Completion;

impl<Idp, Agg, Pay> Command<ExchangePublicToken> for Service<Idp, Agg, Pay>
where
    Agg: Aggregator<
            ItemPublicTokenExchange,
            Ok = item::Item,
            Err = Traced<aggregator::Error>,
        > + Aggregator<
            AccountsGet,
            Ok = Vec<Account>,
            Err = Traced<aggregator::Error>,
        > + Aggregator<
            ProcessorTokenCreate,
            Ok = processor::Token,
            Err = Traced<aggregator::Error>,
        >,
    Pay: Payments<
        AddFundingSource,
        Ok = Option<funding_source::Url>,
        Err = Traced<payments::Error>,
    >,
    Self: Command<
        CreateBankAccount,
        Ok = BankAccount,
        Err = Traced<create_bank_account::ExecutionError>,
    >,
{
    type Ok = Completion;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ExchangePublicToken,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ExchangePublicToken { public_token, user } = cmd;

        let item = self
            .aggregator()
            .execute(ItemPublicTokenExchange { public_token })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Only the first account of the item is linked.
        let account = self
            .aggregator()
            .execute(AccountsGet {
                access_token: item.access_token.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .next()
            .ok_or_else(|| tracerr::new!(E::NoAccounts(item.id.clone())))?;

        let processor_token = self
            .aggregator()
            .execute(ProcessorTokenCreate {
                access_token: item.access_token.clone(),
                account_id: account.id.clone(),
                processor: processor::Processor::Dwolla,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let customer_id = user
            .dwolla_customer_id
            .ok_or_else(|| tracerr::new!(E::MissingCustomer))?;
        let funding_source_url = self
            .payments()
            .execute(AddFundingSource {
                customer_id,
                processor_token,
                bank_name: account.name,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| tracerr::new!(E::FundingSourceNotCreated))?;

        let bank_account = self
            .execute(CreateBankAccount {
                user_id: user.id.clone(),
                bank_id: item.id,
                sharable_id: SharableId::encrypt(&account.id),
                account_id: account.id,
                access_token: item.access_token,
                funding_source_url,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::debug!(
            "`User(id: {})` linked `BankAccount(id: {})`",
            user.id,
            bank_account.id,
        );

        self.home_views().invalidate(&user.id).await;

        Ok(Completion)
    }
}

/// Error of [`ExchangePublicToken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Aggregator`] failed to exchange the token, read the accounts, or
    /// create a processor token.
    #[display("`Aggregator` operation failed: {_0}")]
    #[from]
    Aggregator(aggregator::Error),

    /// Linked item has no accounts.
    #[display("`Item(id: {_0})` has no accounts")]
    NoAccounts(#[error(not(source))] item::Id),

    /// [`User`] is not a customer of the [`Payments`] rails.
    #[display("`User` has no payment rails customer")]
    MissingCustomer,

    /// [`Payments`] rails failed to create a funding source.
    #[display("`Payments` operation failed: {_0}")]
    #[from]
    Payments(payments::Error),

    /// [`Payments`] rails didn't report the created funding source.
    #[display("Funding source was not created")]
    FundingSourceNotCreated,

    /// Recording the [`BankAccount`] failed.
    #[display("Failed to record `BankAccount`: {_0}")]
    #[from]
    BankAccount(create_bank_account::ExecutionError),
}

#[cfg(test)]
mod spec {
    use common::{Currency, Money};

    use crate::{
        domain::{account, bank_account::SharableId, user, Account, User},
        infra::mock::{op, Mock},
        read::accounts::Summary,
        Command as _, Service,
    };

    use super::{Completion, ExchangePublicToken, ExecutionError};

    const FUNDING_SOURCE: &str =
        "https://api-sandbox.dwolla.com/funding-sources/fs-1";

    fn user(customer: Option<&str>) -> User {
        User {
            id: "user-1".into(),
            name: user::Name::new("Ada Lovelace").unwrap(),
            email: user::Email::new("ada@example.com").unwrap(),
            dwolla_customer_id: customer.map(Into::into),
        }
    }

    fn account(id: &str, name: &str) -> Account {
        Account {
            id: id.into(),
            name: name.into(),
            official_name: None,
            mask: None,
            kind: "depository".into(),
            subtype: Some("checking".into()),
            balances: account::Balances {
                current: Money::from_f64(100.0, Currency::Usd),
                available: None,
            },
        }
    }

    fn cmd(customer: Option<&str>) -> ExchangePublicToken {
        ExchangePublicToken {
            public_token: "public-sandbox-1".into(),
            user: user(customer),
        }
    }

    fn linked_mock() -> Mock {
        Mock::new()
            .with_item("item-1", "access-1")
            .with_accounts(
                "access-1",
                vec![account("A", "Checking"), account("B", "Savings")],
            )
            .with_funding_source(FUNDING_SOURCE)
    }

    #[tokio::test]
    async fn performs_steps_in_order() {
        let mock = linked_mock();

        let out = Service::mocked(&mock)
            .execute(cmd(Some("customer-1")))
            .await
            .unwrap();

        assert_eq!(out, Completion);
        assert_eq!(out.to_string(), "complete");
        assert_eq!(
            mock.calls(),
            [
                op::PUBLIC_TOKEN_EXCHANGE,
                op::ACCOUNTS_GET,
                op::PROCESSOR_TOKEN_CREATE,
                op::FUNDING_SOURCE_ADD,
                op::BANK_ACCOUNT_CREATE,
            ],
        );
    }

    #[tokio::test]
    async fn links_first_account() {
        let mock = linked_mock();

        _ = Service::mocked(&mock)
            .execute(cmd(Some("customer-1")))
            .await
            .unwrap();

        let [linked] = <[_; 1]>::try_from(mock.bank_accounts()).unwrap();
        assert_eq!(linked.user_id.as_ref(), "user-1");
        assert_eq!(linked.bank_id.as_ref(), "item-1");
        assert_eq!(linked.account_id.as_ref(), "A");
        assert_eq!(linked.access_token.expose(), "access-1");
        assert_eq!(linked.funding_source_url.as_str(), FUNDING_SOURCE);
        assert_eq!(linked.sharable_id, SharableId::encrypt(&"A".into()));
        assert_eq!(linked.sharable_id.decrypt().unwrap().as_ref(), "A");
    }

    #[tokio::test]
    async fn never_records_without_funding_source() {
        let mock = Mock::new().with_accounts(
            "access-1",
            vec![account("A", "Checking")],
        );

        let err = Service::mocked(&mock)
            .execute(cmd(Some("customer-1")))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::FundingSourceNotCreated,
        ));
        assert_eq!(mock.count(op::FUNDING_SOURCE_ADD), 1);
        assert_eq!(mock.count(op::BANK_ACCOUNT_CREATE), 0);
    }

    #[tokio::test]
    async fn fails_without_accounts() {
        let mock = Mock::new().with_funding_source(FUNDING_SOURCE);

        let err = Service::mocked(&mock)
            .execute(cmd(Some("customer-1")))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoAccounts(_)));
        assert_eq!(mock.calls(), [op::PUBLIC_TOKEN_EXCHANGE, op::ACCOUNTS_GET]);
    }

    #[tokio::test]
    async fn fails_for_user_without_customer() {
        let mock = linked_mock();

        let err = Service::mocked(&mock).execute(cmd(None)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::MissingCustomer));
        assert_eq!(mock.count(op::FUNDING_SOURCE_ADD), 0);
        assert_eq!(mock.count(op::BANK_ACCOUNT_CREATE), 0);
    }

    #[tokio::test]
    async fn aborts_on_failed_step() {
        let mock = linked_mock().failing(op::PROCESSOR_TOKEN_CREATE);

        let err = Service::mocked(&mock)
            .execute(cmd(Some("customer-1")))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Aggregator(_)));
        assert_eq!(
            mock.calls(),
            [
                op::PUBLIC_TOKEN_EXCHANGE,
                op::ACCOUNTS_GET,
                op::PROCESSOR_TOKEN_CREATE,
            ],
        );
    }

    #[tokio::test]
    async fn invalidates_home_view() {
        let mock = linked_mock();
        let service = Service::mocked(&mock);
        let user_id = user::Id::from("user-1");
        let generation = service.home_views().generation().await;
        service
            .home_views()
            .put(
                user_id.clone(),
                Summary::new(vec![]),
                std::time::Duration::from_secs(60),
                generation,
            )
            .await;
        assert!(service.home_views().get(&user_id).await.is_some());

        _ = service.execute(cmd(Some("customer-1"))).await.unwrap();

        assert_eq!(service.home_views().get(&user_id).await, None);
    }
}
