//! In-memory double of all the remote collaborators, recording the calls.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{
        funding_source, item, link, processor,
        user::{self, session},
        Account, BankAccount, User,
    },
    infra::{
        aggregator::{
            self, AccountsGet, ItemPublicTokenExchange, LinkTokenCreate,
            ProcessorTokenCreate,
        },
        http, identity,
        payments::{self, AddFundingSource},
        Aggregator, Identity, Payments,
    },
};

/// Names of the operations recorded by the [`Mock`].
pub(crate) mod op {
    pub(crate) const ACCOUNT_CREATE: &str = "account.create";
    pub(crate) const SESSION_CREATE: &str = "session.create";
    pub(crate) const SESSION_GET: &str = "session.get";
    pub(crate) const SESSION_DELETE: &str = "session.delete";
    pub(crate) const BANK_ACCOUNT_CREATE: &str = "bank_account.create";
    pub(crate) const BANK_ACCOUNT_LIST: &str = "bank_account.list";
    pub(crate) const LINK_TOKEN_CREATE: &str = "link_token.create";
    pub(crate) const PUBLIC_TOKEN_EXCHANGE: &str = "public_token.exchange";
    pub(crate) const ACCOUNTS_GET: &str = "accounts.get";
    pub(crate) const PROCESSOR_TOKEN_CREATE: &str = "processor_token.create";
    pub(crate) const FUNDING_SOURCE_ADD: &str = "funding_source.add";
}

/// Recorded state of a [`Mock`].
#[derive(Debug, Default)]
struct State {
    /// Operations performed so far, in order.
    calls: Vec<&'static str>,

    /// Operations to fail.
    failing: HashSet<&'static str>,

    /// [`User`] owning every [`session::Secret`].
    user: Option<User>,

    /// Stored [`BankAccount`] documents.
    bank_accounts: Vec<BankAccount>,

    /// [`item::Item`] returned by a public token exchange.
    item: Option<item::Item>,

    /// [`Account`]s per access token.
    accounts: HashMap<String, Vec<Account>>,

    /// Funding source URL returned by the payment rails.
    funding_source: Option<funding_source::Url>,

    /// Requests of the last linking token.
    link_token_request: Option<LinkTokenCreate>,
}

/// In-memory implementation of [`Identity`], [`Aggregator`] and [`Payments`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Mock(Arc<Mutex<State>>);

impl Mock {
    /// Creates a new empty [`Mock`].
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every session belong to the provided [`User`].
    pub(crate) fn with_user(self, user: User) -> Self {
        self.state().user = Some(user);
        self
    }

    /// Makes the public token exchange return an item with the provided
    /// access token.
    pub(crate) fn with_item(self, id: &str, access_token: &str) -> Self {
        self.state().item = Some(item::Item {
            id: id.into(),
            access_token: access_token.into(),
        });
        self
    }

    /// Makes the aggregator report the provided [`Account`]s for the access
    /// token.
    pub(crate) fn with_accounts(
        self,
        access_token: &str,
        accounts: Vec<Account>,
    ) -> Self {
        self.state().accounts.insert(access_token.into(), accounts);
        self
    }

    /// Makes the payment rails report the provided funding source URL.
    pub(crate) fn with_funding_source(self, url: &str) -> Self {
        self.state().funding_source =
            Some(url.parse().unwrap_or_else(|e| panic!("{url}: {e}")));
        self
    }

    /// Pre-populates the stored [`BankAccount`] documents.
    pub(crate) fn with_bank_accounts(self, accounts: Vec<BankAccount>) -> Self {
        self.state().bank_accounts = accounts;
        self
    }

    /// Makes the provided [`op`]eration fail.
    pub(crate) fn failing(self, operation: &'static str) -> Self {
        _ = self.state().failing.insert(operation);
        self
    }

    /// Returns the operations performed so far, in order.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    /// Returns how many times the provided [`op`]eration was performed.
    pub(crate) fn count(&self, operation: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == operation).count()
    }

    /// Returns the stored [`BankAccount`] documents.
    pub(crate) fn bank_accounts(&self) -> Vec<BankAccount> {
        self.state().bank_accounts.clone()
    }

    /// Returns the last [`LinkTokenCreate`] request.
    pub(crate) fn link_token_request(&self) -> Option<LinkTokenCreate> {
        self.state().link_token_request.clone()
    }

    /// Locks the [`State`] of this [`Mock`].
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the [`op`]eration, failing if it's configured to.
    fn record(&self, operation: &'static str) -> Result<(), http::Error> {
        let mut state = self.state();
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(http::Error::Status {
                operation,
                status: ::http::StatusCode::INTERNAL_SERVER_ERROR,
                detail: "mocked failure".into(),
            });
        }
        Ok(())
    }

    /// Returns the [`User`] owning sessions, if any.
    fn user(&self) -> Option<User> {
        self.state().user.clone()
    }
}

impl Identity<Insert<user::NewAccount>> for Mock {
    type Ok = User;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Insert(account): Insert<user::NewAccount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::ACCOUNT_CREATE)
            .map_err(tracerr::from_and_wrap!(=> identity::Error))?;
        let user = User {
            id: account.id,
            name: account.name,
            email: account.email,
            dwolla_customer_id: None,
        };
        self.state().user = Some(user.clone());
        Ok(user)
    }
}

impl Identity<Insert<user::Credentials>> for Mock {
    type Ok = user::Session;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Insert(credentials): Insert<user::Credentials>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::SESSION_CREATE)
            .map_err(tracerr::from_and_wrap!(=> identity::Error))?;
        let user_id = self
            .user()
            .filter(|u| u.email == credentials.email)
            .map_or_else(|| "user-1".into(), |u| u.id);
        Ok(user::Session {
            id: "session-1".into(),
            user_id,
            secret: "secret-1".into(),
            expires_at: session::ExpirationDateTime::now()
                + Duration::from_secs(60 * 60),
        })
    }
}

impl Identity<Select<By<Option<User>, session::Secret>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<User>, session::Secret>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::SESSION_GET)
            .map_err(tracerr::from_and_wrap!(=> identity::Error))?;
        Ok(self.user())
    }
}

impl Identity<Delete<session::Secret>> for Mock {
    type Ok = ();
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        _: Delete<session::Secret>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::SESSION_DELETE)
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

impl Identity<Insert<BankAccount>> for Mock {
    type Ok = BankAccount;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Insert(account): Insert<BankAccount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::BANK_ACCOUNT_CREATE)
            .map_err(tracerr::from_and_wrap!(=> identity::Error))?;
        self.state().bank_accounts.push(account.clone());
        Ok(account)
    }
}

impl Identity<Select<By<Vec<BankAccount>, user::Id>>> for Mock {
    type Ok = Vec<BankAccount>;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<BankAccount>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::BANK_ACCOUNT_LIST)
            .map_err(tracerr::from_and_wrap!(=> identity::Error))?;
        Ok(self
            .state()
            .bank_accounts
            .iter()
            .filter(|a| &a.user_id == by.as_inner())
            .cloned()
            .collect())
    }
}

impl Aggregator<LinkTokenCreate> for Mock {
    type Ok = link::Token;
    type Err = Traced<aggregator::Error>;

    async fn execute(
        &self,
        req: LinkTokenCreate,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::LINK_TOKEN_CREATE)
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))?;
        self.state().link_token_request = Some(req);
        Ok("link-sandbox-1".into())
    }
}

impl Aggregator<ItemPublicTokenExchange> for Mock {
    type Ok = item::Item;
    type Err = Traced<aggregator::Error>;

    async fn execute(
        &self,
        _: ItemPublicTokenExchange,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::PUBLIC_TOKEN_EXCHANGE)
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))?;
        Ok(self.state().item.clone().unwrap_or_else(|| item::Item {
            id: "item-1".into(),
            access_token: "access-1".into(),
        }))
    }
}

impl Aggregator<AccountsGet> for Mock {
    type Ok = Vec<Account>;
    type Err = Traced<aggregator::Error>;

    async fn execute(&self, req: AccountsGet) -> Result<Self::Ok, Self::Err> {
        self.record(op::ACCOUNTS_GET)
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))?;
        Ok(self
            .state()
            .accounts
            .get(req.access_token.expose())
            .cloned()
            .unwrap_or_default())
    }
}

impl Aggregator<ProcessorTokenCreate> for Mock {
    type Ok = processor::Token;
    type Err = Traced<aggregator::Error>;

    async fn execute(
        &self,
        req: ProcessorTokenCreate,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::PROCESSOR_TOKEN_CREATE)
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))?;
        Ok(format!("processor-{}", req.account_id).into())
    }
}

impl Payments<AddFundingSource> for Mock {
    type Ok = Option<funding_source::Url>;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        _: AddFundingSource,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(op::FUNDING_SOURCE_ADD)
            .map_err(tracerr::from_and_wrap!(=> payments::Error))?;
        Ok(self.state().funding_source.clone())
    }
}
