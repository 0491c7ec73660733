//! [`Account`]-related definitions.

use common::Money;
use derive_more::{Display, From};
use juniper::{graphql_object, GraphQLScalar};
use service::{
    domain::bank_account,
    read::accounts::{Entry, Summary},
};

use crate::Context;

/// Bank account linked by a `User`.
#[derive(Clone, Debug, From)]
pub struct Account(Entry);

/// Bank account linked by a `User`, along with its balances.
#[graphql_object(context = Context)]
impl Account {
    /// ID of this `Account` in the bank data aggregator.
    pub fn id(&self) -> &str {
        self.0.account.id.as_ref()
    }

    /// Display name of this `Account`.
    pub fn name(&self) -> &str {
        &self.0.account.name
    }

    /// Name of this `Account` given by the bank, if any.
    pub fn official_name(&self) -> Option<&str> {
        self.0.account.official_name.as_deref()
    }

    /// Last digits of the account number, if known.
    pub fn mask(&self) -> Option<&str> {
        self.0.account.mask.as_deref()
    }

    /// Kind of this `Account` (e.g. `depository`, `credit`).
    #[graphql(name = "type")]
    pub fn kind(&self) -> &str {
        &self.0.account.kind
    }

    /// Subtype of this `Account` (e.g. `checking`, `savings`).
    pub fn subtype(&self) -> Option<&str> {
        self.0.account.subtype.as_deref()
    }

    /// Total amount of funds in this `Account`.
    pub fn current_balance(&self) -> Option<Money> {
        self.0.account.balances.current
    }

    /// Amount of funds available for withdrawal from this `Account`.
    pub fn available_balance(&self) -> Option<Money> {
        self.0.account.balances.available
    }

    /// ID of the record describing the link of this `Account`.
    pub fn appwrite_item_id(&self) -> ItemId {
        self.0.document_id.clone().into()
    }

    /// ID of this `Account` which is safe to share with other `User`s.
    pub fn sharable_id(&self) -> &str {
        self.0.sharable_id.as_ref()
    }

    /// ID of the linked bank this `Account` belongs to.
    pub fn bank_id(&self) -> &str {
        self.0.bank_id.as_ref()
    }
}

/// ID of the record describing the link of an `Account`.
#[derive(Clone, Debug, Display, Eq, GraphQLScalar, PartialEq)]
#[graphql(name = "AccountItemId", transparent)]
pub struct ItemId(String);

impl From<bank_account::Id> for ItemId {
    fn from(id: bank_account::Id) -> Self {
        Self(id.to_string())
    }
}

impl From<ItemId> for bank_account::Id {
    fn from(id: ItemId) -> Self {
        id.0.into()
    }
}

/// Summary of all the `Account`s linked by a `User`.
#[derive(Clone, Debug, From)]
pub struct AccountsSummary(Summary);

/// Summary of all the `Account`s linked by a `User`.
#[graphql_object(context = Context)]
impl AccountsSummary {
    /// Linked `Account`s, in the order they were linked.
    pub fn accounts(&self) -> Vec<Account> {
        self.0.accounts.iter().cloned().map(Account).collect()
    }

    /// Number of linked banks.
    pub fn total_banks(&self) -> i32 {
        i32::try_from(self.0.total_banks).unwrap_or(i32::MAX)
    }

    /// Sum of the current balances in the currency of the first `Account`.
    ///
    /// Balances in other currencies are not included.
    pub fn total_current_balance(&self) -> Money {
        self.0.total_current_balance
    }
}
