//! Aggregator [`Account`] definitions.

use common::Money;
use derive_more::{AsRef, Display, From};

/// Bank account metadata, as reported by the bank data aggregator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Account {
    /// [`Id`] of this [`Account`].
    pub id: Id,

    /// Display name of this [`Account`] (e.g. "Plaid Checking").
    pub name: String,

    /// Name of this [`Account`] given by the bank, if any.
    pub official_name: Option<String>,

    /// Last digits of the account number, if known.
    pub mask: Option<String>,

    /// Kind of this [`Account`] (e.g. `depository`, `credit`).
    pub kind: String,

    /// Subtype of this [`Account`] (e.g. `checking`, `savings`).
    pub subtype: Option<String>,

    /// [`Balances`] of this [`Account`].
    pub balances: Balances,
}

/// ID of an [`Account`] in the bank data aggregator.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Id(String);

/// Balances of an [`Account`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Balances {
    /// Total amount of funds in the [`Account`].
    pub current: Option<Money>,

    /// Amount of funds available to be withdrawn from the [`Account`].
    pub available: Option<Money>,
}
