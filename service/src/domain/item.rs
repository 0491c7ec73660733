//! Aggregator [`Item`] definitions.
//!
//! An item is one end-user connection to a bank, as seen by the bank data
//! aggregator.

use derive_more::{AsRef, Display, From};

/// Credentials of a linked item, obtained by exchanging a public token.
#[derive(Clone, Debug)]
pub struct Item {
    /// [`Id`] of the item.
    pub id: Id,

    /// [`AccessToken`] to the item's data.
    pub access_token: AccessToken,
}

/// ID of an [`Item`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Id(String);

/// Durable secret credential to an [`Item`]'s data.
#[derive(AsRef, Clone, derive_more::Debug, Eq, From, PartialEq)]
#[as_ref(str)]
#[debug("AccessToken(..)")]
#[from(String, &str)]
pub struct AccessToken(String);

impl AccessToken {
    /// Exposes this [`AccessToken`] as a string slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}
