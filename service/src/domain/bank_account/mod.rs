//! [`BankAccount`] definitions.

pub mod sharable_id;

use derive_more::{AsRef, Display, From};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{account, funding_source, item, user};

pub use self::sharable_id::SharableId;

/// Record of a bank account linked by a [`User`], stored as a document of the
/// identity backend.
///
/// Created once per successful public token exchange, never updated nor
/// deleted by this service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BankAccount {
    /// [`Id`] of this [`BankAccount`] document.
    pub id: Id,

    /// ID of the [`User`] who linked this [`BankAccount`].
    pub user_id: user::Id,

    /// ID of the aggregator item this [`BankAccount`] belongs to.
    pub bank_id: item::Id,

    /// ID of the aggregator account.
    pub account_id: account::Id,

    /// Access token to the aggregator item.
    ///
    /// Stored as is, without any encryption at rest.
    pub access_token: item::AccessToken,

    /// URL of the payment rails funding source backed by this account.
    pub funding_source_url: funding_source::Url,

    /// [`SharableId`] of the aggregator account.
    pub sharable_id: SharableId,
}

/// ID of a [`BankAccount`] document.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Id(String);

impl Id {
    /// Generates a new unique [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(crate::domain::unique_id())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}
