//! Bank data [`Aggregator`] definitions.

#[cfg(feature = "plaid")]
pub mod plaid;

use derive_more::{Display, Error as StdError, From};

#[cfg(doc)]
use crate::domain::{item::Item, link::Token as LinkToken, Account};
use crate::{
    domain::{account, item, link, processor, user},
    infra::http,
};

#[cfg(feature = "plaid")]
pub use self::plaid::Plaid;

/// Bank data aggregator operation.
pub use common::Handler as Aggregator;

/// [`Aggregator`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Remote call to the aggregator failed.
    #[display("bank data aggregator call failed: {_0}")]
    Remote(http::Error),
}

/// Request of a new [`LinkToken`] for a [`user`].
#[derive(Clone, Debug)]
pub struct LinkTokenCreate {
    /// ID of the [`user`] the [`LinkToken`] is scoped to.
    pub client_user_id: user::Id,

    /// Name to display in the linking widget.
    pub client_name: user::Name,

    /// [`link::Product`]s to link the bank for.
    pub products: Vec<link::Product>,

    /// [`link::Language`] of the linking widget.
    pub language: link::Language,

    /// [`link::CountryCode`]s of the institutions to offer.
    pub country_codes: Vec<link::CountryCode>,
}

/// Request exchanging a [`link::PublicToken`] for the [`Item`] credentials.
#[derive(Clone, Debug)]
pub struct ItemPublicTokenExchange {
    /// [`link::PublicToken`] to exchange.
    pub public_token: link::PublicToken,
}

/// Request of all the [`Account`]s of an [`Item`].
#[derive(Clone, Debug)]
pub struct AccountsGet {
    /// [`item::AccessToken`] of the [`Item`].
    pub access_token: item::AccessToken,
}

/// Request of a new [`processor::Token`] for an [`Account`].
#[derive(Clone, Debug)]
pub struct ProcessorTokenCreate {
    /// [`item::AccessToken`] of the [`Item`] the [`Account`] belongs to.
    pub access_token: item::AccessToken,

    /// ID of the [`Account`].
    pub account_id: account::Id,

    /// [`processor::Processor`] to create the [`processor::Token`] for.
    pub processor: processor::Processor,
}
