//! [`Payments`] rails definitions.

#[cfg(feature = "dwolla")]
pub mod dwolla;

use derive_more::{Display, Error as StdError, From};

use crate::{
    domain::{funding_source, processor},
    infra::http,
};

#[cfg(feature = "dwolla")]
pub use self::dwolla::Dwolla;

/// Payment rails operation.
pub use common::Handler as Payments;

/// [`Payments`] rails error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Remote call to the payment rails failed.
    #[display("payment rails call failed: {_0}")]
    Remote(http::Error),
}

/// Request of a new funding source for a customer's bank account.
///
/// Results in the [`funding_source::Url`] of the created funding source, or
/// [`None`] if the payment rails didn't report one.
#[derive(Clone, Debug)]
pub struct AddFundingSource {
    /// Customer to add the funding source to.
    pub customer_id: funding_source::CustomerId,

    /// [`processor::Token`] granting access to the bank account data.
    pub processor_token: processor::Token,

    /// Display name of the bank account.
    pub bank_name: String,
}
