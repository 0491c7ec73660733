//! Infrastructure layer.
//!
//! Every collaborator of the [`Service`] is a remote hosted API, abstracted
//! behind a [`Handler`] alias, so that each remote call is a separate
//! operation with its own request and response types.
//!
//! [`Handler`]: common::Handler
//! [`Service`]: crate::Service

pub mod aggregator;
pub mod http;
pub mod identity;
#[cfg(test)]
pub(crate) mod mock;
pub mod payments;

#[cfg(feature = "appwrite")]
pub use self::identity::{appwrite, Appwrite};
#[cfg(feature = "dwolla")]
pub use self::payments::{dwolla, Dwolla};
#[cfg(feature = "plaid")]
pub use self::aggregator::{plaid, Plaid};
pub use self::{
    aggregator::Aggregator, identity::Identity, payments::Payments,
};
