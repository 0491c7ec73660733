//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use smart_default::SmartDefault;

#[cfg(doc)]
use infra::{Aggregator, Identity, Payments};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Time a computed [`read::accounts::Summary`] of a user stays cached.
    #[default(Duration::from_secs(60))]
    pub home_view_ttl: Duration,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Idp, Agg, Pay> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Identity`] backend of this [`Service`].
    identity: Idp,

    /// Bank data [`Aggregator`] of this [`Service`].
    aggregator: Agg,

    /// [`Payments`] rails of this [`Service`].
    payments: Pay,

    /// Cached [`read::accounts::Summary`]s of users.
    home_views: read::accounts::Cache,
}

impl<Idp, Agg, Pay> Service<Idp, Agg, Pay> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(
        config: Config,
        identity: Idp,
        aggregator: Agg,
        payments: Pay,
    ) -> Self {
        Self {
            config,
            identity,
            aggregator,
            payments,
            home_views: read::accounts::Cache::default(),
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Identity`] backend of this [`Service`].
    #[must_use]
    pub fn identity(&self) -> &Idp {
        &self.identity
    }

    /// Returns bank data [`Aggregator`] of this [`Service`].
    #[must_use]
    pub fn aggregator(&self) -> &Agg {
        &self.aggregator
    }

    /// Returns [`Payments`] rails of this [`Service`].
    #[must_use]
    pub fn payments(&self) -> &Pay {
        &self.payments
    }

    /// Returns cached [`read::accounts::Summary`]s of this [`Service`].
    pub(crate) fn home_views(&self) -> &read::accounts::Cache {
        &self.home_views
    }
}

#[cfg(test)]
impl Service<infra::mock::Mock, infra::mock::Mock, infra::mock::Mock> {
    /// Creates a new [`Service`] backed by the provided [`infra::mock::Mock`]
    /// for all its collaborators.
    pub(crate) fn mocked(mock: &infra::mock::Mock) -> Self {
        Self::new(Config::default(), mock.clone(), mock.clone(), mock.clone())
    }
}
