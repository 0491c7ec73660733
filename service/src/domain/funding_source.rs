//! Funding source definitions.
//!
//! A funding source is the payment rails' representation of a bank account
//! usable for transfers.

use std::str::FromStr;

use derive_more::{AsRef, Display, From};

/// ID of a customer of the payment rails.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct CustomerId(String);

/// URL of a created funding source.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
pub struct Url(url::Url);

impl Url {
    /// Returns this [`Url`] as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Url {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
