//! Bank linking definitions.

use derive_more::{AsRef, Display, From};
use serde::Serialize;

/// Short-lived token authorizing a client widget to start linking a bank.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Token(String);

/// Token representing a completed linking session of a client widget, to be
/// exchanged for durable item credentials.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct PublicToken(String);

/// Aggregator product a [`Token`] is requested for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Account and routing numbers.
    Auth,
}

/// Country whose institutions a [`Token`] may link.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryCode {
    /// United States.
    Us,
}

/// Language of the linking widget.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
}
