//! Processor token definitions.

use derive_more::{AsRef, From};
use serde::Serialize;

/// Credential letting a payment processor access the aggregator's account
/// data without the raw access token.
#[derive(AsRef, Clone, derive_more::Debug, Eq, From, PartialEq)]
#[as_ref(str)]
#[debug("processor::Token(..)")]
#[from(String, &str)]
pub struct Token(String);

/// Payment processor a [`Token`] is created for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    /// Dwolla payment rails.
    Dwolla,
}
