//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};
use strum::{Display, EnumString};

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Creates a new [`Money`] from a floating point `amount`, as reported by
    /// bank data providers.
    ///
    /// [`None`] is returned if the `amount` is not a finite number.
    #[must_use]
    pub fn from_f64(amount: f64, currency: Currency) -> Option<Self> {
        Some(Self {
            amount: Decimal::try_from(amount).ok()?.normalize(),
            currency,
        })
    }

    /// Sums all the provided amounts having the given [`Currency`].
    ///
    /// Amounts in other currencies are skipped.
    #[must_use]
    pub fn total_of<'m>(
        currency: Currency,
        amounts: impl IntoIterator<Item = &'m Money>,
    ) -> Self {
        amounts
            .into_iter()
            .filter(|m| m.currency == currency)
            .fold(Self::zero(currency), |acc, m| Self {
                amount: acc.amount + m.amount,
                currency,
            })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_char_boundary(s.len() - 3) {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

/// [ISO 4217] currency of a [`Money`] amount.
///
/// Only the currencies of the countries bank linking is available in.
///
/// [ISO 4217]: https://en.wikipedia.org/wiki/ISO_4217
#[derive(
    Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar.
    #[default]
    Usd,

    /// Canadian Dollar.
    Cad,

    /// Euro.
    Eur,

    /// Pound Sterling.
    Gbp,
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}
