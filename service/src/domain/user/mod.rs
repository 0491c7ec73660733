//! [`User`] definitions.

pub mod session;

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display, From, Into};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};

use crate::domain::funding_source;

pub use self::session::Session;

/// Dashboard user, as known by the identity backend.
///
/// Never mutated by this service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// ID of this [`User`] as a customer of the payment rails, if any.
    pub dwolla_customer_id: Option<funding_source::CustomerId>,
}

/// ID of a [`User`] in the identity backend.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Id(String);

impl Id {
    /// Generates a new unique [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(super::unique_id())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Maximum length of a [`Name`] accepted by the identity backend.
    const MAX_LEN: usize = 128;

    /// Creates a new [`Name`] without checking it.
    ///
    /// Intended for names coming back from the identity backend, which has
    /// already validated them.
    #[must_use]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Composes a full [`Name`] out of the first and last ones.
    ///
    /// [`None`] is returned if the result is too long.
    #[must_use]
    pub fn full(first: &Self, last: &Self) -> Option<Self> {
        Self::new(format!("{first} {last}"))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name
            && !name.is_empty()
            && name.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Password of a [`User`].
///
/// Never displayed, and redacted in [`Debug`] output.
///
/// [`Debug`]: std::fmt::Debug
#[derive(Clone, derive_more::Debug, Eq, PartialEq)]
#[debug("Password(..)")]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Exposes this [`Password`] as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `password` is a valid [`Password`].
    ///
    /// The identity backend requires 8 to 256 characters.
    fn check(password: impl AsRef<str>) -> bool {
        let len = password.as_ref().chars().count();
        (8..=256).contains(&len)
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] without checking it.
    ///
    /// Intended for addresses coming back from the identity backend, which
    /// has already validated them.
    #[must_use]
    pub fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Loose `local@domain.tld` shape; the identity backend performs the
        /// authoritative validation.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Data of a new [`User`] account to be registered.
#[derive(Clone, Debug)]
pub struct NewAccount {
    /// Pre-generated [`Id`] of the account.
    pub id: Id,

    /// [`Email`] to register the account with.
    pub email: Email,

    /// [`Password`] to register the account with.
    pub password: secrecy::SecretBox<Password>,

    /// Full [`Name`] of the account owner.
    pub name: Name,
}

/// Email and password pair identifying a [`User`].
#[derive(Clone, Debug)]
pub struct Credentials {
    /// [`Email`] of the [`User`].
    pub email: Email,

    /// [`Password`] of the [`User`].
    pub password: secrecy::SecretBox<Password>,
}
