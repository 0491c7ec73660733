//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Session of a [`User`] issued by the identity backend.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of this [`Session`].
    pub id: Id,

    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`Secret`] authenticating requests on behalf of the [`User`].
    pub secret: Secret,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: ExpirationDateTime,
}

/// ID of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Id(String);

/// Opaque secret of a [`Session`], carried by the session cookie.
///
/// Redacted in [`Debug`] output.
///
/// [`Debug`]: std::fmt::Debug
#[derive(AsRef, Clone, derive_more::Debug, Eq, From, PartialEq)]
#[as_ref(str)]
#[debug("Secret(..)")]
#[from(String, &str)]
pub struct Secret(String);

impl Secret {
    /// Indicates whether this [`Secret`] carries no value.
    ///
    /// The identity backend returns an empty secret for sessions created
    /// without administrative privileges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exposes this [`Secret`] as a string slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
