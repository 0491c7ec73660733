//! [`SharableId`] definitions.

use std::string::FromUtf8Error;

use base64::{engine::general_purpose::STANDARD, DecodeError, Engine as _};
use derive_more::{AsRef, Display, Error, From};

use crate::domain::account;

/// Reversibly obfuscated [`account::Id`], safe to share with other users
/// (e.g. as a transfer recipient).
///
/// This is an obfuscation, not an encryption: anyone may decode it.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct SharableId(String);

impl SharableId {
    /// Obfuscates the provided [`account::Id`] into a [`SharableId`].
    #[must_use]
    pub fn encrypt(account_id: &account::Id) -> Self {
        Self(STANDARD.encode(account_id.as_ref()))
    }

    /// Wraps an already obfuscated string into a [`SharableId`].
    #[must_use]
    pub fn new_unchecked(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Recovers the [`account::Id`] this [`SharableId`] was made from.
    ///
    /// # Errors
    ///
    /// If this [`SharableId`] wasn't produced by [`SharableId::encrypt()`].
    pub fn decrypt(&self) -> Result<account::Id, DecryptError> {
        let bytes = STANDARD.decode(&self.0)?;
        Ok(String::from_utf8(bytes)?.into())
    }
}

/// Error of [`SharableId::decrypt()`].
#[derive(Clone, Debug, Display, Error, From, PartialEq)]
pub enum DecryptError {
    /// Not a valid Base64 string.
    #[display("not a Base64 string: {_0}")]
    Base64(DecodeError),

    /// Decoded bytes are not a valid UTF-8 string.
    #[display("not a UTF-8 string: {_0}")]
    Utf8(FromUtf8Error),
}
