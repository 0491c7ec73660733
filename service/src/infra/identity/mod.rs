//! [`Identity`] backend definitions.
//!
//! The identity backend owns [`User`] accounts and their [`Session`]s, and
//! stores [`BankAccount`] documents. Supported operations:
//! - [`Insert`]`<`[`user::NewAccount`]`>` registers an account;
//! - [`Insert`]`<`[`user::Credentials`]`>` creates a [`Session`];
//! - [`Select`]`<`[`By`]`<`[`Option`]`<`[`User`]`>, `[`session::Secret`]`>>`
//!   reads the [`User`] of a [`Session`];
//! - [`Delete`]`<`[`session::Secret`]`>` deletes a [`Session`];
//! - [`Insert`]`<`[`BankAccount`]`>` creates a [`BankAccount`] document;
//! - [`Select`]`<`[`By`]`<`[`Vec`]`<`[`BankAccount`]`>, `[`user::Id`]`>>`
//!   lists the [`BankAccount`] documents of a [`User`].
//!
//! [`BankAccount`]: crate::domain::BankAccount
//! [`By`]: common::operations::By
//! [`Delete`]: common::operations::Delete
//! [`Insert`]: common::operations::Insert
//! [`Select`]: common::operations::Select
//! [`Session`]: crate::domain::user::Session
//! [`session::Secret`]: crate::domain::user::session::Secret
//! [`User`]: crate::domain::User
//! [`user::Credentials`]: crate::domain::user::Credentials
//! [`user::Id`]: crate::domain::user::Id
//! [`user::NewAccount`]: crate::domain::user::NewAccount

#[cfg(feature = "appwrite")]
pub mod appwrite;

use derive_more::{Display, Error as StdError, From};

use crate::infra::http;

#[cfg(feature = "appwrite")]
pub use self::appwrite::Appwrite;

/// Identity backend operation.
pub use common::Handler as Identity;

/// [`Identity`] backend error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Remote call to the backend failed.
    #[display("identity backend call failed: {_0}")]
    Remote(http::Error),
}
