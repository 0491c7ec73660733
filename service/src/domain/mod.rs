//! Domain definitions.

pub mod account;
pub mod bank_account;
pub mod funding_source;
pub mod item;
pub mod link;
pub mod processor;
pub mod user;

use uuid::Uuid;

pub use self::{account::Account, bank_account::BankAccount, user::User};

/// Generates a new unique identifier accepted by the identity backend for
/// both accounts and documents.
///
/// It's 32 lowercase hexadecimal characters, so never starts with a special
/// character and fits the 36 characters limit.
fn unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}
