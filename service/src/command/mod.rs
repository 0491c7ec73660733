//! [`Command`] definition.

pub mod create_bank_account;
pub mod create_link_token;
pub mod create_user;
pub mod create_user_session;
pub mod delete_user_session;
pub mod exchange_public_token;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_bank_account::CreateBankAccount,
    create_link_token::CreateLinkToken, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_user_session::DeleteUserSession,
    exchange_public_token::ExchangePublicToken,
};
