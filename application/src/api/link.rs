//! Bank linking definitions.

use derive_more::{AsRef, Display};
use juniper::{GraphQLObject, GraphQLScalar};
use service::domain;

use crate::Context;

/// Short-lived token authorizing the linking widget to start linking a bank.
#[derive(AsRef, Clone, Debug, Display, GraphQLScalar)]
#[graphql(name = "LinkToken", transparent)]
pub struct Token(String);

impl From<domain::link::Token> for Token {
    fn from(token: domain::link::Token) -> Self {
        Self(token.to_string())
    }
}

/// Token of a completed linking session, issued by the linking widget.
#[derive(AsRef, Clone, Debug, Display, GraphQLScalar)]
#[graphql(name = "LinkPublicToken", transparent)]
pub struct PublicToken(String);

impl From<PublicToken> for domain::link::PublicToken {
    fn from(token: PublicToken) -> Self {
        token.0.into()
    }
}

/// Result of a `LinkToken` creation.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "CreateLinkTokenResult")]
pub struct CreateTokenResult {
    /// Created `LinkToken`.
    pub link_token: Token,
}

/// Result of a `LinkPublicToken` exchange.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "ExchangePublicTokenResult")]
pub struct ExchangeResult {
    /// Status of the exchange, always `complete` on success.
    pub public_token_exchange: String,
}
