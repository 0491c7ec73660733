//! [`Command`] for creating a [`link::Token`].

use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{link, User},
    infra::{
        aggregator::{self, LinkTokenCreate},
        Aggregator,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`link::Token`] letting the [`User`] link a
/// bank in the client widget.
#[derive(Clone, Debug)]
pub struct CreateLinkToken {
    /// [`User`] to scope the [`link::Token`] to.
    pub user: User,
}

impl CreateLinkToken {
    /// [`link::Product`]s every [`link::Token`] is requested for.
    const PRODUCTS: [link::Product; 1] = [link::Product::Auth];

    /// [`link::CountryCode`]s every [`link::Token`] is requested for.
    const COUNTRY_CODES: [link::CountryCode; 1] = [link::CountryCode::Us];
}

impl<Idp, Agg, Pay> Command<CreateLinkToken> for Service<Idp, Agg, Pay>
where
    Agg: Aggregator<
        LinkTokenCreate,
        Ok = link::Token,
        Err = Traced<aggregator::Error>,
    >,
{
    type Ok = link::Token;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CreateLinkToken { user }: CreateLinkToken,
    ) -> Result<Self::Ok, Self::Err> {
        self.aggregator()
            .execute(LinkTokenCreate {
                client_user_id: user.id,
                client_name: user.name,
                products: CreateLinkToken::PRODUCTS.to_vec(),
                language: link::Language::En,
                country_codes: CreateLinkToken::COUNTRY_CODES.to_vec(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`CreateLinkToken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Aggregator`] error.
    #[display("`Aggregator` operation failed: {_0}")]
    Aggregator(aggregator::Error),
}
