//! [`Query`] definition.

pub mod accounts;
pub mod user;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{identity, Identity},
    Service,
};

pub use self::accounts::Accounts;

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from the [`Identity`] backend.
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct IdentityQuery<T>(T);

impl<W, B> IdentityQuery<By<W, B>> {
    /// Creates a new [`IdentityQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Idp, Agg, Pay, W, B> Query<IdentityQuery<By<W, B>>>
    for Service<Idp, Agg, Pay>
where
    Idp: Identity<Select<By<W, B>>, Ok = W, Err = Traced<identity::Error>>,
{
    type Ok = W;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        IdentityQuery(by): IdentityQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.identity()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
