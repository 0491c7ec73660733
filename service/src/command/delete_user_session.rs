//! [`Command`] for deleting a [`Session`].

use common::operations::Delete;
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::user::session,
    infra::{identity, Identity},
    Service,
};

use super::Command;

/// [`Command`] for deleting the [`Session`] with the provided
/// [`session::Secret`].
#[derive(Clone, Debug)]
pub struct DeleteUserSession {
    /// [`session::Secret`] of the [`Session`] to delete.
    pub secret: session::Secret,
}

impl<Idp, Agg, Pay> Command<DeleteUserSession> for Service<Idp, Agg, Pay>
where
    Idp: Identity<
        Delete<session::Secret>,
        Ok = (),
        Err = Traced<identity::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DeleteUserSession { secret }: DeleteUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        self.identity()
            .execute(Delete(secret))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`DeleteUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Identity`] backend error.
    #[display("`Identity` operation failed: {_0}")]
    Identity(identity::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        infra::mock::{op, Mock},
        Command as _, Service,
    };

    use super::DeleteUserSession;

    #[tokio::test]
    async fn deletes_session() {
        let mock = Mock::new();

        Service::mocked(&mock)
            .execute(DeleteUserSession {
                secret: "secret-1".into(),
            })
            .await
            .unwrap();

        assert_eq!(mock.calls(), [op::SESSION_DELETE]);
    }

    #[tokio::test]
    async fn propagates_backend_failure() {
        let mock = Mock::new().failing(op::SESSION_DELETE);

        let res = Service::mocked(&mock)
            .execute(DeleteUserSession {
                secret: "secret-1".into(),
            })
            .await;

        assert!(res.is_err());
    }
}
