//! [`Command`] for creating a [`Session`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{
    user::{session::Secret, Password},
    User,
};
use crate::{
    domain::user::{self, Session},
    infra::{identity, Identity},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Session`] by [`User`] credentials.
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// [`user::Email`] of a [`User`].
    pub email: user::Email,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Idp, Agg, Pay> Command<CreateUserSession> for Service<Idp, Agg, Pay>
where
    Idp: Identity<
        Insert<user::Credentials>,
        Ok = Session,
        Err = Traced<identity::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { email, password } = cmd;

        let session = self
            .identity()
            .execute(Insert(user::Credentials { email, password }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if session.secret.is_empty() {
            return Err(tracerr::new!(E::MissingSecret));
        }

        Ok(session)
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Identity`] backend error.
    #[display("`Identity` operation failed: {_0}")]
    Identity(identity::Error),

    /// [`Session`] was created without a [`Secret`].
    #[display("`Session` was created without a secret")]
    MissingSecret,
}
