//! [`Command`] for creating a new [`User`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password};
use crate::{
    command::create_user_session::{self, CreateUserSession},
    domain::{
        user::{self, Session},
        User,
    },
    infra::{identity, Identity},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`] and signing it in.
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// First [`Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

/// Output of [`CreateUser`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`User`].
    pub user: User,

    /// [`Session`] of the created [`User`].
    pub session: Session,
}

impl<Idp, Agg, Pay> Command<CreateUser> for Service<Idp, Agg, Pay>
where
    Idp: Identity<
        Insert<user::NewAccount>,
        Ok = User,
        Err = Traced<identity::Error>,
    >,
    Self: Command<
        CreateUserSession,
        Ok = Session,
        Err = Traced<create_user_session::ExecutionError>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            first_name,
            last_name,
            email,
            password,
        } = cmd;

        let name = user::Name::full(&first_name, &last_name)
            .ok_or_else(|| tracerr::new!(E::NameTooLong))?;

        let user = self
            .identity()
            .execute(Insert(user::NewAccount {
                id: user::Id::new(),
                email: email.clone(),
                password: password.clone(),
                name,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // No compensation: the account stays registered even if signing in
        // fails.
        let session = self
            .execute(CreateUserSession { email, password })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { user, session })
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Identity`] backend failed to register the account.
    #[display("`Identity` failed to create an account: {_0}")]
    #[from]
    AccountCreation(identity::Error),

    /// Account was registered, but signing in failed.
    #[display("Failed to create a `Session`: {_0}")]
    #[from]
    SessionCreation(create_user_session::ExecutionError),

    /// Full name composed of the first and last ones is too long.
    #[display("Full name is too long")]
    NameTooLong,
}
