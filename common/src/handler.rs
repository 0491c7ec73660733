//! [`Handler`] abstractions.

use std::future::Future;

/// Something able to execute an operation described by `Args`.
///
/// Commands, queries and remote collaborators of the service are all
/// expressed through this single trait, so that each operation is a separate
/// `impl` with its own success and error types.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
