//! Shared definitions of the REST clients.

use derive_more::{Display, Error as StdError, From};

/// Error of a call to a remote REST API.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request couldn't be performed, or its response couldn't be read.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Remote API rejected the request.
    #[display("`{operation}` responded with `{status}` status: {detail}")]
    #[from(ignore)]
    Status {
        /// Name of the rejected operation.
        operation: &'static str,

        /// [`http::StatusCode`] of the response.
        status: http::StatusCode,

        /// Body of the response, describing the rejection.
        detail: String,
    },

    /// Remote API responded with data not matching the expectations.
    #[display("`{operation}` returned malformed data: {detail}")]
    #[from(ignore)]
    Malformed {
        /// Name of the operation.
        operation: &'static str,

        /// Description of what's wrong with the data.
        detail: String,
    },
}

impl Error {
    /// Returns the [`http::StatusCode`] the remote API rejected the request
    /// with, if any.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status(),
            Self::Malformed { .. } => None,
        }
    }

    /// Indicates whether the remote API rejected the request because of
    /// missing or invalid credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: http::StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }
}

/// Checks the [`reqwest::Response`] status, returning the response on success
/// or an [`Error::Status`] with the response body otherwise.
///
/// # Errors
///
/// If the response status is not a success one.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(Error::Status {
        operation,
        status,
        detail,
    })
}

/// Joins the `base` URL and the `path` into a single URL string.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/'),
    )
}
