//! [`Context`]-related definitions.

use std::sync::{
    atomic::{self, AtomicU16},
    Mutex, PoisonError,
};

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    domain::{self, user::session},
    query, Query as _,
};
use tokio::sync::OnceCell;
use tracing as log;

use crate::{define_error, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// [`SessionCookie`] settings.
    session_cookie: SessionCookie,

    /// [`session::Secret`] carried by the request, if any.
    session_secret: Option<session::Secret>,

    /// Current [`domain::User`], if authenticated.
    current_user: OnceCell<Option<domain::User>>,

    /// [`CookieChange`] to apply to the response.
    cookie_change: Mutex<Option<CookieChange>>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    ///
    /// Server errors are logged.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            if err.status_code.is_server_error() {
                log::error!("{err}");
            }
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns the [`session::Secret`] carried by the current request, if
    /// any.
    #[must_use]
    pub fn session_secret(&self) -> Option<&session::Secret> {
        self.session_secret.as_ref()
    }

    /// Tries to get the current [`domain::User`] for this [`Context`].
    ///
    /// Never fails: any error of the identity backend is logged and results
    /// in [`None`].
    pub async fn try_current_user(&self) -> Option<&domain::User> {
        self.current_user
            .get_or_init(|| async {
                let secret = self.session_secret.clone()?;
                self.service
                    .execute(query::user::BySession::by(secret))
                    .await
                    .unwrap_or_else(|e| {
                        log::warn!("failed to read current `User`: {e}");
                        None
                    })
            })
            .await
            .as_ref()
    }

    /// Returns the current [`domain::User`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if the current HTTP request doesn't carry a valid session.
    pub async fn current_user(&self) -> Result<&domain::User, Error> {
        self.try_current_user()
            .await
            .ok_or_else(|| AuthError::AuthorizationRequired.into())
            .map_err(self.error())
    }

    /// Sets the session cookie carrying the provided [`session::Secret`] on
    /// the response.
    pub fn set_session_cookie(&self, secret: session::Secret) {
        self.change_cookie(CookieChange::Set(secret));
    }

    /// Removes the session cookie with the response.
    pub fn remove_session_cookie(&self) {
        self.change_cookie(CookieChange::Remove);
    }

    /// Applies the pending session cookie change (if any) to the provided
    /// [`CookieJar`].
    pub(crate) fn apply_session_cookie(&self, jar: CookieJar) -> CookieJar {
        let change = self
            .cookie_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match change {
            Some(change) => change.apply(jar, &self.session_cookie),
            None => jar,
        }
    }

    /// Records the provided [`CookieChange`], overriding the previous one.
    fn change_cookie(&self, change: CookieChange) {
        *self
            .cookie_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(change);
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| missing_extension("Service"))?;
        let session_cookie = parts
            .extensions
            .get::<SessionCookie>()
            .cloned()
            .ok_or_else(|| missing_extension("SessionCookie"))?;

        let session_secret = CookieJar::from_headers(&parts.headers)
            .get(&session_cookie.name)
            .map(|c| session::Secret::from(c.value()))
            .filter(|s| !s.is_empty());

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            session_cookie,
            session_secret,
            current_user: OnceCell::new(),
            cookie_change: Mutex::new(None),
        })
    }
}

/// Builds a [`JuniperResponse`] rejecting a request because of the missing
/// request extension.
fn missing_extension(name: &str) -> JuniperResponse {
    JuniperResponse {
        status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
        response: GraphQLBatchResponse::Single(GraphQLResponse::error(
            Error::internal(&format!("missing `{name}` extension"))
                .into_field_error(),
        )),
    }
}

/// Settings of the cookie carrying the [`session::Secret`].
#[derive(Clone, Debug)]
pub struct SessionCookie {
    /// Name of the cookie.
    pub name: String,

    /// Indicator whether the cookie is sent over HTTPS only.
    pub secure: bool,
}

impl SessionCookie {
    /// Builds the cookie carrying the provided [`session::Secret`].
    #[must_use]
    pub fn build(&self, secret: &session::Secret) -> Cookie<'static> {
        Cookie::build((self.name.clone(), secret.expose().to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .build()
    }

    /// Builds the cookie identifying the one to be removed.
    #[must_use]
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

/// Change of the session cookie requested while executing a GraphQL request.
#[derive(Clone, Debug)]
enum CookieChange {
    /// Session cookie must be set to the [`session::Secret`].
    Set(session::Secret),

    /// Session cookie must be removed.
    Remove,
}

impl CookieChange {
    /// Applies this [`CookieChange`] to the provided [`CookieJar`].
    fn apply(self, jar: CookieJar, cookie: &SessionCookie) -> CookieJar {
        match self {
            Self::Set(secret) => jar.add(cookie.build(&secret)),
            Self::Remove => jar.remove(cookie.removal()),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}
