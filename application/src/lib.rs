//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use derive_more::Debug;
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::extract::JuniperRequest;
// Used in binary.
use axum_client_ip as _;
use futures as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, SessionCookie},
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<
    service::infra::Appwrite,
    service::infra::Plaid,
    service::infra::Dwolla,
>;

/// [`juniper`] GraphQL response.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        if response.is_ok() {
            Json(response).into_response()
        } else {
            (status_code, Json(response)).into_response()
        }
    }
}

/// GraphQL API handler.
///
/// Session cookie changes made while executing the request are applied to
/// the response.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    jar: CookieJar,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> (CookieJar, JuniperResponse) {
    let response = gql_request.execute(&*schema, &context).await;
    (
        context.apply_session_cookie(jar),
        JuniperResponse {
            status_code: context.error_status_code(),
            response,
        },
    )
}

#[cfg(test)]
mod spec {
    use std::sync::Arc;

    use axum::{
        extract::FromRequestParts as _, response::IntoResponse as _,
        Extension,
    };
    use axum_extra::extract::CookieJar;
    use juniper::http::{GraphQLBatchRequest, GraphQLRequest};
    use juniper_axum::extract::JuniperRequest;
    use serde_json::{json, Value as Json};
    use service::infra::{appwrite, Appwrite, Dwolla, Plaid};
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{api, config, graphql, Context, Service, SessionCookie};

    fn service(server: &MockServer) -> Service {
        let appwrite = appwrite::Config::try_from(config::Appwrite {
            endpoint: format!("{}/v1", server.uri()),
            project_id: "dashboard".into(),
            database_id: "db".into(),
            user_collection_id: "users".into(),
            ..config::Appwrite::default()
        })
        .unwrap();
        Service::new(
            service::Config::default(),
            Appwrite::new(appwrite),
            Plaid::new(config::Plaid::default().into()),
            Dwolla::new(config::Dwolla::default().into()),
        )
    }

    /// Executes the GraphQL `query` sent with the provided `Cookie` header,
    /// returning the `Set-Cookie` headers and the body of the response.
    async fn execute(
        server: &MockServer,
        query: &str,
        cookie: Option<&'static str>,
    ) -> (Vec<String>, Json) {
        let mut req = http::Request::builder().uri("/graphql");
        if let Some(cookie) = cookie {
            req = req.header(http::header::COOKIE, cookie);
        }
        let (mut parts, ()) = req.body(()).unwrap().into_parts();
        _ = parts.extensions.insert(service(server));
        _ = parts
            .extensions
            .insert(SessionCookie::from(config::Session::default()));

        let context =
            Context::from_request_parts(&mut parts, &()).await.unwrap();
        let jar = CookieJar::from_headers(&parts.headers);
        let request = JuniperRequest(GraphQLBatchRequest::Single(
            GraphQLRequest::new(query.to_owned(), None, None),
        ));

        let response =
            graphql(Extension(Arc::new(api::schema())), jar, context, request)
                .await
                .into_response();
        let cookies = response
            .headers()
            .get_all(http::header::SET_COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .map(ToOwned::to_owned)
            .collect();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (cookies, serde_json::from_slice(&body).unwrap())
    }

    async fn mount_session(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "session-1",
                "userId": "user-1",
                "secret": "s3cr3t",
                "expire": "2030-01-01T00:00:00.000+00:00",
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn assert_session_cookie(cookies: &[String]) {
        let [cookie] = cookies else {
            panic!("expected single `Set-Cookie`, got: {cookies:?}");
        };
        assert!(cookie.starts_with("appwrite-session=s3cr3t;"), "{cookie}");
        for attr in ["HttpOnly", "SameSite=Strict", "Secure", "Path=/"] {
            assert!(cookie.contains(attr), "{cookie}");
        }
    }

    #[tokio::test]
    async fn resolves_no_user_without_session_cookie() {
        for cookie in [None, Some("appwrite-session="), Some("other=1")] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/account"))
                .respond_with(ResponseTemplate::new(500))
                .expect(0)
                .mount(&server)
                .await;

            let (cookies, body) =
                execute(&server, "{ loggedInUser { id } }", cookie).await;

            assert_eq!(body, json!({"data": {"loggedInUser": null}}));
            assert!(cookies.is_empty(), "{cookies:?}");
        }
    }

    #[tokio::test]
    async fn resolves_user_of_session_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .and(header("X-Appwrite-Session", "s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "user-1",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/databases/db/collections/users/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 0,
                "documents": [],
            })))
            .mount(&server)
            .await;

        let (_, body) = execute(
            &server,
            "{ loggedInUser { id name } }",
            Some("appwrite-session=s3cr3t"),
        )
        .await;

        assert_eq!(
            body,
            json!({"data": {"loggedInUser": {
                "id": "user-1",
                "name": "Ada Lovelace",
            }}}),
        );
    }

    #[tokio::test]
    async fn sets_session_cookie_on_sign_in() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        let (cookies, body) = execute(
            &server,
            r#"mutation {
                signIn(email: "ada@example.com", password: "correct horse") {
                    userId
                }
            }"#,
            None,
        )
        .await;

        assert_eq!(body, json!({"data": {"signIn": {"userId": "user-1"}}}));
        assert_session_cookie(&cookies);
    }

    #[tokio::test]
    async fn sets_session_cookie_on_sign_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "user-1",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_session(&server).await;

        let (cookies, body) = execute(
            &server,
            r#"mutation {
                signUp(
                    firstName: "Ada",
                    lastName: "Lovelace",
                    email: "ada@example.com",
                    password: "correct horse",
                ) {
                    name
                }
            }"#,
            None,
        )
        .await;

        assert_eq!(
            body,
            json!({"data": {"signUp": {"name": "Ada Lovelace"}}}),
        );
        assert_session_cookie(&cookies);
    }

    #[tokio::test]
    async fn removes_session_cookie_on_logout() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/account/sessions/current"))
            .and(header("X-Appwrite-Session", "s3cr3t"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (cookies, body) = execute(
            &server,
            "mutation { logoutAccount }",
            Some("appwrite-session=s3cr3t"),
        )
        .await;

        assert_eq!(body, json!({"data": {"logoutAccount": true}}));
        let [cookie] = cookies.as_slice() else {
            panic!("expected single `Set-Cookie`, got: {cookies:?}");
        };
        assert!(cookie.starts_with("appwrite-session=;"), "{cookie}");
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
    }
}
