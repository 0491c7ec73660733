//! [Dwolla] [`Payments`] rails implementation.
//!
//! [Dwolla]: https://developers.dwolla.com/docs/api-reference

use std::sync::Arc;

use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::funding_source,
    infra::{
        http::{self, endpoint, ensure_success},
        payments::{self, AddFundingSource},
        Payments,
    },
};

/// Media type of the Dwolla API requests and responses.
const HAL_JSON: &str = "application/vnd.dwolla.v1.hal+json";

/// Environment of the [`Dwolla`] API.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test environment.
    #[default]
    Sandbox,

    /// Live environment.
    Production,
}

impl Environment {
    /// Returns the base URL of the API in this [`Environment`].
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://api-sandbox.dwolla.com",
            Self::Production => "https://api.dwolla.com",
        }
    }
}

/// [`Dwolla`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`Environment`] to call.
    pub environment: Environment,

    /// Application key.
    pub key: String,

    /// Application secret.
    pub secret: SecretString,
}

/// [Dwolla] client implementing the [`Payments`] rails.
///
/// [Dwolla]: https://www.dwolla.com
#[derive(Clone, Debug)]
pub struct Dwolla {
    /// [`Config`] of this client.
    config: Arc<Config>,

    /// Base URL of the API.
    base_url: String,

    /// HTTP client performing the requests.
    http: reqwest::Client,
}

impl Dwolla {
    /// Creates a new [`Dwolla`] client with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            base_url: config.environment.base_url().to_owned(),
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Overrides the base URL of the API derived from the [`Environment`].
    #[must_use]
    pub fn with_base_url(mut self, url: url::Url) -> Self {
        self.base_url = url.into();
        self
    }

    /// Obtains a new application access token.
    ///
    /// Tokens live for an hour, but are not reused across calls.
    async fn app_token(&self) -> Result<SecretString, http::Error> {
        #[derive(Deserialize)]
        struct Response {
            access_token: String,
        }

        let response = self
            .http
            .post(endpoint(&self.base_url, "token"))
            .basic_auth(
                &self.config.key,
                Some(self.config.secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token = ensure_success(response, "token")
            .await?
            .json::<Response>()
            .await?;
        Ok(token.access_token.into())
    }

    /// Creates a new on-demand authorization, returning its URL.
    async fn on_demand_authorization(
        &self,
        token: &SecretString,
    ) -> Result<String, http::Error> {
        #[derive(Deserialize)]
        struct Link {
            href: String,
        }
        #[derive(Deserialize)]
        struct Links {
            #[serde(rename = "self")]
            this: Link,
        }
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "_links")]
            links: Links,
        }

        let response = self
            .http
            .post(endpoint(&self.base_url, "on-demand-authorizations"))
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::ACCEPT, HAL_JSON)
            .header(reqwest::header::CONTENT_TYPE, HAL_JSON)
            .send()
            .await?;
        let auth = ensure_success(response, "on-demand-authorizations")
            .await?
            .json::<Response>()
            .await?;
        Ok(auth.links.this.href)
    }

    /// Adds a new funding source to the customer.
    async fn add_funding_source(
        &self,
        req: AddFundingSource,
    ) -> Result<Option<funding_source::Url>, http::Error> {
        const OPERATION: &str = "customers.funding-sources";

        let token = self.app_token().await?;
        let authorization = self.on_demand_authorization(&token).await?;

        let response = self
            .http
            .post(endpoint(
                &self.base_url,
                &format!("customers/{}/funding-sources", req.customer_id),
            ))
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::ACCEPT, HAL_JSON)
            .header(reqwest::header::CONTENT_TYPE, HAL_JSON)
            .body(
                json!({
                    "plaidToken": req.processor_token.as_ref(),
                    "name": req.bank_name,
                    "_links": {
                        "on-demand-authorization": {"href": authorization},
                    },
                })
                .to_string(),
            )
            .send()
            .await?;
        let response = ensure_success(response, OPERATION).await?;

        let Some(location) = response.headers().get(reqwest::header::LOCATION)
        else {
            return Ok(None);
        };
        let url = location
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(|l| l.parse().map_err(|e: url::ParseError| e.to_string()))
            .map_err(|detail| http::Error::Malformed {
                operation: OPERATION,
                detail: format!("invalid `Location` header: {detail}"),
            })?;
        Ok(Some(url))
    }
}

impl Payments<AddFundingSource> for Dwolla {
    type Ok = Option<funding_source::Url>;
    type Err = Traced<payments::Error>;

    async fn execute(
        &self,
        req: AddFundingSource,
    ) -> Result<Self::Ok, Self::Err> {
        self.add_funding_source(req)
            .await
            .map_err(tracerr::from_and_wrap!(=> payments::Error))
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, body_string, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::infra::{payments::AddFundingSource, Payments as _};

    use super::{Config, Dwolla, Environment};

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            // "key:secret" in Base64
            .and(header("Authorization", "Basic a2V5OnNlY3JldA=="))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "app-token",
                "token_type": "bearer",
                "expires_in": 3600,
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/on-demand-authorizations"))
            .and(header("Authorization", "Bearer app-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_links": {
                    "self": {
                        "href": "https://api-sandbox.dwolla.com/on-demand-authorizations/oda-1",
                    },
                },
                "bodyText": "I agree.",
                "buttonText": "Agree & Continue",
            })))
            .mount(&server)
            .await;
        server
    }

    fn client(server: &MockServer) -> Dwolla {
        Dwolla::new(Config {
            environment: Environment::Sandbox,
            key: "key".into(),
            secret: "secret".into(),
        })
        .with_base_url(server.uri().parse().unwrap())
    }

    fn request() -> AddFundingSource {
        AddFundingSource {
            customer_id: "customer-1".into(),
            processor_token: "processor-sandbox-1".into(),
            bank_name: "Plaid Checking".into(),
        }
    }

    #[tokio::test]
    async fn returns_location_of_created_funding_source() {
        let server = server().await;
        Mock::given(method("POST"))
            .and(path("/customers/customer-1/funding-sources"))
            .and(header("Authorization", "Bearer app-token"))
            .and(header("Content-Type", "application/vnd.dwolla.v1.hal+json"))
            .and(body_json(json!({
                "plaidToken": "processor-sandbox-1",
                "name": "Plaid Checking",
                "_links": {
                    "on-demand-authorization": {
                        "href": "https://api-sandbox.dwolla.com/on-demand-authorizations/oda-1",
                    },
                },
            })))
            .respond_with(ResponseTemplate::new(201).insert_header(
                "Location",
                "https://api-sandbox.dwolla.com/funding-sources/fs-1",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let url = client(&server).execute(request()).await.unwrap();

        assert_eq!(
            url.unwrap().as_str(),
            "https://api-sandbox.dwolla.com/funding-sources/fs-1",
        );
    }

    #[tokio::test]
    async fn returns_none_without_location() {
        let server = server().await;
        Mock::given(method("POST"))
            .and(path("/customers/customer-1/funding-sources"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let url = client(&server).execute(request()).await.unwrap();

        assert!(url.is_none());
    }

    #[tokio::test]
    async fn reports_rejected_funding_source() {
        let server = server().await;
        Mock::given(method("POST"))
            .and(path("/customers/customer-1/funding-sources"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "DuplicateResource",
                "message": "Bank already exists.",
            })))
            .mount(&server)
            .await;

        let err = client(&server).execute(request()).await.unwrap_err();

        assert!(err.to_string().contains("DuplicateResource"));
    }
}
