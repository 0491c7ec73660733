//! [Plaid] [`Aggregator`] implementation.
//!
//! [Plaid]: https://plaid.com/docs/api

use std::{str::FromStr as _, sync::Arc};

use common::{Currency, Money};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracerr::Traced;

use crate::{
    domain::{account, item, link, processor, Account},
    infra::{
        aggregator::{
            self, AccountsGet, ItemPublicTokenExchange, LinkTokenCreate,
            ProcessorTokenCreate,
        },
        http::{self, endpoint, ensure_success},
        Aggregator,
    },
};

/// Environment of the [`Plaid`] API.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test environment with fake institutions.
    #[default]
    Sandbox,

    /// Environment with real institutions and a limited number of items.
    Development,

    /// Live environment.
    Production,
}

impl Environment {
    /// Returns the base URL of the API in this [`Environment`].
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Development => "https://development.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

/// [`Plaid`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`Environment`] to call.
    pub environment: Environment,

    /// Client ID of the API keys.
    pub client_id: String,

    /// Secret of the API keys.
    pub secret: SecretString,
}

/// [Plaid] client implementing the bank data [`Aggregator`].
///
/// [Plaid]: https://plaid.com
#[derive(Clone, Debug)]
pub struct Plaid {
    /// [`Config`] of this client.
    config: Arc<Config>,

    /// Base URL of the API.
    base_url: String,

    /// HTTP client performing the requests.
    http: reqwest::Client,
}

impl Plaid {
    /// Creates a new [`Plaid`] client with the provided [`Config`].
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

    /// Posts the `body` to the `path` and reads the JSON response.
    async fn post<B, R>(
        &self,
        path: &'static str,
        body: &B,
    ) -> Result<R, http::Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(endpoint(&self.base_url, path))
            .header("PLAID-CLIENT-ID", &self.config.client_id)
            .header("PLAID-SECRET", self.config.secret.expose_secret())
            .json(body)
            .send()
            .await?;
        Ok(ensure_success(response, path).await?.json().await?)
    }
}

impl Aggregator<LinkTokenCreate> for Plaid {
    type Ok = link::Token;
    type Err = Traced<aggregator::Error>;

    async fn execute(
        &self,
        req: LinkTokenCreate,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct User<'a> {
            client_user_id: &'a str,
        }
        #[derive(Serialize)]
        struct Request<'a> {
            user: User<'a>,
            client_name: &'a str,
            products: &'a [link::Product],
            language: link::Language,
            country_codes: &'a [link::CountryCode],
        }
        #[derive(Deserialize)]
        struct Response {
            link_token: String,
        }

        let body = Request {
            user: User {
                client_user_id: req.client_user_id.as_ref(),
            },
            client_name: req.client_name.as_ref(),
            products: &req.products,
            language: req.language,
            country_codes: &req.country_codes,
        };
        self.post::<_, Response>("link/token/create", &body)
            .await
            .map(|r| r.link_token.into())
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))
    }
}

impl Aggregator<ItemPublicTokenExchange> for Plaid {
    type Ok = item::Item;
    type Err = Traced<aggregator::Error>;

    async fn execute(
        &self,
        req: ItemPublicTokenExchange,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Request<'a> {
            public_token: &'a str,
        }
        #[derive(Deserialize)]
        struct Response {
            access_token: String,
            item_id: String,
        }

        let body = Request {
            public_token: req.public_token.as_ref(),
        };
        self.post::<_, Response>("item/public_token/exchange", &body)
            .await
            .map(|r| item::Item {
                id: r.item_id.into(),
                access_token: r.access_token.into(),
            })
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))
    }
}

impl Aggregator<AccountsGet> for Plaid {
    type Ok = Vec<Account>;
    type Err = Traced<aggregator::Error>;

    async fn execute(&self, req: AccountsGet) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Request<'a> {
            access_token: &'a str,
        }
        #[derive(Deserialize)]
        struct Response {
            accounts: Vec<AccountDto>,
        }

        let body = Request {
            access_token: req.access_token.expose(),
        };
        self.post::<_, Response>("accounts/get", &body)
            .await
            .map(|r| r.accounts.into_iter().map(Into::into).collect())
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))
    }
}

impl Aggregator<ProcessorTokenCreate> for Plaid {
    type Ok = processor::Token;
    type Err = Traced<aggregator::Error>;

    async fn execute(
        &self,
        req: ProcessorTokenCreate,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Request<'a> {
            access_token: &'a str,
            account_id: &'a str,
            processor: processor::Processor,
        }
        #[derive(Deserialize)]
        struct Response {
            processor_token: String,
        }

        let body = Request {
            access_token: req.access_token.expose(),
            account_id: req.account_id.as_ref(),
            processor: req.processor,
        };
        self.post::<_, Response>("processor/token/create", &body)
            .await
            .map(|r| r.processor_token.into())
            .map_err(tracerr::from_and_wrap!(=> aggregator::Error))
    }
}

/// Plaid account representation.
#[derive(Debug, Deserialize)]
struct AccountDto {
    account_id: String,
    name: String,
    official_name: Option<String>,
    mask: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    subtype: Option<String>,
    balances: BalancesDto,
}

/// Plaid account balances representation.
#[derive(Debug, Deserialize)]
struct BalancesDto {
    current: Option<f64>,
    available: Option<f64>,
    iso_currency_code: Option<String>,
}

impl From<AccountDto> for Account {
    fn from(dto: AccountDto) -> Self {
        // Plaid reports `null` currency for unofficial currencies, which are
        // not supported here.
        let currency = match dto.balances.iso_currency_code.as_deref() {
            None => Some(Currency::default()),
            Some(code) => Currency::from_str(code).ok(),
        };
        let money = |amount: Option<f64>| {
            currency.and_then(|c| Money::from_f64(amount?, c))
        };

        Self {
            id: account::Id::from(dto.account_id),
            name: dto.name,
            official_name: dto.official_name,
            mask: dto.mask,
            kind: dto.kind,
            subtype: dto.subtype,
            balances: account::Balances {
                current: money(dto.balances.current),
                available: money(dto.balances.available),
            },
        }
    }
}
