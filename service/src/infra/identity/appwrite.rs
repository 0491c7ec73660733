//! [Appwrite] [`Identity`] backend implementation.
//!
//! [Appwrite]: https://appwrite.io/docs/references/cloud/server-rest

use std::sync::Arc;

use common::operations::{By, Delete, Insert, Select};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::{
        bank_account::{self, SharableId},
        user::{self, session},
        BankAccount, User,
    },
    infra::{
        http::{self, endpoint, ensure_success},
        identity, Identity,
    },
};

/// Name of the header identifying the Appwrite project.
const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Name of the header carrying the administrative API key.
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Name of the header carrying a [`Session`] secret.
const SESSION_HEADER: &str = "X-Appwrite-Session";

/// Maximum number of documents requested per page.
const PAGE_SIZE: usize = 100;

/// [`Appwrite`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the Appwrite REST API (e.g. `https://cloud.appwrite.io/v1`).
    pub endpoint: url::Url,

    /// ID of the Appwrite project.
    pub project_id: String,

    /// Administrative API key of the project.
    pub api_key: SecretString,

    /// ID of the database holding the collections.
    pub database_id: String,

    /// ID of the collection holding [`User`] profiles.
    pub user_collection_id: String,

    /// ID of the collection holding [`BankAccount`]s.
    pub bank_collection_id: String,
}

/// [Appwrite] client implementing the [`Identity`] backend.
///
/// [Appwrite]: https://appwrite.io
#[derive(Clone, Debug)]
pub struct Appwrite {
    /// [`Config`] of this client.
    config: Arc<Config>,

    /// HTTP client performing the requests.
    http: reqwest::Client,
}

impl Appwrite {
    /// Creates a new [`Appwrite`] client with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Builds a request to the `path` authorized with the project API key.
    fn admin(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, endpoint(self.config.endpoint.as_str(), path))
            .header(PROJECT_HEADER, &self.config.project_id)
            .header(KEY_HEADER, self.config.api_key.expose_secret())
    }

    /// Builds a request to the `path` on behalf of a [`Session`].
    fn on_behalf(
        &self,
        method: reqwest::Method,
        path: &str,
        secret: &session::Secret,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, endpoint(self.config.endpoint.as_str(), path))
            .header(PROJECT_HEADER, &self.config.project_id)
            .header(SESSION_HEADER, secret.expose())
    }

    /// Returns the path of the documents in the provided collection.
    fn documents_path(&self, collection_id: &str) -> String {
        format!(
            "databases/{}/collections/{collection_id}/documents",
            self.config.database_id,
        )
    }

    /// Lists all the documents of the collection whose `attribute` equals to
    /// the provided `value`, page by page.
    async fn list_documents<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        attribute: &str,
        value: &str,
        operation: &'static str,
    ) -> Result<Vec<T>, http::Error> {
        let path = self.documents_path(collection_id);
        let filter = json!({
            "method": "equal",
            "attribute": attribute,
            "values": [value],
        })
        .to_string();
        let limit = json!({"method": "limit", "values": [PAGE_SIZE]});

        let mut documents = Vec::<T>::new();
        loop {
            let offset =
                json!({"method": "offset", "values": [documents.len()]});
            let response = self
                .admin(reqwest::Method::GET, &path)
                .query(&[
                    ("queries[]", filter.clone()),
                    ("queries[]", limit.to_string()),
                    ("queries[]", offset.to_string()),
                ])
                .send()
                .await?;
            let page = ensure_success(response, operation)
                .await?
                .json::<DocumentList<T>>()
                .await?;

            let fetched = page.documents.len();
            documents.extend(page.documents);
            if fetched == 0 || documents.len() >= page.total {
                return Ok(documents);
            }
        }
    }

    /// Registers a new account.
    async fn create_account(
        &self,
        account: user::NewAccount,
    ) -> Result<User, http::Error> {
        let user::NewAccount {
            id,
            email,
            password,
            name,
        } = account;

        let response = self
            .admin(reqwest::Method::POST, "account")
            .json(&json!({
                "userId": id.as_ref(),
                "email": AsRef::<str>::as_ref(&email),
                "password": password.expose_secret().as_str(),
                "name": AsRef::<str>::as_ref(&name),
            }))
            .send()
            .await?;
        let account = ensure_success(response, "account.create")
            .await?
            .json::<AccountDto>()
            .await?;

        Ok(account.into_user(None))
    }

    /// Creates a new email/password [`Session`].
    async fn create_session(
        &self,
        credentials: user::Credentials,
    ) -> Result<user::Session, http::Error> {
        let user::Credentials { email, password } = credentials;

        let response = self
            .admin(reqwest::Method::POST, "account/sessions/email")
            .json(&json!({
                "email": AsRef::<str>::as_ref(&email),
                "password": password.expose_secret().as_str(),
            }))
            .send()
            .await?;
        let session = ensure_success(response, "account.createSession")
            .await?
            .json::<SessionDto>()
            .await?;

        Ok(user::Session {
            id: session.id.into(),
            user_id: session.user_id.into(),
            secret: session.secret.into(),
            expires_at: session.expire,
        })
    }

    /// Reads the [`User`] of the [`Session`] with the provided secret,
    /// along with its profile document.
    async fn current_user(
        &self,
        secret: &session::Secret,
    ) -> Result<Option<User>, http::Error> {
        let response = self
            .on_behalf(reqwest::Method::GET, "account", secret)
            .send()
            .await?;
        let account = match ensure_success(response, "account.get").await {
            Ok(response) => response.json::<AccountDto>().await?,
            Err(e) if e.is_unauthorized() => return Ok(None),
            Err(e) => return Err(e),
        };

        let profile = self
            .list_documents::<ProfileDto>(
                &self.config.user_collection_id,
                "userId",
                &account.id,
                "users.listDocuments",
            )
            .await?
            .into_iter()
            .next();

        Ok(Some(account.into_user(
            profile.and_then(|p| p.dwolla_customer_id).map(Into::into),
        )))
    }

    /// Deletes the [`Session`] with the provided secret.
    async fn delete_session(
        &self,
        secret: &session::Secret,
    ) -> Result<(), http::Error> {
        let response = self
            .on_behalf(
                reqwest::Method::DELETE,
                "account/sessions/current",
                secret,
            )
            .send()
            .await?;
        ensure_success(response, "account.deleteSession")
            .await
            .map(drop)
    }

    /// Creates a new [`BankAccount`] document.
    async fn create_bank_account(
        &self,
        account: BankAccount,
    ) -> Result<BankAccount, http::Error> {
        let response = self
            .admin(
                reqwest::Method::POST,
                &self.documents_path(&self.config.bank_collection_id),
            )
            .json(&json!({
                "documentId": account.id.as_ref(),
                "data": BankAccountData::from(&account),
            }))
            .send()
            .await?;
        drop(ensure_success(response, "banks.createDocument").await?);

        Ok(account)
    }

    /// Lists the [`BankAccount`] documents of the [`User`].
    async fn bank_accounts(
        &self,
        user_id: &user::Id,
    ) -> Result<Vec<BankAccount>, http::Error> {
        self.list_documents::<Document<BankAccountData>>(
            &self.config.bank_collection_id,
            "userId",
            user_id.as_ref(),
            "banks.listDocuments",
        )
        .await?
        .into_iter()
        .map(BankAccount::try_from)
        .collect()
    }
}

impl Identity<Insert<user::NewAccount>> for Appwrite {
    type Ok = User;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Insert(account): Insert<user::NewAccount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.create_account(account)
            .await
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

impl Identity<Insert<user::Credentials>> for Appwrite {
    type Ok = user::Session;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Insert(credentials): Insert<user::Credentials>,
    ) -> Result<Self::Ok, Self::Err> {
        self.create_session(credentials)
            .await
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

impl Identity<Select<By<Option<User>, session::Secret>>> for Appwrite {
    type Ok = Option<User>;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, session::Secret>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.current_user(by.as_inner())
            .await
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

impl Identity<Delete<session::Secret>> for Appwrite {
    type Ok = ();
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Delete(secret): Delete<session::Secret>,
    ) -> Result<Self::Ok, Self::Err> {
        self.delete_session(&secret)
            .await
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

impl Identity<Insert<BankAccount>> for Appwrite {
    type Ok = BankAccount;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Insert(account): Insert<BankAccount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.create_bank_account(account)
            .await
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

impl Identity<Select<By<Vec<BankAccount>, user::Id>>> for Appwrite {
    type Ok = Vec<BankAccount>;
    type Err = Traced<identity::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<BankAccount>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.bank_accounts(by.as_inner())
            .await
            .map_err(tracerr::from_and_wrap!(=> identity::Error))
    }
}

/// Appwrite account representation.
#[derive(Debug, Deserialize)]
struct AccountDto {
    /// ID of the account.
    #[serde(rename = "$id")]
    id: String,

    /// Name of the account owner.
    name: String,

    /// Email of the account.
    email: String,
}

impl AccountDto {
    /// Converts this [`AccountDto`] into a [`User`].
    fn into_user(
        self,
        dwolla_customer_id: Option<crate::domain::funding_source::CustomerId>,
    ) -> User {
        User {
            id: self.id.into(),
            name: user::Name::new_unchecked(self.name),
            email: user::Email::new_unchecked(self.email),
            dwolla_customer_id,
        }
    }
}

/// Appwrite session representation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDto {
    /// ID of the session.
    #[serde(rename = "$id")]
    id: String,

    /// ID of the account the session belongs to.
    user_id: String,

    /// Secret of the session.
    #[serde(default)]
    secret: String,

    /// Expiration of the session.
    #[serde(with = "common::datetime::serde::rfc3339")]
    expire: session::ExpirationDateTime,
}

/// [`User`] profile document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDto {
    /// ID of the payment rails customer.
    #[serde(default)]
    dwolla_customer_id: Option<String>,
}

/// Page of the listed documents.
#[derive(Debug, Deserialize)]
struct DocumentList<T> {
    /// Total number of the documents matching the queries.
    total: usize,

    /// Documents of the page.
    documents: Vec<T>,
}

/// Stored document.
#[derive(Debug, Deserialize)]
struct Document<T> {
    /// ID of the document.
    #[serde(rename = "$id")]
    id: String,

    /// Attributes of the document.
    #[serde(flatten)]
    data: T,
}

/// Attributes of a [`BankAccount`] document.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct BankAccountData {
    user_id: String,
    bank_id: String,
    account_id: String,
    access_token: String,
    funding_source_url: String,
    sharable_id: String,
}

impl From<&BankAccount> for BankAccountData {
    fn from(account: &BankAccount) -> Self {
        Self {
            user_id: account.user_id.to_string(),
            bank_id: account.bank_id.to_string(),
            account_id: account.account_id.to_string(),
            access_token: account.access_token.expose().to_owned(),
            funding_source_url: account.funding_source_url.to_string(),
            sharable_id: account.sharable_id.to_string(),
        }
    }
}

impl TryFrom<Document<BankAccountData>> for BankAccount {
    type Error = http::Error;

    fn try_from(doc: Document<BankAccountData>) -> Result<Self, Self::Error> {
        let Document { id, data } = doc;
        let funding_source_url =
            data.funding_source_url.parse().map_err(|e| {
                http::Error::Malformed {
                    operation: "banks.listDocuments",
                    detail: format!(
                        "document `{id}` has invalid `fundingSourceUrl`: {e}",
                    ),
                }
            })?;

        Ok(Self {
            id: bank_account::Id::from(id),
            user_id: data.user_id.into(),
            bank_id: data.bank_id.into(),
            account_id: data.account_id.into(),
            access_token: data.access_token.into(),
            funding_source_url,
            sharable_id: SharableId::new_unchecked(data.sharable_id),
        })
    }
}
