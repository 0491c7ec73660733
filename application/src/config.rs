//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::Debug;
use serde::Deserialize;
use service::infra::{appwrite, dwolla, plaid};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Session cookie configuration.
    pub session: Session,

    /// Appwrite configuration.
    pub appwrite: Appwrite,

    /// Plaid configuration.
    pub plaid: Plaid,

    /// Dwolla configuration.
    pub dwolla: Dwolla,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// Origins are listed explicitly, as the session cookie requires credentialed
/// requests.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["http://localhost:3000".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Time a computed accounts summary of a user stays cached.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub home_view_ttl: time::Duration,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service { home_view_ttl } = value;
        Self { home_view_ttl }
    }
}

/// Session cookie configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Session {
    /// Name of the cookie carrying the session secret.
    #[default("appwrite-session".to_owned())]
    pub cookie_name: String,

    /// Indicator whether the cookie is sent over HTTPS only.
    ///
    /// Disable for local development over plain HTTP.
    #[default(true)]
    pub secure: bool,
}

impl From<Session> for crate::SessionCookie {
    fn from(value: Session) -> Self {
        let Session {
            cookie_name,
            secure,
        } = value;
        Self {
            name: cookie_name,
            secure,
        }
    }
}

/// Appwrite configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Appwrite {
    /// Base URL of the Appwrite REST API.
    #[default("https://cloud.appwrite.io/v1".to_owned())]
    pub endpoint: String,

    /// ID of the Appwrite project.
    pub project_id: String,

    /// Administrative API key of the project.
    #[debug(skip)]
    pub api_key: String,

    /// ID of the database holding the collections.
    pub database_id: String,

    /// ID of the collection holding user profiles.
    pub user_collection_id: String,

    /// ID of the collection holding linked bank accounts.
    pub bank_collection_id: String,
}

impl TryFrom<Appwrite> for appwrite::Config {
    type Error = url::ParseError;

    fn try_from(value: Appwrite) -> Result<Self, Self::Error> {
        let Appwrite {
            endpoint,
            project_id,
            api_key,
            database_id,
            user_collection_id,
            bank_collection_id,
        } = value;

        Ok(Self {
            endpoint: endpoint.parse()?,
            project_id,
            api_key: api_key.into(),
            database_id,
            user_collection_id,
            bank_collection_id,
        })
    }
}

/// Plaid configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Plaid {
    /// Environment of the API to call.
    pub environment: plaid::Environment,

    /// Client ID of the API keys.
    pub client_id: String,

    /// Secret of the API keys.
    #[debug(skip)]
    pub secret: String,
}

impl From<Plaid> for plaid::Config {
    fn from(value: Plaid) -> Self {
        let Plaid {
            environment,
            client_id,
            secret,
        } = value;
        Self {
            environment,
            client_id,
            secret: secret.into(),
        }
    }
}

/// Dwolla configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dwolla {
    /// Environment of the API to call.
    pub environment: dwolla::Environment,

    /// Application key.
    pub key: String,

    /// Application secret.
    #[debug(skip)]
    pub secret: String,
}

impl From<Dwolla> for dwolla::Config {
    fn from(value: Dwolla) -> Self {
        let Dwolla {
            environment,
            key,
            secret,
        } = value;
        Self {
            environment,
            key,
            secret: secret.into(),
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::infra::{appwrite, plaid};

    use super::{Appwrite, Config, Plaid};

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::new("definitely-missing.toml").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors.origins, ["http://localhost:3000"]);
        assert_eq!(config.service.home_view_ttl, Duration::from_secs(60));
        assert_eq!(config.session.cookie_name, "appwrite-session");
        assert!(config.session.secure);
        assert_eq!(config.plaid.environment, plaid::Environment::Sandbox);
    }

    #[test]
    fn redacts_secrets() {
        let plaid = Plaid {
            secret: "plaid-secret".into(),
            ..Plaid::default()
        };
        let appwrite = Appwrite {
            api_key: "appwrite-key".into(),
            ..Appwrite::default()
        };

        assert!(!format!("{plaid:?}").contains("plaid-secret"));
        assert!(!format!("{appwrite:?}").contains("appwrite-key"));
    }

    #[test]
    fn converts_appwrite_endpoint() {
        let config = appwrite::Config::try_from(Appwrite::default()).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://cloud.appwrite.io/v1");

        let invalid = Appwrite {
            endpoint: "not a url".into(),
            ..Appwrite::default()
        };
        assert!(appwrite::Config::try_from(invalid).is_err());
    }
}
