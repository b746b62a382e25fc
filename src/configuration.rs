use crate::identity_provider::IdentityProviderClient;

use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub identity_provider: IdentityProviderSettings,
    pub session_store: SessionStoreSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub hmac_secret: Secret<String>,
}

/// Where the identity provider lives.
///
/// Each endpoint is stored as the prefix the api token gets appended to,
/// e.g. `https://identitytoolkit.googleapis.com/v1/accounts:update?key=`.
#[derive(serde::Deserialize, Clone)]
pub struct IdentityProviderSettings {
    pub change_password_url: String,
    pub sign_in_url: String,
    pub api_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl IdentityProviderSettings {
    pub fn client(self) -> Result<IdentityProviderClient, anyhow::Error> {
        let timeout = self.timeout();
        IdentityProviderClient::new(
            self.change_password_url,
            self.sign_in_url,
            self.api_token,
            timeout,
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SessionStoreSettings {
    Redis { uri: Secret<String> },
    Cookie,
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other,
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let mut settings = config::Config::default();
    settings.merge(config::File::from(configuration_directory.join("base")).required(true))?;
    settings.merge(
        config::File::from(configuration_directory.join(environment.as_str())).required(true),
    )?;
    // e.g. `APP_IDENTITY_PROVIDER__API_TOKEN=...` sets `identity_provider.api_token`
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    settings.try_into()
}
