use crate::authentication::Credentials;
use crate::domain::{NewPassword, SessionToken};
use crate::routes::helpers::error_chain_fmt;

use anyhow::Context;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

pub struct IdentityProviderClient {
    http_client: Client,
    change_password_url: String,
    sign_in_url: String,
    api_token: Secret<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    id_token: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChanged {
    pub local_id: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    email: String,
    local_id: String,
    expires_in: String,
}

#[derive(Debug)]
pub struct SignedIn {
    pub token: SessionToken,
    pub email: String,
    pub local_id: String,
    pub expires_in: chrono::Duration,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

/// Why the identity provider refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidIdToken,
    TokenExpired,
    CredentialTooOld,
    UserNotFound,
    UserDisabled,
    WeakPassword,
    InvalidCredentials,
    TooManyAttempts,
    Other(String),
}

impl RejectionReason {
    /// Parses the `error.message` field, e.g. `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_message(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();

        match code {
            "INVALID_ID_TOKEN" => Self::InvalidIdToken,
            "TOKEN_EXPIRED" => Self::TokenExpired,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => Self::CredentialTooOld,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "USER_DISABLED" => Self::UserDisabled,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            other => Self::Other(other.to_string()),
        }
    }

    /// The session token can no longer be used and the user has to sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdToken
                | Self::TokenExpired
                | Self::CredentialTooOld
                | Self::UserNotFound
                | Self::UserDisabled
        )
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdToken => write!(f, "INVALID_ID_TOKEN"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::CredentialTooOld => write!(f, "CREDENTIAL_TOO_OLD_LOGIN_AGAIN"),
            Self::UserNotFound => write!(f, "USER_NOT_FOUND"),
            Self::UserDisabled => write!(f, "USER_DISABLED"),
            Self::WeakPassword => write!(f, "WEAK_PASSWORD"),
            Self::InvalidCredentials => write!(f, "INVALID_LOGIN_CREDENTIALS"),
            Self::TooManyAttempts => write!(f, "TOO_MANY_ATTEMPTS_TRY_LATER"),
            Self::Other(code) => write!(f, "{}", code),
        }
    }
}

#[derive(thiserror::Error)]
pub enum IdentityProviderError {
    #[error("The identity provider rejected the request: {0}")]
    Rejected(RejectionReason),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for IdentityProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IdentityProviderClient {
    pub fn new(
        change_password_url: String,
        sign_in_url: String,
        api_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the identity provider http client.")?;

        Ok(Self {
            http_client,
            change_password_url,
            sign_in_url,
            api_token,
        })
    }

    /// The configured endpoint immediately followed by the api token, no separator added.
    pub fn change_password_url(&self) -> String {
        format!("{}{}", self.change_password_url, self.api_token.expose_secret())
    }

    pub fn sign_in_url(&self) -> String {
        format!("{}{}", self.sign_in_url, self.api_token.expose_secret())
    }

    #[tracing::instrument(name = "Change password at the identity provider", skip_all, err)]
    pub async fn change_password(
        &self,
        token: &SessionToken,
        new_password: &NewPassword,
    ) -> Result<PasswordChanged, IdentityProviderError> {
        let request_body = ChangePasswordRequest {
            id_token: token.expose_secret(),
            password: new_password.expose_secret(),
            return_secure_token: false,
        };

        let response = self
            .http_client
            .post(self.change_password_url())
            .json(&request_body)
            .send()
            .await
            .context("Failed to send the change password request.")?;

        let changed = parse_response::<PasswordChanged>(response).await?;

        tracing::info!(local_id = %changed.local_id, "Password changed");
        Ok(changed)
    }

    #[tracing::instrument(
        name = "Sign in at the identity provider",
        skip_all,
        fields(email = %credentials.email),
        err,
    )]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignedIn, IdentityProviderError> {
        let request_body = SignInRequest {
            email: credentials.email.as_ref(),
            password: credentials.password.expose_secret(),
            return_secure_token: true,
        };

        let response = self
            .http_client
            .post(self.sign_in_url())
            .json(&request_body)
            .send()
            .await
            .context("Failed to send the sign in request.")?;

        let SignInResponse { id_token, email, local_id, expires_in } =
            parse_response::<SignInResponse>(response).await?;

        let token = SessionToken::parse(id_token)
            .map_err(|e| anyhow::anyhow!(e))
            .context("The identity provider returned an unusable token.")?;
        // a token lifetime in seconds, e.g. "3600"
        let expires_in = expires_in
            .parse::<u32>()
            .context("The identity provider returned an invalid `expiresIn`.")?;

        Ok(SignedIn {
            token,
            email,
            local_id,
            expires_in: chrono::Duration::seconds(i64::from(expires_in)),
        })
    }
}

async fn parse_response<T>(response: reqwest::Response) -> Result<T, IdentityProviderError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();

    if status.is_success() {
        let body = response
            .json::<T>()
            .await
            .context("Failed to parse the identity provider response.")?;
        return Ok(body);
    }

    if status.is_client_error() {
        if let Ok(ErrorResponse { error }) = response.json::<ErrorResponse>().await {
            return Err(IdentityProviderError::Rejected(RejectionReason::from_message(
                &error.message,
            )));
        }
    }

    Err(anyhow::anyhow!("The identity provider answered with {}.", status).into())
}
