use crate::authentication::CurrentSession;
use crate::domain::NewPassword;
use crate::identity_provider::{IdentityProviderClient, IdentityProviderError, RejectionReason};
use crate::routes::helpers::ApiError;
use crate::session_state::TypedSession;

use actix_web::{web, HttpResponse};
use secrecy::Secret;

#[derive(serde::Deserialize)]
pub struct PasswordChange {
    password: Secret<String>,
}

#[tracing::instrument(
    name = "Change password via api",
    skip(body, identity_client, session, current_session),
    fields(email = %current_session.email),
)]
pub async fn change_password_api(
    body: web::Json<PasswordChange>,
    identity_client: web::Data<IdentityProviderClient>,
    session: TypedSession,
    current_session: web::ReqData<CurrentSession>,
) -> Result<HttpResponse, ApiError> {
    let new_password = NewPassword::parse(body.0.password).map_err(ApiError::ValidationError)?;

    match identity_client
        .change_password(&current_session.token, &new_password)
        .await
    {
        Ok(_) => Ok(HttpResponse::NoContent().finish()),
        Err(IdentityProviderError::Rejected(reason)) if reason.requires_reauthentication() => {
            session.log_out();
            Err(ApiError::AuthorizationError)
        }
        Err(IdentityProviderError::Rejected(RejectionReason::WeakPassword)) => {
            Err(ApiError::WeakPassword)
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context("Failed to change the password.")
            .into()),
    }
}
