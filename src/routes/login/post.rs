use crate::authentication::Credentials;
use crate::domain::UserEmail;
use crate::identity_provider::{IdentityProviderClient, IdentityProviderError, RejectionReason};
use crate::session_state::{SessionUser, TypedSession};
use crate::utils::{e500, see_other};

use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use secrecy::Secret;

#[derive(serde::Deserialize)]
pub struct FormData {
    email: String,
    password: Secret<String>,
}

#[tracing::instrument(
    skip(form, identity_client, session),
    fields(email=tracing::field::Empty, local_id=tracing::field::Empty),
)]
pub async fn login(
    form: web::Form<FormData>,
    identity_client: web::Data<IdentityProviderClient>,
    session: TypedSession,
) -> Result<HttpResponse, actix_web::Error> {
    let email = match UserEmail::parse(form.0.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::info!(error.message = %e, "Rejected login attempt");
            return Ok(login_failed());
        }
    };

    tracing::Span::current().record("email", &tracing::field::display(&email));

    let credentials = Credentials {
        email,
        password: form.0.password,
    };

    match identity_client.sign_in(&credentials).await {
        Ok(signed_in) => {
            tracing::Span::current().record(
                "local_id",
                &tracing::field::display(&signed_in.local_id),
            );

            session.renew();
            let user = SessionUser::new(signed_in, chrono::Utc::now()).map_err(e500)?;
            session.insert_user(user).map_err(e500)?;

            Ok(see_other("/profile"))
        }
        Err(IdentityProviderError::Rejected(
            RejectionReason::InvalidCredentials
            | RejectionReason::TooManyAttempts
            | RejectionReason::UserDisabled,
        )) => Ok(login_failed()),
        Err(e) => Err(e500(e)),
    }
}

fn login_failed() -> HttpResponse {
    FlashMessage::error("Authentication failed").send();
    see_other("/login")
}
