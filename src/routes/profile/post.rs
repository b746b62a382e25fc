use crate::authentication::CurrentSession;
use crate::domain::NewPassword;
use crate::identity_provider::{IdentityProviderClient, IdentityProviderError, RejectionReason};
use crate::session_state::TypedSession;
use crate::utils::see_other;

use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use secrecy::Secret;

#[derive(serde::Deserialize)]
pub struct FormData {
    new_password: Secret<String>,
}

/// Submits the new password to the identity provider exactly once and
/// always answers with a redirect back into the application.
#[tracing::instrument(
    name = "Change password",
    skip(form, identity_client, session, current_session),
    fields(email = %current_session.email),
)]
pub async fn change_password(
    form: web::Form<FormData>,
    identity_client: web::Data<IdentityProviderClient>,
    session: TypedSession,
    current_session: web::ReqData<CurrentSession>,
) -> HttpResponse {
    let new_password = match NewPassword::parse(form.0.new_password) {
        Ok(new_password) => new_password,
        Err(e) => {
            FlashMessage::error(e).send();
            return see_other("/profile");
        }
    };

    match identity_client
        .change_password(&current_session.token, &new_password)
        .await
    {
        Ok(_) => {
            FlashMessage::info("Your password has been changed.").send();
            see_other("/profile")
        }
        Err(IdentityProviderError::Rejected(reason)) if reason.requires_reauthentication() => {
            session.log_out();
            FlashMessage::error("Your session has expired. Please log in again.").send();
            see_other("/login")
        }
        Err(IdentityProviderError::Rejected(RejectionReason::WeakPassword)) => {
            FlashMessage::error("The new password is too weak. Please choose a stronger one.")
                .send();
            see_other("/profile")
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to change password",
            );
            FlashMessage::error("The password could not be changed. Please try again later.")
                .send();
            see_other("/profile")
        }
    }
}
