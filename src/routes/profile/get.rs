use crate::authentication::CurrentSession;
use crate::domain::MIN_PASSWORD_LENGTH;
use crate::utils::flash_messages_html;

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;

pub async fn profile_form(
    flash_messages: IncomingFlashMessages,
    current_session: web::ReqData<CurrentSession>,
) -> HttpResponse {
    let flash_html = flash_messages_html(&flash_messages);

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("profile.html"),
            email = current_session.email,
            flash_html = flash_html,
            min_length = MIN_PASSWORD_LENGTH,
        ))
}
