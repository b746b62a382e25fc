use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use actix_web_flash_messages::IncomingFlashMessages;

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

// Return an opaque 500 while preserving the error root's cause for logging.
pub fn e500<T>(e: T) -> actix_web::Error
where
    T: std::fmt::Debug + std::fmt::Display + 'static,
{
    actix_web::error::ErrorInternalServerError(e)
}

pub fn flash_messages_html(flash_messages: &IncomingFlashMessages) -> String {
    let mut html = String::new();
    for message in flash_messages.iter() {
        html.push_str(&format!("<p><i>{}</i></p>\n", message.content()));
    }
    html
}
