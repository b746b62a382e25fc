mod new_password;
mod session_token;
mod user_email;

pub use new_password::{NewPassword, MIN_PASSWORD_LENGTH};
pub use session_token::SessionToken;
pub use user_email::UserEmail;
