pub mod middleware;

pub use middleware::{CurrentSession, RejectAnonymousUsers};

use crate::domain::UserEmail;

use secrecy::Secret;

pub struct Credentials {
    pub email: UserEmail,
    pub password: Secret<String>,
}
