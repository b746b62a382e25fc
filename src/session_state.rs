use crate::identity_provider::SignedIn;

use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use anyhow::Context;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use std::future::{ready, Ready};

/// What we remember about a signed-in user between requests.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct SessionUser {
    pub id_token: String,
    pub email: String,
    /// Unix timestamp, in seconds.
    pub expires_at: i64,
}

impl SessionUser {
    pub fn new(signed_in: SignedIn, now: DateTime<Utc>) -> Result<Self, anyhow::Error> {
        let expires_at = now
            .checked_add_signed(signed_in.expires_in)
            .context("The session token expiry is out of range.")?;

        Ok(Self {
            id_token: signed_in.token.expose_secret().clone(),
            email: signed_in.email,
            expires_at: expires_at.timestamp(),
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }
}

pub struct TypedSession(Session);

impl TypedSession {
    const USER_KEY: &'static str = "user";

    pub fn renew(&self) {
        self.0.renew();
    }

    pub fn insert_user(&self, user: SessionUser) -> Result<(), actix_web::Error> {
        self.0.insert(Self::USER_KEY, user).map_err(Into::into)
    }

    pub fn get_user(&self) -> Result<Option<SessionUser>, actix_web::Error> {
        self.0.get(Self::USER_KEY).map_err(Into::into)
    }

    pub fn log_out(self) {
        self.0.purge()
    }
}

impl From<Session> for TypedSession {
    fn from(session: Session) -> Self {
        Self(session)
    }
}

impl FromRequest for TypedSession {
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}
