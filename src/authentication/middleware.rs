use actix_session::SessionExt;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::domain::{SessionToken, UserEmail};
use crate::routes::helpers::ApiError;
use crate::session_state::TypedSession;
use crate::utils::see_other;

/// The signed-in user, handed to handlers through request extensions.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: SessionToken,
    pub email: UserEmail,
}

#[derive(Debug, Copy, Clone)]
enum OnAnonymous {
    RedirectToLogin,
    Unauthorized,
}

// There are two steps in middleware processing.
// 1. Middleware initialization, middleware factory gets called with
//    next service in chain as parameter.
// 2. Middleware's call method gets called with normal request.
pub struct RejectAnonymousUsers {
    on_anonymous: OnAnonymous,
}

impl RejectAnonymousUsers {
    /// For pages: anonymous visitors are sent to `/login`.
    pub fn redirect_to_login() -> Self {
        Self { on_anonymous: OnAnonymous::RedirectToLogin }
    }

    /// For the json api: anonymous callers get a 401.
    pub fn unauthorized() -> Self {
        Self { on_anonymous: OnAnonymous::Unauthorized }
    }
}

// Middleware factory is `Transform` trait
// `S` - type of the next service
// `B` - type of response's body
impl<S, B> Transform<S, ServiceRequest> for RejectAnonymousUsers
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RejectAnonymousUsersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RejectAnonymousUsersMiddleware {
            service,
            on_anonymous: self.on_anonymous,
        }))
    }
}

pub struct RejectAnonymousUsersMiddleware<S> {
    service: S,
    on_anonymous: OnAnonymous,
}

impl<S, B> Service<ServiceRequest> for RejectAnonymousUsersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = TypedSession::from(req.get_session());

        match get_current_session(session) {
            Ok(Some(current_session)) => {
                req.extensions_mut().insert(current_session);
            }
            Ok(None) => {
                let rejection = reject(self.on_anonymous);
                return Box::pin(async move { Err(rejection) });
            }
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;

            Ok(res)
        })
    }
}

/// Expired or unreadable session entries are dropped and count as anonymous.
fn get_current_session(session: TypedSession) -> Result<Option<CurrentSession>, Error> {
    let user = match session.get_user()? {
        Some(user) => user,
        None => return Ok(None),
    };

    if user.is_expired(chrono::Utc::now()) {
        tracing::info!("Session token expired, logging the user out");
        session.log_out();
        return Ok(None);
    }

    let parsed = SessionToken::parse(user.id_token)
        .and_then(|token| UserEmail::parse(user.email).map(|email| (token, email)));

    match parsed {
        Ok((token, email)) => Ok(Some(CurrentSession { token, email })),
        Err(e) => {
            tracing::warn!(error.message = %e, "Discarding a malformed session entry");
            session.log_out();
            Ok(None)
        }
    }
}

fn reject(on_anonymous: OnAnonymous) -> Error {
    match on_anonymous {
        OnAnonymous::RedirectToLogin => {
            InternalError::from_response(ApiError::AuthorizationError, see_other("/login")).into()
        }
        OnAnonymous::Unauthorized => ApiError::AuthorizationError.into(),
    }
}
