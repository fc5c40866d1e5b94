//! Session resolution for authenticated endpoints.
//!
//! Sessions are issued by the authentication provider; this service only
//! maps a presented session token to its user. The token is accepted from
//! the session cookie or from an `Authorization: Bearer` header and looked
//! up by its SHA-256 digest.

use actix_web::{
    dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest,
};
use futures::future::LocalBoxFuture;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

const AUTH_FAILED: &str = "Failed to verify session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState<State>>>().cloned();
        let token = state
            .as_ref()
            .and_then(|s| session_token(req, &s.config.session_cookie));

        Box::pin(async move {
            let token = token.ok_or(Error::Unauthorized)?;
            let state = state.ok_or_else(|| {
                Error::ConfigurationError(String::from(
                    "application state is not registered",
                ))
            })?;

            let session = state
                .database
                .session
                .get_active(&hash_token(&token))
                .await
                .map_err(|e| Error::storage(AUTH_FAILED, e))?
                .ok_or(Error::Unauthorized)?;

            Ok(AuthenticatedUser {
                user_id: session.user_id,
            })
        })
    }
}

/// Bearer header first, then the session cookie. Empty values count as absent.
pub fn session_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned());

    let token = match bearer {
        Some(token) => Some(token),
        None => req
            .cookie(cookie_name)
            .map(|cookie| cookie.value().trim().to_owned()),
    };

    token.filter(|token| !token.is_empty())
}

pub fn hash_token(token: &str) -> String {
    sha256::digest(token)
}
