//! Session identity
//!
//! The identity provider signs an HS256 token whose `sub` is the user id. It
//! arrives either in the session cookie or as `Authorization: Bearer <token>`.
//! Anything missing, malformed, expired or pointing at an unknown user yields an
//! anonymous request, never an error.

use actix_web::{web, Error, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::User;
use crate::state::AppState;

const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sign a session token for `user_id`.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(
            &Header::new(SESSION_ALGORITHM),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify signature and expiry, returning the user id.
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let validation = Validation::new(SESSION_ALGORITHM);
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| crate::error::AppError::Unauthorized("Invalid user ID".to_string()))
    }
}

/// The requesting user, if the request carries a valid session.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<User> {
        self.0
    }
}

fn session_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = state
            .as_ref()
            .and_then(|s| session_token(req, &s.site.session_cookie_name));

        Box::pin(async move {
            let (Some(state), Some(token)) = (state, token) else {
                return Ok(CurrentUser(None));
            };

            let user_id = match state.sessions.verify(&token) {
                Ok(id) => id,
                Err(e) => {
                    debug!(error = %e, "Ignoring invalid session token");
                    return Ok(CurrentUser(None));
                }
            };

            match state.store.users.find_by_id(user_id).await {
                Ok(user) => Ok(CurrentUser(user)),
                Err(e) => {
                    debug!(error = %e, %user_id, "Session user lookup failed");
                    Ok(CurrentUser(None))
                }
            }
        })
    }
}
