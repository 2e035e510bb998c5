//! Request-id and cookie-token auth middleware.
//!
//! The auth middleware resolves the `auth_token` cookie into an
//! [`AuthContext`] exactly once per request and stores it as a request
//! extension; handlers never touch the cookie themselves.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use eggmart_core::Role;

/// Cookie carrying the signed session token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Signing/verification keys plus the pool used to load the caller's role.
#[derive(Clone)]
pub struct AuthState {
    pool: PgPool,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthState {
    #[must_use]
    pub fn new(pool: PgPool, secret: &str) -> Self {
        Self {
            pool,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Issue a signed token for a user, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`jsonwebtoken::errors::Error`] if signing fails.
    pub fn issue_token(
        &self,
        user_id: i64,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    fn decode_user_id(&self, token: &str) -> Option<i64> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).ok()?;
        data.claims.sub.parse::<i64>().ok()
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

fn auth_error(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(MiddlewareErrorBody {
            error: MiddlewareError { code, message },
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware resolving the `auth_token` cookie into an [`AuthContext`].
///
/// Rejects with 401 when the cookie is missing, the signature or expiry is
/// invalid, or the token's user no longer exists.
pub async fn require_auth(State(auth): State<AuthState>, mut req: Request, next: Next) -> Response {
    let Some(user_id) = extract_cookie(req.headers(), AUTH_COOKIE)
        .and_then(|token| auth.decode_user_id(token))
    else {
        return auth_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid auth token",
        );
    };

    match eggmart_db::get_user_auth(&auth.pool, user_id).await {
        Ok(Some(user)) => match Role::parse(&user.role) {
            Some(role) => {
                req.extensions_mut().insert(AuthContext { user_id, role });
                next.run(req).await
            }
            None => {
                tracing::error!(user_id, role = %user.role, "user has unrecognized role");
                auth_error(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "missing or invalid auth token",
                )
            }
        },
        Ok(None) => auth_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid auth token",
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to load user for auth");
            auth_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "failed to resolve session",
            )
        }
    }
}

/// Middleware gating admin routes; must run after [`require_auth`].
pub async fn require_admin(
    Extension(ctx): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Response {
    if ctx.role == Role::Admin {
        next.run(req).await
    } else {
        auth_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "admin privileges required",
        )
    }
}

/// Finds a cookie value in the `Cookie` header.
fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        })
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).expect("value"));
        headers
    }

    #[test]
    fn extract_cookie_finds_token_among_others() {
        let headers = headers_with_cookie("theme=dark; auth_token=abc123; lang=en");
        assert_eq!(extract_cookie(&headers, AUTH_COOKIE), Some("abc123"));
    }

    #[test]
    fn extract_cookie_rejects_prefix_only_match() {
        let headers = headers_with_cookie("auth_token_old=abc123");
        assert_eq!(extract_cookie(&headers, AUTH_COOKIE), None);
    }

    #[test]
    fn extract_cookie_rejects_empty_value() {
        let headers = headers_with_cookie("auth_token=");
        assert_eq!(extract_cookie(&headers, AUTH_COOKIE), None);
    }

    #[test]
    fn extract_cookie_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_cookie(&headers, AUTH_COOKIE), None);
    }
}
