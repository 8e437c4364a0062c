//! Signed session cookie. The claims are a JWT so they can be verified
//! without server-side storage.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use carewhistle_types::api::SessionClaims;

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "cw_session";

/// Claims of the current session. A missing, expired or forged cookie is an
/// empty session, not an error.
pub fn read(jar: &CookieJar, secret: &str) -> SessionClaims {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SessionClaims::default();
    };

    match decode::<SessionClaims>(
        cookie.value(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!("Discarding session cookie: {}", e);
            SessionClaims::default()
        }
    }
}

/// Sign `claims` with a fresh expiry and store them in the jar. The cookie
/// itself lives for the browser session; `exp` bounds it server-side.
pub fn write(
    jar: CookieJar,
    mut claims: SessionClaims,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<CookieJar, ApiError> {
    claims.exp = (chrono::Utc::now() + ttl).timestamp() as usize;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok(jar.add(cookie))
}

pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
