use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use carewhistle_crypto::keys::ContactKey;
use carewhistle_crypto::passwords::{verify_dummy, verify_password};
use carewhistle_db::Database;
use carewhistle_types::api::{LoginRequest, StaffIdentity};

use crate::error::{ApiError, db_call};
use crate::extract::JsonBody;
use crate::middleware::Staff;
use crate::session;
use crate::validate;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub contact_key: ContactKey,
}

/// POST /auth/login: Staff sign-in. Any follow-up capabilities already in
/// the session are kept.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate::normalize_email(&req.email);
    let password = req.password;

    let user = db_call(&state, move |db| {
        let Some(user) = db.get_user_by_email(&email)? else {
            verify_dummy(&password);
            return Ok(None);
        };
        if verify_password(&password, &user.password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    })
    .await?;

    let Some(user) = user else {
        warn!("Rejected staff login");
        return Err(ApiError::InvalidCredentials);
    };

    let identity = StaffIdentity {
        user_id: crate::convert::parse_id(&user.id, "user"),
        email: user.email,
        role: user.role,
        company_id: user.company_id.as_deref().map(|c| crate::convert::parse_id(c, "company")),
    };

    let mut claims = session::read(&jar, &state.session_secret);
    claims.user_id = Some(identity.user_id);
    claims.role = Some(identity.role);
    claims.company_id = identity.company_id;
    let jar = session::write(jar, claims, &state.session_secret, state.session_ttl)?;

    info!("{} {} signed in", identity.role, identity.user_id);
    Ok((jar, Json(identity)))
}

/// POST /auth/logout: Drops the whole session, including follow-up
/// capabilities.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::clear(jar), Json(serde_json::json!({ "ok": true })))
}

/// GET /auth/me: The signed-in staff member.
pub async fn me(Extension(staff): Extension<Staff>) -> Json<StaffIdentity> {
    Json(StaffIdentity {
        user_id: staff.user_id,
        email: staff.email,
        role: staff.role,
        company_id: staff.company_id,
    })
}
