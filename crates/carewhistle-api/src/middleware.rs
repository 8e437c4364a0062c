use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use carewhistle_types::models::Role;

use crate::auth::AppState;
use crate::convert::parse_id;
use crate::error::{ApiError, db_call};
use crate::session;

/// Signed-in staff member, inserted as a request extension by the role guards.
#[derive(Debug, Clone)]
pub struct Staff {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&state, &jar, req, next, Some(Role::Admin)).await
}

pub async fn require_manager(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&state, &jar, req, next, Some(Role::Manager)).await
}

/// Any staff role.
pub async fn require_staff(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&state, &jar, req, next, None).await
}

async fn require_role(
    state: &AppState,
    jar: &CookieJar,
    mut req: Request,
    next: Next,
    role: Option<Role>,
) -> Result<Response, ApiError> {
    let staff = load_staff(state, jar).await?;

    if let Some(required) = role {
        if staff.role != required {
            warn!(
                "{} {} denied access to {} route {}",
                staff.role,
                staff.user_id,
                required,
                req.uri().path()
            );
            return Err(ApiError::Forbidden);
        }
    }

    req.extensions_mut().insert(staff);
    Ok(next.run(req).await)
}

/// Resolve the session to a current user. The account is re-read on every
/// request so deleted users and changed roles take effect immediately.
async fn load_staff(state: &AppState, jar: &CookieJar) -> Result<Staff, ApiError> {
    let claims = session::read(jar, &state.session_secret);
    let user_id = claims.user_id.ok_or(ApiError::Unauthenticated)?;

    let id = user_id.to_string();
    let user = db_call(state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if claims.role != Some(user.role) {
        return Err(ApiError::Unauthenticated);
    }

    Ok(Staff {
        user_id,
        email: user.email,
        role: user.role,
        company_id: user.company_id.as_deref().map(|c| parse_id(c, "company")),
    })
}
