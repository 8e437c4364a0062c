use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use carewhistle_crypto::passwords::hash_password;
use carewhistle_db::queries::UniqueWrite;
use carewhistle_types::api::CreateUserRequest;
use carewhistle_types::models::Role;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, db_call};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::Staff;
use crate::validate;

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = db_call(&state, |db| db.list_users()).await?;
    Ok(Json(rows.into_iter().map(convert::user).collect::<Vec<_>>()))
}

/// POST /admin/users: Managers must name an existing company, admins none.
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate::email(&req.email)?;
    validate::password(&req.password)?;

    match (req.role, req.company_id) {
        (Role::Manager, None) => {
            return Err(ApiError::validation("Managers must belong to a company"));
        }
        (Role::Admin, Some(_)) => {
            return Err(ApiError::validation("Admins cannot belong to a company"));
        }
        _ => {}
    }

    let id = Uuid::new_v4();
    let role = req.role;
    let company_id = req.company_id.map(|c| c.to_string());
    let password = req.password;
    let sid = id.to_string();

    let created = db_call(&state, move |db| {
        if let Some(cid) = company_id.as_deref() {
            if db.get_company(cid)?.is_none() {
                return Ok(None);
            }
        }
        let hash = hash_password(&password)?;
        match db.create_user(&sid, &email, &hash, role, company_id.as_deref())? {
            UniqueWrite::Written => Ok(Some(db.get_user_by_id(&sid)?)),
            _ => Ok(Some(None)),
        }
    })
    .await?;

    match created {
        None => Err(ApiError::validation("Unknown company")),
        Some(None) => Err(ApiError::Conflict("Email already in use".into())),
        Some(Some(row)) => {
            info!("{} {} created", role, id);
            Ok((StatusCode::CREATED, Json(convert::user(row))))
        }
    }
}

/// DELETE /admin/users/{id}: Reports of a deleted manager become unassigned.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    PathParam(user_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if user_id == staff.user_id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    let id = user_id.to_string();
    if !db_call(&state, move |db| db.delete_user(&id)).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!("User {} deleted by {}", user_id, staff.user_id);
    Ok(StatusCode::NO_CONTENT)
}
