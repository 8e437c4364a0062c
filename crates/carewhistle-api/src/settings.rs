use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use carewhistle_types::api::SetSettingRequest;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, db_call};
use crate::extract::{JsonBody, PathParam};
use crate::validate;

pub async fn list_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = db_call(&state, |db| db.list_settings()).await?;
    Ok(Json(rows.into_iter().map(convert::setting).collect::<Vec<_>>()))
}

/// PUT /admin/settings/{key}: Create or overwrite.
pub async fn put_setting(
    State(state): State<AppState>,
    PathParam(key): PathParam<String>,
    JsonBody(req): JsonBody<SetSettingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = validate::setting_key(&key)?;
    let value = validate::setting_value(&req.value)?;

    let row = db_call(&state, move |db| db.set_setting(&key, &value)).await?;
    info!("Setting {} updated", row.key);
    Ok(Json(convert::setting(row)))
}

pub async fn delete_setting(
    State(state): State<AppState>,
    PathParam(key): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    let k = key.clone();
    if !db_call(&state, move |db| db.delete_setting(&k)).await? {
        return Err(ApiError::NotFound("Setting"));
    }
    info!("Setting {} deleted", key);
    Ok(StatusCode::NO_CONTENT)
}
