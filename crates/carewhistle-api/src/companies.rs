use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use carewhistle_crypto::keys::generate_company_code;
use carewhistle_db::queries::UniqueWrite;
use carewhistle_types::api::{CreateCompanyRequest, UpdateCompanyRequest};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, db_call};
use crate::extract::{JsonBody, PathParam};
use crate::validate;

/// Generated codes are redrawn this many times on collision.
const CODE_ATTEMPTS: usize = 5;

pub async fn list_companies(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = db_call(&state, |db| db.list_companies()).await?;
    Ok(Json(rows.into_iter().map(convert::company).collect::<Vec<_>>()))
}

/// POST /admin/companies: A code is generated when none is given.
pub async fn create_company(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate::required("Company name", &req.name, validate::MAX_COMPANY_NAME)?;
    let requested = match req.code.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => Some(validate::company_code(code)?),
    };

    let id = Uuid::new_v4();
    let attempts = if requested.is_some() { 1 } else { CODE_ATTEMPTS };

    for _ in 0..attempts {
        let code = requested.clone().unwrap_or_else(generate_company_code);
        let (sid, n, c) = (id.to_string(), name.clone(), code.clone());
        let write = db_call(&state, move |db| db.create_company(&sid, &n, &c)).await?;

        if write == UniqueWrite::Written {
            let sid = id.to_string();
            let row = db_call(&state, move |db| db.get_company(&sid))
                .await?
                .ok_or(ApiError::NotFound("Company"))?;
            info!("Company {} created with code {}", id, row.code);
            return Ok((StatusCode::CREATED, Json(convert::company(row))));
        }
    }

    Err(ApiError::Conflict("Company code already in use".into()))
}

pub async fn update_company(
    State(state): State<AppState>,
    PathParam(company_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate::optional("Company name", req.name.as_deref(), validate::MAX_COMPANY_NAME)?;
    let code = match req.code.as_deref() {
        Some(code) => Some(validate::company_code(code)?),
        None => None,
    };

    let id = company_id.to_string();
    let row = db_call(&state, move |db| {
        match db.update_company(&id, name.as_deref(), code.as_deref())? {
            UniqueWrite::Written => Ok(Ok(db.get_company(&id)?)),
            other => Ok(Err(other)),
        }
    })
    .await?;

    match row {
        Ok(Some(row)) => Ok(Json(convert::company(row))),
        Ok(None) | Err(UniqueWrite::NotFound) => Err(ApiError::NotFound("Company")),
        Err(_) => Err(ApiError::Conflict("Company code already in use".into())),
    }
}

/// DELETE /admin/companies/{id}: Removes the company's managers, reports
/// and messages with it.
pub async fn delete_company(
    State(state): State<AppState>,
    PathParam(company_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let id = company_id.to_string();
    if !db_call(&state, move |db| db.delete_company(&id)).await? {
        return Err(ApiError::NotFound("Company"));
    }
    info!("Company {} deleted", company_id);
    Ok(StatusCode::NO_CONTENT)
}
