use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use carewhistle_db::reports::{ManagerAccess, ReportFilter};
use carewhistle_types::api::{ManagerDashboard, ManagerReportDetail, PostMessageRequest, StatusCount};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, db_call};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::Staff;
use crate::validate;

fn denied(staff: &Staff, report_id: Uuid) -> ApiError {
    warn!("Manager {} denied report {} (not assigned)", staff.user_id, report_id);
    ApiError::Forbidden
}

/// GET /manager/reports: Only reports an admin assigned to the caller.
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
) -> Result<impl IntoResponse, ApiError> {
    let manager_id = staff.user_id.to_string();
    let rows = db_call(&state, move |db| {
        db.list_reports(&ReportFilter {
            manager_id: Some(manager_id.as_str()),
            ..Default::default()
        })
    })
    .await?;

    Ok(Json(rows.iter().map(convert::report_summary).collect::<Vec<_>>()))
}

/// GET /manager/reports/{id}: The report and its manager channel.
pub async fn get_report(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    PathParam(report_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (rid, mid) = (report_id.to_string(), staff.user_id.to_string());
    let access = db_call(&state, move |db| db.manager_report(&rid, &mid)).await?;

    match access {
        ManagerAccess::Granted((report, messages)) => Ok(Json(ManagerReportDetail {
            summary: convert::report_summary(&report),
            content: report.content,
            messages: convert::messages(messages),
        })),
        ManagerAccess::NotAssigned => Err(denied(&staff, report_id)),
        ManagerAccess::NotFound => Err(ApiError::NotFound("Report")),
    }
}

/// POST /manager/reports/{id}/messages: Manager channel only.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    PathParam(report_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = validate::required("Message", &req.body, validate::MAX_MESSAGE)?;

    let (rid, mid) = (report_id.to_string(), staff.user_id.to_string());
    let access = db_call(&state, move |db| db.post_as_manager(&rid, &mid, &body)).await?;

    match access {
        ManagerAccess::Granted(message) => {
            Ok((StatusCode::CREATED, Json(convert::message(message))))
        }
        ManagerAccess::NotAssigned => Err(denied(&staff, report_id)),
        ManagerAccess::NotFound => Err(ApiError::NotFound("Report")),
    }
}

/// GET /manager/dashboard: Status counts over the caller's queue.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
) -> Result<impl IntoResponse, ApiError> {
    let manager_id = staff.user_id.to_string();
    let counts = db_call(&state, move |db| db.manager_status_counts(&manager_id)).await?;

    Ok(Json(ManagerDashboard {
        total: counts.iter().map(|(_, n)| n).sum(),
        by_status: counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
    }))
}
