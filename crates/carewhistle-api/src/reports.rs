use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use carewhistle_db::reports::{AssignOutcome, ReportFilter};
use carewhistle_types::api::{
    AdminPostMessageRequest, AdminReportDetail, AssignRequest, ReportQuery, UpdateStatusRequest,
};
use carewhistle_types::models::{ReportStatus, Sender};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, db_call};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::Staff;
use crate::validate;

fn parse_status(raw: &str) -> Result<ReportStatus, ApiError> {
    raw.trim().parse::<ReportStatus>().map_err(|e| {
        ApiError::validation(format!(
            "{}; expected one of {}",
            e,
            ReportStatus::ALL
                .iter()
                .map(ReportStatus::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

/// GET /admin/reports: The whole queue, newest first.
pub async fn list_reports(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let company_id = query.company_id.map(|c| c.to_string());

    let rows = db_call(&state, move |db| {
        db.list_reports(&ReportFilter {
            status,
            company_id: company_id.as_deref(),
            manager_id: None,
        })
    })
    .await?;

    Ok(Json(rows.iter().map(convert::report_summary).collect::<Vec<_>>()))
}

/// GET /admin/reports/{id}: Full detail, both channels, opened contact.
pub async fn get_report(
    State(state): State<AppState>,
    PathParam(report_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let id = report_id.to_string();
    let (report, reporter, manager) = db_call(&state, move |db| db.report_with_messages(&id))
        .await?
        .ok_or(ApiError::NotFound("Report"))?;

    Ok(Json(AdminReportDetail {
        summary: convert::report_summary(&report),
        contact: convert::contact(&report, &state.contact_key),
        content: report.content,
        reporter_messages: convert::messages(reporter),
        manager_messages: convert::messages(manager),
    }))
}

/// POST /admin/reports/{id}/status: Any of the fixed statuses, in any order.
pub async fn set_status(
    State(state): State<AppState>,
    PathParam(report_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = parse_status(&req.status)?;

    let id = report_id.to_string();
    let row = db_call(&state, move |db| {
        if !db.set_report_status(&id, status)? {
            return Ok(None);
        }
        db.get_report(&id)
    })
    .await?
    .ok_or(ApiError::NotFound("Report"))?;

    info!("Report {} moved to {}", report_id, status);
    Ok(Json(convert::report_summary(&row)))
}

/// POST /admin/reports/{id}/assign: Gives one manager of the report's
/// company access to it.
pub async fn assign(
    State(state): State<AppState>,
    PathParam(report_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<AssignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (rid, mid) = (report_id.to_string(), req.manager_id.to_string());
    let (outcome, row) = db_call(&state, move |db| {
        let outcome = db.assign_report(&rid, &mid)?;
        let row = if outcome == AssignOutcome::Assigned {
            db.get_report(&rid)?
        } else {
            None
        };
        Ok((outcome, row))
    })
    .await?;

    match (outcome, row) {
        (AssignOutcome::Assigned, Some(row)) => Ok(Json(convert::report_summary(&row))),
        (AssignOutcome::Assigned, None) | (AssignOutcome::ReportNotFound, _) => {
            Err(ApiError::NotFound("Report"))
        }
        (AssignOutcome::ManagerNotFound, _) | (AssignOutcome::NotAManager, _) => {
            Err(ApiError::validation("Reports can only be assigned to a manager"))
        }
        (AssignOutcome::CompanyMismatch, _) => {
            warn!(
                "Refused to assign report {} to manager {} of another company",
                report_id, req.manager_id
            );
            Err(ApiError::validation(
                "Manager does not belong to the report's company",
            ))
        }
    }
}

/// POST /admin/reports/{id}/messages: Admins write on either channel.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    PathParam(report_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<AdminPostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = validate::required("Message", &req.body, validate::MAX_MESSAGE)?;

    let (rid, author) = (report_id.to_string(), staff.user_id.to_string());
    let channel = req.channel;
    let message = db_call(&state, move |db| {
        db.append_message(&rid, channel, Sender::Admin, Some(author.as_str()), &body)
    })
    .await?
    .ok_or(ApiError::NotFound("Report"))?;

    Ok((StatusCode::CREATED, Json(convert::message(message))))
}
