use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use carewhistle_crypto::encrypt::seal_contact;
use carewhistle_crypto::keys::{generate_anon_token, generate_pin};
use carewhistle_db::models::NewReport;
use carewhistle_db::reports::IntakeOutcome;
use carewhistle_types::api::{SubmitReportRequest, SubmitReportResponse};

use crate::auth::AppState;
use crate::convert::parse_id;
use crate::error::{ApiError, db_call};
use crate::extract::JsonBody;
use crate::validate;

/// Fresh credentials are drawn this many times before giving up.
const TOKEN_ATTEMPTS: usize = 3;

/// POST /reports: Anonymous report submission. The token and PIN in the
/// response are the reporter's only way back to the report.
pub async fn submit_report(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let company_code = req.company_code.trim().to_string();
    if company_code.is_empty() {
        return Err(ApiError::validation("Company code is required"));
    }
    let content = validate::required("Content", &req.content, validate::MAX_CONTENT)?;
    let subject = validate::optional("Subject", req.subject.as_deref(), validate::MAX_SUBJECT)?;
    let category = validate::category(req.category.as_deref())?;
    let contact = validate::optional("Contact", req.contact.as_deref(), validate::MAX_CONTACT)?;

    let sealed = contact
        .map(|c| seal_contact(&state.contact_key, &c))
        .transpose()?;

    for _ in 0..TOKEN_ATTEMPTS {
        let token = generate_anon_token();
        let pin = generate_pin();

        let (code, subj, body, cat, seal, tok, p) = (
            company_code.clone(),
            subject.clone(),
            content.clone(),
            category.clone(),
            sealed.clone(),
            token.clone(),
            pin.clone(),
        );
        let outcome = db_call(&state, move |db| {
            db.submit_report(&NewReport {
                company_code: &code,
                subject: subj.as_deref(),
                content: &body,
                category: &cat,
                contact: seal.as_ref().map(|(ct, n)| (ct.as_slice(), n.as_slice())),
                anon_token: &tok,
                anon_pin: &p,
            })
        })
        .await?;

        match outcome {
            IntakeOutcome::Created { report_id } => {
                return Ok((
                    StatusCode::CREATED,
                    Json(SubmitReportResponse {
                        report_id: parse_id(&report_id, "report"),
                        token,
                        pin,
                    }),
                ));
            }
            IntakeOutcome::UnknownCompany => {
                info!("Report submission with unknown company code");
                return Err(ApiError::validation("Unknown company code"));
            }
            IntakeOutcome::TokenCollision => warn!("Anonymous token collision, drawing again"),
        }
    }

    Err(ApiError::Internal(anyhow::anyhow!(
        "No unique anonymous token after {} attempts",
        TOKEN_ATTEMPTS
    )))
}
