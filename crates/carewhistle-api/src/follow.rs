use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use carewhistle_types::api::{FollowRequest, FollowResponse, PostMessageRequest, ReporterThread};

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, db_call};
use crate::extract::{JsonBody, PathParam};
use crate::session;
use crate::validate;

/// POST /follow: Exchange token + PIN for a follow-up capability on this
/// session. Wrong token, wrong PIN and a malformed request all look the same
/// to the caller.
pub async fn follow(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<FollowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Malformed follow-up request: {}", rejection.body_text());
            return Err(ApiError::InvalidCode);
        }
    };

    let token = req.token.trim().to_string();
    let pin = req.pin.trim().to_string();
    if token.is_empty() || pin.is_empty() {
        return Err(ApiError::InvalidCode);
    }

    let (t, p) = (token.clone(), pin.clone());
    let report = db_call(&state, move |db| db.find_report_by_credentials(&t, &p)).await?;
    let Some(report) = report else {
        warn!("Rejected follow-up credentials");
        return Err(ApiError::InvalidCode);
    };

    let mut claims = session::read(&jar, &state.session_secret);
    claims.follow.insert(token.clone(), pin);
    let jar = session::write(jar, claims, &state.session_secret, state.session_ttl)?;

    Ok((
        jar,
        Json(FollowResponse {
            token,
            status: report.status,
        }),
    ))
}

/// The PIN this session holds for `token`, or 403.
fn capability(state: &AppState, jar: &CookieJar, token: &str) -> Result<String, ApiError> {
    session::read(jar, &state.session_secret)
        .follow
        .get(token)
        .cloned()
        .ok_or(ApiError::Forbidden)
}

/// GET /follow/{token}: The report and its reporter channel.
pub async fn get_thread(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let pin = capability(&state, &jar, &token)?;

    let t = token.clone();
    let (report, messages) = db_call(&state, move |db| db.reporter_thread(&t, &pin))
        .await?
        .ok_or(ApiError::NotFound("Report"))?;

    Ok(Json(ReporterThread {
        token,
        subject: report.subject,
        content: report.content,
        category: report.category,
        status: report.status,
        created_at: convert::parse_timestamp(&report.created_at),
        messages: convert::messages(messages),
    }))
}

/// POST /follow/{token}/messages: Reporter writes on the reporter channel.
pub async fn post_message(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
    jar: CookieJar,
    JsonBody(req): JsonBody<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pin = capability(&state, &jar, &token)?;
    let body = validate::required("Message", &req.body, validate::MAX_MESSAGE)?;

    let message = db_call(&state, move |db| db.post_as_reporter(&token, &pin, &body))
        .await?
        .ok_or(ApiError::NotFound("Report"))?;

    Ok((StatusCode::CREATED, Json(convert::message(message))))
}
