use axum::{Json, extract::State, response::IntoResponse};

use carewhistle_types::api::{AdminDashboard, CategoryCount, CompanyCount, DailyCount, StatusCount};

use crate::auth::AppState;
use crate::convert::parse_id;
use crate::error::{ApiError, db_call};

/// Length of the daily time series.
pub const DASHBOARD_DAYS: u32 = 30;

/// GET /admin/dashboard
pub async fn admin_dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let stats = db_call(&state, move |db| db.report_stats(today, DASHBOARD_DAYS)).await?;

    Ok(Json(AdminDashboard {
        total: stats.total,
        unassigned: stats.unassigned,
        by_status: stats
            .by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        by_category: stats
            .by_category
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
        by_company: stats
            .by_company
            .into_iter()
            .map(|(id, name, count)| CompanyCount {
                company_id: parse_id(&id, "company"),
                name,
                count,
            })
            .collect(),
        daily: stats
            .daily
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
    }))
}
