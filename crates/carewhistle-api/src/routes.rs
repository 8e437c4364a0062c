use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::{require_admin, require_manager, require_staff};
use crate::{
    chatbot, companies, dashboard, follow, intake, manager, reports, settings, users,
};

/// All routes, without transport layers (CORS, tracing), which the binary adds.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/reports", post(intake::submit_report))
        .route("/follow", post(follow::follow))
        .route("/follow/{token}", get(follow::get_thread))
        .route("/follow/{token}/messages", post(follow::post_message))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/chatbot", post(chatbot::chatbot))
        .with_state(state.clone());

    let staff_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .layer(middleware::from_fn_with_state(state.clone(), require_staff))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/companies", get(companies::list_companies).post(companies::create_company))
        .route(
            "/companies/{company_id}",
            put(companies::update_company).delete(companies::delete_company),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{user_id}", delete(users::delete_user))
        .route("/reports", get(reports::list_reports))
        .route("/reports/{report_id}", get(reports::get_report))
        .route("/reports/{report_id}/status", post(reports::set_status))
        .route("/reports/{report_id}/assign", post(reports::assign))
        .route("/reports/{report_id}/messages", post(reports::post_message))
        .route("/settings", get(settings::list_settings))
        .route(
            "/settings/{key}",
            put(settings::put_setting).delete(settings::delete_setting),
        )
        .route("/dashboard", get(dashboard::admin_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .with_state(state.clone());

    let manager_routes = Router::new()
        .route("/reports", get(manager::list_reports))
        .route("/reports/{report_id}", get(manager::get_report))
        .route("/reports/{report_id}/messages", post(manager::post_message))
        .route("/dashboard", get(manager::dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), require_manager))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .nest("/admin", admin_routes)
        .nest("/manager", manager_routes)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
