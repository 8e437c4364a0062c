use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Channel, ReportStatus, Role, Sender};

// -- Session --

/// Claims of the signed session cookie. Staff fields and reporter
/// capabilities live side by side; either half may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    /// Follow-up capabilities: anonymous token -> PIN.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub follow: BTreeMap<String, String>,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

// -- Intake & follow-up --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitReportRequest {
    pub company_code: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

/// Returned once at submission. The pair is never shown again.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReportResponse {
    pub report_id: Uuid,
    pub token: String,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowRequest {
    pub token: String,
    pub pin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub token: String,
    pub status: ReportStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReporterThread {
    pub token: String,
    pub subject: Option<String>,
    pub content: String,
    pub category: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminPostMessageRequest {
    pub channel: Channel,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub channel: Channel,
    pub sender: Sender,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// -- Companies --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// -- Reports --

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub status: Option<String>,
    pub company_id: Option<Uuid>,
}

/// Status travels as a plain string so an unknown value gets an error that
/// lists the valid ones.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignRequest {
    pub manager_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_code: String,
    pub subject: Option<String>,
    pub category: String,
    pub status: ReportStatus,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminReportDetail {
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub content: String,
    pub contact: Option<String>,
    pub reporter_messages: Vec<MessageResponse>,
    pub manager_messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManagerReportDetail {
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub content: String,
    pub messages: Vec<MessageResponse>,
}

// -- Settings --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetSettingRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

// -- Dashboards --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ReportStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCount {
    pub company_id: Uuid,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total: u64,
    pub unassigned: u64,
    pub by_status: Vec<StatusCount>,
    pub by_category: Vec<CategoryCount>,
    pub by_company: Vec<CompanyCount>,
    pub daily: Vec<DailyCount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManagerDashboard {
    pub total: u64,
    pub by_status: Vec<StatusCount>,
}

// -- Help assistant --

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatbotReply {
    pub reply: String,
}
