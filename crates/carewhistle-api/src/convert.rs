//! Row -> wire conversions. Rows hold SQLite text; corrupt values are
//! logged and replaced by defaults rather than failing the whole response.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use carewhistle_crypto::encrypt::open_contact;
use carewhistle_crypto::keys::ContactKey;
use carewhistle_db::models::{CompanyRow, MessageRow, ReportRow, SettingRow, UserRow};
use carewhistle_types::api::{
    CompanyResponse, MessageResponse, ReportSummary, SettingResponse, UserResponse,
};

pub fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub fn company(row: CompanyRow) -> CompanyResponse {
    CompanyResponse {
        id: parse_id(&row.id, "company"),
        name: row.name,
        code: row.code,
        created_at: parse_timestamp(&row.created_at),
    }
}

pub fn user(row: UserRow) -> UserResponse {
    UserResponse {
        id: parse_id(&row.id, "user"),
        email: row.email,
        role: row.role,
        company_id: row.company_id.as_deref().map(|c| parse_id(c, "company")),
        created_at: parse_timestamp(&row.created_at),
    }
}

pub fn report_summary(row: &ReportRow) -> ReportSummary {
    ReportSummary {
        id: parse_id(&row.id, "report"),
        company_id: parse_id(&row.company_id, "company"),
        company_code: row.company_code.clone(),
        subject: row.subject.clone(),
        category: row.category.clone(),
        status: row.status,
        manager_id: row.manager_id.as_deref().map(|m| parse_id(m, "manager")),
        created_at: parse_timestamp(&row.created_at),
    }
}

pub fn message(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_id(&row.id, "message"),
        channel: row.channel,
        sender: row.sender,
        body: row.body,
        created_at: parse_timestamp(&row.created_at),
    }
}

pub fn messages(rows: Vec<MessageRow>) -> Vec<MessageResponse> {
    rows.into_iter().map(message).collect()
}

pub fn setting(row: SettingRow) -> SettingResponse {
    SettingResponse {
        key: row.key,
        value: row.value,
        updated_at: parse_timestamp(&row.updated_at),
    }
}

/// Open the sealed reporter contact, if any. A contact sealed under another
/// key is reported as absent.
pub fn contact(row: &ReportRow, key: &ContactKey) -> Option<String> {
    let (ciphertext, nonce) = (row.contact_ciphertext.as_ref()?, row.contact_nonce.as_ref()?);
    match open_contact(key, ciphertext, nonce) {
        Ok(contact) => Some(contact),
        Err(e) => {
            warn!("Cannot open contact of report {}: {}", row.id, e);
            None
        }
    }
}
