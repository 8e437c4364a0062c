//! Row types, one per table. Enum columns are parsed on read.

use std::str::FromStr;

use carewhistle_types::models::{Channel, ReportStatus, Role, Sender};
use rusqlite::Row;
use rusqlite::types::Type;

pub struct CompanyRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created_at: String,
}

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company_id: Option<String>,
    pub created_at: String,
}

/// A report as staff see it. Credentials are deliberately not part of this row.
pub struct ReportRow {
    pub id: String,
    pub company_id: String,
    pub company_code: String,
    pub subject: Option<String>,
    pub content: String,
    pub category: String,
    pub status: ReportStatus,
    pub contact_ciphertext: Option<Vec<u8>>,
    pub contact_nonce: Option<Vec<u8>>,
    pub manager_id: Option<String>,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub report_id: String,
    pub channel: Channel,
    pub sender: Sender,
    pub author_id: Option<String>,
    pub body: String,
    pub created_at: String,
}

pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

/// Input of the public intake transaction.
pub struct NewReport<'a> {
    pub company_code: &'a str,
    pub subject: Option<&'a str>,
    pub content: &'a str,
    pub category: &'a str,
    /// (ciphertext, nonce) of the sealed contact details.
    pub contact: Option<(&'a [u8], &'a [u8])>,
    pub anon_token: &'a str,
    pub anon_pin: &'a str,
}

pub(crate) const COMPANY_COLUMNS: &str = "id, name, code, created_at";

pub(crate) const USER_COLUMNS: &str = "id, email, password, role, company_id, created_at";

pub(crate) const REPORT_COLUMNS: &str = "id, company_id, company_code, subject, content, category, status, \
     contact_ciphertext, contact_nonce, manager_id, created_at";

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, report_id, channel, sender, author_id, body, created_at";

/// Read a TEXT column into one of the string-backed enums.
fn parse_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl CompanyRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            code: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl UserRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            role: parse_col(row, 3)?,
            company_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl ReportRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            company_code: row.get(2)?,
            subject: row.get(3)?,
            content: row.get(4)?,
            category: row.get(5)?,
            status: parse_col(row, 6)?,
            contact_ciphertext: row.get(7)?,
            contact_nonce: row.get(8)?,
            manager_id: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            report_id: row.get(1)?,
            channel: parse_col(row, 2)?,
            sender: parse_col(row, 3)?,
            author_id: row.get(4)?,
            body: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
