use anyhow::Result;
use carewhistle_types::models::{Channel, ReportStatus, Role, Sender};
use rusqlite::{Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::Database;
use crate::models::{MESSAGE_COLUMNS, MessageRow, NewReport, REPORT_COLUMNS, ReportRow};
use crate::queries::{is_unique_violation, query_user_conn};

/// Receipt appended to the reporter channel of every new report.
pub const SUBMISSION_RECEIPT: &str = "Report submitted.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Created { report_id: String },
    UnknownCompany,
    /// The generated token already exists; the caller draws a new one.
    TokenCollision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    ReportNotFound,
    ManagerNotFound,
    NotAManager,
    CompanyMismatch,
}

/// Result of a manager acting on a report.
pub enum ManagerAccess<T> {
    Granted(T),
    NotAssigned,
    NotFound,
}

/// Filters for the staff report queue. `None` means "any".
#[derive(Debug, Default, Clone)]
pub struct ReportFilter<'a> {
    pub status: Option<ReportStatus>,
    pub company_id: Option<&'a str>,
    pub manager_id: Option<&'a str>,
}

impl Database {
    // -- Intake --

    /// Create a report for the company behind `company_code` together with
    /// its submission receipt, in one transaction.
    pub fn submit_report(&self, new: &NewReport<'_>) -> Result<IntakeOutcome> {
        self.with_conn_mut(|conn| {
            let company: Option<(String, String)> = conn
                .query_row(
                    "SELECT id, code FROM companies WHERE code = ?1",
                    [new.company_code.trim().to_ascii_uppercase()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((company_id, company_code)) = company else {
                return Ok(IntakeOutcome::UnknownCompany);
            };

            let report_id = Uuid::new_v4().to_string();
            let (contact_ciphertext, contact_nonce) = match new.contact {
                Some((ct, nonce)) => (Some(ct), Some(nonce)),
                None => (None, None),
            };

            let inserted = conn.execute(
                "INSERT INTO reports (id, company_id, company_code, subject, content, category, status,
                                      contact_ciphertext, contact_nonce, anon_token, anon_pin)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    report_id,
                    company_id,
                    company_code,
                    new.subject,
                    new.content,
                    new.category,
                    ReportStatus::New.as_str(),
                    contact_ciphertext,
                    contact_nonce,
                    new.anon_token,
                    new.anon_pin,
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Ok(IntakeOutcome::TokenCollision),
                Err(e) => return Err(e.into()),
            }

            insert_message(
                conn,
                &report_id,
                Channel::Reporter,
                Sender::System,
                None,
                SUBMISSION_RECEIPT,
            )?;

            info!("Report {} submitted for company {}", report_id, company_code);
            Ok(IntakeOutcome::Created { report_id })
        })
    }

    // -- Reporter follow-up --

    /// Exact match on both halves of the credential.
    pub fn find_report_by_credentials(&self, token: &str, pin: &str) -> Result<Option<ReportRow>> {
        self.with_conn(|conn| query_report_by_credentials(conn, token, pin))
    }

    /// The report and its reporter channel, if the credential matches.
    pub fn reporter_thread(
        &self,
        token: &str,
        pin: &str,
    ) -> Result<Option<(ReportRow, Vec<MessageRow>)>> {
        self.with_conn(|conn| {
            let Some(report) = query_report_by_credentials(conn, token, pin)? else {
                return Ok(None);
            };
            let messages = query_messages(conn, &report.id, Channel::Reporter)?;
            Ok(Some((report, messages)))
        })
    }

    pub fn post_as_reporter(&self, token: &str, pin: &str, body: &str) -> Result<Option<MessageRow>> {
        self.with_conn_mut(|conn| {
            let Some(report) = query_report_by_credentials(conn, token, pin)? else {
                return Ok(None);
            };
            let message =
                insert_message(conn, &report.id, Channel::Reporter, Sender::Reporter, None, body)?;
            Ok(Some(message))
        })
    }

    // -- Staff queue --

    /// Reports matching `filter`, newest first.
    pub fn list_reports(&self, filter: &ReportFilter<'_>) -> Result<Vec<ReportRow>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut params: Vec<String> = Vec::new();

            if let Some(status) = filter.status {
                params.push(status.as_str().to_string());
                clauses.push(format!("status = ?{}", params.len()));
            }
            if let Some(company_id) = filter.company_id {
                params.push(company_id.to_string());
                clauses.push(format!("company_id = ?{}", params.len()));
            }
            if let Some(manager_id) = filter.manager_id {
                params.push(manager_id.to_string());
                clauses.push(format!("manager_id = ?{}", params.len()));
            }

            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", clauses.join(" AND "))
            };
            let sql = format!(
                "SELECT {REPORT_COLUMNS} FROM reports {where_sql} ORDER BY created_at DESC, rowid DESC"
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), ReportRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_report(&self, id: &str) -> Result<Option<ReportRow>> {
        self.with_conn(|conn| query_report(conn, id))
    }

    /// Report plus both channels, for admins.
    pub fn report_with_messages(
        &self,
        id: &str,
    ) -> Result<Option<(ReportRow, Vec<MessageRow>, Vec<MessageRow>)>> {
        self.with_conn(|conn| {
            let Some(report) = query_report(conn, id)? else {
                return Ok(None);
            };
            let reporter = query_messages(conn, id, Channel::Reporter)?;
            let manager = query_messages(conn, id, Channel::Manager)?;
            Ok(Some((report, reporter, manager)))
        })
    }

    // -- Triage --

    /// Any of the fixed statuses may be set at any time. Returns false if the
    /// report does not exist.
    pub fn set_report_status(&self, id: &str, status: ReportStatus) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE reports SET status = ?1 WHERE id = ?2",
                (status.as_str(), id),
            )?;
            Ok(n > 0)
        })
    }

    /// Bind a report to a manager of the report's own company. Reassigning
    /// replaces the previous manager.
    pub fn assign_report(&self, report_id: &str, manager_id: &str) -> Result<AssignOutcome> {
        self.with_conn_mut(|conn| {
            let Some(report) = query_report(conn, report_id)? else {
                return Ok(AssignOutcome::ReportNotFound);
            };
            let Some(user) = query_user_conn(conn, manager_id)? else {
                return Ok(AssignOutcome::ManagerNotFound);
            };
            if user.role != Role::Manager {
                return Ok(AssignOutcome::NotAManager);
            }
            if user.company_id.as_deref() != Some(report.company_id.as_str()) {
                return Ok(AssignOutcome::CompanyMismatch);
            }

            conn.execute(
                "UPDATE reports SET manager_id = ?1 WHERE id = ?2",
                (manager_id, report_id),
            )?;
            info!("Report {} assigned to manager {}", report_id, manager_id);
            Ok(AssignOutcome::Assigned)
        })
    }

    // -- Messages --

    /// Append a staff message on either channel. `None` if the report is gone.
    pub fn append_message(
        &self,
        report_id: &str,
        channel: Channel,
        sender: Sender,
        author_id: Option<&str>,
        body: &str,
    ) -> Result<Option<MessageRow>> {
        self.with_conn_mut(|conn| {
            if query_report(conn, report_id)?.is_none() {
                return Ok(None);
            }
            Ok(Some(insert_message(conn, report_id, channel, sender, author_id, body)?))
        })
    }

    pub fn list_messages(&self, report_id: &str, channel: Channel) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, report_id, channel))
    }

    /// The report and its manager channel, if assigned to `manager_id`.
    pub fn manager_report(
        &self,
        report_id: &str,
        manager_id: &str,
    ) -> Result<ManagerAccess<(ReportRow, Vec<MessageRow>)>> {
        self.with_conn(|conn| {
            let Some(report) = query_report(conn, report_id)? else {
                return Ok(ManagerAccess::NotFound);
            };
            if report.manager_id.as_deref() != Some(manager_id) {
                return Ok(ManagerAccess::NotAssigned);
            }
            let messages = query_messages(conn, report_id, Channel::Manager)?;
            Ok(ManagerAccess::Granted((report, messages)))
        })
    }

    pub fn post_as_manager(
        &self,
        report_id: &str,
        manager_id: &str,
        body: &str,
    ) -> Result<ManagerAccess<MessageRow>> {
        self.with_conn_mut(|conn| {
            let Some(report) = query_report(conn, report_id)? else {
                return Ok(ManagerAccess::NotFound);
            };
            if report.manager_id.as_deref() != Some(manager_id) {
                return Ok(ManagerAccess::NotAssigned);
            }
            let message = insert_message(
                conn,
                report_id,
                Channel::Manager,
                Sender::Manager,
                Some(manager_id),
                body,
            )?;
            Ok(ManagerAccess::Granted(message))
        })
    }
}

fn query_report(conn: &Connection, id: &str) -> Result<Option<ReportRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"))?;
    Ok(stmt.query_row([id], ReportRow::from_row).optional()?)
}

fn query_report_by_credentials(conn: &Connection, token: &str, pin: &str) -> Result<Option<ReportRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports WHERE anon_token = ?1 AND anon_pin = ?2"
    ))?;
    Ok(stmt.query_row([token, pin], ReportRow::from_row).optional()?)
}

fn query_messages(conn: &Connection, report_id: &str, channel: Channel) -> Result<Vec<MessageRow>> {
    // rowid breaks ties between messages written within the same second
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE report_id = ?1 AND channel = ?2
         ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt
        .query_map([report_id, channel.as_str()], MessageRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn insert_message(
    conn: &Connection,
    report_id: &str,
    channel: Channel,
    sender: Sender,
    author_id: Option<&str>,
    body: &str,
) -> Result<MessageRow> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO messages (id, report_id, channel, sender, author_id, body)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, report_id, channel.as_str(), sender.as_str(), author_id, body],
    )?;

    let mut stmt = conn.prepare(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"))?;
    Ok(stmt.query_row([&id], MessageRow::from_row)?)
}
