use std::collections::HashMap;

use anyhow::Result;
use carewhistle_types::models::ReportStatus;
use chrono::{Days, NaiveDate};
use rusqlite::Connection;
use tracing::warn;

use crate::Database;

/// Aggregates behind the admin dashboard.
pub struct ReportStats {
    pub total: u64,
    pub unassigned: u64,
    /// Every status, zero-filled, in lifecycle order.
    pub by_status: Vec<(ReportStatus, u64)>,
    /// Most frequent first.
    pub by_category: Vec<(String, u64)>,
    /// (company_id, name, count) for every company, including empty ones.
    pub by_company: Vec<(String, String, u64)>,
    /// One entry per day, oldest first, zero-filled.
    pub daily: Vec<(NaiveDate, u64)>,
}

impl Database {
    /// Dashboard aggregates; `daily` covers the `days` days ending on `today`.
    pub fn report_stats(&self, today: NaiveDate, days: u32) -> Result<ReportStats> {
        self.with_conn(|conn| {
            let by_status = status_counts(conn, None)?;
            let total = by_status.iter().map(|(_, n)| n).sum();

            let unassigned: i64 = conn.query_row(
                "SELECT COUNT(*) FROM reports WHERE manager_id IS NULL",
                [],
                |r| r.get(0),
            )?;

            let mut stmt = conn.prepare(
                "SELECT category, COUNT(*) AS n FROM reports
                 GROUP BY category ORDER BY n DESC, category ASC",
            )?;
            let by_category = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, COUNT(r.id) AS n
                 FROM companies c
                 LEFT JOIN reports r ON r.company_id = c.id
                 GROUP BY c.id, c.name
                 ORDER BY n DESC, c.name COLLATE NOCASE ASC",
            )?;
            let by_company = stmt
                .query_map([], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get::<_, i64>(2)? as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let daily = daily_counts(conn, today, days)?;

            Ok(ReportStats {
                total,
                unassigned: unassigned as u64,
                by_status,
                by_category,
                by_company,
                daily,
            })
        })
    }

    /// Status counts over the reports assigned to one manager.
    pub fn manager_status_counts(&self, manager_id: &str) -> Result<Vec<(ReportStatus, u64)>> {
        self.with_conn(|conn| status_counts(conn, Some(manager_id)))
    }
}

fn status_counts(conn: &Connection, manager_id: Option<&str>) -> Result<Vec<(ReportStatus, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM reports
         WHERE ?1 IS NULL OR manager_id = ?1
         GROUP BY status",
    )?;
    let mut counts: HashMap<String, u64> = HashMap::new();
    let rows = stmt.query_map([manager_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    for row in rows {
        let (status, n) = row?;
        counts.insert(status, n);
    }

    for status in counts.keys() {
        if status.parse::<ReportStatus>().is_err() {
            warn!("Ignoring reports with unknown status '{}'", status);
        }
    }

    Ok(ReportStatus::ALL
        .iter()
        .map(|s| (*s, counts.get(s.as_str()).copied().unwrap_or(0)))
        .collect())
}

fn daily_counts(conn: &Connection, today: NaiveDate, days: u32) -> Result<Vec<(NaiveDate, u64)>> {
    if days == 0 {
        return Ok(vec![]);
    }
    let start = today
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| anyhow::anyhow!("Dashboard window out of range"))?;

    let mut stmt = conn.prepare(
        "SELECT date(created_at) AS d, COUNT(*) FROM reports
         WHERE date(created_at) BETWEEN ?1 AND ?2
         GROUP BY d",
    )?;
    let mut counts: HashMap<NaiveDate, u64> = HashMap::new();
    let rows = stmt.query_map([start.to_string(), today.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    for row in rows {
        let (day, n) = row?;
        match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
            Ok(date) => {
                counts.insert(date, n);
            }
            Err(e) => warn!("Corrupt report date '{}': {}", day, e),
        }
    }

    Ok(start
        .iter_days()
        .take(days as usize)
        .map(|d| (d, counts.get(&d).copied().unwrap_or(0)))
        .collect())
}
