use crate::Database;
use crate::models::{COMPANY_COLUMNS, CompanyRow, SettingRow, USER_COLUMNS, UserRow};
use anyhow::Result;
use carewhistle_types::models::Role;
use rusqlite::{Connection, OptionalExtension};

/// Result of a write that may collide with a UNIQUE column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueWrite {
    Written,
    Duplicate,
    NotFound,
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Map a statement result to `Duplicate` on unique violation.
fn unique_write(res: rusqlite::Result<usize>) -> Result<UniqueWrite> {
    match res {
        Ok(0) => Ok(UniqueWrite::NotFound),
        Ok(_) => Ok(UniqueWrite::Written),
        Err(e) if is_unique_violation(&e) => Ok(UniqueWrite::Duplicate),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    // -- Companies --

    pub fn list_companies(&self) -> Result<Vec<CompanyRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name COLLATE NOCASE"
            ))?;
            let rows = stmt
                .query_map([], CompanyRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_company(&self, id: &str) -> Result<Option<CompanyRow>> {
        self.with_conn(|conn| query_company(conn, "id", id))
    }

    /// Codes are stored upper-case, so lookups are case-insensitive.
    pub fn get_company_by_code(&self, code: &str) -> Result<Option<CompanyRow>> {
        self.with_conn(|conn| query_company(conn, "code", &code.trim().to_ascii_uppercase()))
    }

    pub fn create_company(&self, id: &str, name: &str, code: &str) -> Result<UniqueWrite> {
        self.with_conn_mut(|conn| {
            unique_write(conn.execute(
                "INSERT INTO companies (id, name, code) VALUES (?1, ?2, ?3)",
                (id, name, code.to_ascii_uppercase()),
            ))
        })
    }

    /// Rename and/or recode a company. A new code is copied onto its reports
    /// so that `company_code` always names the owning company.
    pub fn update_company(
        &self,
        id: &str,
        name: Option<&str>,
        code: Option<&str>,
    ) -> Result<UniqueWrite> {
        self.with_conn_mut(|conn| {
            if query_company(conn, "id", id)?.is_none() {
                return Ok(UniqueWrite::NotFound);
            }
            if let Some(code) = code {
                let code = code.to_ascii_uppercase();
                let res = conn.execute("UPDATE companies SET code = ?1 WHERE id = ?2", (&code, id));
                if unique_write(res)? == UniqueWrite::Duplicate {
                    return Ok(UniqueWrite::Duplicate);
                }
                conn.execute(
                    "UPDATE reports SET company_code = ?1 WHERE company_id = ?2",
                    (&code, id),
                )?;
            }
            if let Some(name) = name {
                conn.execute("UPDATE companies SET name = ?1 WHERE id = ?2", (name, id))?;
            }
            Ok(UniqueWrite::Written)
        })
    }

    /// Delete a company; its managers, reports and their messages go with it.
    pub fn delete_company(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM companies WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Users --

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email"))?;
            let rows = stmt
                .query_map([], UserRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        company_id: Option<&str>,
    ) -> Result<UniqueWrite> {
        self.with_conn_mut(|conn| {
            unique_write(conn.execute(
                "INSERT INTO users (id, email, password, role, company_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, email, password_hash, role.as_str(), company_id),
            ))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Reports assigned to a deleted manager fall back to unassigned.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Settings --

    pub fn list_settings(&self) -> Result<Vec<SettingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value, updated_at FROM settings ORDER BY key")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(SettingRow {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<SettingRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                (key, value),
            )?;
            let row = conn.query_row(
                "SELECT key, value, updated_at FROM settings WHERE key = ?1",
                [key],
                |row| {
                    Ok(SettingRow {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )?;
            Ok(row)
        })
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
            Ok(n > 0)
        })
    }

    // -- Housekeeping --

    /// Row count of one of the fixed tables, used to decide on seeding.
    pub fn count_rows(&self, table: Table) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name()), [], |r| {
                    r.get(0)
                })?;
            Ok(n as u64)
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Table {
    Companies,
    Users,
    Reports,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Companies => "companies",
            Table::Users => "users",
            Table::Reports => "reports",
        }
    }
}

/// `column` is always one of our own literals, never user input.
fn query_company(conn: &Connection, column: &str, value: &str) -> Result<Option<CompanyRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE {column} = ?1"
    ))?;
    Ok(stmt.query_row([value], CompanyRow::from_row).optional()?)
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    Ok(stmt.query_row([value], UserRow::from_row).optional()?)
}

pub(crate) fn query_user_conn(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    query_user(conn, "id", id)
}
