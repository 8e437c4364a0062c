use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE companies (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                code        TEXT NOT NULL UNIQUE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                role        TEXT NOT NULL CHECK (role IN ('admin', 'manager')),
                company_id  TEXT REFERENCES companies(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK ((role = 'manager') = (company_id IS NOT NULL))
            );

            CREATE TABLE reports (
                id                  TEXT PRIMARY KEY,
                company_id          TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                company_code        TEXT NOT NULL,
                subject             TEXT,
                content             TEXT NOT NULL,
                category            TEXT NOT NULL,
                status              TEXT NOT NULL DEFAULT 'new',
                contact_ciphertext  BLOB,
                contact_nonce       BLOB,
                anon_token          TEXT NOT NULL UNIQUE,
                anon_pin            TEXT NOT NULL,
                manager_id          TEXT REFERENCES users(id) ON DELETE SET NULL,
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_reports_company ON reports(company_id, created_at);
            CREATE INDEX idx_reports_manager ON reports(manager_id);

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                report_id   TEXT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
                channel     TEXT NOT NULL CHECK (channel IN ('reporter', 'manager')),
                sender      TEXT NOT NULL,
                author_id   TEXT REFERENCES users(id) ON DELETE SET NULL,
                body        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_messages_report
                ON messages(report_id, channel, created_at);

            CREATE TABLE settings (
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
