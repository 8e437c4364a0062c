use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use carewhistle_crypto::passwords::hash_password;
use carewhistle_db::Database;
use carewhistle_db::models::NewReport;
use carewhistle_db::queries::Table;
use carewhistle_types::models::Role;

pub const DEMO_COMPANY_CODE: &str = "BRIGHT";
pub const DEMO_ADMIN: (&str, &str) = ("admin@admin.com", "password");
pub const DEMO_MANAGER: (&str, &str) = ("manager@brightcare.com", "manager1");
pub const DEMO_TOKEN: &str = "demo-token";
pub const DEMO_PIN: &str = "123456";

/// Fill empty tables with a demo company, one admin, one manager and one
/// unassigned report. Tables that already hold rows are left alone.
pub fn seed_demo(db: &Database) -> Result<()> {
    if db.count_rows(Table::Companies)? == 0 {
        db.create_company(&Uuid::new_v4().to_string(), "Bright Care", DEMO_COMPANY_CODE)?;
        info!("Seeded demo company {}", DEMO_COMPANY_CODE);
    }

    let company = db
        .get_company_by_code(DEMO_COMPANY_CODE)?
        .or(db.list_companies()?.into_iter().next())
        .ok_or_else(|| anyhow::anyhow!("No company to seed into"))?;

    if db.count_rows(Table::Users)? == 0 {
        let (email, password) = DEMO_ADMIN;
        db.create_user(&Uuid::new_v4().to_string(), email, &hash_password(password)?, Role::Admin, None)?;

        let (email, password) = DEMO_MANAGER;
        db.create_user(
            &Uuid::new_v4().to_string(),
            email,
            &hash_password(password)?,
            Role::Manager,
            Some(company.id.as_str()),
        )?;
        info!("Seeded demo admin and manager accounts");
    }

    if db.count_rows(Table::Reports)? == 0 {
        db.submit_report(&NewReport {
            company_code: &company.code,
            subject: Some("Demo subject"),
            content: "Demo content",
            category: "Other",
            contact: None,
            anon_token: DEMO_TOKEN,
            anon_pin: DEMO_PIN,
        })?;
        info!("Seeded demo report");
    }

    Ok(())
}
