//! End-to-end tests of the HTTP surface: intake, follow-up, triage and the
//! role guards, driven through the router with the session cookie carried
//! between requests by hand.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use carewhistle_api::seed::{self, DEMO_ADMIN, DEMO_MANAGER, DEMO_PIN, DEMO_TOKEN};
use carewhistle_api::session::SESSION_COOKIE;
use carewhistle_api::{AppState, AppStateInner, router};
use carewhistle_crypto::keys::ContactKey;
use carewhistle_db::Database;
use carewhistle_types::models::Channel;

struct TestApp {
    app: Router,
    state: AppState,
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    json: Value,
}

impl TestApp {
    fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        seed::seed_demo(&db).unwrap();

        let state: AppState = Arc::new(AppStateInner {
            db,
            session_secret: "test-secret".into(),
            session_ttl: chrono::Duration::hours(1),
            contact_key: ContactKey::from_bytes([7u8; 32]),
        });
        Self {
            app: router(state.clone()),
            state,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
        self.send_raw(method, uri, body.map(|b| b.to_string()), cookie).await
    }

    async fn send_raw(&self, method: &str, uri: &str, body: Option<String>, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(SESSION_COOKIE))
            .map(|v| v.split(';').next().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply { status, cookie, json }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.send("GET", uri, None, cookie).await
    }

    async fn post(&self, uri: &str, body: Value, cookie: Option<&str>) -> Reply {
        self.send("POST", uri, Some(body), cookie).await
    }

    async fn login(&self, (email, password): (&str, &str)) -> String {
        let reply = self
            .post("/auth/login", json!({ "email": email, "password": password }), None)
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.json);
        reply.cookie.expect("login sets the session cookie")
    }

    fn demo_report_id(&self) -> String {
        self.state
            .db
            .find_report_by_credentials(DEMO_TOKEN, DEMO_PIN)
            .unwrap()
            .unwrap()
            .id
    }

    fn demo_manager_id(&self) -> String {
        self.state.db.get_user_by_email(DEMO_MANAGER.0).unwrap().unwrap().id
    }
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn intake_credentials_open_exactly_one_thread() {
    let t = TestApp::new();

    let submitted = t
        .post(
            "/reports",
            json!({ "company_code": "bright", "subject": "Night shift", "content": "Meds were skipped", "category": "Safety" }),
            None,
        )
        .await;
    assert_eq!(submitted.status, StatusCode::CREATED);
    let token = submitted.json["token"].as_str().unwrap().to_string();
    let pin = submitted.json["pin"].as_str().unwrap().to_string();
    assert_eq!(pin.len(), 6);
    assert!(pin.chars().all(|c| c.is_ascii_digit()));
    assert_ne!(token, DEMO_TOKEN);

    // Submission alone grants nothing.
    assert_eq!(t.get(&format!("/follow/{token}"), None).await.status, StatusCode::FORBIDDEN);

    let followed = t.post("/follow", json!({ "token": token, "pin": pin }), None).await;
    assert_eq!(followed.status, StatusCode::OK);
    assert_eq!(followed.json["status"], "new");
    let cookie = followed.cookie.unwrap();

    let thread = t.get(&format!("/follow/{token}"), Some(&cookie)).await;
    assert_eq!(thread.status, StatusCode::OK);
    assert_eq!(thread.json["content"], "Meds were skipped");
    assert_eq!(thread.json["category"], "Safety");
    assert_eq!(thread.json["messages"][0]["sender"], "system");

    // The capability does not extend to other reports.
    let other = t.get(&format!("/follow/{DEMO_TOKEN}"), Some(&cookie)).await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_pin_and_wrong_token_look_the_same() {
    let t = TestApp::new();

    let wrong_pin = t.post("/follow", json!({ "token": DEMO_TOKEN, "pin": "000000" }), None).await;
    let wrong_token = t.post("/follow", json!({ "token": "nope", "pin": DEMO_PIN }), None).await;

    assert_eq!(wrong_pin.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_token.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pin.json, wrong_token.json);
    assert_eq!(wrong_pin.json["error"], "Invalid code");
    assert!(wrong_pin.cookie.is_none());
}

#[tokio::test]
async fn intake_validation_errors() {
    let t = TestApp::new();

    let unknown = t.post("/reports", json!({ "company_code": "NOPE", "content": "x" }), None).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.json["error"], "Unknown company code");

    let empty = t.post("/reports", json!({ "company_code": "BRIGHT", "content": "   " }), None).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.json["error"], "Content is required");
}

#[tokio::test]
async fn manager_sees_report_only_after_assignment() {
    let t = TestApp::new();
    let report_id = t.demo_report_id();
    let manager_id = t.demo_manager_id();

    let manager = t.login(DEMO_MANAGER).await;
    let queue = t.get("/manager/reports", Some(&manager)).await;
    assert_eq!(queue.status, StatusCode::OK);
    assert!(ids(&queue.json).is_empty());
    let detail = t.get(&format!("/manager/reports/{report_id}"), Some(&manager)).await;
    assert_eq!(detail.status, StatusCode::FORBIDDEN);

    let admin = t.login(DEMO_ADMIN).await;
    let assigned = t
        .post(
            &format!("/admin/reports/{report_id}/assign"),
            json!({ "manager_id": manager_id }),
            Some(&admin),
        )
        .await;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(assigned.json["manager_id"], manager_id.as_str());
    // Assignment does not touch status.
    assert_eq!(assigned.json["status"], "new");

    let queue = t.get("/manager/reports", Some(&manager)).await;
    assert_eq!(ids(&queue.json), vec![report_id.clone()]);
    let detail = t.get(&format!("/manager/reports/{report_id}"), Some(&manager)).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json["content"], "Demo content");
}

#[tokio::test]
async fn assignment_across_companies_is_refused() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;

    let company = t
        .post("/admin/companies", json!({ "name": "Acme Homes", "code": "acme" }), Some(&admin))
        .await;
    assert_eq!(company.status, StatusCode::CREATED);
    let other = t
        .post(
            "/admin/users",
            json!({ "email": "boss@acme.com", "password": "longenough", "role": "manager", "company_id": company.json["id"] }),
            Some(&admin),
        )
        .await;
    assert_eq!(other.status, StatusCode::CREATED);

    let refused = t
        .post(
            &format!("/admin/reports/{}/assign", t.demo_report_id()),
            json!({ "manager_id": other.json["id"] }),
            Some(&admin),
        )
        .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_outside_the_fixed_set_is_rejected() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;
    let uri = format!("/admin/reports/{}/status", t.demo_report_id());

    let bad = t.post(&uri, json!({ "status": "archived" }), Some(&admin)).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let resolved = t.post(&uri, json!({ "status": "resolved" }), Some(&admin)).await;
    assert_eq!(resolved.status, StatusCode::OK);
    assert_eq!(resolved.json["status"], "resolved");

    // Going backwards is allowed.
    let reopened = t.post(&uri, json!({ "status": "in_review" }), Some(&admin)).await;
    assert_eq!(reopened.json["status"], "in_review");

    let filtered = t.get("/admin/reports?status=in_review", Some(&admin)).await;
    assert_eq!(ids(&filtered.json).len(), 1);
    let bad_filter = t.get("/admin/reports?status=lost", Some(&admin)).await;
    assert_eq!(bad_filter.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn channels_are_visible_per_role() {
    let t = TestApp::new();
    let report_id = t.demo_report_id();
    let admin = t.login(DEMO_ADMIN).await;
    let manager = t.login(DEMO_MANAGER).await;
    t.post(
        &format!("/admin/reports/{report_id}/assign"),
        json!({ "manager_id": t.demo_manager_id() }),
        Some(&admin),
    )
    .await;

    let reporter = t
        .post("/follow", json!({ "token": DEMO_TOKEN, "pin": DEMO_PIN }), None)
        .await
        .cookie
        .unwrap();

    let posted = t
        .post(&format!("/follow/{DEMO_TOKEN}/messages"), json!({ "body": "It happened again" }), Some(&reporter))
        .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.json["channel"], "reporter");

    let posted = t
        .post(&format!("/manager/reports/{report_id}/messages"), json!({ "body": "Looking into it" }), Some(&manager))
        .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.json["sender"], "manager");

    let posted = t
        .post(
            &format!("/admin/reports/{report_id}/messages"),
            json!({ "channel": "reporter", "body": "Thank you for reporting" }),
            Some(&admin),
        )
        .await;
    assert_eq!(posted.status, StatusCode::CREATED);

    let detail = t.get(&format!("/admin/reports/{report_id}"), Some(&admin)).await;
    let bodies = |v: &Value| -> Vec<String> {
        v.as_array().unwrap().iter().map(|m| m["body"].as_str().unwrap().to_string()).collect()
    };
    assert_eq!(
        bodies(&detail.json["reporter_messages"]),
        vec!["Report submitted.", "It happened again", "Thank you for reporting"]
    );
    assert_eq!(bodies(&detail.json["manager_messages"]), vec!["Looking into it"]);

    let thread = t.get(&format!("/follow/{DEMO_TOKEN}"), Some(&reporter)).await;
    assert!(!bodies(&thread.json["messages"]).contains(&"Looking into it".to_string()));

    let mine = t.get(&format!("/manager/reports/{report_id}"), Some(&manager)).await;
    assert_eq!(bodies(&mine.json["messages"]), vec!["Looking into it"]);
}

#[tokio::test]
async fn role_guards() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;
    let manager = t.login(DEMO_MANAGER).await;

    assert_eq!(t.get("/admin/reports", None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(t.get("/admin/reports", Some(&manager)).await.status, StatusCode::FORBIDDEN);
    assert_eq!(t.get("/manager/reports", Some(&admin)).await.status, StatusCode::FORBIDDEN);
    assert_eq!(t.get("/admin/dashboard", Some(&admin)).await.status, StatusCode::OK);

    let me = t.get("/auth/me", Some(&manager)).await;
    assert_eq!(me.json["role"], "manager");
    assert_eq!(me.json["email"], DEMO_MANAGER.0);

    let out = t.post("/auth/logout", json!({}), Some(&admin)).await;
    let cleared = out.cookie.unwrap();
    assert_eq!(t.get("/auth/me", Some(&cleared)).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_login_is_generic() {
    let t = TestApp::new();

    let wrong_password = t
        .post("/auth/login", json!({ "email": DEMO_ADMIN.0, "password": "nope-nope" }), None)
        .await;
    let unknown = t
        .post("/auth/login", json!({ "email": "ghost@x.com", "password": "password" }), None)
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.json, unknown.json);
}

#[tokio::test]
async fn deleting_company_removes_reports_and_messages() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;

    let company = t.post("/admin/companies", json!({ "name": "Acme Homes" }), Some(&admin)).await;
    assert_eq!(company.status, StatusCode::CREATED);
    let code = company.json["code"].as_str().unwrap().to_string();
    let company_id = company.json["id"].as_str().unwrap().to_string();

    let submitted = t
        .post("/reports", json!({ "company_code": code, "content": "Broken fire door" }), None)
        .await;
    let (token, pin) = (
        submitted.json["token"].as_str().unwrap().to_string(),
        submitted.json["pin"].as_str().unwrap().to_string(),
    );
    let report_id = submitted.json["report_id"].as_str().unwrap().to_string();

    let deleted = t.send("DELETE", &format!("/admin/companies/{company_id}"), None, Some(&admin)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let follow = t.post("/follow", json!({ "token": token, "pin": pin }), None).await;
    assert_eq!(follow.status, StatusCode::UNAUTHORIZED);
    let detail = t.get(&format!("/admin/reports/{report_id}"), Some(&admin)).await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);
    assert!(t.state.db.list_messages(&report_id, Channel::Reporter).unwrap().is_empty());

    // The demo company's report is untouched.
    let remaining = t.get("/admin/reports", Some(&admin)).await;
    assert_eq!(ids(&remaining.json), vec![t.demo_report_id()]);
}

#[tokio::test]
async fn contact_is_sealed_and_only_admins_read_it() {
    let t = TestApp::new();

    let submitted = t
        .post(
            "/reports",
            json!({ "company_code": "BRIGHT", "content": "Bullying", "contact": "call 555-0100" }),
            None,
        )
        .await;
    let report_id = submitted.json["report_id"].as_str().unwrap().to_string();

    let row = t.state.db.get_report(&report_id).unwrap().unwrap();
    let sealed = row.contact_ciphertext.unwrap();
    assert!(!sealed.windows(8).any(|w| w == b"555-0100"));

    let admin = t.login(DEMO_ADMIN).await;
    let detail = t.get(&format!("/admin/reports/{report_id}"), Some(&admin)).await;
    assert_eq!(detail.json["contact"], "call 555-0100");
}

#[tokio::test]
async fn staff_accounts() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;

    let orphan = t
        .post("/admin/users", json!({ "email": "m@x.com", "password": "longenough", "role": "manager" }), Some(&admin))
        .await;
    assert_eq!(orphan.status, StatusCode::BAD_REQUEST);

    let duplicate = t
        .post(
            "/admin/users",
            json!({ "email": DEMO_ADMIN.0, "password": "longenough", "role": "admin" }),
            Some(&admin),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let me = t.get("/auth/me", Some(&admin)).await;
    let own_id = me.json["user_id"].as_str().unwrap().to_string();
    let self_delete = t.send("DELETE", &format!("/admin/users/{own_id}"), None, Some(&admin)).await;
    assert_eq!(self_delete.status, StatusCode::BAD_REQUEST);

    // A deleted manager's session stops working.
    let manager = t.login(DEMO_MANAGER).await;
    let gone = t.send("DELETE", &format!("/admin/users/{}", t.demo_manager_id()), None, Some(&admin)).await;
    assert_eq!(gone.status, StatusCode::NO_CONTENT);
    assert_eq!(t.get("/manager/reports", Some(&manager)).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn settings_are_admin_managed() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;

    let put = t
        .send("PUT", "/admin/settings/site.name", Some(json!({ "value": "CareWhistle" })), Some(&admin))
        .await;
    assert_eq!(put.status, StatusCode::OK);
    assert_eq!(put.json["value"], "CareWhistle");

    let bad = t
        .send("PUT", "/admin/settings/Site%20Name", Some(json!({ "value": "x" })), Some(&admin))
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let list = t.get("/admin/settings", Some(&admin)).await;
    assert_eq!(list.json.as_array().unwrap().len(), 1);

    let manager = t.login(DEMO_MANAGER).await;
    let denied = t
        .send("PUT", "/admin/settings/site.name", Some(json!({ "value": "mine" })), Some(&manager))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let deleted = t.send("DELETE", "/admin/settings/site.name", None, Some(&admin)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(t.get("/admin/settings", Some(&admin)).await.json.as_array().unwrap().is_empty());

    let again = t.send("DELETE", "/admin/settings/site.name", None, Some(&admin)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.json["error"], "Setting not found");
}

#[tokio::test]
async fn chatbot_tolerates_bad_json() {
    let t = TestApp::new();

    let reply = t.send_raw("POST", "/chatbot", Some("not json".into()), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["reply"], "Please say something.");
}

#[tokio::test]
async fn malformed_input_gets_json_errors() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;

    let missing = t.post("/reports", json!({ "company_code": "BRIGHT" }), None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert!(missing.json["error"].as_str().unwrap().contains("content"));

    let extra = t
        .post("/reports", json!({ "company_code": "BRIGHT", "content": "x", "extra": 1 }), None)
        .await;
    assert_eq!(extra.status, StatusCode::BAD_REQUEST);
    assert!(extra.json["error"].is_string());

    let garbage = t.send_raw("POST", "/reports", Some("{not json".into()), None).await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
    assert_eq!(garbage.json["error"], "Request body is not valid JSON");

    let status = t
        .post(&format!("/admin/reports/{}/status", t.demo_report_id()), json!({ "status": 5 }), Some(&admin))
        .await;
    assert_eq!(status.status, StatusCode::BAD_REQUEST);
    assert!(status.json["error"].is_string());

    let bad_id = t.get("/admin/reports/not-a-uuid", Some(&admin)).await;
    assert_eq!(bad_id.status, StatusCode::NOT_FOUND);
    assert_eq!(bad_id.json["error"], "Resource not found");

    let bad_query = t.get("/admin/reports?company_id=nope", Some(&admin)).await;
    assert_eq!(bad_query.status, StatusCode::BAD_REQUEST);
    assert!(bad_query.json["error"].is_string());

    // Nothing was created along the way.
    assert_eq!(ids(&t.get("/admin/reports", Some(&admin)).await.json).len(), 1);
}

#[tokio::test]
async fn malformed_follow_requests_look_like_wrong_codes() {
    let t = TestApp::new();

    let wrong_pin = t.post("/follow", json!({ "token": DEMO_TOKEN, "pin": "000000" }), None).await;
    let missing_pin = t.post("/follow", json!({ "token": DEMO_TOKEN }), None).await;
    let garbage = t.send_raw("POST", "/follow", Some("not json".into()), None).await;

    for reply in [&missing_pin, &garbage] {
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.json, wrong_pin.json);
        assert!(reply.cookie.is_none());
    }
}

#[tokio::test]
async fn reporter_posts_need_the_capability() {
    let t = TestApp::new();
    let uri = format!("/follow/{DEMO_TOKEN}/messages");

    let anonymous = t.post(&uri, json!({ "body": "hello" }), None).await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);

    // A capability for another report does not count.
    let submitted = t.post("/reports", json!({ "company_code": "BRIGHT", "content": "x" }), None).await;
    let other = t
        .post(
            "/follow",
            json!({ "token": submitted.json["token"], "pin": submitted.json["pin"] }),
            None,
        )
        .await
        .cookie
        .unwrap();
    let foreign = t.post(&uri, json!({ "body": "hello" }), Some(&other)).await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    assert!(t.state.db.list_messages(&t.demo_report_id(), Channel::Reporter).unwrap().is_empty());
}

#[tokio::test]
async fn manager_cannot_post_to_unassigned_report() {
    let t = TestApp::new();
    let report_id = t.demo_report_id();
    let manager = t.login(DEMO_MANAGER).await;

    let denied = t
        .post(&format!("/manager/reports/{report_id}/messages"), json!({ "body": "hi" }), Some(&manager))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert!(t.state.db.list_messages(&report_id, Channel::Manager).unwrap().is_empty());

    let missing = t
        .post(
            &format!("/manager/reports/{}/messages", uuid::Uuid::new_v4()),
            json!({ "body": "hi" }),
            Some(&manager),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manager_dashboard_counts_only_own_reports() {
    let t = TestApp::new();
    let admin = t.login(DEMO_ADMIN).await;

    let company_id = t.state.db.get_company_by_code("BRIGHT").unwrap().unwrap().id;
    let colleague = t
        .post(
            "/admin/users",
            json!({ "email": "second@brightcare.com", "password": "longenough", "role": "manager", "company_id": company_id }),
            Some(&admin),
        )
        .await;
    assert_eq!(colleague.status, StatusCode::CREATED);

    let second = t.post("/reports", json!({ "company_code": "BRIGHT", "content": "y" }), None).await;
    let third = t.post("/reports", json!({ "company_code": "BRIGHT", "content": "z" }), None).await;
    let assign = |report: &Value, manager: &Value| {
        (
            format!("/admin/reports/{}/assign", report.as_str().unwrap()),
            json!({ "manager_id": manager }),
        )
    };

    let mine = Value::String(t.demo_manager_id());
    let demo = Value::String(t.demo_report_id());
    for (report, manager) in [(&demo, &mine), (&second.json["report_id"], &mine), (&third.json["report_id"], &colleague.json["id"])] {
        let (uri, body) = assign(report, manager);
        assert_eq!(t.post(&uri, body, Some(&admin)).await.status, StatusCode::OK);
    }
    t.post(&format!("/admin/reports/{}/status", t.demo_report_id()), json!({ "status": "closed" }), Some(&admin))
        .await;

    let manager = t.login(DEMO_MANAGER).await;
    let dashboard = t.get("/manager/dashboard", Some(&manager)).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.json["total"], 2);
    let count = |status: &str| {
        dashboard.json["by_status"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["status"] == status)
            .unwrap()["count"]
            .clone()
    };
    assert_eq!(count("new"), 1);
    assert_eq!(count("closed"), 1);
    assert_eq!(count("resolved"), 0);

    let overall = t.get("/admin/dashboard", Some(&admin)).await;
    assert_eq!(overall.json["total"], 3);
    assert_eq!(overall.json["unassigned"], 0);
}
