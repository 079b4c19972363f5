//! Router-level tests for the RSVP server.
//!
//! Each test builds the full Axum router over an in-memory store and drives
//! it with `tower::ServiceExt::oneshot`. No network or database needed.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rsvp_core::auth::SessionSigner;
use rsvp_core::EventService;
use rsvp_storage::{EventStore, MemoryStore, NewEvent};

use rsvp_server::routes;
use rsvp_server::state::AppState;

const ADMIN_PASSWORD: &str = "admin-pass";
const GUEST_PASSWORD: &str = "guest-pass";

struct TestApp {
    router: Router,
    store: MemoryStore,
}

impl TestApp {
    async fn new(is_public: bool) -> Self {
        let store = MemoryStore::new();
        store
            .create_event(NewEvent {
                name: "Summer Picnic".to_owned(),
                date: None,
                time: None,
                location: Some("Riverside Park".to_owned()),
                description: None,
                admin_password: ADMIN_PASSWORD.to_owned(),
                guest_password: GUEST_PASSWORD.to_owned(),
                accepting_rsvps: true,
                is_public,
            })
            .await
            .unwrap();
        Self::with_store(Some(store.clone()), store)
    }

    fn with_store(service_store: Option<MemoryStore>, store: MemoryStore) -> Self {
        let state = Arc::new(AppState {
            service: service_store.map(|s| EventService::new(Arc::new(s))),
            sessions: SessionSigner::new(b"test-secret".to_vec()),
            public_url: "https://party.example/".to_owned(),
        });
        Self {
            router: routes::router(state),
            store,
        }
    }

    async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body.to_owned())).unwrap()).await
    }

    /// POST a body with an arbitrary content type, or none at all.
    async fn post_raw(&self, uri: &str, content_type: Option<&str>, body: &str) -> Response {
        let mut req = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            req = req.header(header::CONTENT_TYPE, content_type);
        }
        self.send(req.body(Body::from(body.to_owned())).unwrap()).await
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    /// Log in and return the `name=value` pair of the session cookie.
    async fn login(&self, uri: &str, password: &str) -> String {
        let resp = self
            .post_form(uri, &format!("password={password}"), None)
            .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }
}

async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

// ── RSVP ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn rsvp_redirects_on_success() {
    let app = TestApp::new(true).await;
    let resp = app
        .post_form(
            "/api/rsvp",
            "name=Ada+Lovelace&email=ADA%40Example.com&response=yes&phone=&message=Can%27t+wait",
            None,
        )
        .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/?success=true");

    let event = app.store.get_event().await.unwrap().unwrap();
    let rsvps = app.store.list_rsvps(event.id).await.unwrap();
    assert_eq!(rsvps.len(), 1);
    assert_eq!(rsvps[0].guest_email, "ada@example.com");
    assert_eq!(rsvps[0].guest_phone, None);
    assert_eq!(rsvps[0].message.as_deref(), Some("Can't wait"));
}

#[tokio::test]
async fn rsvp_validation_errors_are_plain_text_400s() {
    let app = TestApp::new(true).await;
    let cases = [
        ("name=A&email=a%40b.c&response=yes", "Invalid name"),
        ("name=Ada&email=nope&response=yes", "Invalid email"),
        ("name=Ada&email=a%40b.c&response=perhaps", "Invalid response"),
        ("email=a%40b.c&response=yes", "Invalid name"),
    ];
    for (body, message) in cases {
        let resp = app.post_form("/api/rsvp", body, None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body_text(resp).await, message);
    }
}

#[tokio::test]
async fn duplicate_rsvp_conflicts() {
    let app = TestApp::new(true).await;
    let body = "name=Ada&email=ada%40example.com&response=yes";
    assert_eq!(app.post_form("/api/rsvp", body, None).await.status(), StatusCode::FOUND);

    let resp = app
        .post_form("/api/rsvp", "name=Ada&email=Ada%40Example.com&response=no", None)
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(resp).await, "You have already RSVPed for this event");
}

#[tokio::test]
async fn closed_event_rejects_rsvp() {
    let app = TestApp::new(true).await;
    let admin = app.login("/api/admin/login", ADMIN_PASSWORD).await;
    let resp = app
        .post_form(
            "/api/admin-actions",
            "action=update_event&name=Summer+Picnic&is_public=on",
            Some(&admin),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = app
        .post_form("/api/rsvp", "name=Ada&email=a%40b.c&response=yes", None)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(resp).await, "RSVPs are currently closed");
}

#[tokio::test]
async fn private_event_requires_guest_session() {
    let app = TestApp::new(false).await;
    let body = "name=Ada&email=a%40b.c&response=maybe";

    let resp = app.post_form("/api/rsvp", body, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let guest = app.login("/api/login", GUEST_PASSWORD).await;
    assert!(guest.starts_with("guest_session="));
    let resp = app.post_form("/api/rsvp", body, Some(&guest)).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn missing_event_is_404() {
    let store = MemoryStore::new();
    let app = TestApp::with_store(Some(store.clone()), store);
    let resp = app
        .post_form("/api/rsvp", "name=Ada&email=a%40b.c&response=yes", None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "Event not found");
}

#[tokio::test]
async fn unconfigured_database_is_500() {
    let app = TestApp::with_store(None, MemoryStore::new());
    let resp = app
        .post_form("/api/rsvp", "name=Ada&email=a%40b.c&response=yes", None)
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "Database not configured");

    let health = body_json(app.get("/health", None).await).await;
    assert_eq!(health["database"], "not_configured");
}

#[tokio::test]
async fn repeated_form_field_keeps_first_value() {
    let app = TestApp::new(true).await;
    let resp = app
        .post_form(
            "/api/rsvp",
            "name=Ada&name=Bob&email=ada%40example.com&response=yes&response=no",
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let event = app.store.get_event().await.unwrap().unwrap();
    let rsvps = app.store.list_rsvps(event.id).await.unwrap();
    assert_eq!(rsvps.len(), 1);
    assert_eq!(rsvps[0].guest_name, "Ada");
    assert_eq!(rsvps[0].response.to_string(), "yes");
}

#[tokio::test]
async fn unreadable_form_body_is_plain_text_500() {
    let app = TestApp::new(true).await;
    let body = "name=Ada&email=ada%40example.com&response=yes";

    for content_type in [None, Some("multipart/form-data; boundary=x"), Some("application/json")] {
        let resp = app.post_raw("/api/rsvp", content_type, body).await;
        assert_eq!(
            resp.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "content type {content_type:?}"
        );
        assert_eq!(body_text(resp).await, "Internal server error");
    }

    let resp = app.post_raw("/api/admin/login", None, "password=x").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "Internal server error");

    let event = app.store.get_event().await.unwrap().unwrap();
    assert!(app.store.list_rsvps(event.id).await.unwrap().is_empty());
}

// ── Auth ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new(true).await;
    let resp = app.post_form("/api/admin/login", "password=guest-pass", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let resp = app.post_form("/api/login", "", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_stored_password_never_logs_in() {
    let store = MemoryStore::new();
    store
        .create_event(NewEvent {
            name: "Open House".to_owned(),
            date: None,
            time: None,
            location: None,
            description: None,
            admin_password: String::new(),
            guest_password: GUEST_PASSWORD.to_owned(),
            accepting_rsvps: true,
            is_public: false,
        })
        .await
        .unwrap();
    let app = TestApp::with_store(Some(store.clone()), store);

    for body in ["", "password=", "password=anything"] {
        let resp = app.post_form("/api/admin/login", body, None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "body {body:?}");
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    let resp = app.post_form("/api/login", "password=", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    app.login("/api/login", GUEST_PASSWORD).await;
}

#[tokio::test]
async fn admin_login_sets_cookie_and_redirects() {
    let app = TestApp::new(true).await;
    let resp = app
        .post_form("/api/admin/login", &format!("password={ADMIN_PASSWORD}"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin");
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("admin_session="));
    assert!(cookie.ends_with("; Path=/; HttpOnly; SameSite=Strict; Max-Age=86400"));
}

#[tokio::test]
async fn logout_clears_both_sessions() {
    let app = TestApp::new(true).await;
    let resp = app.post_form("/api/logout", "", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let cookies: Vec<_> = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.ends_with("Max-Age=0")));
}

// ── Admin ────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_need_admin_session() {
    let app = TestApp::new(true).await;
    let guest = app.login("/api/login", GUEST_PASSWORD).await;

    let resp = app
        .post_form("/api/admin-actions", "action=post_update&content=Hello+all", None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .post_form(
            "/api/admin-actions",
            "action=post_update&content=Hello+all",
            Some(&guest),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.get("/api/admin/rsvps", Some("admin_session=123.abcd")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_updates_event_and_posts_update() {
    let app = TestApp::new(true).await;
    let admin = app.login("/api/admin/login", ADMIN_PASSWORD).await;

    let resp = app
        .post_form(
            "/api/admin-actions",
            "action=update_event&name=Autumn+Picnic&date=2025-10-04&time=+Noon+\
             &location=&description=Bring+a+blanket&accepting_rsvps=on&is_public=on",
            Some(&admin),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin?success=Event%20updated%20successfully");

    let resp = app
        .post_form(
            "/api/admin-actions",
            "action=post_update&content=Moved+to+the+pavilion",
            Some(&admin),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin?success=Update%20posted%20successfully");

    let overview = body_json(app.get("/api/event", None).await).await;
    assert_eq!(overview["event"]["name"], "Autumn Picnic");
    assert_eq!(overview["event"]["date"], "2025-10-04");
    assert_eq!(overview["event"]["time"], "Noon");
    assert!(overview["event"]["location"].is_null());
    assert!(overview["event"].get("admin_password_hash").is_none());
    assert_eq!(overview["updates"][0]["content"], "Moved to the pavilion");
}

#[tokio::test]
async fn admin_form_errors() {
    let app = TestApp::new(true).await;
    let admin = app.login("/api/admin/login", ADMIN_PASSWORD).await;
    let cases = [
        ("action=drop_tables", StatusCode::BAD_REQUEST, "Invalid action"),
        ("action=update_event&name=X", StatusCode::BAD_REQUEST, "Invalid event name"),
        (
            "action=update_event&name=Picnic&date=tomorrow",
            StatusCode::BAD_REQUEST,
            "Invalid event date",
        ),
        ("action=post_update&content=hi", StatusCode::BAD_REQUEST, "Update content is too short"),
    ];
    for (body, status, message) in cases {
        let resp = app.post_form("/api/admin-actions", body, Some(&admin)).await;
        assert_eq!(resp.status(), status, "{body}");
        assert_eq!(body_text(resp).await, message);
    }
}

#[tokio::test]
async fn guest_list_and_invite_link() {
    let app = TestApp::new(true).await;
    for (email, response) in [("a%40x.y", "yes"), ("b%40x.y", "no"), ("c%40x.y", "yes")] {
        let body = format!("name=Guest&email={email}&response={response}");
        assert_eq!(app.post_form("/api/rsvp", &body, None).await.status(), StatusCode::FOUND);
    }
    let admin = app.login("/api/admin/login", ADMIN_PASSWORD).await;

    let list = body_json(app.get("/api/admin/rsvps", Some(&admin)).await).await;
    assert_eq!(list["summary"]["yes"], 2);
    assert_eq!(list["summary"]["no"], 1);
    assert_eq!(list["summary"]["total"], 3);
    assert_eq!(list["rsvps"][0]["guest_email"], "c@x.y");

    let invite = body_json(app.get("/api/admin/invite?response=yes", Some(&admin)).await).await;
    let mailto = invite["mailto"].as_str().unwrap();
    assert!(mailto.starts_with("mailto:c@x.y;a@x.y?subject=You%27re%20invited%20to%20Summer%20Picnic"));
    assert!(mailto.contains("https%3A%2F%2Fparty.example%2F"));

    let resp = app.get("/api/admin/invite?response=sometimes", Some(&admin)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Event view ───────────────────────────────────────────────────────

#[tokio::test]
async fn private_event_view_needs_session() {
    let app = TestApp::new(false).await;
    assert_eq!(app.get("/api/event", None).await.status(), StatusCode::UNAUTHORIZED);

    let guest = app.login("/api/login", GUEST_PASSWORD).await;
    let resp = app.get("/api/event", Some(&guest)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let overview = body_json(resp).await;
    assert_eq!(overview["event"]["location"], "Riverside Park");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = TestApp::new(true).await;
    let resp = app.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(resp.headers()[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = TestApp::new(true).await;
    let resp = app.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let health = body_json(resp).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["database"], "configured");

    let app = TestApp::with_store(None, MemoryStore::new());
    let health = body_json(app.get("/health", None).await).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["database"], "not_configured");
}
