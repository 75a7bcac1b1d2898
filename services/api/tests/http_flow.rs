/// End-to-end tests through the axum router, backed by the in-memory store.
use api_lib::adapters::Argon2Hasher;
use api_lib::config::Config;
use api_lib::web::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use seminar_core::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let config = Arc::new(Config::from_lookup(|_| None).expect("default config"));
    let state = AppState::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(Argon2Hasher::new()),
    );
    router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec();
    (status, set_cookie, bytes)
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json body")
}

async fn signup(app: &Router) -> String {
    let (status, cookie, _) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "email": "Ada@Uni.edu",
            "name": "Ada",
            "designation": "Professor",
            "department": "CSE",
            "password": "secret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    cookie.expect("session cookie")
}

async fn create_group_class(app: &Router, cookie: &str) -> String {
    let (status, _, body) = send(
        app,
        "POST",
        "/classes",
        Some(cookie),
        Some(json!({
            "subject": "Networks",
            "section": "A",
            "assignment_mode": "group",
            "group_size": 2,
            "students": [
                { "usn": "1cr21cs001", "name": "Asha" },
                { "usn": "1cr21cs002", "name": "Ben" }
            ],
            "topics": ["Raft", "Paxos"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json_of(&body)["id"].as_str().expect("class id").to_string()
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = app();
    let (status, _, _) = send(&app, "GET", "/classes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, "GET", "/classes", Some("session=bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = app();
    let cookie = signup(&app).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ada@uni.edu", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(String::from_utf8_lossy(&body), "Invalid email or password.");

    let (status, _, body) = send(&app, "GET", "/me", Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["department"], "CSE");

    let (status, _, _) = send(&app, "POST", "/auth/logout", Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, "GET", "/me", Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_group_topic_flow_and_export() {
    let app = app();
    let cookie = signup(&app).await;
    let class_id = create_group_class(&app, &cookie).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/topics/resolve",
        None,
        Some(json!({ "usn": " 1cr21cs001 " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first = json_of(&body);
    assert_eq!(first["is_group"], true);
    assert_eq!(first["assigned_by"], "Asha");
    assert_eq!(first["members"][1]["name"], "Ben");

    let (_, _, body) = send(
        &app,
        "POST",
        "/topics/resolve",
        None,
        Some(json!({ "usn": "1CR21CS002" })),
    )
    .await;
    assert_eq!(json_of(&body)["topic"], first["topic"]);

    let uri = format!("/classes/{}/students?filter=unassigned", class_id);
    let (status, _, body) = send(&app, "GET", &uri, Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let listing = json_of(&body);
    assert_eq!(listing["assigned"], 2);
    assert_eq!(listing["students"].as_array().map(Vec::len), Some(0));

    let uri = format!("/classes/{}/export", class_id);
    let (status, _, body) = send(&app, "GET", &uri, Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(body).unwrap();
    assert!(csv.starts_with("USN,Name,Section,Assigned Topic\n1CR21CS001,Asha,A,"));

    let (status, _, body) = send(
        &app,
        "POST",
        "/students/1cr21cs002/reset",
        Some(cookie.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["assigned_topic"], Value::Null);
}

#[tokio::test]
async fn test_unknown_usn_and_class_deletion() {
    let app = app();
    let cookie = signup(&app).await;
    let class_id = create_group_class(&app, &cookie).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/topics/resolve",
        None,
        Some(json!({ "usn": "1CR99XX999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/classes/{}", class_id);
    let (status, _, body) = send(&app, "DELETE", &uri, Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["students_removed"], 2);

    let (status, _, _) = send(&app, "GET", &uri, Some(cookie.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, _, body) = send(&app, "GET", "/classes", Some(cookie.as_str()), None).await;
    assert_eq!(json_of(&body), json!([]));
    let (status, _, _) = send(
        &app,
        "POST",
        "/topics/resolve",
        None,
        Some(json!({ "usn": "1CR21CS001" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_roster_upload() {
    let app = app();
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"roster.csv\"\r\nContent-Type: text/csv\r\n\r\nUSN,Name\r\n1cr01,Asha\r\n,Nobody\r\n1cr02,Ben\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/import/roster")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let roster = json_of(&bytes);
    assert_eq!(
        roster["students"],
        json!([{ "usn": "1cr01", "name": "Asha" }, { "usn": "1cr02", "name": "Ben" }])
    );
}
