use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use goonj::{auth::token_service::AuthConfig, build_router, config::DbConfig, connect_db, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_with_limit(rate_limit_per_minute: u32) -> Router {
    let db = connect_db(&DbConfig::in_memory()).await.unwrap();
    let mut auth = AuthConfig::new("integration-secret");
    auth.bcrypt_cost = 4;
    build_router(AppState::new(db, auth, rate_limit_per_minute))
}

async fn app() -> Router {
    app_with_limit(10_000).await
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_raw(app: &Router, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn upload(app: &Router, title: &str, language: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/songs",
        None,
        Some(json!({
            "title": title,
            "artist": "Zubeen Garg",
            "language": language,
            "audio_url": format!("https://cdn.example.com/{}.mp3", title.replace(' ', "-")),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_online() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn songs_lifecycle() {
    let app = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/songs",
        None,
        Some(json!({ "title": "No artist" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let mayabini = upload(&app, "Mayabini", "Assamese").await;
    upload(&app, "Kesariya", "Hindi").await;

    let (status, body) = call(&app, Method::GET, "/api/songs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let songs = body["data"].as_array().unwrap();
    assert_eq!(songs.len(), 2);
    // newest first
    assert_eq!(songs[0]["title"], "Kesariya");

    let (_, body) = call(&app, Method::GET, "/api/songs?language=Assamese", None, None).await;
    let songs = body["data"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["genre"], "Pop");
    assert_eq!(songs[0]["era"], "2020s");
    assert_eq!(songs[0]["cover_image_url"], "https://via.placeholder.com/500");

    let uri = format!("/api/songs/{mayabini}");
    let (status, body) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Mayabini");

    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "message": "Song deleted" }));

    let (status, _) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_with_wrong_password_issues_no_token() {
    let app = app().await;
    register(&app, "anku").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "anku@example.com", "password": "wrong-one" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body.get("data").is_none());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ANKU@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some());
    assert_eq!(body["data"]["user"]["username"], "anku");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "someone-else",
            "email": "anku@example.com",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn playlists_require_a_valid_token() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/api/playlists", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");

    let (status, _) = call(&app, Method::GET, "/api/playlists", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn playlist_add_song_rules() {
    let app = app().await;
    let owner = register(&app, "owner").await;
    let intruder = register(&app, "intruder").await;
    let song_id = upload(&app, "Bihu", "Assamese").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/playlists",
        Some(&owner),
        Some(json!({ "title": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/playlists",
        Some(&owner),
        Some(json!({ "title": "Rongali" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_public"], false);
    let playlist_id = body["data"]["id"].as_str().unwrap().to_string();

    let add = json!({ "playlist_id": playlist_id, "song_id": song_id });

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/playlists/add-song",
        Some(&owner),
        Some(add.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["song_id"], song_id.as_str());

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/playlists/add-song",
        Some(&owner),
        Some(add.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/playlists/add-song",
        Some(&intruder),
        Some(add),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/playlists/add-song",
        Some(&owner),
        Some(json!({ "playlist_id": playlist_id, "song_id": "missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, "/api/playlists", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let playlists = body["data"].as_array().unwrap();
    assert_eq!(playlists.len(), 1);
    let rows = playlists[0]["songs"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["song"]["title"], "Bihu");

    let (_, body) = call(&app, Method::GET, "/api/playlists", Some(&intruder), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn requests_over_the_limit_are_rejected() {
    let app = app_with_limit(2).await;

    for _ in 0..2 {
        let (status, _) = call(&app, Method::GET, "/api/songs", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(&app, Method::GET, "/api/songs", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], "Too many requests");
}

#[tokio::test]
async fn rejected_bodies_use_the_error_envelope() {
    let app = app().await;

    let cases = [
        ("application/json", r#"{"title":5,"artist":"Zubeen Garg","audio_url":"https://cdn.example.com/a.mp3"}"#),
        ("application/json", "{not json"),
        ("text/plain", r#"{"title":"Mayabini"}"#),
    ];
    for (content_type, raw) in cases {
        let (status, body) = send_raw(&app, "/api/songs", content_type, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{content_type} {raw}");
        assert_eq!(body["status"], "error", "{content_type} {raw}");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    let (status, body) = send_raw(&app, "/api/auth/login", "text/plain", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}
