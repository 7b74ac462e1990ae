//! Public pages, snippet creation and the global response chain.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use snippetbox::db::SnippetStore;

#[tokio::test]
async fn test_ping() {
    let mut app = TestApp::new().await;

    let response = app.get("/ping").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "PONG");
    assert_eq!(response.headers["x-frame-options"], "deny");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["referrer-policy"], "origin-when-cross-origin");
    assert_eq!(response.headers["x-xss-protection"], "0");
    assert!(response.headers.contains_key("content-security-policy"));

    // No session is attached outside the dynamic chain
    assert!(app.session_cookie().is_none());
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let mut app = TestApp::new().await;

    for uri in ["/", "/user/login", "/does/not/exist", "/snippets/create"] {
        let response = app.get(uri).await;
        assert_eq!(response.headers["x-frame-options"], "deny", "{}", uri);
    }
}

#[tokio::test]
async fn test_snippet_view() {
    let mut app = TestApp::new().await;
    let id = app
        .snippets
        .insert("An old silent pond", "An old silent pond...", 7)
        .await
        .unwrap();
    assert_eq!(id, 1);

    let cases = [
        ("Valid ID", "/snippets/view/1", StatusCode::OK, "An old silent pond..."),
        ("Non-existent ID", "/snippets/view/2", StatusCode::NOT_FOUND, ""),
        ("Negative ID", "/snippets/view/-1", StatusCode::NOT_FOUND, ""),
        ("Decimal ID", "/snippets/view/1.23", StatusCode::NOT_FOUND, ""),
        ("String ID", "/snippets/view/foo", StatusCode::NOT_FOUND, ""),
        ("Empty ID", "/snippets/view/", StatusCode::NOT_FOUND, ""),
        ("Trailing slash", "/snippets/view/1/", StatusCode::NOT_FOUND, ""),
    ];

    for (name, uri, want_status, want_body) in cases {
        let response = app.get(uri).await;
        assert_eq!(response.status, want_status, "{}", name);
        assert!(response.body.contains(want_body), "{}", name);
    }
}

#[tokio::test]
async fn test_expired_snippet_is_not_found() {
    let mut app = TestApp::new().await;
    sqlx::query(
        "INSERT INTO snippets (title, content, created, expires)
         VALUES ('Gone', 'Gone', '2020-01-01T00:00:00Z', '2020-01-02T00:00:00Z')",
    )
    .execute(&app.pool)
    .await
    .unwrap();

    let response = app.get("/snippets/view/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let home = app.get("/").await;
    assert!(!home.body.contains("Gone"));
}

#[tokio::test]
async fn test_home_lists_latest_snippets() {
    let mut app = TestApp::new().await;

    let empty = app.get("/").await;
    assert_eq!(empty.status, StatusCode::OK);
    assert!(empty.body.contains("nothing to see here"));

    app.snippets.insert("First haiku", "one", 7).await.unwrap();
    app.snippets.insert("Second haiku", "two", 7).await.unwrap();

    let home = app.get("/").await;
    assert!(home.body.contains("First haiku"));
    assert!(home.body.contains("Second haiku"));
    assert!(home.body.find("Second haiku") < home.body.find("First haiku"));
}

#[tokio::test]
async fn test_anonymous_cannot_create() {
    let mut app = TestApp::new().await;

    let response = app.get("/snippets/create").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/user/login"));

    // A valid token for an anonymous session still does not get past the gate
    let token = app.csrf_token("/user/login").await;
    let response = app
        .post_form(
            "/snippets/create",
            &[
                ("title", "Sneaky"),
                ("content", "Sneaky"),
                ("expires", "7"),
                ("csrf_token", &token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/user/login"));
    assert!(app.snippets.latest().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_snippet() {
    let mut app = TestApp::new().await;
    app.login_as_alice().await;
    let token = app.csrf_token("/snippets/create").await;

    let response = app
        .post_form(
            "/snippets/create",
            &[
                ("title", "Over the wintry forest"),
                ("content", "Winds howl in rage with no leaves to blow"),
                ("expires", "7"),
                ("csrf_token", &token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/snippets/view/1"));

    let page = app.get("/snippets/view/1").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Snippet successfully created!"));
    assert!(page.body.contains("Over the wintry forest"));

    // Flash is shown once
    let page = app.get("/snippets/view/1").await;
    assert!(!page.body.contains("Snippet successfully created!"));
}

#[tokio::test]
async fn test_create_snippet_validation() {
    let mut app = TestApp::new().await;
    app.login_as_alice().await;
    let token = app.csrf_token("/snippets/create").await;
    let long_title = "a".repeat(101);

    let cases = [
        ("Blank title", "", "content", "7", "This field cannot be blank"),
        ("Long title", long_title.as_str(), "content", "7", "This field cannot be more than 100 characters long"),
        ("Blank content", "title", "  ", "7", "This field cannot be blank"),
        ("Bad expiry", "title", "content", "30", "This field must equal 1, 7 or 365"),
    ];

    for (name, title, content, expires, want_body) in cases {
        let response = app
            .post_form(
                "/snippets/create",
                &[
                    ("title", title),
                    ("content", content),
                    ("expires", expires),
                    ("csrf_token", &token),
                ],
            )
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", name);
        assert!(response.body.contains(want_body), "{}", name);
    }

    assert!(app.snippets.latest().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_static_files_skip_sessions() {
    let mut app = TestApp::new().await;

    let response = app.get("/static/css/main.css").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(app.session_cookie().is_none());
}
