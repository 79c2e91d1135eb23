//! Integration tests for the home/login/logout controller.

mod common;

use common::{client, TestHarness};

#[tokio::test]
async fn home_anonymous_shows_login_view() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("<form"));
    assert!(body.contains("name=\"username\""));
}

#[tokio::test]
async fn login_success_sets_session_and_redirects() {
    let config = TestHarness::auth_config("admin", "secret");
    let (h, addr) = TestHarness::with_server_config(config).await;

    let http = client();
    let resp = http
        .post(format!("http://{addr}/"))
        .form(&[("username", "admin"), ("password", "secret")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");
    assert_eq!(h.ctx.sessions.len(), 1);

    // The cookie now authenticates the home route.
    let resp = http
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "Logged in");
}

#[tokio::test]
async fn login_wrong_credentials_leaves_session_untouched() {
    let config = TestHarness::auth_config("admin", "secret");
    let (h, addr) = TestHarness::with_server_config(config).await;

    let resp = client()
        .post(format!("http://{addr}/"))
        .form(&[("username", "admin"), ("password", "wrong")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    assert!(resp.headers().get("location").is_none());
    assert!(h.ctx.sessions.is_empty());
}

#[tokio::test]
async fn login_unconfigured_auth_answers_503() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .post(format!("http://{addr}/"))
        .form(&[("username", "anyone"), ("password", "anything")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn logout_clears_session_and_redirects() {
    let config = TestHarness::auth_config("admin", "secret");
    let (h, addr) = TestHarness::with_server_config(config).await;

    let http = client();
    http.post(format!("http://{addr}/"))
        .form(&[("username", "admin"), ("password", "secret")])
        .send()
        .await
        .unwrap();
    assert_eq!(h.ctx.sessions.len(), 1);

    let resp = http
        .get(format!("http://{addr}/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");
    assert!(h.ctx.sessions.is_empty());

    // Back to the login view.
    let resp = http
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert!(resp.text().await.unwrap().contains("<form"));
}

#[tokio::test]
async fn logout_without_session_still_redirects() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!("http://{addr}/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");
}

#[tokio::test]
async fn logout_accepts_post() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .post(format!("http://{addr}/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
}

#[tokio::test]
async fn custom_base_url_used_for_redirects() {
    let mut config = TestHarness::auth_config("admin", "secret");
    config.server.base_url = "/app".to_string();
    let (_h, addr) = TestHarness::with_server_config(config).await;

    let resp = client()
        .post(format!("http://{addr}/"))
        .form(&[("username", "admin"), ("password", "secret")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/app");
}

#[tokio::test]
async fn health_check() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
