//! The login/logout controller.
//!
//! Two routes: home (GET shows the login view or a logged-in marker, POST
//! checks credentials) and logout (clears the session unconditionally).
//! Credentials come from the `[auth]` config section; until both are set,
//! login answers 503.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::server::AppContext;
use crate::server::sessions::Session;

const SESSION_COOKIE_NAME: &str = "fluidbean_session";

const LOGIN_VIEW: &str = include_str!("../../templates/login.html");

/// Login form payload
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn current_session(ctx: &AppContext, jar: &CookieJar) -> Option<Session> {
    let cookie = jar.get(SESSION_COOKIE_NAME)?;
    ctx.sessions.get(cookie.value())
}

/// Home handler: logged-in marker for a valid session, the login view
/// otherwise.
pub async fn home(State(ctx): State<AppContext>, jar: CookieJar) -> Response {
    match current_session(&ctx, &jar) {
        Some(session) => {
            tracing::debug!(username = %session.username, "home for authenticated session");
            "Logged in".into_response()
        }
        None => Html(LOGIN_VIEW).into_response(),
    }
}

/// Login handler: on a credential match, create a session, set the cookie,
/// and redirect to the base URL. A mismatch leaves the session untouched
/// and returns 401 with no redirect.
pub async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = &ctx.config.auth;
    let (Some(expected_username), Some(expected_password)) = (&auth.username, &auth.password)
    else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Authentication not configured",
        )
            .into_response();
    };

    if form.username == *expected_username && form.password == *expected_password {
        let token = ctx.sessions.create(&form.username, auth.session_timeout_hours);
        let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        tracing::info!(username = %form.username, "login successful");
        (jar.add(cookie), Redirect::to(&ctx.config.server.base_url)).into_response()
    } else {
        tracing::debug!(username = %form.username, "login rejected");
        (StatusCode::UNAUTHORIZED, Html(LOGIN_VIEW)).into_response()
    }
}

/// Logout handler: drop the session and its cookie, then redirect to the
/// base URL, regardless of prior state.
pub async fn logout(State(ctx): State<AppContext>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        ctx.sessions.clear(cookie.value());
    }
    let removal = Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build();
    (
        jar.remove(removal),
        Redirect::to(&ctx.config.server.base_url),
    )
        .into_response()
}
