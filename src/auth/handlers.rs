use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, instrument, warn};

use crate::auth::{
    dto::{LoginForm, RegisterForm},
    services::{self, is_valid_email, AuthError},
    session::{SessionKeys, AUTH_COOKIE},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

#[instrument(skip(state))]
pub async fn register_page(State(state): State<AppState>) -> Response {
    render_page(&state, "register.html", "Register")
}

#[instrument(skip(state))]
pub async fn login_page(State(state): State<AppState>) -> Response {
    render_page(&state, "login.html", "Log in")
}

#[instrument(skip(state, form))]
pub async fn register_submit(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> Response {
    form.username = form.username.trim().to_string();
    form.email = form.email.trim().to_lowercase();
    form.name = form.name.trim().to_string();

    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email");
        return render_invalid(
            &state,
            "register.html",
            "Register",
            "Invalid email address",
            StatusCode::BAD_REQUEST,
        );
    }

    if form.password.is_empty() {
        warn!("empty password");
        return render_invalid(
            &state,
            "register.html",
            "Register",
            "Password must not be empty",
            StatusCode::BAD_REQUEST,
        );
    }

    match services::register(&state, &form).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            Redirect::to("/login").into_response()
        }
        Err(AuthError::DuplicateCredential) => render_invalid(
            &state,
            "register.html",
            "Register",
            "Username or email already registered",
            StatusCode::BAD_REQUEST,
        ),
        Err(e) => {
            error!(error = %e, "register failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[instrument(skip(state, jar, form))]
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();

    let user = match services::login(&state, username, &form.password).await {
        Ok(u) => u,
        Err(AuthError::InvalidCredentials) => {
            return render_invalid(
                &state,
                "login.html",
                "Log in",
                "Invalid username or password",
                StatusCode::UNAUTHORIZED,
            );
        }
        Err(e) => {
            error!(error = %e, "login failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let keys = SessionKeys::from_ref(&state);
    let token = match keys.issue(&user.username) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "session token issue failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(keys.session_ttl.as_secs() as i64))
        .build();

    info!(user_id = %user.id, username = %user.username, "user logged in");
    (jar.add(cookie), Redirect::to("/tasks")).into_response()
}

/// Logging out only clears the cookie on the client. The token stays valid
/// until its natural expiry; there is no server-side session state to drop.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let removal = Cookie::build((AUTH_COOKIE, "")).path("/").build();
    (jar.remove(removal), Redirect::to("/"))
}

fn render_page(state: &AppState, template: &str, title: &str) -> Response {
    let mut ctx = tera::Context::new();
    ctx.insert("title", title);
    match state.templates.render(template, &ctx) {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            error!(error = %e, template, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

fn render_invalid(
    state: &AppState,
    template: &str,
    title: &str,
    message: &str,
    status: StatusCode,
) -> Response {
    let mut ctx = tera::Context::new();
    ctx.insert("title", title);
    ctx.insert("invalid", &true);
    ctx.insert("message", message);
    match state.templates.render(template, &ctx) {
        Ok(body) => {
            let mut resp = Html(body).into_response();
            *resp.status_mut() = status;
            resp
        }
        Err(e) => {
            error!(error = %e, template, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_page_renders_form() {
        let state = AppState::fake();
        let resp = login_page(State(state)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let html = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(html.contains("name=\"username\""));
        assert!(html.contains("name=\"password\""));
    }

    #[tokio::test]
    async fn register_page_renders_all_fields() {
        let state = AppState::fake();
        let resp = register_page(State(state)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let html = String::from_utf8(body.to_vec()).expect("utf8");
        for field in ["username", "email", "name", "password"] {
            assert!(html.contains(&format!("name=\"{field}\"")), "missing {field}");
        }
    }

    #[tokio::test]
    async fn invalid_render_carries_status_and_flag() {
        let state = AppState::fake();
        let resp = render_invalid(
            &state,
            "login.html",
            "Log in",
            "Invalid username or password",
            StatusCode::UNAUTHORIZED,
        );
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let html = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(html.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_redirects_home() {
        let resp = logout(CookieJar::new()).await.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("location").unwrap(), "/");
        let set_cookie = resp
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .expect("removal cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("auth="));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
