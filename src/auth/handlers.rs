use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tera::Context;
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        extractors::SessionUser,
        session::SessionKeys,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(show_login).post(login))
        .route("/register", get(show_register).post(register))
        .route("/logout", get(logout))
}

fn form_context(title: &str, username: &str, error: Option<&str>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("form_username", username);
    if let Some(error) = error {
        ctx.insert("error", error);
    }
    ctx
}

fn form_error(state: &AppState, template: &str, title: &str, username: &str, err: &AppError) -> Response {
    let status = if err.is_user_facing() {
        StatusCode::OK
    } else {
        error!(error = %err, template, "auth request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let ctx = form_context(title, username, Some(&err.user_message()));
    state.views.page(status, template, &ctx)
}

/// A session whose user no longer exists is dropped instead of redirected,
/// so the browser does not bounce between `/login` and `/cards`.
#[instrument(skip(state, session))]
pub async fn show_login(State(state): State<AppState>, session: Option<SessionUser>) -> Response {
    let login_page = |state: &AppState| {
        state
            .views
            .page(StatusCode::OK, "login.html", &form_context("Login", "", None))
    };

    let Some(session) = session else {
        return login_page(&state);
    };
    match state.auth.get_user_by_id(session.user_id).await {
        Ok(_) => Redirect::to("/cards").into_response(),
        Err(AppError::NotFound) => {
            info!(user_id = session.user_id, "session for unknown user dropped");
            let keys = SessionKeys::from_ref(&state);
            ([(SET_COOKIE, keys.clear_cookie())], login_page(&state)).into_response()
        }
        Err(e) => {
            error!(error = %e, user_id = session.user_id, "session user lookup failed");
            login_page(&state)
        }
    }
}

#[instrument(skip(state, form))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let user = match state.auth.login(&form.username, &form.password).await {
        Ok(u) => u,
        Err(e) => return form_error(&state, "login.html", "Login", &form.username, &e),
    };

    let keys = SessionKeys::from_ref(&state);
    let cookie = match keys
        .sign(user.id, &user.username)
        .and_then(|token| keys.cookie(&token))
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, user_id = user.id, "failed to save session");
            let ctx = form_context("Login", &form.username, Some("failed to save session"));
            return state
                .views
                .page(StatusCode::INTERNAL_SERVER_ERROR, "login.html", &ctx);
        }
    };

    info!(user_id = user.id, "session started");
    ([(SET_COOKIE, cookie)], Redirect::to("/cards")).into_response()
}

pub async fn show_register(State(state): State<AppState>) -> Response {
    state
        .views
        .page(StatusCode::OK, "register.html", &form_context("Register", "", None))
}

#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if form.password != form.confirm_password {
        let err = AppError::Validation("passwords do not match".into());
        return form_error(&state, "register.html", "Register", &form.username, &err);
    }

    match state.auth.register(&form.username, &form.password).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(e) => form_error(&state, "register.html", "Register", &form.username, &e),
    }
}

pub async fn logout(State(state): State<AppState>, session: SessionUser) -> Response {
    info!(user_id = session.user_id, "session ended");
    let keys = SessionKeys::from_ref(&state);
    ([(SET_COOKIE, keys.clear_cookie())], Redirect::to("/login")).into_response()
}
