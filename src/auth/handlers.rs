use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use cookie::Cookie;
use tera::Context;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{EditUserForm, LoginForm, SignUpForm},
        extractors::Principal,
        password::{hash_password, validate_new_password, verify_password},
        repo::User,
        session,
        session::Session,
    },
    error::AppError,
    state::AppState,
    views,
};

pub const PASSWORD_POLICY_MESSAGE: &str =
    "Passwords must match and be between 8 and 12 characters.";
pub const BAD_CREDENTIALS_MESSAGE: &str = "Incorrect email or password, please try again.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign_up", get(sign_up_form).post(sign_up))
        .route("/user_login", get(login_form).post(login))
        .route("/user", get(profile).post(profile))
        .route("/log_out", get(log_out).post(log_out))
        .route("/delete_user", get(delete_user))
        .route("/edit_user", get(edit_user_form).post(edit_user))
}

fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> Response {
    (
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(location),
    )
        .into_response()
}

fn none_if_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[instrument(skip(state))]
async fn sign_up_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    views::render(&state.templates, "sign_up.html", &Context::new())
}

#[instrument(skip(state, form))]
async fn sign_up(
    State(state): State<AppState>,
    Form(mut form): Form<SignUpForm>,
) -> Result<Response, AppError> {
    form.user_email = form.user_email.trim().to_string();

    if validate_new_password(&form.password, &form.confirm_password).is_err() {
        warn!("sign up rejected by password policy");
        let mut ctx = Context::new();
        ctx.insert("message", PASSWORD_POLICY_MESSAGE);
        return Ok(views::render(&state.templates, "sign_up.html", &ctx)?.into_response());
    }

    let hash = hash_password(&form.password)?;
    let user = User::create(
        &state.db,
        &form.user_email,
        &hash,
        &form.first_name,
        &form.last_name,
    )
    .await?;

    // The new principal is authenticated right away, no separate login step.
    let session = Session::create(&state.db, user.id, state.config.session_ttl_minutes).await?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(redirect_with_cookie("/", session::session_cookie(&session.token)))
}

#[instrument(skip(state))]
async fn login_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    views::render(&state.templates, "user_login.html", &Context::new())
}

#[instrument(skip(state, form))]
async fn login(
    State(state): State<AppState>,
    Form(mut form): Form<LoginForm>,
) -> Result<Response, AppError> {
    form.user_email = form.user_email.trim().to_string();

    // Unknown email and wrong password take the same path: one generic
    // message, nothing to distinguish the two from outside.
    let Some(user) = User::find_by_email(&state.db, &form.user_email).await? else {
        warn!(email = %form.user_email, "login unknown email");
        return rejected_login(&state);
    };
    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return rejected_login(&state);
    }

    let session = Session::create(&state.db, user.id, state.config.session_ttl_minutes).await?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(redirect_with_cookie(
        "/create",
        session::session_cookie(&session.token),
    ))
}

fn rejected_login(state: &AppState) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("message", BAD_CREDENTIALS_MESSAGE);
    Ok(views::render(&state.templates, "user_login.html", &ctx)?.into_response())
}

#[instrument(skip(state, user))]
async fn profile(
    State(state): State<AppState>,
    Principal(user): Principal,
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("bio", user.bio.as_deref().unwrap_or_default());
    ctx.insert("avatar", user.avatar.as_deref().unwrap_or_default());
    views::render(&state.templates, "user.html", &ctx)
}

#[instrument(skip(state, headers))]
async fn log_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session::token_from_headers(&headers) {
        Session::delete(&state.db, &token).await?;
    }
    Ok(redirect_with_cookie("/", session::clear_session_cookie()))
}

#[instrument(skip(state, user))]
async fn delete_user(
    State(state): State<AppState>,
    Principal(user): Principal,
) -> Result<Response, AppError> {
    // Session rows go with the user via the FK cascade.
    User::delete(&state.db, user.id).await?;
    info!(user_id = %user.id, "user deleted");
    Ok(redirect_with_cookie("/", session::clear_session_cookie()))
}

#[instrument(skip(state, user))]
async fn edit_user_form(
    State(state): State<AppState>,
    Principal(user): Principal,
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("bio", user.bio.as_deref().unwrap_or_default());
    ctx.insert("avatar", user.avatar.as_deref().unwrap_or_default());
    views::render(&state.templates, "edit_user.html", &ctx)
}

#[instrument(skip(state, user, form))]
async fn edit_user(
    State(state): State<AppState>,
    Principal(user): Principal,
    Form(form): Form<EditUserForm>,
) -> Result<Response, AppError> {
    User::update_profile(
        &state.db,
        user.id,
        &form.first_name,
        &form.last_name,
        none_if_empty(&form.bio),
        none_if_empty(&form.avatar),
    )
    .await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Redirect::to("/user").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn redirect_with_cookie_sets_both_headers() {
        let res = redirect_with_cookie("/", session::session_cookie("tok"));
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION),
            Some(&HeaderValue::from_static("/"))
        );
        let set_cookie = res.headers().get(header::SET_COOKIE).unwrap();
        assert!(set_cookie.to_str().unwrap().contains("gardenlog_session=tok"));
    }

    #[test]
    fn empty_profile_fields_stored_as_absent() {
        assert_eq!(none_if_empty(""), None);
        assert_eq!(none_if_empty("   "), None);
        assert_eq!(none_if_empty(" likes ferns "), Some("likes ferns"));
    }
}
