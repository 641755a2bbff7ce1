use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{
    auth::{repo::User, session, session::Session},
    error::AppError,
    state::AppState,
};

/// The authenticated identity for the active session. Extraction fails with
/// `AppError::NotAuthenticated` when there is no valid session, which turns
/// into a redirect to the login page.
pub struct Principal(pub User);

/// Like [`Principal`] but never rejects; pages rendered for both anonymous
/// and authenticated visitors use this.
pub struct MaybePrincipal(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybePrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session::token_from_headers(&parts.headers) else {
            return Ok(MaybePrincipal(None));
        };
        let Some(session) = Session::find_valid(&state.db, &token).await? else {
            return Ok(MaybePrincipal(None));
        };
        let user = User::find_by_id(&state.db, session.user_id).await?;
        Ok(MaybePrincipal(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybePrincipal::from_request_parts(parts, state).await? {
            MaybePrincipal(Some(user)) => Ok(Principal(user)),
            MaybePrincipal(None) => Err(AppError::NotAuthenticated),
        }
    }
}
