use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

/// Route an unauthenticated request to a protected page is redirected to.
pub const LOGIN_ROUTE: &str = "/user_login";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("authentication required")]
    NotAuthenticated,
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(include_str!("../templates/404.html")),
            )
                .into_response(),
            AppError::NotAuthenticated => Redirect::to(LOGIN_ROUTE).into_response(),
            AppError::Template(e) => {
                error!(error = %e, "template rendering error");
                server_error()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                server_error()
            }
        }
    }
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Something went wrong.</h1>"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn not_authenticated_redirects_to_login() {
        let res = AppError::NotAuthenticated.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            LOGIN_ROUTE
        );
    }

    #[test]
    fn not_found_renders_custom_page() {
        let res = AppError::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_errors_map_to_500() {
        let res = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn database_errors_propagate_as_internal() {
        let err: AppError = anyhow::Error::from(sqlx::Error::RowNotFound).into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
