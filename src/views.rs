use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppError;

pub fn render(templates: &Tera, name: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(templates.render(name, context)?))
}
