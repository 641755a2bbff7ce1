use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tera::Context;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{MaybePrincipal, Principal},
    error::AppError,
    plants::{
        dto::{HarvestForm, PlantForm},
        repo::{Harvest, Plant},
    },
    state::AppState,
    views,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(plants_list))
        .route("/about", get(about))
        .route("/create", get(create_form).post(create))
        .route("/plant/:plant_id", get(detail))
        .route("/harvest/:plant_id", post(harvest))
        .route("/edit/:plant_id", get(edit_form).post(edit))
        .route("/delete/:plant_id", post(delete))
}

/// Plant id path segment. Anything that is not a valid id gets the custom
/// 404 page instead of axum's plain-text rejection.
pub struct PlantId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PlantId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(PlantId(id))
    }
}

#[instrument(skip(state, principal))]
async fn plants_list(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
) -> Result<Html<String>, AppError> {
    let plants = Plant::list(&state.db).await?;
    let mut ctx = Context::new();
    ctx.insert("plants", &plants);
    ctx.insert("logged_in", &principal.is_some());
    views::render(&state.templates, "plants_list.html", &ctx)
}

#[instrument(skip(state))]
async fn about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    views::render(&state.templates, "about.html", &Context::new())
}

#[instrument(skip(state, _user))]
async fn create_form(
    State(state): State<AppState>,
    Principal(_user): Principal,
) -> Result<Html<String>, AppError> {
    views::render(&state.templates, "create.html", &Context::new())
}

#[instrument(skip(state, user, form))]
async fn create(
    State(state): State<AppState>,
    Principal(user): Principal,
    Form(form): Form<PlantForm>,
) -> Result<Response, AppError> {
    let plant = Plant::create(
        &state.db,
        &form.plant_name,
        &form.variety,
        &form.photo_url,
        &form.date_planted,
    )
    .await?;
    info!(plant_id = %plant.id, user_id = %user.id, "plant created");
    Ok(Redirect::to(&format!("/plant/{}", plant.id)).into_response())
}

#[instrument(skip(state))]
async fn detail(
    State(state): State<AppState>,
    PlantId(plant_id): PlantId,
) -> Result<Html<String>, AppError> {
    let Some(plant) = Plant::find(&state.db, plant_id).await? else {
        return Err(AppError::NotFound);
    };
    let harvests = Harvest::list_for_plant(&state.db, plant_id).await?;
    let mut ctx = Context::new();
    ctx.insert("plant", &plant);
    ctx.insert("harvests", &harvests);
    views::render(&state.templates, "detail.html", &ctx)
}

#[instrument(skip(state, user, form))]
async fn harvest(
    State(state): State<AppState>,
    Principal(user): Principal,
    PlantId(plant_id): PlantId,
    Form(form): Form<HarvestForm>,
) -> Result<Response, AppError> {
    // The quantity string needs the plant name, so a missing plant fails here.
    let Some(plant) = Plant::find(&state.db, plant_id).await? else {
        return Err(AppError::NotFound);
    };
    let quantity = Harvest::quantity_string(&form.harvested_amount, &plant.name);
    let harvest = Harvest::create(&state.db, plant.id, &quantity, &form.date_harvested).await?;
    info!(harvest_id = %harvest.id, plant_id = %plant.id, user_id = %user.id, "harvest logged");
    Ok(Redirect::to(&format!("/plant/{}", plant.id)).into_response())
}

#[instrument(skip(state))]
async fn edit_form(
    State(state): State<AppState>,
    PlantId(plant_id): PlantId,
) -> Result<Html<String>, AppError> {
    let Some(plant) = Plant::find(&state.db, plant_id).await? else {
        return Err(AppError::NotFound);
    };
    let mut ctx = Context::new();
    ctx.insert("plant", &plant);
    views::render(&state.templates, "edit.html", &ctx)
}

#[instrument(skip(state, user, form))]
async fn edit(
    State(state): State<AppState>,
    Principal(user): Principal,
    PlantId(plant_id): PlantId,
    Form(form): Form<PlantForm>,
) -> Result<Response, AppError> {
    Plant::update(
        &state.db,
        plant_id,
        &form.plant_name,
        &form.variety,
        &form.photo_url,
        &form.date_planted,
    )
    .await?;
    info!(plant_id = %plant_id, user_id = %user.id, "plant updated");
    Ok(Redirect::to(&format!("/plant/{}", plant_id)).into_response())
}

#[instrument(skip(state, user))]
async fn delete(
    State(state): State<AppState>,
    Principal(user): Principal,
    PlantId(plant_id): PlantId,
) -> Result<Response, AppError> {
    Plant::delete_cascade(&state.db, plant_id).await?;
    info!(plant_id = %plant_id, user_id = %user.id, "plant and harvests deleted");
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn unparsable_plant_id_maps_to_not_found() {
        let (mut parts, _) = Request::builder()
            .uri("/plant/not-a-uuid")
            .body(())
            .unwrap()
            .into_parts();
        let err = PlantId::from_request_parts(&mut parts, &())
            .await
            .err()
            .expect("extraction must fail");
        assert!(matches!(err, AppError::NotFound));
    }
}
