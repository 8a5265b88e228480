use crate::auth::{Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks};
use crate::errors::{ApiError, ErrorResponse};
use crate::models::{payload, Drink, DrinkShort, NewDrink};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use crate::store::DrinkStore;
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    routing::{get, patch},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public menu listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// Drinks including full recipes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksResponse {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

impl DrinksResponse {
    fn new(drinks: Vec<Drink>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// Id of a removed drink
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}

/// Path ids that are not integers match no drink
fn drink_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

async fn all_drinks(state: &AppState) -> Result<Vec<Drink>, ApiError> {
    let drinks = state.store.list().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(drinks)
}

#[utoipa::path(
    get,
    path = "/drinks",
    tag = DRINKS_TAG,
    responses(
        (status = 200, description = "Menu without ingredient names", body = MenuResponse),
        (status = 404, description = "The menu is empty", body = ErrorResponse)
    )
)]
pub(crate) async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<MenuResponse>, ApiError> {
    let drinks = all_drinks(&state).await?;
    Ok(Json(MenuResponse {
        success: true,
        drinks: drinks.iter().map(DrinkShort::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = DRINKS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token with 'get:drinks-detail'"),
    ),
    responses(
        (status = 200, description = "Menu with full recipes", body = DrinksResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "The menu is empty", body = ErrorResponse)
    )
)]
pub(crate) async fn list_drink_details(
    _auth: Authorized<GetDrinksDetail>,
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse>, ApiError> {
    Ok(Json(DrinksResponse::new(all_drinks(&state).await?)))
}

#[utoipa::path(
    post,
    path = "/drinks",
    tag = DRINKS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token with 'post:drinks'"),
    ),
    request_body = NewDrink,
    responses(
        (status = 200, description = "Drink created", body = DrinksResponse),
        (status = 400, description = "Missing title or recipe", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 422, description = "Malformed recipe or duplicate title", body = ErrorResponse)
    )
)]
pub(crate) async fn create_drink(
    auth: Authorized<PostDrinks>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DrinksResponse>, ApiError> {
    let new_drink = payload::new_drink(&payload::parse_object(&body)?)?;
    let drink = state.store.create(new_drink).await?;
    info!(
        "Drink {} '{}' created by {}",
        drink.id, drink.title, auth.claims.sub
    );
    Ok(Json(DrinksResponse::new(vec![drink])))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    params(
        ("id" = i64, Path, description = "Drink id"),
        ("Authorization" = String, Header, description = "Bearer token with 'patch:drinks'"),
    ),
    request_body = NewDrink,
    responses(
        (status = 200, description = "Drink updated", body = DrinksResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Unknown drink", body = ErrorResponse),
        (status = 422, description = "Nothing to update, malformed field or duplicate title", body = ErrorResponse)
    )
)]
pub(crate) async fn update_drink(
    auth: Authorized<PatchDrinks>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<DrinksResponse>, ApiError> {
    let id = drink_id(id)?;
    if state.store.get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let changes = payload::drink_changes(&payload::parse_object(&body)?)?;
    // `None` if the drink was deleted since the lookup
    let drink = state
        .store
        .update(id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("Drink {} updated by {}", drink.id, auth.claims.sub);
    Ok(Json(DrinksResponse::new(vec![drink])))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    params(
        ("id" = i64, Path, description = "Drink id"),
        ("Authorization" = String, Header, description = "Bearer token with 'delete:drinks'"),
    ),
    responses(
        (status = 200, description = "Drink deleted", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Unknown drink", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_drink(
    auth: Authorized<DeleteDrinks>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = drink_id(id)?;
    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    info!("Drink {} deleted by {}", id, auth.claims.sub);
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(list_drink_details))
        .route("/drinks/{id}", patch(update_drink).delete(delete_drink))
}
