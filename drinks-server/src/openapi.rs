use crate::api::{client_config, drinks, health};
use crate::errors::ErrorResponse;
use crate::models::{Drink, DrinkShort, Ingredient, NewDrink, ShortIngredient};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const DRINKS_TAG: &str = "Drinks API";
pub(crate) const AUTH_TAG: &str = "Auth API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::ready_check,
        client_config::client_config,
        drinks::list_drinks,
        drinks::list_drink_details,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
    ),
    components(schemas(
        Drink,
        DrinkShort,
        Ingredient,
        NewDrink,
        ShortIngredient,
        ErrorResponse,
        drinks::MenuResponse,
        drinks::DrinksResponse,
        drinks::DeleteResponse,
        client_config::ClientConfig,
        health::Health,
    )),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = DRINKS_TAG, description = "Drink menu endpoints"),
        (name = AUTH_TAG, description = "Identity provider settings for clients"),
    ),
    info(
        title = "Drink Menu API",
        description = "Coffee shop drink menu guarded by token permissions",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
