//! Validation of create and update request bodies.
//!
//! Missing required fields are a 400, fields that are present but malformed are a 422.
//! Nothing in here touches the store.

use crate::errors::ApiError;
use crate::models::{DrinkChanges, Ingredient, NewDrink};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A recipe may be sent as a list of ingredients or as a single ingredient object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

/// Parses raw request bytes into a JSON object
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ApiError::bad_request("request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!(
            "request body is not valid JSON: {e}"
        ))),
    }
}

/// Validates a create request; both `title` and `recipe` are required
pub fn new_drink(body: &Map<String, Value>) -> Result<NewDrink, ApiError> {
    let (Some(title), Some(recipe)) = (body.get("title"), body.get("recipe")) else {
        return Err(ApiError::bad_request(
            "request body must include 'title' and 'recipe'",
        ));
    };
    Ok(NewDrink {
        title: parse_title(title)?,
        recipe: parse_recipe(recipe)?,
    })
}

/// Validates a partial update; at least one of `title` or `recipe` must be present
pub fn drink_changes(body: &Map<String, Value>) -> Result<DrinkChanges, ApiError> {
    let changes = DrinkChanges {
        title: body.get("title").map(parse_title).transpose()?,
        recipe: body.get("recipe").map(parse_recipe).transpose()?,
    };
    if changes.is_empty() {
        return Err(ApiError::unprocessable(
            "request body must include 'title' or 'recipe'",
        ));
    }
    Ok(changes)
}

fn parse_title(value: &Value) -> Result<String, ApiError> {
    match value.as_str().map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        Some(_) => Err(ApiError::unprocessable("'title' must not be empty")),
        None => Err(ApiError::unprocessable("'title' must be a string")),
    }
}

fn parse_recipe(value: &Value) -> Result<Vec<Ingredient>, ApiError> {
    let recipe = match RecipeInput::deserialize(value) {
        Ok(RecipeInput::Many(ingredients)) => ingredients,
        Ok(RecipeInput::One(ingredient)) => vec![ingredient],
        Err(_) => {
            return Err(ApiError::unprocessable(
                "'recipe' must be an ingredient or a list of ingredients \
                 with 'color', 'name' and a positive integer 'parts'",
            ))
        }
    };
    if recipe.is_empty() {
        return Err(ApiError::unprocessable("'recipe' must not be empty"));
    }
    for ingredient in &recipe {
        if ingredient.parts == 0 {
            return Err(ApiError::unprocessable(format!(
                "'parts' of '{}' must be positive",
                ingredient.name
            )));
        }
        if ingredient.name.trim().is_empty() || ingredient.color.trim().is_empty() {
            return Err(ApiError::unprocessable(
                "ingredient 'name' and 'color' must not be empty",
            ));
        }
    }
    Ok(recipe)
}
