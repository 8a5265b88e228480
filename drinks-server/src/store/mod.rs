use crate::config::{Settings, StoreBackend};
use crate::models::{Drink, DrinkChanges, NewDrink};
use log::info;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a drink titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to encode or decode recipe: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Drink persistence contract.
///
/// Every method is one atomic unit against the backend, so handlers never need
/// to coordinate locking themselves. Titles are unique across the store, and ids
/// are assigned by the store and never handed out twice.
#[async_trait::async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks ordered by id
    async fn list(&self) -> Result<Vec<Drink>, StoreError>;

    /// A single drink, `None` if the id is unknown
    async fn get(&self, id: i64) -> Result<Option<Drink>, StoreError>;

    /// Inserts a drink and returns it with its new id
    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// Replaces the fields present in `changes`; `None` if the id is unknown
    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Option<Drink>, StoreError>;

    /// Removes a drink; `false` if the id is unknown
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Returns Ok(()) if healthy, or Err with a descriptive message if unhealthy.
    async fn health_check(&self) -> Result<(), String>;
}

/// Store implementation chosen at startup from the configuration.
#[derive(Clone)]
pub enum Store {
    /// Process-local store, lost on restart
    InMemory(memory::InMemoryStore),
    /// SQLite file store
    Sqlite(sqlite::SqliteStore),
}

#[async_trait::async_trait]
impl DrinkStore for Store {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        match self {
            Self::InMemory(store) => store.list().await,
            Self::Sqlite(store) => store.list().await,
        }
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        match self {
            Self::InMemory(store) => store.get(id).await,
            Self::Sqlite(store) => store.get(id).await,
        }
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        match self {
            Self::InMemory(store) => store.create(drink).await,
            Self::Sqlite(store) => store.create(drink).await,
        }
    }

    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Option<Drink>, StoreError> {
        match self {
            Self::InMemory(store) => store.update(id, changes).await,
            Self::Sqlite(store) => store.update(id, changes).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        match self {
            Self::InMemory(store) => store.delete(id).await,
            Self::Sqlite(store) => store.delete(id).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::InMemory(store) => store.health_check().await,
            Self::Sqlite(store) => store.health_check().await,
        }
    }
}

/// Creates the store backend selected by `store.backend`.
pub async fn create_store(settings: &Settings) -> Result<Store, StoreError> {
    match settings.store.backend {
        StoreBackend::InMemory => {
            info!("Using in-memory drink store");
            Ok(Store::InMemory(memory::InMemoryStore::new()))
        }
        StoreBackend::Sqlite => {
            info!("Using sqlite drink store at {}", settings.store.sqlite_path);
            let store = sqlite::SqliteStore::open(&settings.store.sqlite_path).await?;
            Ok(Store::Sqlite(store))
        }
    }
}

/// Behaviour every backend must share, run against each implementation.
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use crate::models::Ingredient;

    pub(crate) fn new_drink(title: &str) -> NewDrink {
        NewDrink {
            title: title.to_string(),
            recipe: vec![Ingredient {
                color: "brown".to_string(),
                name: "espresso".to_string(),
                parts: 1,
            }],
        }
    }

    pub(crate) async fn create_and_list(store: &impl DrinkStore) {
        assert!(store.list().await.unwrap().is_empty());

        let latte = store.create(new_drink("Latte")).await.unwrap();
        let mocha = store.create(new_drink("Mocha")).await.unwrap();
        assert!(latte.id < mocha.id);

        let drinks = store.list().await.unwrap();
        assert_eq!(drinks, vec![latte.clone(), mocha]);
        assert_eq!(store.get(latte.id).await.unwrap(), Some(latte));
        assert_eq!(store.get(9999).await.unwrap(), None);
    }

    pub(crate) async fn unique_titles(store: &impl DrinkStore) {
        let latte = store.create(new_drink("Latte")).await.unwrap();
        let mocha = store.create(new_drink("Mocha")).await.unwrap();

        let err = store.create(new_drink("Latte")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle(title) if title == "Latte"));

        let rename = DrinkChanges {
            title: Some("Latte".to_string()),
            recipe: None,
        };
        let err = store.update(mocha.id, rename).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle(_)));

        // Renaming a drink to its own title is not a clash
        let same = DrinkChanges {
            title: Some("Latte".to_string()),
            recipe: None,
        };
        assert!(store.update(latte.id, same).await.unwrap().is_some());
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    pub(crate) async fn partial_update(store: &impl DrinkStore) {
        let latte = store.create(new_drink("Latte")).await.unwrap();

        let renamed = store
            .update(
                latte.id,
                DrinkChanges {
                    title: Some("Latte Deluxe".to_string()),
                    recipe: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Latte Deluxe");
        assert_eq!(renamed.recipe, latte.recipe);

        let recipe = vec![Ingredient {
            color: "white".to_string(),
            name: "milk".to_string(),
            parts: 4,
        }];
        let updated = store
            .update(
                latte.id,
                DrinkChanges {
                    title: None,
                    recipe: Some(recipe.clone()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Latte Deluxe");
        assert_eq!(updated.recipe, recipe);
        assert_eq!(store.get(latte.id).await.unwrap(), Some(updated));

        let missing = store
            .update(
                9999,
                DrinkChanges {
                    title: Some("Ghost".to_string()),
                    recipe: None,
                },
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    pub(crate) async fn delete_never_reuses_ids(store: &impl DrinkStore) {
        let first = store.create(new_drink("Latte")).await.unwrap();
        assert!(store.delete(first.id).await.unwrap());
        assert!(!store.delete(first.id).await.unwrap());
        assert!(store.get(first.id).await.unwrap().is_none());

        let second = store.create(new_drink("Latte")).await.unwrap();
        assert!(second.id > first.id);
    }
}
