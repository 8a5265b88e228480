//! SQLite implementation of the drink store.
//!
//! Uses rusqlite with bundled SQLite. The single connection sits behind a mutex
//! and every call runs on the blocking thread pool.

use super::{DrinkStore, StoreError};
use crate::models::{Drink, DrinkChanges, Ingredient, NewDrink};
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS drinks (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        title  TEXT    NOT NULL UNIQUE,
        recipe TEXT    NOT NULL
    );
";

/// Drink store backed by a SQLite database.
///
/// `AUTOINCREMENT` keeps deleted ids from being handed out again.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the schema exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let conn = Connection::open(path)?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to open database: {e}")))??;
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` with exclusive access to the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("connection mutex poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

fn drink_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn decode((id, title, recipe): (i64, String, String)) -> Result<Drink, StoreError> {
    let recipe: Vec<Ingredient> = serde_json::from_str(&recipe)?;
    Ok(Drink { id, title, recipe })
}

/// Maps a unique constraint violation on `title` to `DuplicateTitle`
fn map_title_conflict(err: rusqlite::Error, title: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateTitle(title.to_string())
        }
        _ => StoreError::Database(err),
    }
}

fn select_one(conn: &Connection, id: i64) -> Result<Option<Drink>, StoreError> {
    conn.query_row(
        "SELECT id, title, recipe FROM drinks WHERE id = ?1",
        params![id],
        drink_from_row,
    )
    .optional()?
    .map(decode)
    .transpose()
}

#[async_trait]
impl DrinkStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, recipe FROM drinks ORDER BY id")?;
            let drinks = stmt
                .query_map([], drink_from_row)?
                .map(|row| decode(row?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(drinks)
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        self.with_conn(move |conn| select_one(conn, id)).await
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        self.with_conn(move |conn| {
            let recipe = serde_json::to_string(&drink.recipe)?;
            conn.execute(
                "INSERT INTO drinks (title, recipe) VALUES (?1, ?2)",
                params![drink.title, recipe],
            )
            .map_err(|e| map_title_conflict(e, &drink.title))?;
            Ok(Drink {
                id: conn.last_insert_rowid(),
                title: drink.title,
                recipe: drink.recipe,
            })
        })
        .await
    }

    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Option<Drink>, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let Some(mut drink) = select_one(&tx, id)? else {
                return Ok(None);
            };
            changes.apply_to(&mut drink);
            let recipe = serde_json::to_string(&drink.recipe)?;
            tx.execute(
                "UPDATE drinks SET title = ?1, recipe = ?2 WHERE id = ?3",
                params![drink.title, recipe, id],
            )
            .map_err(|e| map_title_conflict(e, &drink.title))?;
            tx.commit()?;
            Ok(Some(drink))
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM drinks WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn health_check(&self) -> Result<(), String> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
        .map_err(|e| e.to_string())
    }
}
