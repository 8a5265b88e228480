use confique::Config;
use serde::Deserialize;
use std::fmt;

/// Specifies which drink store implementation to use
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "String")]
pub enum StoreBackend {
    #[default]
    InMemory,
    Sqlite,
}

impl TryFrom<String> for StoreBackend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "in-memory" => Ok(Self::InMemory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!(
                "unknown store backend '{other}', expected 'in-memory' or 'sqlite'"
            )),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("in-memory"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Configuration for the drink store
#[derive(Debug, Config, Clone)]
pub struct StoreConfig {
    /// Store backend: "in-memory" (default) or "sqlite"
    #[config(env = "DRINKS_STORE_BACKEND", default = "in-memory")]
    pub backend: StoreBackend,

    /// Database file used by the sqlite backend (default: drinks.db)
    #[config(env = "DRINKS_STORE_SQLITE_PATH", default = "drinks.db")]
    pub sqlite_path: String,
}
