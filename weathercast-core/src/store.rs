use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};
use thiserror::Error;
use tracing::debug;

use crate::config::project_dirs;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not determine platform data directory")]
    NoDataDir,
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize city state: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Durable home of the last city a lookup succeeded for.
pub trait CityStore: Send + Sync + Debug {
    fn last_searched_city(&self) -> Result<Option<String>, StoreError>;
    fn save_last_searched_city(&self, city: &str) -> Result<(), StoreError>;
}

/// On-disk contents of the state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoredCity {
    pub last_searched_city: Option<String>,
    pub searched_at: Option<DateTime<Utc>>,
}

/// Keeps the last searched city in a small TOML file.
#[derive(Debug)]
pub struct FileCityStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store located in the platform data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        let dirs = project_dirs().map_err(|_| StoreError::NoDataDir)?;
        Ok(dirs.data_dir().join("state.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full state entry; a missing file reads as empty.
    pub fn load_state(&self) -> Result<StoredCity, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoredCity::default()),
            Err(source) => return Err(self.io_error(source)),
        };

        toml::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_state(&self, state: &StoredCity) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let contents = toml::to_string_pretty(state)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, contents).map_err(|source| self.io_error(source))?;
        fs::rename(&temp_path, &self.path).map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), "saved last searched city");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CityStore for FileCityStore {
    fn last_searched_city(&self) -> Result<Option<String>, StoreError> {
        Ok(non_empty(self.load_state()?.last_searched_city))
    }

    fn save_last_searched_city(&self, city: &str) -> Result<(), StoreError> {
        self.write_state(&StoredCity {
            last_searched_city: Some(city.to_owned()),
            searched_at: Some(Utc::now()),
        })
    }
}

/// Process-local store, for tests and runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCityStore {
    city: RwLock<Option<String>>,
}

impl MemoryCityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(city: impl Into<String>) -> Self {
        Self {
            city: RwLock::new(Some(city.into())),
        }
    }
}

impl CityStore for MemoryCityStore {
    fn last_searched_city(&self) -> Result<Option<String>, StoreError> {
        let city = self.city.read().unwrap_or_else(PoisonError::into_inner);
        Ok(non_empty(city.clone()))
    }

    fn save_last_searched_city(&self, city: &str) -> Result<(), StoreError> {
        *self.city.write().unwrap_or_else(PoisonError::into_inner) = Some(city.to_owned());
        Ok(())
    }
}

fn non_empty(city: Option<String>) -> Option<String> {
    city.filter(|c| !c.is_empty())
}
