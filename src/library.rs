use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::media::{CatalogItem, MediaId, MediaKey, MediaType};

pub const FAVORITES_KEY: &str = "favorites";
pub const RECENTLY_VIEWED_KEY: &str = "recently_viewed";
pub const RECENTLY_VIEWED_CAPACITY: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available on this platform")]
    NoDataDir,
}

/// String key-value storage with load-on-init / save-on-mutate semantics.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn open_default() -> Result<Self, StoreError> {
        let dirs =
            directories::ProjectDirs::from("", "", "catalogz").ok_or(StoreError::NoDataDir)?;
        Self::new(dirs.data_dir().to_path_buf())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentlyViewedEntry {
    pub id: MediaId,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub media_type: MediaType,
}

impl RecentlyViewedEntry {
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            poster_path: item.poster_path.clone(),
            release_date: item.first_date.clone(),
            media_type: item.media_type,
        }
    }

    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.id, self.media_type)
    }

    pub fn to_item(&self) -> CatalogItem {
        CatalogItem {
            id: self.id,
            media_type: self.media_type,
            title: self.title.clone(),
            overview: String::new(),
            poster_path: self.poster_path.clone(),
            first_date: self.release_date.clone(),
            genre_ids: Vec::new(),
            vote_average: 0.0,
        }
    }
}

/// Favorites and recently viewed entries, mirrored to a key-value store on every change.
pub struct Library {
    store: Box<dyn KeyValueStore>,
    favorites: Vec<MediaKey>,
    recently_viewed: Vec<RecentlyViewedEntry>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("favorites", &self.favorites.len())
            .field("recently_viewed", &self.recently_viewed.len())
            .finish()
    }
}

fn read_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, "could not read stored list: {}", e);
            return Vec::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, "discarding unreadable stored list: {}", e);
        Vec::new()
    })
}

impl Library {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let mut favorites: Vec<MediaKey> = read_list(store.as_ref(), FAVORITES_KEY);
        let mut seen = std::collections::HashSet::new();
        favorites.retain(|key| seen.insert(*key));

        let mut recently_viewed: Vec<RecentlyViewedEntry> =
            read_list(store.as_ref(), RECENTLY_VIEWED_KEY);
        recently_viewed.truncate(RECENTLY_VIEWED_CAPACITY);

        tracing::info!(
            favorites = favorites.len(),
            recently_viewed = recently_viewed.len(),
            "library loaded"
        );
        Self {
            store,
            favorites,
            recently_viewed,
        }
    }

    /// Opens the on-disk library, falling back to a session-only one when the
    /// platform has no data directory.
    pub fn open_default() -> Self {
        match JsonFileStore::open_default() {
            Ok(store) => Self::load(Box::new(store)),
            Err(e) => {
                tracing::warn!("favorites will not persist: {}", e);
                Self::load(Box::new(MemoryStore::default()))
            }
        }
    }

    pub fn favorites(&self) -> &[MediaKey] {
        &self.favorites
    }

    pub fn recently_viewed(&self) -> &[RecentlyViewedEntry] {
        &self.recently_viewed
    }

    pub fn is_favorite(&self, key: MediaKey) -> bool {
        self.favorites.contains(&key)
    }

    /// Adds or removes `key`; returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, key: MediaKey) -> bool {
        let now_favorite = match self.favorites.iter().position(|f| *f == key) {
            Some(index) => {
                self.favorites.remove(index);
                false
            }
            None => {
                self.favorites.push(key);
                true
            }
        };
        persist(self.store.as_mut(), FAVORITES_KEY, &self.favorites);
        now_favorite
    }

    pub fn add_recently_viewed(&mut self, item: &CatalogItem) {
        let key = item.key();
        self.recently_viewed.retain(|entry| entry.key() != key);
        self.recently_viewed
            .insert(0, RecentlyViewedEntry::from_item(item));
        self.recently_viewed.truncate(RECENTLY_VIEWED_CAPACITY);
        persist(self.store.as_mut(), RECENTLY_VIEWED_KEY, &self.recently_viewed);
    }

    pub fn find_recent(&self, key: MediaKey) -> Option<&RecentlyViewedEntry> {
        self.recently_viewed.iter().find(|entry| entry.key() == key)
    }
}

fn persist<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StoreError::from)
        .and_then(|json| store.set(key, &json));
    if let Err(e) = result {
        tracing::warn!(key, "could not persist library change: {}", e);
    }
}
