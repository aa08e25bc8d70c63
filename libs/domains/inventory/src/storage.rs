//! Local JSON blob store under fixed keys.
//!
//! Values are overwritten wholesale on every `set`; there is no versioning and
//! no transaction support.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::InventoryResult;

/// Keys the application stores blobs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum StorageKey {
    #[strum(serialize = "inventory_products")]
    Products,
    #[strum(serialize = "inventory_sales")]
    Sales,
    #[strum(serialize = "inventory_categories")]
    Categories,
    #[strum(serialize = "inventory_settings")]
    Settings,
}

#[derive(Debug, Clone)]
enum Backend {
    Memory(Arc<RwLock<HashMap<StorageKey, String>>>),
    Directory(PathBuf),
}

/// JSON store; cheap to clone, clones share the same backend
#[derive(Debug, Clone)]
pub struct JsonStore {
    backend: Backend,
}

impl JsonStore {
    /// Volatile store, gone with the process
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(HashMap::new()))),
        }
    }

    /// Store writing `<dir>/<key>.json`; the directory is created if missing
    pub async fn open(dir: impl AsRef<Path>) -> InventoryResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!(path = %dir.display(), "Opened local JSON store");
        Ok(Self {
            backend: Backend::Directory(dir),
        })
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Directory(_))
    }

    fn path_for(dir: &Path, key: StorageKey) -> PathBuf {
        dir.join(format!("{}.json", key.as_ref()))
    }

    async fn read_raw(&self, key: StorageKey) -> InventoryResult<Option<String>> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.read().await.get(&key).cloned()),
            Backend::Directory(dir) => match tokio::fs::read_to_string(Self::path_for(dir, key)).await {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Read and decode a blob; a missing key is `None`
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: StorageKey) -> InventoryResult<Option<T>> {
        match self.read_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and overwrite a blob
    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> InventoryResult<()> {
        let raw = serde_json::to_string(value)?;
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.insert(key, raw);
            }
            Backend::Directory(dir) => {
                // Write then rename so a crash never leaves half a blob
                let path = Self::path_for(dir, key);
                let tmp = path.with_extension("json.tmp");
                tokio::fs::write(&tmp, raw).await?;
                tokio::fs::rename(&tmp, &path).await?;
            }
        }
        tracing::trace!(key = %key, "Stored blob");
        Ok(())
    }

    pub async fn remove(&self, key: StorageKey) -> InventoryResult<()> {
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.remove(&key);
            }
            Backend::Directory(dir) => match tokio::fs::remove_file(Self::path_for(dir, key)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }

    /// Remove every known key
    pub async fn clear(&self) -> InventoryResult<()> {
        for key in StorageKey::iter() {
            self.remove(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InventoryError;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        currency: String,
        low_stock: i64,
    }

    fn settings() -> Settings {
        Settings {
            currency: "CLP".into(),
            low_stock: 10,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("inventory-store-{name}-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::Products.as_ref(), "inventory_products");
        assert_eq!(StorageKey::iter().count(), 4);
    }

    #[tokio::test]
    async fn test_memory_roundtrip_and_overwrite() {
        let store = JsonStore::in_memory();
        assert_eq!(store.get::<Settings>(StorageKey::Settings).await.unwrap(), None);

        store.set(StorageKey::Settings, &settings()).await.unwrap();
        let mut updated = settings();
        updated.low_stock = 3;
        store.set(StorageKey::Settings, &updated).await.unwrap();

        let loaded: Settings = store.get(StorageKey::Settings).await.unwrap().unwrap();
        assert_eq!(loaded.low_stock, 3);
    }

    #[tokio::test]
    async fn test_clones_share_backend() {
        let store = JsonStore::in_memory();
        let clone = store.clone();
        clone.set(StorageKey::Categories, &vec!["Pinturas"]).await.unwrap();
        let categories: Vec<String> = store.get(StorageKey::Categories).await.unwrap().unwrap();
        assert_eq!(categories, ["Pinturas"]);
    }

    #[tokio::test]
    async fn test_directory_backend_persists_across_instances() {
        let dir = scratch_dir("persist");
        {
            let store = JsonStore::open(&dir).await.unwrap();
            assert!(store.is_persistent());
            store.set(StorageKey::Settings, &settings()).await.unwrap();
        }
        let reopened = JsonStore::open(&dir).await.unwrap();
        let loaded: Settings = reopened.get(StorageKey::Settings).await.unwrap().unwrap();
        assert_eq!(loaded, settings());

        reopened.clear().await.unwrap();
        assert_eq!(reopened.get::<Settings>(StorageKey::Settings).await.unwrap(), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_serialization_error() {
        let dir = scratch_dir("corrupt");
        let store = JsonStore::open(&dir).await.unwrap();
        std::fs::write(dir.join("inventory_settings.json"), "{not json").unwrap();

        let err = store.get::<Settings>(StorageKey::Settings).await.unwrap_err();
        assert!(matches!(err, InventoryError::Serialization(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
