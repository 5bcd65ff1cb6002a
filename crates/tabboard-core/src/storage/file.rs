//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// File-based storage for native platforms.
///
/// Stores each key as a JSON file in a directory. Key characters that are
/// unsafe in filenames are percent-encoded so keys can be listed back.
pub struct FileStorage {
    /// Base directory for key files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/tabboard/store/`
    /// On Windows: `%LOCALAPPDATA%\tabboard\store\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("tabboard").join("store"))
    }

    /// Get the file path for a key.
    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_key(key)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let path = self.key_path(key);

        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            serde_json::from_str(&json).map(Some).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.key_path(key);
        let json = match serde_json::to_string(&value) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            // Replace atomically through a temp file.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e))
            })?;
            fs::rename(&tmp, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
            })
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.key_path(key);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut keys = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                        keys.push(key);
                    }
                }
            }
            Ok(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_set_get() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.set("settings:gridSize", json!(20))).unwrap();
        let loaded = block_on(storage.get("settings:gridSize")).unwrap();

        assert_eq!(loaded, Some(json!(20)));
    }

    #[test]
    fn test_file_storage_missing_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(block_on(storage.get("nonexistent")).unwrap(), None);
    }

    #[test]
    fn test_file_storage_keys_round_trip_encoding() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.set("widget:w-1", json!({}))).unwrap();
        block_on(storage.set("widget:w-1:notes", json!("hi"))).unwrap();
        block_on(storage.set("odd/key*é", json!(null))).unwrap();

        let mut keys = block_on(storage.keys()).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["odd/key*é", "widget:w-1", "widget:w-1:notes"]);
    }

    #[test]
    fn test_file_storage_remove() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.set("test", json!(1))).unwrap();
        block_on(storage.remove("test")).unwrap();
        assert_eq!(block_on(storage.get("test")).unwrap(), None);
        assert!(block_on(storage.remove("test")).is_ok());
    }

    #[test]
    fn test_file_storage_corrupt_value() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        assert!(matches!(
            block_on(storage.get("broken")),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_encode_decode_key() {
        for key in ["plain", "widget:abc:notes", "a b%c", "ünï"] {
            assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
        }
    }
}
