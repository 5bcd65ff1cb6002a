//! Two-tier storage: a primary backend with a local secondary.

use super::{BoxFuture, Storage, StorageResult};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage that transparently falls back to a secondary backend.
///
/// Reads try the primary first and consult the secondary if the primary
/// errors or has no value. Writes go to the primary; when it fails the
/// value is written to the secondary instead and the key is marked as
/// diverted.
///
/// A diverted key is read from the secondary first, since the primary may
/// still hold an older value. The next successful primary write or read
/// migration clears the mark.
pub struct FallbackStorage<P, S> {
    primary: P,
    secondary: S,
    diverted: Mutex<HashSet<String>>,
}

impl<P: Storage, S: Storage> FallbackStorage<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            primary,
            secondary,
            diverted: Mutex::new(HashSet::new()),
        }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    /// Whether the newest value of `key` lives in the secondary.
    pub fn is_diverted(&self, key: &str) -> bool {
        self.diverted().contains(key)
    }

    fn diverted(&self) -> MutexGuard<'_, HashSet<String>> {
        self.diverted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_diverted(&self, key: &str, diverted: bool) {
        let mut keys = self.diverted();
        if diverted {
            keys.insert(key.to_string());
        } else {
            keys.remove(key);
        }
    }

    /// Read a diverted key from the secondary and try to move it back.
    async fn read_diverted(&self, key: &str) -> StorageResult<Option<Value>> {
        let value = match self.secondary.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                self.mark_diverted(key, false);
                return self.primary.get(key).await;
            }
            Err(e) => {
                log::warn!("Secondary storage read of {} failed ({}), using primary", key, e);
                return self.primary.get(key).await;
            }
        };
        if self.primary.set(key, value.clone()).await.is_ok() {
            self.mark_diverted(key, false);
            if let Err(e) = self.secondary.remove(key).await {
                log::debug!("Could not drop migrated copy of {}: {}", key, e);
            }
            log::info!("Moved {} back to primary storage", key);
        }
        Ok(Some(value))
    }
}

impl<P: Storage, S: Storage> Storage for FallbackStorage<P, S> {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let key = key.to_string();
        Box::pin(async move {
            if self.is_diverted(&key) {
                return self.read_diverted(&key).await;
            }
            match self.primary.get(&key).await {
                Ok(Some(value)) => Ok(Some(value)),
                Ok(None) => self.secondary.get(&key).await.or(Ok(None)),
                Err(e) => {
                    log::warn!("Primary storage read of {} failed ({}), using secondary", key, e);
                    self.secondary.get(&key).await
                }
            }
        })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            match self.primary.set(&key, value.clone()).await {
                Ok(()) => {
                    if self.is_diverted(&key) {
                        self.mark_diverted(&key, false);
                        // The secondary copy is stale now.
                        if let Err(e) = self.secondary.remove(&key).await {
                            log::debug!("Could not drop secondary copy of {}: {}", key, e);
                        }
                    }
                    Ok(())
                }
                Err(e) => {
                    log::warn!("Primary storage write of {} failed ({}), using secondary", key, e);
                    self.secondary.set(&key, value).await?;
                    self.mark_diverted(&key, true);
                    Ok(())
                }
            }
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let primary = self.primary.remove(&key).await;
            let secondary = self.secondary.remove(&key).await;
            self.mark_diverted(&key, false);
            // Succeeds if either tier no longer holds the key.
            primary.or(secondary)
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let primary = self.primary.keys().await;
            let secondary = self.secondary.keys().await;
            match (primary, secondary) {
                (Ok(mut keys), Ok(more)) => {
                    for key in more {
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                    Ok(keys)
                }
                (Ok(keys), Err(_)) | (Err(_), Ok(keys)) => Ok(keys),
                (Err(e), Err(_)) => Err(e),
            }
        })
    }
}
