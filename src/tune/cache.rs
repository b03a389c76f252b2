//! Tuned weights persisted between runs as `{ "<field>": [a, b, c] }`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::Result;
use crate::core::types::{Field, Weights};

#[derive(Debug, Clone, Default)]
pub struct WeightCache {
    path: PathBuf,
    weights: BTreeMap<String, Weights>,
}

impl WeightCache {
    /// Read the cache at `path`. A missing or unreadable file yields an
    /// empty cache, which only means tuning runs again.
    pub fn load(path: &Path) -> Self {
        let weights = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, Weights>>(&contents) {
                Ok(weights) => {
                    tracing::info!(path = %path.display(), fields = weights.len(), "Loaded tuned weights");
                    weights
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt weight cache");
                    BTreeMap::new()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "No weight cache");
                BTreeMap::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            weights,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached weights for `field`, ignoring entries that are not valid weights
    pub fn get(&self, field: Field) -> Option<Weights> {
        self.weights.get(field.key()).copied().filter(Weights::is_valid)
    }

    pub fn insert(&mut self, field: Field, weights: Weights) {
        self.weights.insert(field.key().to_string(), weights);
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.weights)?)?;
        tracing::debug!(path = %self.path.display(), "Saved tuned weights");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("tuned_weights.json");

        let mut cache = WeightCache::load(&path);
        assert!(cache.is_empty());
        cache.insert(Field::Armor, Weights::new(0.6, 0.3, 0.1));
        cache.save().unwrap();

        let reloaded = WeightCache::load(&path);
        assert_eq!(reloaded.get(Field::Armor), Some(Weights::new(0.6, 0.3, 0.1)));
        assert_eq!(reloaded.get(Field::Feats), None);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"armor\""));
    }

    #[test]
    fn test_corrupt_cache_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuned_weights.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(WeightCache::load(&path).is_empty());

        fs::write(&path, r#"{"feats": [0.5, 0.5]}"#).unwrap();
        assert!(WeightCache::load(&path).is_empty());
    }

    #[test]
    fn test_invalid_entry_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuned_weights.json");
        fs::write(&path, r#"{"feats": [-1.0, 1.0, 1.0], "weapons": [0.2, 0.3, 0.5]}"#).unwrap();
        let cache = WeightCache::load(&path);
        assert_eq!(cache.get(Field::Feats), None);
        assert_eq!(cache.get(Field::Weapons), Some(Weights::new(0.2, 0.3, 0.5)));
    }
}
