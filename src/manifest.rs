//! Generation Manifests
//!
//! One record per written image, and a batch manifest tying them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::composer::{self, ComposerError};
use crate::hashing::batch_digest;
use crate::markup::LayoutKind;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub file_name: String,
    pub path: PathBuf,
    /// `None` for the numbers banner, which has no entity.
    pub entity_id: Option<i64>,
    pub layout: LayoutKind,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchManifest {
    pub batch_id: Uuid,
    pub engine_version: String,
    pub generated_at: DateTime<Utc>,
    pub images: Vec<ImageRecord>,
    /// Covers engine version and images only, so re-running an unchanged
    /// batch yields the same hash.
    pub manifest_hash: String,
}

impl BatchManifest {
    pub fn new(mut images: Vec<ImageRecord>) -> Self {
        images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        let manifest_hash = batch_digest(ENGINE_VERSION, &images);

        Self {
            batch_id: Uuid::new_v4(),
            engine_version: ENGINE_VERSION.to_string(),
            generated_at: Utc::now(),
            images,
            manifest_hash,
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&ImageRecord> {
        self.images.iter().find(|r| r.file_name == file_name)
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), ComposerError> {
        let json = serde_json::to_vec_pretty(self)?;
        composer::persist("manifest", path, &json).await
    }
}

/// Result of one item in a settled batch.
#[derive(Debug)]
pub struct ItemOutcome {
    pub file_name: String,
    pub result: Result<ImageRecord, ComposerError>,
}

impl ItemOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, sha: &str) -> ImageRecord {
        ImageRecord {
            file_name: name.to_string(),
            path: PathBuf::from("/out").join(name),
            entity_id: Some(1),
            layout: LayoutKind::Card,
            bytes: 100,
            sha256: sha.to_string(),
        }
    }

    #[test]
    fn test_hash_independent_of_order_and_batch_id() {
        let a = BatchManifest::new(vec![record("og-1.png", "aa"), record("og-2.png", "bb")]);
        let b = BatchManifest::new(vec![record("og-2.png", "bb"), record("og-1.png", "aa")]);
        assert_ne!(a.batch_id, b.batch_id);
        assert_eq!(a.manifest_hash, b.manifest_hash);
        assert_eq!(a.images[0].file_name, "og-1.png");
    }

    #[test]
    fn test_hash_changes_with_content() {
        let a = BatchManifest::new(vec![record("og-1.png", "aa")]);
        let b = BatchManifest::new(vec![record("og-1.png", "ab")]);
        assert_ne!(a.manifest_hash, b.manifest_hash);
    }

    #[test]
    fn test_serialized_field_names() {
        let manifest = BatchManifest::new(vec![record("og-1.png", "aa")]);
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("manifestHash").is_some());
        assert_eq!(json["images"][0]["fileName"], "og-1.png");
        assert_eq!(json["images"][0]["layout"], "card");
    }
}
