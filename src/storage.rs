use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::UnifiedDataset;
use crate::error::ScrapeError;

/// File name of the intermediate document. Its presence is the cache hit
/// that lets a run skip scraping entirely; the cache is all-or-nothing.
const DATASET_FILE: &str = "data.json";

pub fn dataset_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATASET_FILE)
}

/// Persist the dataset as indented UTF-8 JSON.
pub fn save_dataset(path: &Path, dataset: &UnifiedDataset) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(dataset)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("dataset saved to {}", path.display());
    Ok(())
}

pub fn load_dataset(path: &Path) -> Result<UnifiedDataset, ScrapeError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ScrapeError::Decode(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| ScrapeError::Decode(format!("{}: {e}", path.display())))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, DatasetBuilder, GameEntry, GameGroup, YearGroups};

    fn sample_dataset() -> UnifiedDataset {
        let mut games = GameGroup::new();
        games.insert(
            "Game One".to_string(),
            GameEntry {
                url: "https://store.example.com/app/101/".to_string(),
                genre: vec!["Action".to_string(), "Indie".to_string()],
            },
        );
        let mut groups = YearGroups::new();
        groups.insert("Platinum".to_string(), games);
        let mut builder = DatasetBuilder::new();
        builder.add_listing(Category::BestSellers, "2023", groups);
        builder.build()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bestof-{}-{name}", std::process::id()))
    }

    #[test]
    fn round_trip_preserves_dataset() {
        let dir = temp_path("roundtrip");
        let path = dataset_path(&dir);
        let dataset = sample_dataset();
        save_dataset(&path, &dataset).unwrap();
        let loaded = load_dataset(&path).unwrap();
        assert_eq!(loaded, dataset);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn saved_document_is_indented_with_original_keys() {
        let dir = temp_path("indent");
        let path = dataset_path(&dir);
        save_dataset(&path, &sample_dataset()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"best sellers\""));
        assert!(raw.contains("\n  "));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = load_dataset(Path::new("/nonexistent/data.json")).unwrap_err();
        assert!(matches!(err, ScrapeError::Decode(_)));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let dir = temp_path("invalid");
        fs::create_dir_all(&dir).unwrap();
        let path = dataset_path(&dir);
        fs::write(&path, "not json").unwrap();
        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, ScrapeError::Decode(_)));
        fs::remove_dir_all(&dir).unwrap();
    }
}
