use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::catalog::{Category, CategorySnapshot, UnifiedDataset};

/// Genres never emitted; software categories, not game genres.
const EXCLUDED_GENRES: &[&str] = &[
    "Animation & Modeling",
    "Design & Illustration",
    "Photo Editing",
    "Utilities",
];

/// Flatten one category snapshot into `;`-delimited text: header row, then
/// one row per surviving genre of every game that has any. `is_indie` is a
/// per-game flag and identical on all of a game's rows. Fields holding the
/// delimiter get quoted by the writer.
pub fn format_csv(snapshot: &CategorySnapshot, category: Category) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record([
        "year",
        category.rank_column(),
        "game",
        "genre",
        "is_indie",
    ])?;

    for (year, groups) in snapshot {
        for (label, games) in groups {
            for (game, entry) in games {
                if entry.genre.is_empty() {
                    continue;
                }
                let is_indie = if entry.genre.iter().any(|g| g == "Indie") {
                    "True"
                } else {
                    "False"
                };
                for genre in &entry.genre {
                    if EXCLUDED_GENRES.contains(&genre.as_str()) {
                        continue;
                    }
                    writer.write_record([
                        year.as_str(),
                        label.as_str(),
                        game.as_str(),
                        genre.as_str(),
                        is_indie,
                    ])?;
                }
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing csv: {e}"))?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

/// Write the three per-category CSV files into `out_dir`.
pub fn write_csv_files(dataset: &UnifiedDataset, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    for category in Category::ALL {
        let csv = format_csv(dataset.snapshot(category), category)?;
        let path = out_dir.join(format!("{}.csv", category.file_stem()));
        fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

// ── Tests ──
