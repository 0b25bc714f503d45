use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One game inside a group: detail-page URL plus the genres attached during
/// the enrichment phase. The genre list stays empty when a detail page has no
/// genre block or its fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    /// Defaulted on read so documents written before the URL was kept
    /// (entries holding only a genre object) still deserialize.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub genre: Vec<String>,
}

impl GameEntry {
    pub fn placeholder(url: &str) -> Self {
        Self {
            url: url.to_string(),
            genre: Vec::new(),
        }
    }
}

/// Game name → entry. Map keys enforce name uniqueness within a group;
/// insertion order follows the page.
pub type GameGroup = IndexMap<String, GameEntry>;

/// Canonical group label → games, in page order.
pub type YearGroups = IndexMap<String, GameGroup>;

/// Year ("2020".."2023") → groups. BTreeMap keys sort lexicographically,
/// which for these year strings is chronological.
pub type CategorySnapshot = BTreeMap<String, YearGroups>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    BestSellers,
    BestReleases,
    MostPlayed,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::BestSellers,
        Category::BestReleases,
        Category::MostPlayed,
    ];

    /// Key used in the intermediate document and in log lines.
    pub fn key(&self) -> &'static str {
        match self {
            Category::BestSellers => "best sellers",
            Category::BestReleases => "best releases",
            Category::MostPlayed => "most played",
        }
    }

    /// CSV file stem for this category.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Category::BestSellers => "best_sellers",
            Category::BestReleases => "best_releases",
            Category::MostPlayed => "most_played",
        }
    }

    /// Second CSV column: rank tier for sellers/releases, concurrent-player
    /// bucket for most played.
    pub fn rank_column(&self) -> &'static str {
        match self {
            Category::MostPlayed => "simultaneous_players",
            _ => "rank",
        }
    }
}

/// The one artifact persisted to the intermediate document and the sole
/// input to CSV formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDataset {
    #[serde(rename = "best sellers")]
    pub best_sellers: CategorySnapshot,
    #[serde(rename = "best releases")]
    pub best_releases: CategorySnapshot,
    #[serde(rename = "most played")]
    pub most_played: CategorySnapshot,
}

impl UnifiedDataset {
    pub fn snapshot(&self, category: Category) -> &CategorySnapshot {
        match category {
            Category::BestSellers => &self.best_sellers,
            Category::BestReleases => &self.best_releases,
            Category::MostPlayed => &self.most_played,
        }
    }
}

/// Owns snapshot construction across the two pipeline phases so the
/// formatter only ever sees a fully built dataset.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    data: UnifiedDataset,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot_mut(&mut self, category: Category) -> &mut CategorySnapshot {
        match category {
            Category::BestSellers => &mut self.data.best_sellers,
            Category::BestReleases => &mut self.data.best_releases,
            Category::MostPlayed => &mut self.data.most_played,
        }
    }

    /// Record the listing-phase result for one category/year page.
    pub fn add_listing(&mut self, category: Category, year: &str, groups: YearGroups) {
        self.snapshot_mut(category).insert(year.to_string(), groups);
    }

    /// Attach genres to one game, replacing its placeholder entry in place.
    /// A miss means the game was never listed; nothing to do then.
    pub fn set_genres(
        &mut self,
        category: Category,
        year: &str,
        group: &str,
        game: &str,
        genres: Vec<String>,
    ) {
        if let Some(entry) = self
            .snapshot_mut(category)
            .get_mut(year)
            .and_then(|groups| groups.get_mut(group))
            .and_then(|games| games.get_mut(game))
        {
            entry.genre = genres;
        }
    }

    /// Every (category, year, group, game, url) still awaiting enrichment,
    /// in listing order.
    pub fn pending_games(&self) -> Vec<(Category, String, String, String, String)> {
        let mut pending = Vec::new();
        for category in Category::ALL {
            for (year, groups) in self.data.snapshot(category) {
                for (label, games) in groups {
                    for (name, entry) in games {
                        pending.push((
                            category,
                            year.clone(),
                            label.clone(),
                            name.clone(),
                            entry.url.clone(),
                        ));
                    }
                }
            }
        }
        pending
    }

    pub fn build(self) -> UnifiedDataset {
        self.data
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn one_group(game: &str, url: &str) -> YearGroups {
        let mut games = GameGroup::new();
        games.insert(game.to_string(), GameEntry::placeholder(url));
        let mut groups = YearGroups::new();
        groups.insert("Gold".to_string(), games);
        groups
    }

    #[test]
    fn set_genres_replaces_placeholder() {
        let mut builder = DatasetBuilder::new();
        builder.add_listing(Category::BestSellers, "2023", one_group("X", "https://x"));
        builder.set_genres(
            Category::BestSellers,
            "2023",
            "Gold",
            "X",
            vec!["Racing".to_string()],
        );
        let dataset = builder.build();
        let entry = &dataset.best_sellers["2023"]["Gold"]["X"];
        assert_eq!(entry.url, "https://x");
        assert_eq!(entry.genre, vec!["Racing"]);
    }

    #[test]
    fn set_genres_on_unlisted_game_is_a_no_op() {
        let mut builder = DatasetBuilder::new();
        builder.add_listing(Category::MostPlayed, "2022", one_group("X", "https://x"));
        builder.set_genres(Category::MostPlayed, "2022", "Gold", "Y", vec!["RPG".into()]);
        let dataset = builder.build();
        assert!(dataset.most_played["2022"]["Gold"]["X"].genre.is_empty());
    }

    #[test]
    fn pending_games_walks_listing_order() {
        let mut builder = DatasetBuilder::new();
        builder.add_listing(Category::BestSellers, "2021", one_group("A", "https://a"));
        builder.add_listing(Category::BestSellers, "2020", one_group("B", "https://b"));
        let pending = builder.pending_games();
        assert_eq!(pending.len(), 2);
        // Years iterate sorted, so 2020 comes first.
        assert_eq!(pending[0].1, "2020");
        assert_eq!(pending[0].3, "B");
    }

    #[test]
    fn entries_without_url_still_deserialize() {
        // Older documents stored each game as a bare genre object.
        let json = r#"{
            "best sellers": {
                "2020": { "Platinum": { "X": { "genre": ["Action"] } } }
            },
            "best releases": {},
            "most played": {}
        }"#;
        let dataset: UnifiedDataset = serde_json::from_str(json).unwrap();
        let entry = &dataset.best_sellers["2020"]["Platinum"]["X"];
        assert_eq!(entry.genre, vec!["Action"]);
        assert!(entry.url.is_empty());
    }

    #[test]
    fn dataset_categories_use_original_keys() {
        let json = serde_json::to_string(&UnifiedDataset::default()).unwrap();
        assert!(json.contains("\"best sellers\""));
        assert!(json.contains("\"best releases\""));
        assert!(json.contains("\"most played\""));
    }
}
