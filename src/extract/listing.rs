use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use super::selectors::{CompiledSelectors, ListingSelectors};
use crate::catalog::{GameEntry, GameGroup, YearGroups};
use crate::error::ScrapeError;

/// Leading player count in a most-played bucket label, e.g. "45,2" in
/// "45,2 thousand players".
static PLAYER_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:,\d+)?").unwrap());

/// Localized rank tiers → canonical English names.
const TIER_RENAMES: &[(&str, &str)] = &[
    ("Platina", "Platinum"),
    ("Ouro", "Gold"),
    ("Prata", "Silver"),
    ("Bronze", "Bronze"),
];

const CANONICAL_TIERS: &[&str] = &["Platinum", "Gold", "Silver", "Bronze"];

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const TOP_BY_MONTH: &str = "Top New Releases By Month";

/// A group whose label cannot be located is skipped. All three listing
/// variants share this one predicate.
pub fn label_is_missing(label: Option<&str>) -> bool {
    match label {
        None => true,
        Some(text) => text.trim().is_empty(),
    }
}

enum LabelAction {
    Keep(String),
    Drop,
}

/// Best-sellers listing: groups are rank tiers, localized tier words are
/// translated to English. A label outside the tier vocabulary is malformed;
/// the group is skipped with a warning.
pub fn extract_best_sellers(html: &str, selectors: &ListingSelectors) -> Result<YearGroups> {
    collect_groups(html, selectors, |label| {
        normalize_tier(label).map(LabelAction::Keep)
    })
}

/// Most-played listing: each group label is a free-text concurrent-player
/// count. The leading decimal number is kept with its separator switched to
/// a dot and a literal "000" appended, so "45,2" becomes "45.2000". That
/// reading drops the thousands unit of the source text; it is kept verbatim
/// so downstream consumers see the labels they have always seen.
pub fn extract_most_played(html: &str, selectors: &ListingSelectors) -> Result<YearGroups> {
    collect_groups(html, selectors, |label| match PLAYER_COUNT_RE.find(label) {
        Some(m) => Ok(LabelAction::Keep(format!("{}000", m.as_str().replace(',', ".")))),
        None => Err(ScrapeError::MalformedGroupLabel(label.to_string())),
    })
}

/// Best-releases listing. Group labels vary per year: 2020 nests everything
/// under month buckets plus one "Top New Releases of 2020" group, 2021 still
/// carries the by-month index label, and 2023 uses localized tier words.
pub fn extract_best_releases(
    html: &str,
    year: &str,
    selectors: &ListingSelectors,
) -> Result<YearGroups> {
    collect_groups(html, selectors, |label| Ok(normalize_release(label, year)))
}

fn normalize_tier(label: &str) -> Result<String, ScrapeError> {
    if let Some((_, canonical)) = TIER_RENAMES.iter().find(|(raw, _)| *raw == label) {
        return Ok(canonical.to_string());
    }
    if CANONICAL_TIERS.contains(&label) {
        return Ok(label.to_string());
    }
    Err(ScrapeError::MalformedGroupLabel(label.to_string()))
}

fn normalize_release(label: &str, year: &str) -> LabelAction {
    match year {
        "2020" => {
            if label == "Top New Releases of 2020" {
                return LabelAction::Keep("Platinum".to_string());
            }
            if label == TOP_BY_MONTH || MONTHS.contains(&label) {
                return LabelAction::Drop;
            }
        }
        "2021" => {
            if label == TOP_BY_MONTH {
                return LabelAction::Drop;
            }
        }
        "2023" => {
            if let Some((_, canonical)) = TIER_RENAMES.iter().find(|(raw, _)| *raw == label) {
                return LabelAction::Keep(canonical.to_string());
            }
        }
        _ => {}
    }
    LabelAction::Keep(label.to_string())
}

fn collect_groups<F>(
    html: &str,
    selectors: &ListingSelectors,
    mut normalize: F,
) -> Result<YearGroups>
where
    F: FnMut(&str) -> Result<LabelAction, ScrapeError>,
{
    let compiled = selectors.compile()?;
    let document = Html::parse_document(html);
    let mut groups = YearGroups::new();

    for group in document.select(&compiled.group) {
        let label = group
            .select(&compiled.group_label)
            .next()
            .map(|el| el.text().collect::<String>());
        if label_is_missing(label.as_deref()) {
            debug!("group without a label, skipped");
            continue;
        }
        let raw = label.unwrap_or_default();
        let canonical = match normalize(raw.trim()) {
            Ok(LabelAction::Keep(name)) => name,
            Ok(LabelAction::Drop) => continue,
            Err(e) => {
                warn!("skipping group: {e}");
                continue;
            }
        };
        groups.insert(canonical, collect_cards(group, &compiled));
    }

    Ok(groups)
}

/// Name from the card image alt attribute, URL from the first anchor href.
fn collect_cards(group: ElementRef<'_>, compiled: &CompiledSelectors) -> GameGroup {
    let mut games = GameGroup::new();
    for card in group.select(&compiled.card) {
        let name = card
            .select(&compiled.card_image)
            .next()
            .and_then(|img| img.value().attr("alt"));
        let url = card
            .select(&compiled.anchor)
            .next()
            .and_then(|anchor| anchor.value().attr("href"));
        match (name, url) {
            (Some(name), Some(url)) if !name.trim().is_empty() => {
                games.insert(name.trim().to_string(), GameEntry::placeholder(url));
            }
            _ => debug!("card without name or link, skipped"),
        }
    }
    games
}

// ── Tests ──
