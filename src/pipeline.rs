use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::browser::StoreBrowser;
use crate::catalog::{Category, DatasetBuilder, UnifiedDataset, YearGroups};
use crate::error::ScrapeError;
use crate::extract::selectors::ListingSelectors;
use crate::extract::{detail, listing};

/// The fixed listing matrix: four yearly snapshots per category. Tab ids
/// moved between years and the 2023 pages are served localized, which is
/// where the Portuguese tier labels come from.
const BEST_SELLERS_URLS: [(&str, &str); 4] = [
    ("2020", "https://store.steampowered.com/sale/BestOf2020?tab=4"),
    ("2021", "https://store.steampowered.com/sale/BestOf2021?tab=1"),
    ("2022", "https://store.steampowered.com/sale/BestOf2022?tab=1"),
    ("2023", "https://store.steampowered.com/sale/BestOf2023?l=brazilian&tab=1"),
];

const BEST_RELEASES_URLS: [(&str, &str); 4] = [
    ("2020", "https://store.steampowered.com/sale/BestOf2020?tab=2"),
    ("2021", "https://store.steampowered.com/sale/BestOf2021?tab=2"),
    ("2022", "https://store.steampowered.com/sale/BestOf2022?tab=2"),
    ("2023", "https://store.steampowered.com/sale/BestOf2023?l=brazilian&tab=2"),
];

const MOST_PLAYED_URLS: [(&str, &str); 4] = [
    ("2020", "https://store.steampowered.com/sale/BestOf2020?tab=1"),
    ("2021", "https://store.steampowered.com/sale/BestOf2021?tab=3"),
    ("2022", "https://store.steampowered.com/sale/BestOf2022?tab=3"),
    ("2023", "https://store.steampowered.com/sale/BestOf2023?l=brazilian&tab=3"),
];

fn listing_urls(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::BestSellers => &BEST_SELLERS_URLS,
        Category::BestReleases => &BEST_RELEASES_URLS,
        Category::MostPlayed => &MOST_PLAYED_URLS,
    }
}

/// Run the full scrape: listing phase, per-game enrichment, finalize.
/// The browser session is released on every exit path.
pub async fn run_scrape(headless: bool) -> Result<UnifiedDataset> {
    let selectors = ListingSelectors::default();
    let browser = StoreBrowser::launch(headless).await?;
    let result = scrape_all(&browser, &selectors).await;
    browser.close().await;
    result
}

async fn scrape_all(
    browser: &StoreBrowser,
    selectors: &ListingSelectors,
) -> Result<UnifiedDataset> {
    let mut builder = DatasetBuilder::new();

    // Phase 1: listing pages. A failure here is fatal; without a listing
    // there is nothing to enrich.
    for category in Category::ALL {
        for (year, url) in listing_urls(category) {
            info!("listing {} {}: {}", category.key(), year, url);
            let html = browser
                .fetch(url)
                .await
                .with_context(|| format!("listing page {} {}", category.key(), year))?;
            let groups = extract_listing(category, year, &html, selectors)?;
            let games: usize = groups.values().map(|g| g.len()).sum();
            info!("  {} groups, {} games", groups.len(), games);
            builder.add_listing(category, year, groups);
        }
    }

    // Phase 2: detail pages. Failures are isolated per game; the game then
    // keeps an empty genre list.
    let pending = builder.pending_games();
    info!("enriching {} games with genre data", pending.len());
    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    for (category, year, group, game, url) in pending {
        match fetch_genres(browser, &url).await {
            Ok(genres) => builder.set_genres(category, &year, &group, &game, genres),
            Err(e) => warn!("{game} ({year} {group}): {e}; keeping empty genre list"),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(builder.build())
}

fn extract_listing(
    category: Category,
    year: &str,
    html: &str,
    selectors: &ListingSelectors,
) -> Result<YearGroups> {
    match category {
        Category::BestSellers => listing::extract_best_sellers(html, selectors),
        Category::BestReleases => listing::extract_best_releases(html, year, selectors),
        Category::MostPlayed => listing::extract_most_played(html, selectors),
    }
}

/// Fetch one detail page and pull its genres, re-navigating through the
/// age-verification interstitial when one is in the way.
async fn fetch_genres(browser: &StoreBrowser, url: &str) -> Result<Vec<String>, ScrapeError> {
    let html = browser.fetch(url).await?;
    let html = if detail::detect_age_gate(&html) {
        browser.bypass_age_gate().await?
    } else {
        html
    };
    Ok(detail::extract_genres(&html))
}
