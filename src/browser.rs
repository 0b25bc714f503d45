use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::extract::selectors::AgeGateSelectors;

/// Initial settle after navigation, before scrolling starts.
const LOAD_SETTLE_MS: u64 = 200;
/// Final settle after scrolling, before the markup is read.
const RENDER_SETTLE_MS: u64 = 500;
/// Pixels per scroll step.
const SCROLL_STEP_PX: u32 = 500;
/// Pause between a scroll step and the offset read.
const SCROLL_POLL_MS: u64 = 100;
/// Upper bound on scroll steps so a page that keeps growing cannot hang
/// the run. The real termination signal stays the offset comparison.
const MAX_SCROLL_STEPS: u32 = 400;

/// Birth year selected on the age gate; old enough for any 18+ title.
const AGE_GATE_BIRTH_YEAR: &str = "2000";

/// One long-lived headless-browser session shared by every fetch of a run.
/// The orchestrator owns it exclusively and releases it via [`close`];
/// dropping it also tears the child process down.
pub struct StoreBrowser {
    browser: Browser,
    page: Page,
    age_gate: AgeGateSelectors,
}

impl StoreBrowser {
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut config = BrowserConfig::builder()
            .window_size(1280, 1024)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-dev-shm-usage");
        if !headless {
            config = config.with_head();
        }
        let config = config
            .build()
            .map_err(|e| anyhow!("browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        // CDP events must be drained for the session to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler: {e}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open page")?;
        info!("browser session started (headless: {headless})");

        Ok(Self {
            browser,
            page,
            age_gate: AgeGateSelectors::default(),
        })
    }

    /// Navigate to `url` and return the fully rendered markup: settle,
    /// scroll until the offset stops moving, settle again, read the DOM.
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Fetch(format!("{url}: {e}")))?;
        tokio::time::sleep(Duration::from_millis(LOAD_SETTLE_MS)).await;
        self.scroll_to_bottom().await?;
        tokio::time::sleep(Duration::from_millis(RENDER_SETTLE_MS)).await;
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::Fetch(format!("{url}: reading content: {e}")))
    }

    /// Pass the age-verification interstitial currently on screen: pick a
    /// passing birth year in the year dropdown, confirm, and return the
    /// rendered game page. A missing control is fatal for the current game
    /// only, surfaced as [`ScrapeError::ControlNotFound`].
    pub async fn bypass_age_gate(&self) -> Result<String, ScrapeError> {
        let year_select = &self.age_gate.year_select;
        self.page.find_element(year_select.as_str()).await.map_err(|_| {
            ScrapeError::ControlNotFound(format!("age-gate year select {year_select:?}"))
        })?;
        let set_year = format!(
            "(() => {{ const el = document.querySelector({year_select:?}); \
             el.value = {AGE_GATE_BIRTH_YEAR:?}; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); }})()"
        );
        self.page
            .evaluate(set_year)
            .await
            .map_err(|e| ScrapeError::Fetch(format!("selecting birth year: {e}")))?;

        let view_button = &self.age_gate.view_button;
        let button = self.page.find_element(view_button.as_str()).await.map_err(|_| {
            ScrapeError::ControlNotFound(format!("age-gate view button {view_button:?}"))
        })?;
        button
            .click()
            .await
            .map_err(|e| ScrapeError::Fetch(format!("clicking view button: {e}")))?;

        tokio::time::sleep(Duration::from_millis(LOAD_SETTLE_MS)).await;
        self.scroll_to_bottom().await?;
        tokio::time::sleep(Duration::from_millis(RENDER_SETTLE_MS)).await;
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::Fetch(format!("reading content after age gate: {e}")))
    }

    /// Scroll in fixed increments until the offset repeats between two
    /// consecutive reads, the signal that lazy loading has run out.
    async fn scroll_to_bottom(&self) -> Result<(), ScrapeError> {
        let mut last_offset = -1.0_f64;
        for _ in 0..MAX_SCROLL_STEPS {
            self.page
                .evaluate(format!("window.scrollBy(0, {SCROLL_STEP_PX})"))
                .await
                .map_err(|e| ScrapeError::Fetch(format!("scrolling: {e}")))?;
            tokio::time::sleep(Duration::from_millis(SCROLL_POLL_MS)).await;
            let offset: f64 = self
                .page
                .evaluate("window.scrollY")
                .await
                .map_err(|e| ScrapeError::Fetch(format!("reading scroll offset: {e}")))?
                .into_value()
                .map_err(|e| ScrapeError::Fetch(format!("scroll offset value: {e}")))?;
            if offset == last_offset {
                return Ok(());
            }
            last_offset = offset;
        }
        Err(ScrapeError::Fetch(
            "scroll offset never stabilized".to_string(),
        ))
    }

    /// Release the session. Errors are logged, not propagated; by this
    /// point the dataset is already out of the browser's hands.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("closing browser: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            debug!("waiting for browser exit: {e}");
        }
        info!("browser session closed");
    }
}
