//! Gallery page resolution and image download.
//!
//! The gallery serves an HTML page per identifier; the actual image URL has
//! to be scraped out of it before the raster can be fetched. Everything here
//! is stateless apart from [`DownloadMonitor`], which keeps the running
//! failure tally shared by all download jobs of one source instance.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use image::DynamicImage;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{instrument, warn};

/// The gallery blocks obviously non-browser clients, so mimic a common
/// desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const CONNECT_TIMEOUT: Duration = Duration::from_millis(1500);
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Consecutive failures tolerated between rate-limit warnings.
const FAILURES_PER_WARNING: u64 = 5;

/// Selector for the single screenshot element on a gallery page.
static SCREENSHOT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img#screenshot-image").unwrap());

/// Build the HTTP client shared by all download jobs of a source.
pub(crate) fn build_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).connect_timeout(CONNECT_TIMEOUT).timeout(READ_TIMEOUT).build()
}

/// Tally of failed downloads, shared across a source's download jobs.
///
/// Repeated failures usually mean the gallery is rate limiting (or outright
/// blocking) this address rather than individual images being missing, so a
/// warning is emitted every [`FAILURES_PER_WARNING`]th failure. The count
/// only needs to be eventually consistent; relaxed ordering is enough for a
/// modular warning cadence.
#[derive(Debug, Default)]
pub struct DownloadMonitor {
    failures: AtomicU64,
}

impl DownloadMonitor {
    /// Record one failed download. Returns `true` when this failure crossed
    /// a warning threshold (every [`FAILURES_PER_WARNING`]th failure).
    pub fn record_failure(&self) -> bool {
        let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if total % FAILURES_PER_WARNING == 0 {
            warn!(failures = total, "repeated download failures; the gallery may be rate limiting this address");
            return true;
        }
        false
    }

    /// Total failures recorded so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Extract the absolute image URL from a gallery page.
///
/// The page carries a single `img#screenshot-image` element whose `src` may
/// be absolute, protocol-relative or path-relative; it is resolved against
/// `page_url`.
pub(crate) fn resolve_image_url(page_html: &str, page_url: &str) -> Option<Url> {
    let document = Html::parse_document(page_html);
    let element = document.select(&SCREENSHOT_SELECTOR).next()?;
    let src = element.value().attr("src")?.trim();
    if src.is_empty() {
        return None;
    }
    Url::parse(page_url).ok()?.join(src).ok()
}

/// Fetch the image for one gallery identifier: resolve the page, scrape the
/// image URL, download and decode the raster.
#[instrument(skip(client, base_url))]
pub(crate) async fn fetch_image(client: &Client, base_url: &str, id: &str) -> Result<DynamicImage> {
    let page_url = format!("{base_url}{id}");
    let page = client
        .get(&page_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .or_raise(|| ErrorKind::Network(format!("gallery page request for {id:?} failed")))?
        .text()
        .await
        .or_raise(|| ErrorKind::Network(format!("gallery page body for {id:?} unreadable")))?;

    let image_url =
        resolve_image_url(&page, &page_url).ok_or_raise(|| ErrorKind::MissingImage(id.to_string()))?;

    let bytes = client
        .get(image_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .or_raise(|| ErrorKind::Network(format!("image request for {id:?} failed")))?
        .bytes()
        .await
        .or_raise(|| ErrorKind::Network(format!("image body for {id:?} unreadable")))?;

    image::load_from_memory(&bytes).or_raise(|| ErrorKind::Decode(id.to_string()))
}
