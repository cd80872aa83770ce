//! Remote screenshot gallery source.
//!
//! Images are addressed by sequential 6-character base-36 identifiers
//! ([`IdCursor`]). A small worker pool downloads images in batches ahead of
//! consumption, so OCR downstream rarely waits on the network.

mod cursor;
mod fetch;

pub use self::cursor::IdCursor;
pub use self::fetch::DownloadMonitor;
use crate::Source;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use image::DynamicImage;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info};

/// Worker pool size: concurrent downloads in flight.
const WORKERS: usize = 2;
/// Replenish the internal buffer once it drains to this many images.
const LOW_WATER_MARK: usize = 8;
/// Download jobs enqueued per replenishment.
const BATCH_SIZE: usize = 4;
/// Internal buffer capacity; completed downloads beyond this are discarded.
const BUFFER_CAPACITY: usize = 16;
/// How long `next` is prepared to wait for an in-flight download.
const TAKE_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_BASE_URL: &str = "https://prnt.sc/";
const DEFAULT_BASE_CODE: &str = "nz0000";

/// Configuration for [`GallerySource`].
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Page URL prefix; the image id is appended directly.
    pub base_url: String,
    /// Seed identifier. Normalised on use; the sequence starts immediately
    /// *after* this code.
    pub base_code: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_code: DEFAULT_BASE_CODE.to_string(),
        }
    }
}

/// Screenshot source scraping a public web gallery.
///
/// A fixed-size worker pool resolves gallery pages and downloads images in
/// batches of [`BATCH_SIZE`] whenever the internal buffer falls to
/// [`LOW_WATER_MARK`]. Failed downloads are counted by a [`DownloadMonitor`]
/// and dropped without retry; the identifier space is dense enough that the
/// next id serves just as well.
///
/// Downloads are buffered in completion order, **not** id order; callers
/// must not assume monotonic id delivery.
#[derive(Debug)]
pub struct GallerySource {
    client: Client,
    base_url: Arc<str>,
    cursor: IdCursor,
    images: Receiver<(String, DynamicImage)>,
    feed: Sender<(String, DynamicImage)>,
    jobs: JoinSet<()>,
    permits: Arc<Semaphore>,
    monitor: Arc<DownloadMonitor>,
    current: (String, DynamicImage),
}

impl GallerySource {
    /// Connect to the gallery and load a first image.
    ///
    /// Spawns the initial download batch and blocks (bounded by
    /// [`TAKE_TIMEOUT`]) until a first image lands, so the source satisfies
    /// the valid-initial-image contract or fails fast with
    /// [`Exhausted`](ErrorKind::Exhausted).
    pub async fn connect(config: GalleryConfig) -> Result<Self> {
        let client = fetch::build_client().or_raise(|| {
            ErrorKind::Network("failed to construct gallery HTTP client".to_string())
        })?;
        let (feed, images) = mpsc::channel(BUFFER_CAPACITY);
        let mut source = Self {
            client,
            base_url: Arc::from(config.base_url.as_str()),
            cursor: IdCursor::new(&config.base_code),
            images,
            feed,
            jobs: JoinSet::new(),
            permits: Arc::new(Semaphore::new(WORKERS)),
            monitor: Arc::new(DownloadMonitor::default()),
            current: (String::new(), DynamicImage::new_rgb8(0, 0)),
        };
        info!(base_url = %source.base_url, seed = source.cursor.current(), "connecting to gallery");
        source.current = source.take_next().await?;
        Ok(source)
    }

    /// Failure statistics for this source's download jobs.
    pub fn monitor(&self) -> &DownloadMonitor {
        &self.monitor
    }

    /// Wait (bounded) for the next completed download, keeping the pipeline
    /// of in-flight jobs topped up on either side of the wait.
    async fn take_next(&mut self) -> Result<(String, DynamicImage)> {
        self.reap_finished_jobs();
        self.replenish();
        let taken = match timeout(TAKE_TIMEOUT, self.images.recv()).await {
            Ok(Some(pair)) => pair,
            // Cannot happen while this source holds its own feed sender, but
            // a closed buffer is dry either way.
            Ok(None) => exn::bail!(ErrorKind::Exhausted),
            Err(_elapsed) => {
                debug!(waited = ?TAKE_TIMEOUT, "no download completed in time");
                exn::bail!(ErrorKind::Exhausted)
            },
        };
        self.replenish();
        Ok(taken)
    }

    /// Spawn a fresh batch of download jobs if the buffer has run low.
    fn replenish(&mut self) {
        if self.images.len() > LOW_WATER_MARK {
            return;
        }
        for _ in 0..BATCH_SIZE {
            let id = self.cursor.advance().to_string();
            self.jobs.spawn(download_job(
                self.client.clone(),
                Arc::clone(&self.base_url),
                id,
                self.feed.clone(),
                Arc::clone(&self.monitor),
                Arc::clone(&self.permits),
            ));
        }
    }

    /// Drop bookkeeping for jobs that have already completed.
    fn reap_finished_jobs(&mut self) {
        while self.jobs.try_join_next().is_some() {}
    }
}

/// One download job: fetch the image for `id` and offer it to the buffer.
///
/// Runs under a pool-wide semaphore permit so at most [`WORKERS`] downloads
/// are in flight. A full buffer refuses the image and it is discarded; so is
/// any failed download, after the monitor has counted it.
async fn download_job(
    client: Client,
    base_url: Arc<str>,
    id: String,
    feed: Sender<(String, DynamicImage)>,
    monitor: Arc<DownloadMonitor>,
    permits: Arc<Semaphore>,
) {
    // Acquisition only fails once the semaphore is closed by shutdown.
    let Ok(_permit) = permits.acquire_owned().await else {
        return;
    };
    match fetch::fetch_image(&client, &base_url, &id).await {
        Ok(image) => match feed.try_send((id, image)) {
            Ok(()) => {},
            Err(TrySendError::Full((id, _))) => {
                debug!(image_id = %id, "buffer full; discarding completed download");
            },
            Err(TrySendError::Closed(_)) => {},
        },
        Err(err) => {
            monitor.record_failure();
            debug!(image_id = %id, error = ?err, "download failed");
        },
    }
}

#[async_trait]
impl Source for GallerySource {
    async fn next(&mut self) -> Result<()> {
        self.current = self.take_next().await?;
        Ok(())
    }

    fn current_id(&self) -> &str {
        &self.current.0
    }

    fn current_content(&self) -> DynamicImage {
        self.current.1.clone()
    }

    async fn shutdown(&mut self) {
        // Closing the semaphore unblocks queued jobs; aborting the set stops
        // in-flight ones at their next await. Both are idempotent, and the
        // JoinSet aborts everything on drop anyway.
        self.permits.close();
        self.jobs.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_the_gallery() {
        let config = GalleryConfig::default();
        assert_eq!(config.base_url, "https://prnt.sc/");
        assert_eq!(IdCursor::fix(&config.base_code).len(), 6);
    }

    #[tokio::test]
    async fn connect_fails_fast_when_nothing_downloads() {
        // An unroutable base URL: every job fails, the buffer stays empty and
        // the bounded first-image wait turns into Exhausted.
        let config = GalleryConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            base_code: "000000".to_string(),
        };
        let started = std::time::Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(30), GallerySource::connect(config)).await;
        let err = result.expect("bounded wait must elapse").unwrap_err();
        assert!(matches!(err.current_value(), ErrorKind::Exhausted));
        assert!(started.elapsed() >= Duration::from_secs(10));
    }
}
