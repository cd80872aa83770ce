//! Image providers for the magpie scavenging pipeline.
//!
//! A [`Source`] yields a lazy, possibly-finite sequence of `(id, image)`
//! pairs. Two implementations are provided: [`GallerySource`] scrapes a
//! public screenshot gallery addressed by 6-character base-36 identifiers
//! using a concurrent batched downloader, and [`DiskSource`] enumerates a
//! local directory (useful for development and tests). The feature-gated
//! [`MockSource`] serves prepared in-memory images to dependent crates'
//! test suites.

pub mod error;

mod disk;
mod gallery;
#[cfg(feature = "mock")]
mod mock;

pub use self::disk::DiskSource;
pub use self::gallery::{DownloadMonitor, GalleryConfig, GallerySource, IdCursor};
#[cfg(feature = "mock")]
pub use self::mock::MockSource;
use crate::error::Result;
use async_trait::async_trait;
use image::DynamicImage;

/// Boxed source handle, as consumed by the pipeline's image stage.
pub type SourceHandle = Box<dyn Source>;

/// A provider of uniquely-identified images.
///
/// The contract mirrors a cursor over a lazy sequence: a freshly constructed
/// source already has a valid first image loaded, so [`current_id`](Self::current_id)
/// and [`current_content`](Self::current_content) are meaningful before any
/// call to [`next`](Self::next). Implementations that cannot load a first
/// image must fail their constructor instead of handing out an empty source.
///
/// Implementations are **not** required to be thread-safe. The pipeline
/// confines each source instance to a single task for its whole lifetime,
/// which is why every operation takes `&mut self` or `&self` without any
/// interior synchronisation requirement.
///
/// # Examples
///
/// ```no_run
/// use magpie_source::Source;
/// use magpie_source::error::{ErrorKind, Result};
///
/// async fn drain(mut source: impl Source) -> Result<u32> {
///     let mut seen = 0;
///     loop {
///         let _id = source.current_id();
///         let _image = source.current_content();
///         seen += 1;
///         match source.next().await {
///             Ok(()) => continue,
///             Err(err) if matches!(err.current_value(), ErrorKind::Exhausted) => break,
///             Err(err) => return Err(err),
///         }
///     }
///     source.shutdown().await;
///     Ok(seen)
/// }
/// ```
#[async_trait]
pub trait Source: Send {
    /// Advance to the next image.
    ///
    /// On success a valid image is loaded; a source never substitutes a
    /// placeholder. Sources that have to wait for an image (e.g. in-flight
    /// downloads) block here, within their own bounded patience.
    ///
    /// # Errors
    ///
    /// Fails with [`Exhausted`](crate::error::ErrorKind::Exhausted) when no
    /// further image is, or will become, available.
    async fn next(&mut self) -> Result<()>;

    /// Unique, non-empty identifier of the most recently loaded image.
    fn current_id(&self) -> &str;

    /// The most recently loaded image.
    ///
    /// Returns an owned raster; callers may mutate it freely without
    /// affecting the source.
    fn current_content(&self) -> DynamicImage;

    /// Release background resources. Idempotent.
    async fn shutdown(&mut self);
}
