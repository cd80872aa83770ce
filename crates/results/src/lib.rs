//! Result records and sinks for the magpie scavenging pipeline.
//!
//! A [`HuntResult`] bundles a flagged image with the reason it was flagged
//! and which module flagged it. A [`ResultSink`] consumes those records one
//! at a time, persisting or discarding them as the implementation sees
//! fit.

pub mod error;

mod csv;
mod discard;

pub use self::csv::{Columns, CsvSink};
pub use self::discard::DiscardSink;
use async_trait::async_trait;
use image::DynamicImage;

/// A flagged image plus the reason it was flagged and who flagged it.
///
/// Immutable once created. The raster accessor returns an owned copy, so
/// callers can modify what they get back without affecting the record (or
/// anyone else holding it).
#[derive(Debug, Clone)]
pub struct HuntResult {
    author: String,
    details: String,
    image_id: String,
    content: DynamicImage,
    text: String,
}

impl HuntResult {
    /// Bundle one finding. `author`, `details` and `image_id` are expected
    /// to be non-empty; sinks drop records that are not.
    pub fn new(
        author: impl Into<String>,
        details: impl Into<String>,
        image_id: impl Into<String>,
        content: DynamicImage,
        text: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            details: details.into(),
            image_id: image_id.into(),
            content,
            text: text.into(),
        }
    }

    /// Name of the flagger module which produced this result.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Human-readable justification supplied by the flagger.
    pub fn details(&self) -> &str {
        &self.details
    }

    /// Identifier of the flagged image.
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// The flagged image. Returns an owned copy.
    pub fn content(&self) -> DynamicImage {
        self.content.clone()
    }

    /// Text extracted from the image; possibly empty, never missing.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether every required field is present and non-empty.
    pub(crate) fn is_complete(&self) -> bool {
        !self.author.is_empty() && !self.details.is_empty() && !self.image_id.is_empty()
    }
}

/// Consumer of [`HuntResult`] records; the egress of the pipeline.
///
/// Sinks are driven from a single task, one record at a time, until
/// [`close`](Self::close). Persistence failures are a sink-internal affair:
/// implementations log and carry on, so one bad write never stalls the
/// pipeline.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use magpie_results::{HuntResult, ResultSink};
///
/// /// Counts results instead of keeping them.
/// #[derive(Default)]
/// struct CountingSink(u64);
///
/// #[async_trait]
/// impl ResultSink for CountingSink {
///     async fn add(&mut self, _result: &HuntResult) {
///         self.0 += 1;
///     }
///
///     fn print(&self) {
///         println!("{} results accepted", self.0);
///     }
///
///     async fn close(&mut self) {}
/// }
/// ```
#[async_trait]
pub trait ResultSink: Send {
    /// Store one result. May persist to disk, may keep in memory. Called
    /// repeatedly until [`close`](Self::close).
    async fn add(&mut self, result: &HuntResult);

    /// Render a human-readable summary of the stored results to stdout.
    fn print(&self);

    /// Release held resources (file handles). Idempotent; behaviour of
    /// `add`/`print` after closing is unspecified.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn result() -> HuntResult {
        let content = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([5, 5, 5])));
        HuntResult::new("MODULE", "Detected keyword: \"key\"", "abc123.png", content, "some key material")
    }

    #[test]
    fn accessors_round_trip() {
        let result = result();
        assert_eq!(result.author(), "MODULE");
        assert_eq!(result.details(), "Detected keyword: \"key\"");
        assert_eq!(result.image_id(), "abc123.png");
        assert_eq!(result.text(), "some key material");
        assert!(result.is_complete());
    }

    #[test]
    fn content_is_a_defensive_copy() {
        let result = result();
        let mut copy = result.content();
        copy.as_mut_rgb8().unwrap().put_pixel(0, 0, Rgb([255, 0, 0]));
        assert_eq!(result.content().to_rgb8().get_pixel(0, 0), &Rgb([5, 5, 5]));
    }

    #[test]
    fn empty_required_fields_are_incomplete() {
        let content = DynamicImage::new_rgb8(1, 1);
        assert!(!HuntResult::new("", "details", "id", content.clone(), "").is_complete());
        assert!(!HuntResult::new("author", "", "id", content.clone(), "").is_complete());
        assert!(!HuntResult::new("author", "details", "", content, "").is_complete());
    }
}
