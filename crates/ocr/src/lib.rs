//! Text extraction for the magpie scavenging pipeline.
//!
//! A [`TextExtractor`] is a total function from an image to the text visible
//! in it. Extraction failure is never an error the pipeline has to deal
//! with: an extractor that cannot read anything returns the empty string.
//!
//! Extraction is synchronous, CPU-heavy work; the pipeline runs it under
//! `spawn_blocking` and always hands the extractor a deep copy of the
//! raster, so implementations are free to mutate their input (binarise,
//! upscale, deskew) to improve recognition.

mod tesseract;

pub use self::tesseract::TesseractExtractor;
use image::DynamicImage;

/// Sentinel text substituted for OCR output when extraction is disabled.
pub const OCR_DISABLED_NOTICE: &str =
    "NOTICE: OCR has been disabled. Re-enable OCR to perform textual analysis.";

/// Extracts visible text from an image.
///
/// Implementations must be total: no text, unreadable input and engine
/// failures all come back as `""`. The image is received by value: it is
/// the caller's copy, and the extractor may modify it freely while working.
pub trait TextExtractor: Send + Sync {
    /// Extract the text visible in `image`, or `""` if there is none or
    /// extraction fails.
    fn extract(&self, image: DynamicImage) -> String;
}

/// Extractor substituted when OCR is disabled.
///
/// Returns the fixed [`OCR_DISABLED_NOTICE`] for every image, so downstream
/// consumers can tell "no text found" apart from "nobody looked".
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledExtractor;

impl TextExtractor for DisabledExtractor {
    fn extract(&self, _image: DynamicImage) -> String {
        OCR_DISABLED_NOTICE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_extractor_returns_the_notice() {
        let extractor = DisabledExtractor;
        assert_eq!(extractor.extract(DynamicImage::new_rgb8(1, 1)), OCR_DISABLED_NOTICE);
        assert_eq!(extractor.extract(DynamicImage::new_rgb8(32, 32)), OCR_DISABLED_NOTICE);
    }
}
