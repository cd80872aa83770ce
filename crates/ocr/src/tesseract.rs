//! Tesseract-backed text extraction.

use crate::TextExtractor;
use image::DynamicImage;
use std::process::Command;
use tracing::{debug, warn};

const DEFAULT_BINARY: &str = "tesseract";
const DEFAULT_LANGUAGE: &str = "eng";

/// Extractor driving the Tesseract OCR engine.
///
/// Rather than binding the engine over FFI, this adapter shells out to the
/// `tesseract` binary in stdout mode against a temporary PNG. That keeps the
/// engine an external collaborator: anything that goes wrong (binary
/// missing, engine crash, unreadable output) is absorbed into an empty
/// string, per the [`TextExtractor`] contract.
pub struct TesseractExtractor {
    binary: String,
    language: String,
}

impl TesseractExtractor {
    /// Create an extractor using the `tesseract` binary from `PATH` and the
    /// English language model.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    /// Create an extractor driving a specific binary (e.g. a non-`PATH`
    /// install location).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        let extractor = Self {
            binary: binary.into(),
            language: DEFAULT_LANGUAGE.to_string(),
        };
        extractor.probe();
        extractor
    }

    /// Select the language model passed to the engine (`-l`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// One-off availability check so a missing engine shows up at
    /// construction time instead of as a stream of empty extractions.
    fn probe(&self) {
        match Command::new(&self.binary).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                debug!(binary = %self.binary, version = %version.lines().next().unwrap_or_default(), "tesseract available");
            },
            Ok(output) => {
                warn!(binary = %self.binary, status = %output.status, "tesseract probe failed; extraction will return empty text");
            },
            Err(err) => {
                warn!(binary = %self.binary, error = %err, "tesseract binary not found; extraction will return empty text");
            },
        }
    }

    fn run_engine(&self, image: &DynamicImage) -> Option<String> {
        let file = match tempfile::Builder::new().prefix("magpie-ocr-").suffix(".png").tempfile() {
            Ok(file) => file,
            Err(err) => {
                warn!(error = %err, "failed to create temporary image for OCR");
                return None;
            },
        };
        if let Err(err) = image.save(file.path()) {
            warn!(error = %err, "failed to write temporary image for OCR");
            return None;
        }
        let output = match Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                warn!(binary = %self.binary, error = %err, "failed to launch tesseract");
                return None;
            },
        };
        if !output.status.success() {
            warn!(status = %output.status, stderr = %String::from_utf8_lossy(&output.stderr), "tesseract exited unsuccessfully");
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract(&self, image: DynamicImage) -> String {
        self.run_engine(&image).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_engine_extracts_empty_text() {
        let extractor = TesseractExtractor::with_binary("magpie-definitely-not-a-real-binary");
        assert_eq!(extractor.extract(DynamicImage::new_rgb8(4, 4)), "");
    }

    #[test]
    fn language_is_configurable() {
        let extractor = TesseractExtractor::with_binary("magpie-definitely-not-a-real-binary").with_language("deu");
        assert_eq!(extractor.language, "deu");
    }
}
