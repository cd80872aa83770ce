//! Per-image pipeline record.

use image::DynamicImage;

/// One image travelling through the pipeline: its identifier, raster and the
/// text OCR pulled out of it.
///
/// Immutable once created. The raster accessor hands out an owned copy so
/// holders of a record can modify what they receive without affecting anyone
/// downstream; `text` may be empty (an image with nothing readable) but is
/// always present.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    id: String,
    content: DynamicImage,
    text: String,
}

impl ImageRecord {
    pub(crate) fn new(id: impl Into<String>, content: DynamicImage, text: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "image records need a non-empty id");
        Self { id, content, text: text.into() }
    }

    /// Identifier of the image.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The image itself. Returns an owned copy.
    pub fn content(&self) -> DynamicImage {
        self.content.clone()
    }

    /// Text extracted from the image; possibly empty.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn content_is_a_defensive_copy() {
        let raster = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([7, 7, 7])));
        let record = ImageRecord::new("img", raster, "text");
        let mut copy = record.content();
        copy.as_mut_rgb8().unwrap().put_pixel(0, 0, Rgb([0, 0, 0]));
        assert_eq!(record.content().to_rgb8().get_pixel(0, 0), &Rgb([7, 7, 7]));
    }
}
