//! In-memory source for testing.

use crate::Source;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::collections::VecDeque;

/// In-memory source serving prepared `(id, image)` pairs in order.
///
/// Intended for unit tests in dependent crates that need a [`Source`]
/// without filesystem or network dependencies. Construction fails with
/// [`Exhausted`](ErrorKind::Exhausted) when given no images, matching the
/// valid-initial-image contract of real sources.
///
/// # Examples
///
/// ```
/// use image::DynamicImage;
/// use magpie_source::{MockSource, Source};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut source = MockSource::with_images([
///     ("first".to_string(), DynamicImage::new_rgb8(1, 1)),
///     ("second".to_string(), DynamicImage::new_rgb8(1, 1)),
/// ])?;
/// assert_eq!(source.current_id(), "first");
/// source.next().await?;
/// assert_eq!(source.current_id(), "second");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockSource {
    pending: VecDeque<(String, DynamicImage)>,
    current: (String, DynamicImage),
}

impl MockSource {
    /// Create a mock source pre-populated with images, served in the given
    /// order.
    pub fn with_images(images: impl IntoIterator<Item = (String, DynamicImage)>) -> Result<Self> {
        let mut pending: VecDeque<_> = images.into_iter().collect();
        let Some(current) = pending.pop_front() else {
            exn::bail!(ErrorKind::Exhausted);
        };
        Ok(Self { pending, current })
    }

    /// Images not yet served.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl Source for MockSource {
    async fn next(&mut self) -> Result<()> {
        let Some(next) = self.pending.pop_front() else {
            exn::bail!(ErrorKind::Exhausted);
        };
        self.current = next;
        Ok(())
    }

    fn current_id(&self) -> &str {
        &self.current.0
    }

    fn current_content(&self) -> DynamicImage {
        self.current.1.clone()
    }

    async fn shutdown(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(id: &str) -> (String, DynamicImage) {
        (id.to_string(), DynamicImage::new_rgb8(1, 1))
    }

    #[tokio::test]
    async fn serves_images_in_insertion_order() {
        let mut source = MockSource::with_images([pair("a"), pair("b")]).unwrap();
        assert_eq!(source.current_id(), "a");
        assert_eq!(source.remaining(), 1);
        source.next().await.unwrap();
        assert_eq!(source.current_id(), "b");
        let err = source.next().await.unwrap_err();
        assert!(matches!(err.current_value(), ErrorKind::Exhausted));
    }

    #[test]
    fn refuses_to_start_empty() {
        let images: [(String, DynamicImage); 0] = [];
        let err = MockSource::with_images(images).unwrap_err();
        assert!(matches!(err.current_value(), ErrorKind::Exhausted));
    }
}
