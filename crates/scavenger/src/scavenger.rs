//! The interactive scavenger: a pull interface over the running pipeline.

use crate::builder::Builder;
use crate::error::{ErrorKind, Result};
use crate::stage::StageHandle;
use image::DynamicImage;
use magpie_results::{HuntResult, ResultSink};
use tokio::sync::mpsc::Receiver;
use tracing::info;

/// An interactive scavenger hunting for sensitive data visible in
/// screenshots.
///
/// Images flow from a source through OCR into a bounded image queue; a
/// hunting task runs every flagger over them and parks its findings in a
/// bounded result queue. The client works with one result at a time,
/// pulling the next whenever it likes; the bounded queues keep both stages
/// paced to consumption.
///
/// All methods are non-blocking observations or non-waiting operations; the
/// only time a scavenger waits on the pipeline is inside
/// [`Builder::build`], which holds the caller until a first result exists.
///
/// Dropping a scavenger (or calling [`exit`](Self::exit)) cancels both
/// stage tasks; in-flight images are abandoned, not drained.
pub struct Scavenger {
    results: Receiver<HuntResult>,
    current: Option<HuntResult>,
    sink: Box<dyn ResultSink>,
    image_stage: StageHandle,
    hunt_stage: StageHandle,
}

impl Scavenger {
    /// Start configuring a scavenger.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn assemble(
        results: Receiver<HuntResult>,
        current: Option<HuntResult>,
        sink: Box<dyn ResultSink>,
        image_stage: StageHandle,
        hunt_stage: StageHandle,
    ) -> Self {
        Self { results, current, sink, image_stage, hunt_stage }
    }

    /// Whether a further result is already buffered and can be loaded
    /// without waiting.
    pub fn has_next_result(&self) -> bool {
        !self.results.is_empty()
    }

    /// Pop the next buffered result, adopt it as the current result and
    /// forward it to the sink.
    ///
    /// # Errors
    ///
    /// Fails with [`NoBufferedResult`](ErrorKind::NoBufferedResult) when the
    /// result queue is empty; gate calls with
    /// [`has_next_result`](Self::has_next_result).
    pub async fn load_next_result(&mut self) -> Result<()> {
        let Ok(result) = self.results.try_recv() else {
            exn::bail!(ErrorKind::NoBufferedResult);
        };
        self.sink.add(&result).await;
        self.current = Some(result);
        Ok(())
    }

    /// Whether the pipeline has delivered everything it ever will: the
    /// result queue is empty and both stages have terminated.
    ///
    /// Monotonic: once `true`, stays `true`.
    pub fn is_finished(&self) -> bool {
        self.results.is_empty() && self.image_stage.is_done() && self.hunt_stage.is_done()
    }

    /// The current result, in full.
    ///
    /// `None` only when the pipeline finished without producing a single
    /// result (an empty source, or no flagger ever matched).
    pub fn current_result(&self) -> Option<&HuntResult> {
        self.current.as_ref()
    }

    /// Identifier of the current result's image.
    pub fn result_image_id(&self) -> Option<&str> {
        self.current.as_ref().map(HuntResult::image_id)
    }

    /// The current result's image. Returns an owned copy; mutating it does
    /// not affect later calls.
    pub fn result_image_content(&self) -> Option<DynamicImage> {
        self.current.as_ref().map(HuntResult::content)
    }

    /// Text extracted from the current result's image.
    pub fn result_image_text(&self) -> Option<&str> {
        self.current.as_ref().map(HuntResult::text)
    }

    /// Name of the flagger module that produced the current result.
    pub fn result_author(&self) -> Option<&str> {
        self.current.as_ref().map(HuntResult::author)
    }

    /// The flagger's justification for the current result.
    pub fn result_details(&self) -> Option<&str> {
        self.current.as_ref().map(HuntResult::details)
    }

    /// Render a summary of everything the sink has accepted so far.
    pub fn print_results(&self) {
        self.sink.print();
    }

    /// [`print_results`](Self::print_results) followed by [`exit`](Self::exit).
    pub async fn print_results_and_exit(&mut self) {
        self.print_results();
        self.exit().await;
    }

    /// Shut the pipeline down: close the sink and cancel both stages
    /// without waiting for them.
    ///
    /// Idempotent, and deliberately **not** a process exit; whether the
    /// hosting process terminates is the caller's decision alone.
    pub async fn exit(&mut self) {
        info!("shutting down scavenging pipeline");
        self.sink.close().await;
        self.image_stage.cancel();
        self.hunt_stage.cancel();
    }
}

impl Drop for Scavenger {
    fn drop(&mut self) {
        self.image_stage.cancel();
        self.hunt_stage.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use magpie_hunt::FlagPolicy;
    use magpie_ocr::TextExtractor;
    use magpie_source::MockSource;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// 1×1 image whose red channel selects this image's fake OCR text.
    fn marked_image(marker: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([marker, 0, 0])))
    }

    /// Extractor double mapping an image's marker pixel to a fixed text.
    struct MarkerExtractor(Vec<&'static str>);

    impl TextExtractor for MarkerExtractor {
        fn extract(&self, image: DynamicImage) -> String {
            let marker = image.to_rgb8().get_pixel(0, 0)[0] as usize;
            self.0.get(marker).copied().unwrap_or_default().to_string()
        }
    }

    /// Sink double recording the ids it is handed.
    #[derive(Default)]
    struct RecordingSink {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn watch(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.seen)
        }
    }

    #[async_trait]
    impl ResultSink for RecordingSink {
        async fn add(&mut self, result: &HuntResult) {
            self.seen.lock().unwrap().push(result.image_id().to_string());
        }
        fn print(&self) {}
        async fn close(&mut self) {}
    }

    fn mock_source(images: &[(&str, u8)]) -> MockSource {
        MockSource::with_images(
            images.iter().map(|(id, marker)| (id.to_string(), marked_image(*marker))),
        )
        .unwrap()
    }

    /// Pull every remaining result, returning `(author, image_id)` pairs in
    /// load order (the current result at entry is not included).
    async fn drain(scavenger: &mut Scavenger) -> Vec<(String, String)> {
        let mut loaded = Vec::new();
        while !scavenger.is_finished() {
            if scavenger.has_next_result() {
                scavenger.load_next_result().await.unwrap();
                loaded.push((
                    scavenger.result_author().unwrap().to_string(),
                    scavenger.result_image_id().unwrap().to_string(),
                ));
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
        loaded
    }

    #[tokio::test]
    async fn flags_keyword_and_pattern_matches_in_source_order() {
        let source = mock_source(&[("A.png", 0), ("B.png", 1), ("C.png", 2)]);
        let extractor =
            MarkerExtractor(vec!["my password is hunter2", "contact me: a@b.co", "no content"]);
        let sink = RecordingSink::default();
        let sunk = sink.watch();

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(sink)
            .build()
            .await
            .unwrap();

        // The first result is adopted during construction.
        assert_eq!(scavenger.result_author(), Some("SENSITIVE_KEYWORD_FLAGGER"));
        assert_eq!(scavenger.result_image_id(), Some("A.png"));
        assert_eq!(scavenger.result_details(), Some("Detected keyword: \"password\""));

        let loaded = drain(&mut scavenger).await;
        assert_eq!(loaded, [("PATTERN_MATCHING_FLAGGER".to_string(), "B.png".to_string())]);
        assert_eq!(
            scavenger.result_details().unwrap(),
            "\"a@b.co\" matched with regex: [a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\\.[a-zA-Z0-9-.]+",
        );
        assert!(!scavenger.has_next_result());
        assert!(scavenger.is_finished());
        // The sink saw both results: the adopted first one and the loaded one.
        assert_eq!(*sunk.lock().unwrap(), ["A.png", "B.png"]);
    }

    #[tokio::test]
    async fn finishes_without_results_when_nothing_matches() {
        let source = mock_source(&[("quiet.png", 0)]);
        let extractor = MarkerExtractor(vec![""]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(RecordingSink::default())
            .build()
            .await
            .unwrap();

        assert!(scavenger.current_result().is_none());
        assert!(scavenger.result_image_id().is_none());
        assert!(!scavenger.has_next_result());
        assert!(drain(&mut scavenger).await.is_empty());
        assert!(scavenger.is_finished());
    }

    #[tokio::test]
    async fn disabled_hunting_passes_every_image_through() {
        let source = mock_source(&[("1.png", 0), ("2.png", 0), ("3.png", 0)]);
        let extractor = MarkerExtractor(vec!["whatever"]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(RecordingSink::default())
            .enable_hunting(false)
            .build()
            .await
            .unwrap();

        assert_eq!(scavenger.result_author(), Some("HUNTING DISABLED"));
        assert_eq!(scavenger.result_image_id(), Some("1.png"));
        let loaded = drain(&mut scavenger).await;
        let expected: Vec<(String, String)> = ["2.png", "3.png"]
            .iter()
            .map(|id| ("HUNTING DISABLED".to_string(), id.to_string()))
            .collect();
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn disabled_ocr_substitutes_the_notice_for_text() {
        let source = mock_source(&[("shot.png", 0)]);

        // Hunting disabled too, so the notice text itself is not what gets
        // the image flagged.
        let mut scavenger = Scavenger::builder()
            .source(source)
            .enable_ocr(false)
            .enable_hunting(false)
            .result_sink(RecordingSink::default())
            .build()
            .await
            .unwrap();

        assert_eq!(scavenger.result_image_text(), Some(magpie_ocr::OCR_DISABLED_NOTICE));
        drain(&mut scavenger).await;
    }

    #[tokio::test]
    async fn disabled_sink_still_delivers_results_to_the_client() {
        let source = mock_source(&[("a.png", 0), ("b.png", 0)]);
        let extractor = MarkerExtractor(vec!["password time"]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .enable_result_sink(false)
            .build()
            .await
            .unwrap();

        assert_eq!(scavenger.result_image_id(), Some("a.png"));
        let loaded = drain(&mut scavenger).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].1, "b.png");
    }

    #[tokio::test]
    async fn load_next_result_without_gating_is_an_error() {
        let source = mock_source(&[("only.png", 0)]);
        let extractor = MarkerExtractor(vec!["password"]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(RecordingSink::default())
            .build()
            .await
            .unwrap();

        // Single image, already adopted as current: nothing else is coming.
        while !scavenger.is_finished() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let err = scavenger.load_next_result().await.unwrap_err();
        assert!(matches!(err.current_value(), ErrorKind::NoBufferedResult));
        // The failed load leaves the current result untouched.
        assert_eq!(scavenger.result_image_id(), Some("only.png"));
    }

    #[tokio::test]
    async fn every_match_policy_emits_one_result_per_flagger() {
        let source = mock_source(&[("both.png", 0)]);
        let extractor = MarkerExtractor(vec!["password for a@b.co"]);
        let sink = RecordingSink::default();
        let sunk = sink.watch();

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(sink)
            .flag_policy(FlagPolicy::EveryMatch)
            .build()
            .await
            .unwrap();

        // Pattern flagger runs first; the keyword flagger still gets its say.
        assert_eq!(scavenger.result_author(), Some("PATTERN_MATCHING_FLAGGER"));
        let loaded = drain(&mut scavenger).await;
        assert_eq!(loaded, [("SENSITIVE_KEYWORD_FLAGGER".to_string(), "both.png".to_string())]);
        assert_eq!(*sunk.lock().unwrap(), ["both.png", "both.png"]);
    }

    #[tokio::test]
    async fn result_image_content_is_a_defensive_copy() {
        let source = mock_source(&[("img.png", 3)]);
        let extractor = MarkerExtractor(vec!["", "", "", "password"]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(RecordingSink::default())
            .build()
            .await
            .unwrap();

        let mut copy = scavenger.result_image_content().unwrap();
        copy.as_mut_rgb8().unwrap().put_pixel(0, 0, Rgb([0, 0, 0]));
        let fresh = scavenger.result_image_content().unwrap();
        assert_eq!(fresh.to_rgb8().get_pixel(0, 0), &Rgb([3, 0, 0]));
        drain(&mut scavenger).await;
    }

    #[tokio::test]
    async fn exit_is_idempotent_and_stays_in_process() {
        let source = mock_source(&[("img.png", 0)]);
        let extractor = MarkerExtractor(vec!["password"]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(RecordingSink::default())
            .build()
            .await
            .unwrap();

        scavenger.exit().await;
        scavenger.exit().await;
        scavenger.print_results_and_exit().await;
    }

    #[tokio::test]
    async fn tight_buffers_deliver_every_match_exactly_once_in_order() {
        const IMAGES: usize = 1000;

        // Every third image carries the marker that maps to flaggable text.
        let images: Vec<(String, u8)> = (0..IMAGES)
            .map(|i| (format!("img-{i:04}"), u8::from(i % 3 == 0)))
            .collect();
        let source = MockSource::with_images(
            images.iter().map(|(id, marker)| (id.clone(), marked_image(*marker))),
        )
        .unwrap();
        let extractor = MarkerExtractor(vec!["all quiet here", "the password is hunter2"]);

        let mut scavenger = Scavenger::builder()
            .source(source)
            .text_extractor(extractor)
            .result_sink(RecordingSink::default())
            .image_buffer_size(2)
            .result_buffer_size(1)
            .build()
            .await
            .unwrap();

        let mut observed = vec![scavenger.result_image_id().unwrap().to_string()];
        observed.extend(drain(&mut scavenger).await.into_iter().map(|(_, id)| id));

        let expected: Vec<String> =
            (0..IMAGES).filter(|i| i % 3 == 0).map(|i| format!("img-{i:04}")).collect();
        assert_eq!(observed.len(), expected.len());
        assert_eq!(observed, expected);
    }
}
