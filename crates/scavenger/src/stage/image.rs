//! Image stage: source → OCR → image queue.

use crate::record::ImageRecord;
use crate::stage::StageHandle;
use image::DynamicImage;
use magpie_ocr::TextExtractor;
use magpie_source::Source;
use magpie_source::error::ErrorKind as SourceErrorKind;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

/// Spawn the image stage.
///
/// The stage exclusively owns the source and extractor for the lifetime of
/// the pipeline. Neither is touched from any other task, which is what lets
/// both stay blissfully unaware of threads.
pub(crate) fn spawn(
    source: Box<dyn Source>,
    extractor: Arc<dyn TextExtractor>,
    records: Sender<ImageRecord>,
) -> StageHandle {
    StageHandle::new(tokio::spawn(run(source, extractor, records)))
}

/// Keep the image queue replenished until the source runs dry.
///
/// Each iteration reads the source's loaded image, extracts its text, sends
/// the bundled record (waiting whenever the queue is at capacity; the
/// queue's bound is the stage's backpressure) and only then advances the
/// source. The source therefore moves at most once per successfully
/// enqueued record, and never runs ahead of a full queue.
async fn run(mut source: Box<dyn Source>, extractor: Arc<dyn TextExtractor>, records: Sender<ImageRecord>) {
    loop {
        let image_id = source.current_id().to_string();
        let content = source.current_content();
        // The extractor gets its own deep copy; it may mangle the raster
        // however it likes to improve recognition.
        let text = extract_text(&extractor, content.clone()).await;
        let record = ImageRecord::new(image_id, content, text);

        if records.send(record).await.is_err() {
            debug!("image queue closed; stopping image stage");
            break;
        }
        match source.next().await {
            Ok(()) => {},
            Err(err) if matches!(err.current_value(), SourceErrorKind::Exhausted) => {
                debug!("image source exhausted; image stage finished");
                break;
            },
            Err(err) => {
                warn!(error = ?err, "image source failed; stopping image stage");
                break;
            },
        }
    }
    source.shutdown().await;
}

/// Run the (synchronous, CPU-heavy) extractor off the async workers.
async fn extract_text(extractor: &Arc<dyn TextExtractor>, image: DynamicImage) -> String {
    let extractor = Arc::clone(extractor);
    match tokio::task::spawn_blocking(move || extractor.extract(image)).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "text extraction task failed");
            String::new()
        },
    }
}
