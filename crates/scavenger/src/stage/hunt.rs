//! Hunting stage: image queue → flaggers → result queue.

use crate::record::ImageRecord;
use crate::stage::StageHandle;
use magpie_hunt::{FlagPolicy, Flagger};
use magpie_results::HuntResult;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::debug;

/// Spawn the hunting stage. The flagger set is owned by the stage for the
/// lifetime of the pipeline.
pub(crate) fn spawn(
    flaggers: Vec<Box<dyn Flagger>>,
    policy: FlagPolicy,
    records: Receiver<ImageRecord>,
    results: Sender<HuntResult>,
) -> StageHandle {
    StageHandle::new(tokio::spawn(run(flaggers, policy, records, results)))
}

/// Work through the image queue until it closes and drains.
///
/// Receiving `None` is the termination condition: the image stage has
/// dropped its sender (source exhausted) and every buffered record has been
/// consumed. Each record is shown to the flaggers in order; findings become
/// [`HuntResult`]s sent downstream, waiting whenever the result queue is at
/// capacity. Under [`FlagPolicy::FirstMatch`] the first finding ends the
/// image's evaluation; under [`FlagPolicy::EveryMatch`] every flagger gets
/// its say.
///
/// Returning drops the result sender, which is how the client side learns
/// the hunt is over.
async fn run(
    flaggers: Vec<Box<dyn Flagger>>,
    policy: FlagPolicy,
    mut records: Receiver<ImageRecord>,
    results: Sender<HuntResult>,
) {
    while let Some(record) = records.recv().await {
        let content = record.content();
        for flagger in &flaggers {
            let Some(details) = flagger.flag(record.id(), &content, record.text()) else {
                continue;
            };
            debug!(image_id = record.id(), author = flagger.module_name(), "image flagged");
            let result =
                HuntResult::new(flagger.module_name(), details, record.id(), content.clone(), record.text());
            if results.send(result).await.is_err() {
                debug!("result queue closed; stopping hunting stage");
                return;
            }
            if policy == FlagPolicy::FirstMatch {
                break;
            }
        }
    }
    debug!("image queue drained; hunting stage finished");
}
