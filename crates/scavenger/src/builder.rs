//! Validated construction of [`Scavenger`] instances.

use crate::Scavenger;
use crate::error::{ErrorKind, Result};
use crate::stage;
use exn::ResultExt;
use magpie_hunt::{DefaultFlaggerFactory, FlagAll, FlagPolicy, Flagger, FlaggerFactory};
use magpie_ocr::{DisabledExtractor, TesseractExtractor, TextExtractor};
use magpie_results::{CsvSink, DiscardSink, ResultSink};
use magpie_source::{GalleryConfig, GallerySource, Source};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_IMAGE_BUFFER_SIZE: usize = 16;
const DEFAULT_RESULT_BUFFER_SIZE: usize = 8;

/// Builder for [`Scavenger`].
///
/// Construction goes through a builder so a scavenger can only ever be
/// observed in a valid state: defaults are applied lazily at
/// [`build`](Self::build), disabled features are substituted with no-op
/// implementations (never `None` checks sprinkled through the pipeline), and
/// the returned instance already holds its first result whenever the
/// pipeline produces one at all.
///
/// # Examples
///
/// ```no_run
/// use magpie_scavenger::Scavenger;
/// use magpie_source::DiskSource;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut scavenger = Scavenger::builder()
///     .source(DiskSource::open("./dataset").await?)
///     .image_buffer_size(32)
///     .build()
///     .await?;
///
/// while !scavenger.is_finished() {
///     if scavenger.has_next_result() {
///         scavenger.load_next_result().await?;
///         println!("{}: {}", scavenger.result_image_id().unwrap(), scavenger.result_details().unwrap());
///     } else {
///         tokio::time::sleep(std::time::Duration::from_millis(200)).await;
///     }
/// }
/// scavenger.print_results_and_exit().await;
/// # Ok(())
/// # }
/// ```
pub struct Builder {
    source: Option<Box<dyn Source>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    flaggers: Option<Vec<Box<dyn Flagger>>>,
    sink: Option<Box<dyn ResultSink>>,
    image_buffer_size: usize,
    result_buffer_size: usize,
    ocr_enabled: bool,
    hunting_enabled: bool,
    sink_enabled: bool,
    flag_policy: FlagPolicy,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            source: None,
            extractor: None,
            flaggers: None,
            sink: None,
            image_buffer_size: DEFAULT_IMAGE_BUFFER_SIZE,
            result_buffer_size: DEFAULT_RESULT_BUFFER_SIZE,
            ocr_enabled: true,
            hunting_enabled: true,
            sink_enabled: true,
            flag_policy: FlagPolicy::default(),
        }
    }

    /// Override the default (remote gallery) image source.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Override the default (Tesseract) text extractor.
    pub fn text_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Replace the default flagger list with the factory's. The factory is
    /// drained immediately; later mutations to it are not observed.
    pub fn flagger_factory(mut self, factory: &dyn FlaggerFactory) -> Self {
        self.flaggers = Some(factory.flaggers());
        self
    }

    /// Override the default (abbreviated CSV) result sink.
    pub fn result_sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Capacity of the image queue. Zero is rejected (with a warning) and
    /// the default of 16 kept.
    pub fn image_buffer_size(mut self, size: usize) -> Self {
        if size == 0 {
            warn!("image buffer size must be positive; keeping {}", self.image_buffer_size);
        } else {
            self.image_buffer_size = size;
        }
        self
    }

    /// Capacity of the result queue. Zero is rejected (with a warning) and
    /// the default of 8 kept.
    pub fn result_buffer_size(mut self, size: usize) -> Self {
        if size == 0 {
            warn!("result buffer size must be positive; keeping {}", self.result_buffer_size);
        } else {
            self.result_buffer_size = size;
        }
        self
    }

    /// When disabled, a sentinel extractor is substituted and every record
    /// carries the disabled notice instead of OCR text.
    pub fn enable_ocr(mut self, enabled: bool) -> Self {
        self.ocr_enabled = enabled;
        self
    }

    /// When disabled, a single flag-everything module is substituted: every
    /// image becomes a result and the pipeline acts as a plain scraper.
    pub fn enable_hunting(mut self, enabled: bool) -> Self {
        self.hunting_enabled = enabled;
        self
    }

    /// When disabled, results are accepted and discarded instead of
    /// persisted.
    pub fn enable_result_sink(mut self, enabled: bool) -> Self {
        self.sink_enabled = enabled;
        self
    }

    /// How many findings one image may produce (default:
    /// [`FlagPolicy::FirstMatch`]).
    pub fn flag_policy(mut self, policy: FlagPolicy) -> Self {
        self.flag_policy = policy;
        self
    }

    /// Assemble and start the pipeline.
    ///
    /// Spawns both stages and then waits on the result queue until the first
    /// result is available, which is adopted as the current result and
    /// forwarded to the sink, so the instance handed back is immediately
    /// useful. If the hunting stage completes without ever producing a
    /// result (nothing matched, or the source was already dry), the returned
    /// scavenger is immediately finished and has no current result.
    ///
    /// # Errors
    ///
    /// Fails when a defaulted component cannot be initialised (the remote
    /// gallery is unreachable, or the CSV sink cannot create its output
    /// files).
    pub async fn build(self) -> Result<Scavenger> {
        let extractor: Arc<dyn TextExtractor> = if self.ocr_enabled {
            self.extractor.unwrap_or_else(|| Arc::new(TesseractExtractor::new()))
        } else {
            Arc::new(DisabledExtractor)
        };
        let flaggers: Vec<Box<dyn Flagger>> = if self.hunting_enabled {
            self.flaggers.unwrap_or_else(|| DefaultFlaggerFactory.flaggers())
        } else {
            vec![Box::new(FlagAll)]
        };
        let mut sink: Box<dyn ResultSink> = if self.sink_enabled {
            match self.sink {
                Some(sink) => sink,
                None => Box::new(CsvSink::abbreviated().or_raise(|| ErrorKind::Sink)?),
            }
        } else {
            Box::new(DiscardSink)
        };
        let source: Box<dyn Source> = match self.source {
            Some(source) => source,
            None => Box::new(
                GallerySource::connect(GalleryConfig::default()).await.or_raise(|| ErrorKind::Source)?,
            ),
        };

        let (record_tx, record_rx) = mpsc::channel(self.image_buffer_size);
        let (result_tx, mut result_rx) = mpsc::channel(self.result_buffer_size);
        let image_stage = stage::image::spawn(source, extractor, record_tx);
        let hunt_stage = stage::hunt::spawn(flaggers, self.flag_policy, record_rx, result_tx);

        let current = match result_rx.recv().await {
            Some(first) => {
                debug!(image_id = first.image_id(), author = first.author(), "adopted first result");
                sink.add(&first).await;
                Some(first)
            },
            None => {
                debug!("pipeline completed without producing any result");
                None
            },
        };

        Ok(Scavenger::assemble(result_rx, current, sink, image_stage, hunt_stage))
    }
}
