//! Concurrent scavenging pipeline for sensitive data visible in screenshots.
//!
//! A [`Scavenger`] composes four pluggable components (an image source, a
//! text extractor, an ordered flagger set and a result sink) into a
//! three-stage pipeline joined by two bounded queues:
//!
//! ```text
//! source ──▶ image stage ──▶ [image queue] ──▶ hunting stage ──▶ [result queue] ──▶ client
//!            (source + OCR)                    (flaggers)                           (pull + sink)
//! ```
//!
//! Each stage is a long-running task that exclusively owns its leaf
//! components, so none of them need to be thread-safe. The queues bound
//! memory and pace the stages to the client's consumption; the client pulls
//! one result at a time through the [`Scavenger`]'s non-blocking interface.
//!
//! Construction goes through [`Scavenger::builder`], which applies defaults,
//! substitutes no-op implementations for disabled features and does not hand
//! the instance back until the pipeline has produced its first result (or
//! proven it never will).

pub mod error;

mod builder;
mod record;
mod scavenger;
mod stage;

pub use crate::builder::Builder;
pub use crate::scavenger::Scavenger;
// The vocabulary types clients need when configuring a pipeline.
pub use magpie_hunt::{FlagPolicy, Flagger, FlaggerFactory};
pub use magpie_ocr::TextExtractor;
pub use magpie_results::{HuntResult, ResultSink};
pub use magpie_source::Source;
