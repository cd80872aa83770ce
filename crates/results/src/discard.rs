//! Discarding sink used when result persistence is disabled.

use crate::{HuntResult, ResultSink};
use async_trait::async_trait;

const DISABLED_NOTICE: &str = "Result sink has been disabled";

/// Sink that drops every result.
///
/// Substituted when the result sink is disabled, so the rest of the pipeline
/// never has to care whether anyone is listening. Nothing touches disk;
/// `print` emits a fixed notice instead of a summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

#[async_trait]
impl ResultSink for DiscardSink {
    async fn add(&mut self, _result: &HuntResult) {}

    fn print(&self) {
        println!("{DISABLED_NOTICE}");
    }

    async fn close(&mut self) {}
}
