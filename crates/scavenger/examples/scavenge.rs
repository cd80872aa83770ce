//! Minimal driver for the scavenging pipeline.
//!
//! Scrapes the default remote gallery with the default flagger set and keeps
//! pulling flagged screenshots until it has collected ten, then prints the
//! summary and shuts down. Expects the `tesseract` binary on `PATH`.
//!
//! ```sh
//! cargo run --example scavenge
//! ```

use magpie_scavenger::Scavenger;
use std::time::Duration;

const RESULTS_WANTED: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info,magpie_source=debug").init();

    let mut scavenger = Scavenger::builder().build().await.map_err(|err| std::io::Error::other(format!("{err:?}")))?;
    let mut collected = 1; // the builder already loaded the first result

    while collected < RESULTS_WANTED && !scavenger.is_finished() {
        if !scavenger.has_next_result() {
            tokio::time::sleep(Duration::from_millis(200)).await;
            continue;
        }
        scavenger.load_next_result().await.map_err(|err| std::io::Error::other(format!("{err:?}")))?;
        collected += 1;
        println!(
            "[{collected}/{RESULTS_WANTED}] {}: {} ({})",
            scavenger.result_image_id().unwrap_or("<none>"),
            scavenger.result_details().unwrap_or_default(),
            scavenger.result_author().unwrap_or_default(),
        );
    }

    scavenger.print_results_and_exit().await;
    Ok(())
}
