//! CSV-and-PNG persistence for hunt results.

use crate::error::{ErrorKind, Result};
use crate::{HuntResult, ResultSink};
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const IMAGE_DIR: &str = "./huntedImages/";
const ABBREVIATED_FILE: &str = "./AbbreviatedResults.csv";
const EXTENSIVE_FILE: &str = "./Results.csv";

/// Column strategy for [`CsvSink`]: a header row plus a projection from a
/// result to its row.
///
/// Passed as plain data instead of being baked into a sink subclass, so the
/// two shipped layouts differ only in the strategy they carry.
#[derive(Clone, Copy)]
pub struct Columns {
    header: &'static [&'static str],
    row: fn(&HuntResult) -> Vec<String>,
}

impl Columns {
    /// Custom column layout.
    pub fn new(header: &'static [&'static str], row: fn(&HuntResult) -> Vec<String>) -> Self {
        Self { header, row }
    }

    /// `{Image ID, Result Author, Result Details}`.
    pub const ABBREVIATED: Columns = Columns {
        header: &["Image ID", "Result Author", "Result Details"],
        row: |result| {
            vec![result.image_id().to_string(), result.author().to_string(), result.details().to_string()]
        },
    };

    /// [`ABBREVIATED`](Self::ABBREVIATED) plus the extracted image text.
    pub const EXTENSIVE: Columns = Columns {
        header: &["Image ID", "Result Author", "Result Details", "Image Text"],
        row: |result| {
            vec![
                result.image_id().to_string(),
                result.author().to_string(),
                result.details().to_string(),
                result.text().to_string(),
            ]
        },
    };
}

/// Sink persisting each accepted result as a CSV row plus a PNG copy of the
/// flagged image, while also keeping results in memory for [`print`].
///
/// The CSV file (header row first) lives in the working directory and the
/// images under `./huntedImages/`, named `<image id>.png`. Records with any
/// empty required field are dropped. Individual persistence failures are
/// logged and skipped; the sink keeps accepting results until
/// [`close`](ResultSink::close).
///
/// [`print`]: ResultSink::print
pub struct CsvSink {
    columns: Columns,
    image_dir: PathBuf,
    writer: Option<csv::Writer<File>>,
    results: Vec<HuntResult>,
}

impl CsvSink {
    /// Abbreviated sink at the default locations
    /// (`./AbbreviatedResults.csv`, `./huntedImages/`).
    pub fn abbreviated() -> Result<Self> {
        Self::create(Columns::ABBREVIATED, ABBREVIATED_FILE, IMAGE_DIR)
    }

    /// Extensive sink at the default locations (`./Results.csv`,
    /// `./huntedImages/`).
    pub fn extensive() -> Result<Self> {
        Self::create(Columns::EXTENSIVE, EXTENSIVE_FILE, IMAGE_DIR)
    }

    /// Sink with explicit column strategy and output locations. An existing
    /// CSV file at `csv_path` is overwritten; `image_dir` is created if
    /// missing.
    pub fn create(
        columns: Columns,
        csv_path: impl AsRef<Path>,
        image_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let image_dir = image_dir.into();
        std::fs::create_dir_all(&image_dir).map_err(ErrorKind::Io)?;
        let mut writer = csv::Writer::from_path(csv_path.as_ref())
            .map_err(|err| ErrorKind::Io(std::io::Error::other(err)))?;
        writer.write_record(columns.header).or_raise(|| ErrorKind::Header)?;
        writer.flush().map_err(ErrorKind::Io)?;
        Ok(Self {
            columns,
            image_dir,
            writer: Some(writer),
            results: Vec::new(),
        })
    }

    async fn save_image(&self, result: &HuntResult) {
        let path = self.image_dir.join(format!("{}.png", result.image_id()));
        let image = result.content();
        // PNG encoding is CPU work; keep it off the async thread.
        let saved = tokio::task::spawn_blocking(move || image.save(&path).map(|()| path)).await;
        match saved {
            Ok(Ok(path)) => debug!(path = %path.display(), "saved flagged image"),
            Ok(Err(err)) => warn!(image_id = result.image_id(), error = %err, "failed to save flagged image"),
            Err(err) => warn!(error = %err, "image save task failed"),
        }
    }
}

#[async_trait]
impl ResultSink for CsvSink {
    async fn add(&mut self, result: &HuntResult) {
        if !result.is_complete() {
            warn!(image_id = result.image_id(), "dropping incomplete result");
            return;
        }
        self.save_image(result).await;
        if let Some(writer) = self.writer.as_mut() {
            let row = (self.columns.row)(result);
            if let Err(err) = writer.write_record(&row) {
                warn!(image_id = result.image_id(), error = %err, "failed to append CSV row");
            } else if let Err(err) = writer.flush() {
                warn!(image_id = result.image_id(), error = %err, "failed to flush CSV row");
            }
        }
        self.results.push(result.clone());
    }

    fn print(&self) {
        for title in self.columns.header {
            print!("{title} | ");
        }
        println!();
        for result in &self.results {
            for field in (self.columns.row)(result) {
                print!("{field} | ");
            }
            println!();
        }
    }

    async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(err) = writer.flush()
        {
            warn!(error = %err, "failed to flush CSV on close");
        }
    }
}
