//! JSONL batch output
//!
//! One batch file per walker. The file is opened when the sink is created and stays open
//! until `finish`; dropping an unfinished sink still flushes what was buffered.

use crate::article::Article;
use crate::output::{ArticleSink, OutputError, OutputResult};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one compact JSON line per article to a batch file
#[derive(Debug)]
pub struct JsonlBatchSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines_written: usize,
}

impl JsonlBatchSink {
    /// Opens (or creates) the batch file in append mode
    ///
    /// Parent directories are created as needed.
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!("Opened batch file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            lines_written: 0,
        })
    }

    /// Returns the batch file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of articles appended so far
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }
}

impl ArticleSink for JsonlBatchSink {
    fn write(&mut self, article: &Article) -> OutputResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(OutputError::Write(format!(
                "batch file {} already closed",
                self.path.display()
            )));
        };

        // One write per record, newline included, so a record is never split across flushes
        let mut line = serde_json::to_string(article)?;
        line.push('\n');
        writer.write_all(line.as_bytes())?;
        self.lines_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            tracing::info!(
                "Closed batch file {} ({} articles)",
                self.path.display(),
                self.lines_written
            );
        }
        Ok(())
    }
}

impl Drop for JsonlBatchSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::error!("Failed to flush {}: {}", self.path.display(), e);
            }
        }
    }
}
