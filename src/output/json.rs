//! Per-article JSON output

use crate::article::Article;
use crate::output::{ArticleSink, OutputError, OutputResult};
use std::path::{Path, PathBuf};

/// Writes every article to its own pretty-printed `<id>.json` file
#[derive(Debug)]
pub struct JsonFileSink {
    dir: PathBuf,
    finished: bool,
}

impl JsonFileSink {
    /// Creates the sink, making sure the output directory exists
    pub fn create(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            finished: false,
        })
    }

    /// Returns the path an article is written to
    pub fn article_path(&self, article: &Article) -> PathBuf {
        self.dir.join(format!("{}.json", article.id))
    }
}

impl ArticleSink for JsonFileSink {
    fn write(&mut self, article: &Article) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Write(format!(
                "sink for {} already finished",
                self.dir.display()
            )));
        }

        let content = serde_json::to_string_pretty(article)?;
        std::fs::write(self.article_path(article), content)?;
        tracing::debug!("Wrote article {} to {}", article.id, self.dir.display());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.finished = true;
        Ok(())
    }
}
