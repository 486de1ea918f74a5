use core::fmt;
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{Local, SecondsFormat};
use stacked_errors::{Result, StackableErr};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// How one strategy attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

impl AttemptOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failure => "failure",
        }
    }
}

impl Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where attempt records go. The sink is best-effort from the search's point
/// of view, a failed write must never alter the search outcome.
#[async_trait]
pub trait AttemptSink {
    /// Persists exactly one record for one strategy attempt
    async fn record(&self, strategy_name: &str, outcome: AttemptOutcome) -> Result<()>;
}

/// Appends one line per attempt to a durable log file, so that past runs can
/// be audited (or tailed while the fix is in progress).
///
/// Both the file path and the working-directory context that gets stamped
/// into each record are explicit construction-time configuration.
#[derive(Debug, Clone)]
pub struct AttemptLog {
    path: PathBuf,
    cwd: PathBuf,
}

impl AttemptLog {
    pub fn new(path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            cwd: cwd.as_ref().to_owned(),
        }
    }

    /// `[<RFC3339 timestamp>] <success|failure>! <strategy name> @ <cwd>`
    fn render_line(timestamp: &str, outcome: AttemptOutcome, strategy_name: &str, cwd: &Path) -> String {
        format!(
            "[{timestamp}] {outcome}! {strategy_name} @ {}\n",
            cwd.display()
        )
    }
}

#[async_trait]
impl AttemptSink for AttemptLog {
    /// Opens the log for append (creating it if needed), writes the record,
    /// and syncs so the line survives even if the process dies right after
    async fn record(&self, strategy_name: &str, outcome: AttemptOutcome) -> Result<()> {
        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        let line = Self::render_line(&timestamp, outcome, strategy_name, &self.cwd);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .stack_err_with(|| {
                format!("AttemptLog::record() -> failed to open {:?} for append", self.path)
            })?;
        file.write_all(line.as_bytes()).await.stack_err_with(|| {
            format!("AttemptLog::record() -> failed to append to {:?}", self.path)
        })?;
        file.flush().await.stack()?;
        file.sync_all().await.stack()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let line = AttemptLog::render_line(
            "2026-08-25T10:00:00+02:00",
            AttemptOutcome::Failure,
            "cache:flush, setup:di:compile, setup:upgrade, indexer:reindex",
            Path::new("/srv/shop"),
        );
        assert_eq!(
            line,
            "[2026-08-25T10:00:00+02:00] failure! cache:flush, setup:di:compile, setup:upgrade, \
             indexer:reindex @ /srv/shop\n"
        );
    }

    #[tokio::test]
    async fn records_append_one_line_each() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.log");
        let log = AttemptLog::new(&path, "/srv/shop");
        log.record("a, b", AttemptOutcome::Failure).await.unwrap();
        log.record("b, a", AttemptOutcome::Success).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("failure! a, b @ /srv/shop"));
        assert!(lines[1].contains("success! b, a @ /srv/shop"));
        assert!(lines[0].starts_with('['));
    }

    #[tokio::test]
    async fn unwritable_path_is_an_error() {
        let log = AttemptLog::new("/nonexistent-dir-bfa3/attempts.log", "/srv/shop");
        assert!(log.record("a, b", AttemptOutcome::Success).await.is_err());
    }
}
