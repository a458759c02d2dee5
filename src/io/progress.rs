//! Batch progress display for commands that walk many map files

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static STATUS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{prefix:>24.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

static TOTAL_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Maps: [{bar:40.green/white}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// One processed file as shown in the status lines
#[derive(Debug, Clone)]
struct FileEntry {
    name: String,
    status: String,
}

/// Status lines for the most recent files plus a total bar for large batches
///
/// Batches no larger than the status window show one line per file. Larger
/// batches add a total bar and keep the window on the newest files.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    total: Option<ProgressBar>,
    status_lines: Vec<ProgressBar>,
    entries: Vec<FileEntry>,
    tally: BTreeMap<String, usize>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager with nothing displayed yet
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            total: None,
            status_lines: Vec::new(),
            entries: Vec::new(),
            tally: BTreeMap::new(),
        }
    }

    /// Lay out the display for a batch of `file_count` files
    pub fn initialize(&mut self, file_count: usize) {
        if file_count > MAX_INDIVIDUAL_PROGRESS_BARS {
            let total = ProgressBar::new(file_count as u64).with_style(TOTAL_STYLE.clone());
            self.total = Some(self.multi_progress.add(total));
        }

        let lines = file_count.min(MAX_INDIVIDUAL_PROGRESS_BARS);
        self.status_lines = (0..lines)
            .map(|_| {
                self.multi_progress
                    .add(ProgressBar::new_spinner().with_style(STATUS_STYLE.clone()))
            })
            .collect();
    }

    /// Show a file as in progress
    pub fn start_file(&mut self, path: &Path) {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        self.entries.push(FileEntry {
            name,
            status: "working".to_string(),
        });
        self.redraw();
    }

    /// Record the outcome of the most recently started file
    pub fn complete_file(&mut self, status: &str) {
        if let Some(entry) = self.entries.last_mut() {
            entry.status = status.to_string();
        }
        *self.tally.entry(status.to_string()).or_default() += 1;
        if let Some(total) = &self.total {
            total.inc(1);
            total.set_message(self.summary());
        }
        self.redraw();
    }

    /// Remove the display, leaving the totals on the batch bar
    pub fn finish(&self) {
        if let Some(total) = &self.total {
            total.finish_with_message(self.summary());
        }
        let _ = self.multi_progress.clear();
    }

    /// Number of files started so far
    pub fn started(&self) -> usize {
        self.entries.len()
    }

    // e.g. "packed 12, skipped 3"
    fn summary(&self) -> String {
        self.tally
            .iter()
            .map(|(status, count)| format!("{status} {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn redraw(&self) {
        let window_start = self.entries.len().saturating_sub(self.status_lines.len());
        let window = self.entries.get(window_start..).unwrap_or_default();
        for (line, entry) in self.status_lines.iter().zip(window) {
            line.set_prefix(entry.name.clone());
            line.set_message(entry.status.clone());
        }
    }
}
