//! Ingestion progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct IngestProgress {
    /// Leaf directories found for this scan.
    pub directories_total: u64,
    /// Leaf directories finished (committed or rolled back).
    pub directories_done: u64,
    /// Files looked at so far.
    pub files_scanned: u64,
    /// Files newly cataloged so far.
    pub files_new: u64,
    /// Files that could not be cataloged.
    pub files_failed: u64,
    /// Directory currently being ingested.
    pub current_path: PathBuf,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
}

impl IngestProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            directories_total: 0,
            directories_done: 0,
            files_scanned: 0,
            files_new: 0,
            files_failed: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fraction of directories finished, between 0 and 1.
    pub fn fraction_done(&self) -> f64 {
        if self.directories_total == 0 {
            0.0
        } else {
            self.directories_done as f64 / self.directories_total as f64
        }
    }
}

impl Default for IngestProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters with timing; produces [`IngestProgress`] snapshots.
#[derive(Debug)]
pub struct ProgressTracker {
    start_time: Instant,
    progress: IngestProgress,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            progress: IngestProgress::new(),
        }
    }

    pub fn set_directories_total(&mut self, total: u64) {
        self.progress.directories_total = total;
    }

    pub fn start_directory(&mut self, path: PathBuf) {
        self.progress.current_path = path;
    }

    pub fn finish_directory(&mut self, scanned: u64, new: u64, failed: u64) {
        self.progress.directories_done += 1;
        self.progress.files_scanned += scanned;
        self.progress.files_new += new;
        self.progress.files_failed += failed;
    }

    pub fn snapshot(&self) -> IngestProgress {
        IngestProgress {
            elapsed: self.start_time.elapsed(),
            ..self.progress.clone()
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
