//! Directory walking and content hashing for shoebox.
//!
//! # Overview
//!
//! `shoebox-scan` finds the work for an ingestion run and fingerprints it:
//!
//! - **Leaf directory discovery** via jwalk, hidden directories pruned
//! - **Parallel BLAKE3 hashing** via rayon, memory-mapped for large files
//! - **Progress snapshots** for broadcasting to subscribers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use shoebox_scan::{DirectoryWalker, Hasher, list_files};
//!
//! let walker = DirectoryWalker::new();
//! let hasher = Hasher::new();
//! for leaf in walker.find_leaf_directories(Path::new("/srv/photos"), "/2024").unwrap() {
//!     let files = list_files(&leaf).unwrap();
//!     let digests = hasher.hash_all(&files);
//!     println!("{}: {} files", leaf.display(), digests.len());
//! }
//! ```

mod hasher;
mod progress;
mod walker;

pub use hasher::{Hasher, hash_file};
pub use progress::{IngestProgress, ProgressTracker};
pub use walker::{DirectoryWalker, list_files, relative_directory, relative_path, resolve};

// Re-export core types for convenience
pub use shoebox_core::{ContentHash, ScanError, ScanWarning, WarningKind};
