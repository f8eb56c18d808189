//! Content hashing with BLAKE3.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::warn;

use shoebox_core::{ContentHash, ScanError};

/// Files above this size are memory-mapped instead of read in chunks.
const MMAP_THRESHOLD: u64 = 128 * 1024;

/// Compute the full BLAKE3 digest of a file.
pub fn hash_file(path: &Path) -> Result<ContentHash, ScanError> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let file_size = file.metadata().map_err(|e| ScanError::io(path, e))?.len();

    let mut hasher = blake3::Hasher::new();
    if file_size > MMAP_THRESHOLD {
        drop(file);
        hasher
            .update_mmap_rayon(path)
            .map_err(|e| ScanError::io(path, e))?;
    } else {
        let mut buffer = vec![0u8; 64 * 1024];
        let mut file = file;
        loop {
            let bytes_read = file.read(&mut buffer).map_err(|e| ScanError::io(path, e))?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Hashes batches of files in parallel.
pub struct Hasher {
    pool: Option<rayon::ThreadPool>,
}

impl Hasher {
    /// Create a hasher on the global rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Create a hasher with a dedicated pool (0 = global pool).
    pub fn with_threads(threads: usize) -> Self {
        if threads == 0 {
            return Self::new();
        }
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Self { pool: Some(pool) },
            Err(err) => {
                warn!(threads, error = %err, "falling back to global hashing pool");
                Self::new()
            }
        }
    }

    /// Hash every path; results come back in input order.
    pub fn hash_all(&self, paths: &[PathBuf]) -> Vec<Result<ContentHash, ScanError>> {
        let work = || -> Vec<Result<ContentHash, ScanError>> {
            paths.par_iter().map(|path| hash_file(path)).collect()
        };
        match self.pool {
            Some(ref pool) => pool.install(work),
            None => work(),
        }
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
