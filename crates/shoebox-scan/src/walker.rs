//! Leaf directory discovery using jwalk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use shoebox_core::ScanError;

/// Finds the directories that ingestion works on.
///
/// A leaf directory has no subdirectories. Directories whose name starts
/// with `.` are pruned along with their subtrees and do not make their
/// parent a non-leaf.
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    threads: usize,
}

impl DirectoryWalker {
    /// Create a walker on the default rayon pool.
    pub fn new() -> Self {
        Self { threads: 0 }
    }

    /// Create a walker with its own pool of `threads` workers (0 = default pool).
    pub fn with_threads(threads: usize) -> Self {
        Self { threads }
    }

    /// Every leaf directory at or below `root/relative`, sorted.
    pub fn find_leaf_directories(
        &self,
        root: &Path,
        relative: &str,
    ) -> Result<Vec<PathBuf>, ScanError> {
        let start = resolve(root, relative);
        let metadata = std::fs::metadata(&start).map_err(|e| ScanError::io(&start, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory { path: start });
        }

        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&start)
            .parallelism(parallelism)
            .skip_hidden(true)
            .follow_links(false)
            .sort(true);

        let mut directories = Vec::new();
        let mut parents = HashSet::new();

        for entry_result in walker {
            let entry = entry_result.map_err(|err| walk_error(&err, &start))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if entry.depth() > 0 {
                if let Some(parent) = path.parent() {
                    parents.insert(parent.to_path_buf());
                }
            }
            directories.push(path);
        }

        let mut leaves: Vec<PathBuf> = directories
            .into_iter()
            .filter(|dir| !parents.contains(dir))
            .collect();
        leaves.sort();

        debug!(root = %start.display(), leaves = leaves.len(), "found leaf directories");
        Ok(leaves)
    }
}

fn walk_error(err: &jwalk::Error, fallback: &Path) -> ScanError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let kind = err
        .io_error()
        .map(std::io::Error::kind)
        .unwrap_or(std::io::ErrorKind::Other);
    ScanError::io(path, std::io::Error::new(kind, err.to_string()))
}

/// Regular, non-hidden files directly inside `dir`, in name order.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| ScanError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ScanError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Join a request path such as `/2024/summer` onto a root.
pub fn resolve(root: &Path, relative: &str) -> PathBuf {
    let relative = relative.trim_matches('/');
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

/// `/`-separated path of `path` relative to `root`, always starting with `/`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(Path::new(""));
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", parts.join("/"))
}

/// Relative path of the directory holding `file`.
pub fn relative_directory(root: &Path, file: &Path) -> String {
    match file.parent() {
        Some(parent) => relative_path(root, parent),
        None => "/".to_string(),
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // TempDir names start with a dot, so fixtures live one level down.
    fn create_test_tree() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("photos");

        fs::create_dir_all(root.join("2023/winter")).unwrap();
        fs::create_dir_all(root.join("2024/summer")).unwrap();
        fs::create_dir_all(root.join("2024/autumn/.thumbnails")).unwrap();
        fs::create_dir_all(root.join(".cache/deep")).unwrap();

        fs::write(root.join("2023/winter/a.jpg"), "a").unwrap();
        fs::write(root.join("2024/summer/b.jpg"), "b").unwrap();
        fs::write(root.join("2024/notes.txt"), "n").unwrap();

        (temp, root)
    }

    #[test]
    fn test_finds_leaves_sorted() {
        let (_temp, root) = create_test_tree();
        let root = root.as_path();

        let leaves = DirectoryWalker::new()
            .find_leaf_directories(root, "/")
            .unwrap();

        assert_eq!(
            leaves,
            vec![
                root.join("2023/winter"),
                root.join("2024/autumn"),
                root.join("2024/summer"),
            ]
        );
    }

    #[test]
    fn test_relative_start() {
        let (_temp, root) = create_test_tree();
        let root = root.as_path();

        let leaves = DirectoryWalker::new()
            .find_leaf_directories(root, "/2024/summer")
            .unwrap();
        assert_eq!(leaves, vec![root.join("2024/summer")]);
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = DirectoryWalker::new()
            .find_leaf_directories(temp.path(), "/nope")
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let (_temp, root) = create_test_tree();
        let err = DirectoryWalker::new()
            .find_leaf_directories(&root, "/2024/notes.txt")
            .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn test_list_files_skips_hidden_and_dirs() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("b.jpg"), "b").unwrap();
        fs::write(dir.join("a.jpg"), "a").unwrap();
        fs::write(dir.join(".DS_Store"), "x").unwrap();
        fs::create_dir(dir.join(".thumbs")).unwrap();

        let files = list_files(dir).unwrap();
        assert_eq!(files, vec![dir.join("a.jpg"), dir.join("b.jpg")]);
    }

    #[test]
    fn test_relative_paths() {
        let root = Path::new("/srv/photos");
        assert_eq!(
            relative_directory(root, Path::new("/srv/photos/2024/summer/a.jpg")),
            "/2024/summer"
        );
        assert_eq!(relative_directory(root, Path::new("/srv/photos/a.jpg")), "/");
        assert_eq!(relative_path(root, Path::new("/srv/photos/2024")), "/2024");
        assert_eq!(resolve(root, "/2024/"), PathBuf::from("/srv/photos/2024"));
        assert_eq!(resolve(root, "/"), PathBuf::from("/srv/photos"));
    }
}
