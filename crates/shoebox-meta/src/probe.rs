//! Content-based MIME detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::trace;

/// How many leading bytes are inspected for magic numbers.
const SNIFF_LEN: usize = 8192;

/// Detects a file's MIME type from its content.
pub trait MimeProbe: Send + Sync {
    /// `None` when the type cannot be determined.
    fn probe(&self, path: &Path) -> Option<String>;
}

/// Magic-byte detection via `infer`, with an extension table for text
/// formats that carry no signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicProbe;

impl MagicProbe {
    pub fn new() -> Self {
        Self
    }
}

impl MimeProbe for MagicProbe {
    fn probe(&self, path: &Path) -> Option<String> {
        let mut file = File::open(path).ok()?;
        let mut head = Vec::with_capacity(SNIFF_LEN);
        file.by_ref()
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .ok()?;

        if let Some(kind) = infer::get(&head) {
            trace!(path = %path.display(), mime = kind.mime_type(), "magic match");
            return Some(kind.mime_type().to_string());
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_from_extension)
            .map(str::to_string)
    }
}

/// Text-only formats, which have no magic bytes to match.
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "geojson" => "application/vnd.geo+json",
        "ndjson" | "jsonl" => "application/x-ndjson",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "svg" => "image/svg+xml",
        "sh" => "application/x-sh",
        "bat" | "cmd" => "application/x-bat",
        "eps" => "application/postscript",
        _ => return None,
    };
    Some(mime)
}
