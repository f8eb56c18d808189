//! File categories and MIME type classification.
//!
//! Classification is total: every input, including a missing or blank MIME
//! type, maps to exactly one [`FileCategory`]. Lookup goes through four
//! tiers, first hit wins:
//!
//! 1. a curated table of exact MIME types,
//! 2. the top-level type for `image/*`, `audio/*`, `video/*` and `font/*`,
//! 3. `text/*` as documents,
//! 4. office-suite vendor families as documents and known archive types.
//!
//! Anything left over is [`FileCategory::Unknown`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Closed classification of a catalog entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Archive,
    Audio,
    Binary,
    Data,
    Document,
    Executable,
    Font,
    Icon,
    Image,
    Interactive,
    Thumb,
    Unknown,
    Vector,
    Video,
}

impl FileCategory {
    /// Every category, in catalog order.
    pub const ALL: [FileCategory; 14] = [
        FileCategory::Archive,
        FileCategory::Audio,
        FileCategory::Binary,
        FileCategory::Data,
        FileCategory::Document,
        FileCategory::Executable,
        FileCategory::Font,
        FileCategory::Icon,
        FileCategory::Image,
        FileCategory::Interactive,
        FileCategory::Thumb,
        FileCategory::Unknown,
        FileCategory::Vector,
        FileCategory::Video,
    ];

    /// Classify a MIME type.
    pub fn from_mime(mime: Option<&str>) -> Self {
        let Some(mime) = mime else {
            return Self::Unknown;
        };
        let mime = mime.trim().to_ascii_lowercase();
        if mime.is_empty() {
            return Self::Unknown;
        }

        if let Some(category) = exact_match(&mime) {
            return category;
        }

        let top_level = mime.split('/').next().unwrap_or_default();
        match top_level {
            "image" => return Self::Image,
            "audio" => return Self::Audio,
            "video" => return Self::Video,
            "font" => return Self::Font,
            "text" => return Self::Document,
            _ => {}
        }

        if OFFICE_FAMILIES.iter().any(|family| mime.contains(family)) {
            return Self::Document;
        }
        if ARCHIVE_FAMILIES.contains(&mime.as_str()) {
            return Self::Archive;
        }

        Self::Unknown
    }

    /// Lowercase name used in storage and on the command line.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Audio => "audio",
            Self::Binary => "binary",
            Self::Data => "data",
            Self::Document => "document",
            Self::Executable => "executable",
            Self::Font => "font",
            Self::Icon => "icon",
            Self::Image => "image",
            Self::Interactive => "interactive",
            Self::Thumb => "thumb",
            Self::Unknown => "unknown",
            Self::Vector => "vector",
            Self::Video => "video",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Archive => "(Un)Compressed archive files",
            Self::Audio => "Audio files",
            Self::Binary => "Binary file",
            Self::Data => "Various data files, binary or ascii",
            Self::Document => "Document files",
            Self::Executable => "Executable files including scripts",
            Self::Font => "Font files",
            Self::Icon => "Icon files",
            Self::Image => "Bitmap image files",
            Self::Interactive => "Interactive files (Flash, Shockwave etc)",
            Self::Thumb => "Thumb file",
            Self::Unknown => "Unknown filetype",
            Self::Vector => "Vector image files",
            Self::Video => "Video files",
        }
    }

    /// Whether entries of this category can be stored.
    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

const OFFICE_FAMILIES: [&str; 3] = [
    "application/vnd.ms-",
    "application/vnd.openxmlformats-officedocument.",
    "application/vnd.oasis.opendocument",
];

const ARCHIVE_FAMILIES: [&str; 7] = [
    "application/zip",
    "application/gzip",
    "application/x-bzip2",
    "application/x-7z-compressed",
    "application/x-rar-compressed",
    "application/x-tar",
    "application/x-xz",
];

fn exact_match(mime: &str) -> Option<FileCategory> {
    use FileCategory::*;

    let category = match mime {
        "application/pdf"
        | "application/msword"
        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        | "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        | "application/vnd.ms-excel"
        | "application/vnd.ms-powerpoint"
        | "application/rtf"
        | "application/epub+zip"
        | "application/vnd.oasis.opendocument.text"
        | "application/vnd.oasis.opendocument.spreadsheet"
        | "application/vnd.oasis.opendocument.presentation"
        | "text/plain"
        | "text/markdown"
        | "text/html"
        | "text/rtf" => Document,

        "application/zip"
        | "application/gzip"
        | "application/x-bzip2"
        | "application/x-7z-compressed"
        | "application/x-rar-compressed"
        | "application/x-tar"
        | "application/x-xz" => Archive,

        "application/x-msdownload"
        | "application/x-dosexec"
        | "application/x-executable"
        | "application/x-sharedlib"
        | "application/x-msi"
        | "application/vnd.android.package-archive"
        | "application/java-archive"
        | "application/x-sh"
        | "text/x-shellscript"
        | "application/x-bat" => Executable,

        "application/x-shockwave-flash" | "application/x-director" => Interactive,

        "application/json"
        | "application/xml"
        | "text/xml"
        | "text/csv"
        | "application/csv"
        | "application/x-ndjson"
        | "application/yaml"
        | "text/yaml"
        | "application/x-yaml"
        | "application/vnd.geo+json" => Data,

        "image/svg+xml"
        | "application/postscript"
        | "application/eps"
        | "application/x-eps"
        | "application/vnd.adobe.illustrator" => Vector,

        "image/vnd.microsoft.icon" | "image/x-icon" => Icon,

        "application/font-woff"
        | "application/font-woff2"
        | "application/x-font-ttf"
        | "application/x-font-otf" => Font,

        "application/octet-stream" | "application/x-binary" => Binary,

        "image/x-thumbnail" | "application/x-thumbnail" => Thumb,

        _ => return None,
    };
    Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_required_classifications() {
        assert_eq!(FileCategory::from_mime(Some("image/jpeg")), FileCategory::Image);
        assert_eq!(FileCategory::from_mime(Some("application/zip")), FileCategory::Archive);
        assert_eq!(FileCategory::from_mime(Some("text/plain")), FileCategory::Document);
        assert_eq!(
            FileCategory::from_mime(Some("application/x-shockwave-flash")),
            FileCategory::Interactive
        );
        assert_eq!(FileCategory::from_mime(Some("")), FileCategory::Unknown);
        assert_eq!(FileCategory::from_mime(None), FileCategory::Unknown);
    }

    #[test]
    fn test_exact_table_beats_top_level() {
        // These start with image/ or text/ but live in the curated table.
        assert_eq!(FileCategory::from_mime(Some("image/svg+xml")), FileCategory::Vector);
        assert_eq!(FileCategory::from_mime(Some("image/x-icon")), FileCategory::Icon);
        assert_eq!(FileCategory::from_mime(Some("image/x-thumbnail")), FileCategory::Thumb);
        assert_eq!(FileCategory::from_mime(Some("text/csv")), FileCategory::Data);
        assert_eq!(
            FileCategory::from_mime(Some("text/x-shellscript")),
            FileCategory::Executable
        );
    }

    #[test]
    fn test_trim_and_case() {
        assert_eq!(FileCategory::from_mime(Some("  IMAGE/JPEG ")), FileCategory::Image);
        assert_eq!(FileCategory::from_mime(Some("Application/PDF")), FileCategory::Document);
        assert_eq!(FileCategory::from_mime(Some("   ")), FileCategory::Unknown);
    }

    #[test]
    fn test_fallback_tiers() {
        assert_eq!(FileCategory::from_mime(Some("video/x-matroska")), FileCategory::Video);
        assert_eq!(FileCategory::from_mime(Some("audio/flac")), FileCategory::Audio);
        assert_eq!(FileCategory::from_mime(Some("font/ttf")), FileCategory::Font);
        assert_eq!(FileCategory::from_mime(Some("text/x-rust")), FileCategory::Document);
        assert_eq!(
            FileCategory::from_mime(Some("application/vnd.ms-word.document.macroenabled.12")),
            FileCategory::Document
        );
        assert_eq!(
            FileCategory::from_mime(Some("application/vnd.oasis.opendocument.graphics")),
            FileCategory::Document
        );
        assert_eq!(
            FileCategory::from_mime(Some("application/x-unheard-of")),
            FileCategory::Unknown
        );
        assert_eq!(FileCategory::from_mime(Some("nonsense")), FileCategory::Unknown);
    }

    #[test]
    fn test_classification_is_idempotent() {
        for mime in ["image/png", "application/json", "", "garbage/", "/"] {
            let first = FileCategory::from_mime(Some(mime));
            let second = FileCategory::from_mime(Some(mime));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for category in FileCategory::iter() {
            assert_eq!(category.to_string(), category.short_name());
            assert_eq!(FileCategory::from_str(category.short_name()).unwrap(), category);
            assert!(!category.description().is_empty());
        }
        assert_eq!(FileCategory::ALL.len(), FileCategory::iter().count());
    }
}
