//! Category-specific detail extraction.
//!
//! Images are read straight from the grouped document. The other
//! categories look their tags up by name in any group and ask the tool
//! again, once, for whatever the document did not carry.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use shoebox_core::{
    ArchiveDetails, AudioDetails, BinaryDetails, DataDetails, DocumentDetails, EntryDetails,
    ExecutableDetails, FileCategory, FontDetails, IconDetails, ImageDetails, InteractiveDetails,
    ThumbDetails, VectorDetails, VideoDetails,
};

use crate::document::{Locations, MetadataDocument, value_to_string};
use crate::error::ExtractError;
use crate::extractor::{MetadataExtractor, TagValues};

const DEFAULT_COLOR_DEPTH: i64 = 8;
const DEFAULT_DPI: i64 = 72;

const IMAGE_WIDTH: Locations<'static> = &[
    ("SubIFD", &["ImageWidth"]),
    ("IFD0", &["ImageWidth"]),
    ("File", &["ImageWidth"]),
    ("PNG", &["ImageWidth"]),
];
const IMAGE_HEIGHT: Locations<'static> = &[
    ("SubIFD", &["ImageHeight"]),
    ("IFD0", &["ImageHeight"]),
    ("File", &["ImageHeight"]),
    ("PNG", &["ImageHeight"]),
];
const BITS_PER_SAMPLE: Locations<'static> = &[
    ("SubIFD", &["BitsPerSample"]),
    ("IFD0", &["BitsPerSample"]),
    ("File", &["BitsPerSample"]),
    ("PNG", &["BitDepth"]),
];
const X_RESOLUTION: Locations<'static> = &[("SubIFD", &["XResolution"]), ("IFD0", &["XResolution"])];

/// Everything needed to fill in one entry's category details.
pub struct DetailSource<'a> {
    pub document: &'a MetadataDocument,
    pub path: &'a Path,
    pub mime_type: &'a str,
    pub extractor: &'a dyn MetadataExtractor,
}

impl DetailSource<'_> {
    /// Values for `tags`, from the document where present and from a
    /// targeted tool run for the rest.
    fn lookup(&self, tags: &[&str]) -> Result<TagValues, ExtractError> {
        let mut values = TagValues::default();
        let mut missing = Vec::new();
        for tag in tags {
            match self.document.find_any(tag) {
                Some(value) => values.insert(*tag, value.clone()),
                None => missing.push(*tag),
            }
        }

        if !missing.is_empty() {
            debug!(path = %self.path.display(), ?missing, "fetching tags");
            let fetched = self.extractor.extract_tags(self.path, &missing)?;
            for tag in missing {
                if let Some(value) = fetched.get(tag) {
                    values.insert(tag, value.clone());
                }
            }
        }
        Ok(values)
    }

    /// Subtype of the MIME type, lowercased.
    fn subtype(&self) -> String {
        let mime = self.mime_type.trim().to_ascii_lowercase();
        mime.split_once('/')
            .map(|(_, sub)| sub.to_string())
            .unwrap_or(mime)
    }
}

/// Build the detail variant for `category`.
///
/// `Unknown` has no details and yields `None`. A failing tag lookup is
/// returned as an error so the caller can fail the file.
pub fn extract_details(
    category: FileCategory,
    source: &DetailSource<'_>,
) -> Result<Option<EntryDetails>, ExtractError> {
    let details = match category {
        FileCategory::Unknown => return Ok(None),
        FileCategory::Image => EntryDetails::Image(image_details(source.document)),
        FileCategory::Video => {
            let tags = source.lookup(&[
                "ImageWidth",
                "ImageHeight",
                "VideoFrameRate",
                "Duration",
                "VideoCodec",
            ])?;
            EntryDetails::Video(VideoDetails {
                width: integer(&tags, "ImageWidth"),
                height: integer(&tags, "ImageHeight"),
                frame_rate: tags.number("VideoFrameRate"),
                duration: duration(&tags),
                codec: tags.string("VideoCodec"),
            })
        }
        FileCategory::Audio => {
            let tags = source.lookup(&[
                "Duration",
                "AudioBitrate",
                "AudioSampleRate",
                "AudioCodec",
                "AudioChannels",
            ])?;
            EntryDetails::Audio(AudioDetails {
                duration: duration(&tags),
                bit_rate: tags.string("AudioBitrate"),
                sample_rate: integer(&tags, "AudioSampleRate"),
                codec: tags.string("AudioCodec"),
                channels: integer(&tags, "AudioChannels"),
            })
        }
        FileCategory::Document => {
            let tags = source.lookup(&["PageCount", "FileType"])?;
            EntryDetails::Document(DocumentDetails {
                page_count: integer(&tags, "PageCount"),
                format: tags.string("FileType"),
            })
        }
        FileCategory::Vector => {
            let tags = source.lookup(&["ImageWidth", "ImageHeight", "Layers"])?;
            EntryDetails::Vector(VectorDetails {
                width: integer(&tags, "ImageWidth"),
                height: integer(&tags, "ImageHeight"),
                layers: integer(&tags, "Layers"),
            })
        }
        FileCategory::Icon => {
            let tags = source.lookup(&["ImageWidth", "ImageHeight", "Scalable"])?;
            EntryDetails::Icon(IconDetails {
                width: integer(&tags, "ImageWidth"),
                height: integer(&tags, "ImageHeight"),
                scalable: tags.get("Scalable").and_then(boolean).unwrap_or(false),
            })
        }
        FileCategory::Font => {
            let tags = source.lookup(&["FontFamily", "FontWeight", "FontSubfamily"])?;
            EntryDetails::Font(FontDetails {
                family: tags.string("FontFamily"),
                weight: tags.string("FontWeight"),
                style: tags.string("FontSubfamily"),
            })
        }
        FileCategory::Archive => {
            let tags = source.lookup(&[
                "Compression",
                "UncompressedSize",
                "ContentCount",
                "Encrypted",
            ])?;
            EntryDetails::Archive(ArchiveDetails {
                compression: tags.string("Compression"),
                uncompressed_size: integer(&tags, "UncompressedSize"),
                content_count: integer(&tags, "ContentCount"),
                encrypted: tags.get("Encrypted").and_then(boolean),
            })
        }
        FileCategory::Binary => {
            let tags = source.lookup(&["Software"])?;
            let (software_name, software_major_version) = tags
                .string("Software")
                .map(|text| split_software(&text))
                .unwrap_or_default();
            EntryDetails::Binary(BinaryDetails {
                software_name,
                software_major_version,
            })
        }
        FileCategory::Executable => {
            let subtype = source.subtype();
            EntryDetails::Executable(ExecutableDetails {
                operating_systems: operating_systems(&subtype),
                script: matches!(
                    subtype.as_str(),
                    "x-sh" | "x-shellscript" | "x-bat"
                ),
            })
        }
        FileCategory::Interactive => EntryDetails::Interactive(InteractiveDetails {
            technology: match source.subtype().as_str() {
                "x-shockwave-flash" => Some("flash".to_string()),
                "x-director" => Some("shockwave".to_string()),
                _ => None,
            },
        }),
        FileCategory::Data => EntryDetails::Data(DataDetails {
            data_structure: data_structure(&source.subtype()).map(str::to_string),
        }),
        FileCategory::Thumb => EntryDetails::Thumb(ThumbDetails {
            target_entry: None,
            relation_type: Some("thumbnail".to_string()),
        }),
    };
    Ok(Some(details))
}

fn image_details(doc: &MetadataDocument) -> ImageDetails {
    let (width, height) = doc
        .string("Composite", "ImageSize")
        .and_then(|text| parse_image_size(&text))
        .map(|(w, h)| (Some(w), Some(h)))
        .unwrap_or_else(|| {
            (
                doc.first_number(IMAGE_WIDTH).map(|n| n as i64),
                doc.first_number(IMAGE_HEIGHT).map(|n| n as i64),
            )
        });

    ImageDetails {
        width,
        height,
        color_depth: doc
            .first_string(BITS_PER_SAMPLE)
            .and_then(|text| parse_color_depth(&text))
            .unwrap_or(DEFAULT_COLOR_DEPTH),
        dpi: doc
            .first_number(X_RESOLUTION)
            .map(|n| n as i64)
            .unwrap_or(DEFAULT_DPI),
        group_label: doc.string("XMP-xmp", "Label"),
    }
}

/// `4000x3000` or `4000 3000`.
fn parse_image_size(text: &str) -> Option<(i64, i64)> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .or_else(|| text.split_once(' '))?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// Bits per sample; per-channel triplets such as `8 8 8` are summed.
fn parse_color_depth(text: &str) -> Option<i64> {
    let text = text.replace(',', " ");
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() == 3 {
        let channels: Option<Vec<i64>> = parts.iter().map(|p| p.parse().ok()).collect();
        if let Some(channels) = channels {
            return Some(channels.iter().sum());
        }
    }
    let first = parts.first()?;
    first
        .parse::<i64>()
        .ok()
        .or_else(|| first.parse::<f64>().ok().map(|n| n as i64))
}

/// Seconds from `h:mm:ss[.f]`, `mm:ss[.f]`, `N s`, `N sec`, `N seconds`
/// or a bare number. Blank text is zero.
pub fn parse_duration(text: &str) -> Option<f64> {
    let text = text.trim().trim_end_matches("(approx)").trim();
    if text.is_empty() {
        return Some(0.0);
    }

    if text.contains(':') {
        let parts: Vec<f64> = text
            .split(':')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<_>>()?;
        return match parts.as_slice() {
            [h, m, s] => Some(h * 3600.0 + m * 60.0 + s),
            [m, s] => Some(m * 60.0 + s),
            _ => None,
        };
    }

    let number = ["seconds", "sec", "s"]
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .unwrap_or(text);
    number.trim().parse().ok()
}

fn duration(tags: &TagValues) -> Option<f64> {
    match tags.get("Duration")? {
        Value::Number(n) => n.as_f64(),
        other => value_to_string(other).and_then(|text| parse_duration(&text)),
    }
}

fn integer(tags: &TagValues, tag: &str) -> Option<i64> {
    tags.number(tag).map(|n| n as i64)
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `Adobe Photoshop 24.1` → (`Adobe Photoshop`, `24`).
fn split_software(text: &str) -> (Option<String>, Option<String>) {
    match text.rsplit_once(' ') {
        Some((name, version)) if version.starts_with(|c: char| c.is_ascii_digit()) => {
            let major = version.split('.').next().unwrap_or(version);
            (Some(name.trim().to_string()), Some(major.to_string()))
        }
        _ => (Some(text.to_string()), None),
    }
}

fn operating_systems(subtype: &str) -> BTreeSet<String> {
    let systems: &[&str] = match subtype {
        "x-msdownload" | "x-dosexec" | "x-msi" | "x-bat" => &["windows"],
        "x-executable" | "x-sharedlib" => &["linux"],
        "x-sh" | "x-shellscript" => &["linux", "macos"],
        "vnd.android.package-archive" => &["android"],
        "java-archive" => &["linux", "macos", "windows"],
        _ => &[],
    };
    systems.iter().map(|s| s.to_string()).collect()
}

fn data_structure(subtype: &str) -> Option<&'static str> {
    let structure = match subtype {
        "json" => "json",
        "vnd.geo+json" => "geojson",
        "x-ndjson" => "ndjson",
        "xml" => "xml",
        "csv" => "csv",
        "yaml" | "x-yaml" => "yaml",
        _ => return None,
    };
    Some(structure)
}
