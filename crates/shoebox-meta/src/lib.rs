//! Metadata extraction for shoebox.
//!
//! # Overview
//!
//! `shoebox-meta` turns a file into the values the catalog stores:
//!
//! - **Tool boundary**: the [`MetadataExtractor`] trait and its `exiftool`
//!   adapter, run with a per-invocation time limit
//! - **Content sniffing**: the [`MimeProbe`] trait, backed by `infer`
//! - **Field parsing**: capture dates, GPS positions, header fields and
//!   per-category details from the grouped metadata document
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use shoebox_meta::{CommonFields, ExifTool, MetadataExtractor, gps_coordinate};
//!
//! let tool = ExifTool::new("exiftool", Duration::from_secs(60)).unwrap();
//! let doc = tool.extract(Path::new("/srv/photos/aurora.jpg")).unwrap();
//! let fields = CommonFields::from_document(&doc);
//! println!("{:?} at {:?}", fields.original_datetime, gps_coordinate(&doc));
//! ```

mod datetime;
mod details;
mod document;
mod error;
mod extractor;
mod fields;
mod gps;
mod probe;

pub use datetime::{gps_timestamp, parse_capture_datetime};
pub use details::{DetailSource, extract_details, parse_duration};
pub use document::{Locations, MetadataDocument, value_to_number, value_to_string};
pub use error::ExtractError;
pub use extractor::{ExifTool, MetadataExtractor, TagValues};
pub use fields::{CommonFields, document_id, mime_type};
pub use gps::{convert_coordinate, gps_coordinate};
pub use probe::{MagicProbe, MimeProbe};
