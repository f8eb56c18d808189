//! Metadata tool boundary and its exiftool adapter.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::document::{MetadataDocument, value_to_number, value_to_string};
use crate::error::ExtractError;

/// Flat tag → value answer to a targeted lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagValues(Map<String, Value>);

impl TagValues {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, tag: &str) -> Option<&Value> {
        self.0.get(tag)
    }

    pub fn string(&self, tag: &str) -> Option<String> {
        self.get(tag).and_then(value_to_string)
    }

    pub fn number(&self, tag: &str) -> Option<f64> {
        self.get(tag).and_then(value_to_number)
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: Value) {
        self.0.insert(tag.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads embedded metadata from files.
pub trait MetadataExtractor: Send + Sync {
    /// Full grouped metadata document for a file.
    fn extract(&self, path: &Path) -> Result<MetadataDocument, ExtractError>;

    /// Just the named tags, ungrouped. Missing tags are absent from the
    /// answer rather than an error.
    fn extract_tags(&self, path: &Path, tags: &[&str]) -> Result<TagValues, ExtractError>;
}

/// Runs the `exiftool` program with a per-invocation time limit.
pub struct ExifTool {
    program: String,
    timeout: Duration,
    runtime: Runtime,
}

impl ExifTool {
    /// Create an adapter for `program`.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Result<Self, ExtractError> {
        let program = program.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ExtractError::Spawn {
                program: program.clone(),
                source,
            })?;
        Ok(Self {
            program,
            timeout,
            runtime,
        })
    }

    /// Run the tool on one file and return its stdout.
    fn run(&self, path: &Path, args: &[&str]) -> Result<String, ExtractError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %self.program, ?args, path = %path.display(), "running metadata tool");

        let output = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, command.output()).await })
            .map_err(|_| ExtractError::Timeout {
                path: path.to_path_buf(),
                timeout: self.timeout,
            })?
            .map_err(|source| ExtractError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        // exiftool exits non-zero for files it only partly understood but
        // still prints JSON; only give up when there is nothing to read.
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Failed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

impl MetadataExtractor for ExifTool {
    fn extract(&self, path: &Path) -> Result<MetadataDocument, ExtractError> {
        let stdout = self.run(
            path,
            &["-j", "-a", "-u", "-ee", "-api", "RequestAll=3", "-g1", "-J"],
        )?;
        parse_document(path, &stdout)
    }

    fn extract_tags(&self, path: &Path, tags: &[&str]) -> Result<TagValues, ExtractError> {
        let mut args = vec!["-j".to_string()];
        args.extend(tags.iter().map(|tag| format!("-{tag}")));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let stdout = self.run(path, &args)?;
        parse_tag_values(path, &stdout)
    }
}

fn parse_document(path: &Path, stdout: &str) -> Result<MetadataDocument, ExtractError> {
    let document = MetadataDocument::from_json(stdout).map_err(|source| ExtractError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(message) = document.string("ExifTool", "Error") {
        warn!(path = %path.display(), %message, "metadata tool reported an error");
        return Err(ExtractError::Rejected {
            path: path.to_path_buf(),
            message,
        });
    }
    if document.is_empty() {
        return Err(ExtractError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(document)
}

fn parse_tag_values(path: &Path, stdout: &str) -> Result<TagValues, ExtractError> {
    let value: Value = serde_json::from_str(stdout).map_err(|source| ExtractError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let values = match value {
        Value::Array(items) => items.into_iter().next(),
        other => Some(other),
    };
    match values {
        Some(Value::Object(mut map)) => {
            map.remove("SourceFile");
            Ok(TagValues::new(map))
        }
        _ => Ok(TagValues::default()),
    }
}
