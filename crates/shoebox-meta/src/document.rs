//! Grouped metadata documents.
//!
//! The metadata tool reports tags grouped by family-1 group name
//! (`File`, `ExifIFD`, `XMP-dc`, `Composite`, ...). A [`MetadataDocument`]
//! keeps that shape and offers ordered lookups over `(group, keys)` lists:
//! the first location that holds a usable value wins.

use serde_json::{Map, Value};

use shoebox_core::MetadataFact;

/// Ordered lookup locations: each group with the keys to try in it.
pub type Locations<'a> = &'a [(&'a str, &'a [&'a str])];

/// One file's metadata, grouped as group → key → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDocument {
    root: Map<String, Value>,
}

impl MetadataDocument {
    /// Parse tool output. A top-level array contributes its first element;
    /// anything that is not an object yields an empty document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let value = match value {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// True when no group object is present.
    pub fn is_empty(&self) -> bool {
        !self.root.values().any(Value::is_object)
    }

    /// Names of the groups present.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.root
            .iter()
            .filter(|(_, value)| value.is_object())
            .map(|(name, _)| name.as_str())
    }

    /// Raw value of `group:key`.
    pub fn get(&self, group: &str, key: &str) -> Option<&Value> {
        self.root.get(group)?.as_object()?.get(key)
    }

    /// Value of `key` in whichever group has it first.
    pub fn find_any(&self, key: &str) -> Option<&Value> {
        self.root
            .values()
            .filter_map(Value::as_object)
            .find_map(|group| group.get(key))
    }

    /// Trimmed, non-empty text of `group:key`.
    pub fn string(&self, group: &str, key: &str) -> Option<String> {
        self.get(group, key).and_then(value_to_string)
    }

    /// First non-empty text value across `locations`.
    pub fn first_string(&self, locations: Locations<'_>) -> Option<String> {
        locations.iter().find_map(|(group, keys)| {
            keys.iter().find_map(|key| self.string(group, key))
        })
    }

    /// First numeric value across `locations`. Numeric strings count.
    pub fn first_number(&self, locations: Locations<'_>) -> Option<f64> {
        locations.iter().find_map(|(group, keys)| {
            keys.iter()
                .find_map(|key| self.get(group, key).and_then(value_to_number))
        })
    }

    /// First list across `locations`; a scalar value counts as a list of
    /// one. Blank items are dropped.
    pub fn first_list(&self, locations: Locations<'_>) -> Vec<String> {
        for (group, keys) in locations {
            for key in keys.iter() {
                let items: Vec<String> = match self.get(group, key) {
                    Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
                    Some(value) => value_to_string(value).into_iter().collect(),
                    None => continue,
                };
                if !items.is_empty() {
                    return items;
                }
            }
        }
        Vec::new()
    }

    /// One fact per leaf key of every group. Top-level scalars such as
    /// `SourceFile` are not groups and are skipped.
    pub fn facts(&self) -> Vec<MetadataFact> {
        self.root
            .iter()
            .filter_map(|(group, value)| value.as_object().map(|tags| (group, tags)))
            .flat_map(|(group, tags)| {
                tags.iter().filter_map(move |(key, value)| {
                    fact_value(value).map(|text| MetadataFact::new(group.as_str(), key.as_str(), text))
                })
            })
            .collect()
    }

    /// The document as compact JSON.
    pub fn to_json(&self) -> String {
        Value::Object(self.root.clone()).to_string()
    }
}

/// Text form of a JSON value: strings trimmed, numbers and booleans
/// printed, arrays joined with `, `. Null and blank give `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Numeric form of a JSON value. Strings are parsed after trimming.
pub fn value_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn fact_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => value_to_string(other).or_else(|| Some(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MetadataDocument {
        MetadataDocument::from_value(json!([{
            "SourceFile": "/srv/photos/a.jpg",
            "File": { "MIMEType": "image/jpeg", "FileSize": 1234 },
            "XMP-dc": { "Subject": ["aurora", " ", "lapland"], "Creator": "  Maija  " },
            "IPTC": { "Keywords": "single" }
        }]))
    }

    #[test]
    fn test_array_wrapper_is_unwrapped() {
        let doc = sample();
        assert!(!doc.is_empty());
        let mut groups: Vec<_> = doc.groups().collect();
        groups.sort_unstable();
        assert_eq!(groups, vec!["File", "IPTC", "XMP-dc"]);
    }

    #[test]
    fn test_lookups() {
        let doc = sample();
        assert_eq!(doc.string("File", "MIMEType").as_deref(), Some("image/jpeg"));
        assert_eq!(doc.string("File", "FileSize").as_deref(), Some("1234"));
        assert_eq!(
            doc.first_string(&[("XMP", &["Creator"]), ("XMP-dc", &["Creator"])]).as_deref(),
            Some("Maija")
        );
        assert_eq!(doc.first_number(&[("File", &["FileSize"])]), Some(1234.0));
        assert_eq!(doc.find_any("Keywords"), Some(&json!("single")));
    }

    #[test]
    fn test_lists() {
        let doc = sample();
        assert_eq!(
            doc.first_list(&[("XMP-dc", &["Subject"])]),
            vec!["aurora".to_string(), "lapland".to_string()]
        );
        assert_eq!(doc.first_list(&[("IPTC", &["Keywords"])]), vec!["single".to_string()]);
        assert!(doc.first_list(&[("XMP", &["Subject"])]).is_empty());
    }

    #[test]
    fn test_facts_skip_top_level_scalars() {
        let facts = sample().facts();
        assert!(facts.iter().all(|f| f.key != "SourceFile"));
        assert!(facts.contains(&MetadataFact::new("File", "FileSize", "1234")));
        assert!(facts.contains(&MetadataFact::new("IPTC", "Keywords", "single")));
        assert_eq!(facts.len(), 5);
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(MetadataDocument::from_json("[]").unwrap().is_empty());
        assert!(MetadataDocument::from_json("42").unwrap().is_empty());
        assert!(MetadataDocument::from_json("not json").is_err());
    }
}
