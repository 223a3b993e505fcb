use super::schema::{self, DELIMITER, FIELDS};
use crate::shared::models::{FormatError, FrontMatterDocument, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Mapping;
use std::collections::HashMap;
use tracing::debug;

/// Split a document text into the typed front matter and the body prose.
///
/// The body is everything after the second delimiter line, trimmed of
/// leading and trailing blank lines. Unknown top-level keys are preserved
/// in the extension map in source order.
pub fn decode(text: &str) -> Result<(FrontMatterDocument, String)> {
    let lines: Vec<&str> = text.lines().collect();

    let first = lines
        .iter()
        .position(|line| is_delimiter(line))
        .ok_or(FormatError::MissingDelimiters)?;
    let second = lines[first + 1..]
        .iter()
        .position(|line| is_delimiter(line))
        .map(|offset| first + 1 + offset)
        .ok_or(FormatError::MissingDelimiters)?;

    let front = lines[first + 1..second].join("\n");
    let body = trim_blank_lines(&lines[second + 1..]);

    let mapping: Mapping = if front.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(&front).map_err(FormatError::malformed)?
    };

    let mut known: HashMap<String, Value> = HashMap::new();
    let mut extensions: Vec<(String, Value)> = Vec::new();
    for (key, value) in mapping {
        let key = key
            .as_str()
            .ok_or_else(|| FormatError::malformed("non-string top-level key"))?
            .to_string();
        if schema::is_known_key(&key) {
            known.insert(key, value);
        } else {
            debug!(section = %key, "preserving extension section");
            extensions.push((key, value));
        }
    }

    // Required fields are checked in schema order, so the first missing
    // one is the one reported.
    for field in FIELDS {
        if field.required && !known.contains_key(field.key) {
            return Err(FormatError::MissingRequiredField(field.key.to_string()));
        }
    }

    let document = FrontMatterDocument {
        doc_type: take_field(&mut known, "type")?,
        schema_version: take_field(&mut known, "schemaVersion")?,
        title: take_field(&mut known, "title")?,
        short_title: take_field(&mut known, "shortTitle")?,
        author: take_field(&mut known, "author")?,
        created: take_field(&mut known, "created")?,
        updated: take_field(&mut known, "updated")?,
        intent: take_optional(&mut known, "intent")?,
        files: take_optional(&mut known, "files")?,
        characters: take_optional(&mut known, "characters")?,
        voices: take_optional(&mut known, "voices")?,
        scenes: take_optional(&mut known, "scenes")?,
        audio_export: take_optional(&mut known, "audioExport")?,
        status: take_optional(&mut known, "status")?,
        extensions,
    };

    Ok((document, body))
}

/// Serialize the document back to text: delimiter, fields in schema order
/// (absent optional sections omitted, never written as null), extensions
/// in insertion order, delimiter, then the body separated by exactly one
/// blank line when non-empty.
pub fn encode(document: &FrontMatterDocument, body: &str) -> Result<String> {
    let mut mapping = Mapping::new();

    for field in FIELDS {
        if let Some(value) = field_value(document, field.key)? {
            mapping.insert(Value::String(field.key.to_string()), value);
        }
    }
    for (key, value) in &document.extensions {
        mapping.insert(Value::String(key.clone()), value.clone());
    }

    let yaml = serde_yaml::to_string(&mapping).map_err(FormatError::malformed)?;

    let mut text = String::with_capacity(yaml.len() + body.len() + 16);
    text.push_str(DELIMITER);
    text.push('\n');
    text.push_str(&yaml);
    text.push_str(DELIMITER);
    text.push('\n');

    if !body.is_empty() {
        text.push('\n');
        text.push_str(body);
        if !body.ends_with('\n') {
            text.push('\n');
        }
    }

    Ok(text)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\r') == DELIMITER
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map(|idx| idx + 1)
        .unwrap_or(start);
    lines[start..end].join("\n")
}

fn take_field<T: DeserializeOwned>(
    known: &mut HashMap<String, Value>,
    key: &str,
) -> Result<T> {
    let value = known
        .remove(key)
        .ok_or_else(|| FormatError::MissingRequiredField(key.to_string()))?;
    decode_value(value, key)
}

fn take_optional<T: DeserializeOwned>(
    known: &mut HashMap<String, Value>,
    key: &str,
) -> Result<Option<T>> {
    match known.remove(key) {
        Some(value) => decode_value(value, key).map(Some),
        None => Ok(None),
    }
}

fn decode_value<T: DeserializeOwned>(value: Value, key: &str) -> Result<T> {
    serde_yaml::from_value(value)
        .map_err(|e| FormatError::malformed(format!("field '{}': {}", key, e)))
}

fn encode_value<T: Serialize>(value: &T, key: &str) -> Result<Value> {
    serde_yaml::to_value(value)
        .map_err(|e| FormatError::malformed(format!("field '{}': {}", key, e)))
}

fn field_value(document: &FrontMatterDocument, key: &str) -> Result<Option<Value>> {
    let value = match key {
        "type" => Some(encode_value(&document.doc_type, key)?),
        "schemaVersion" => Some(encode_value(&document.schema_version, key)?),
        "title" => Some(encode_value(&document.title, key)?),
        "shortTitle" => Some(encode_value(&document.short_title, key)?),
        "author" => Some(encode_value(&document.author, key)?),
        "created" => Some(encode_value(&document.created, key)?),
        "updated" => Some(encode_value(&document.updated, key)?),
        "intent" => document
            .intent
            .as_ref()
            .map(|v| encode_value(v, key))
            .transpose()?,
        "files" => document
            .files
            .as_ref()
            .map(|v| encode_value(v, key))
            .transpose()?,
        "characters" => document
            .characters
            .as_ref()
            .map(|v| encode_value(v, key))
            .transpose()?,
        "voices" => document
            .voices
            .as_ref()
            .map(|v| encode_value(v, key))
            .transpose()?,
        "scenes" => document
            .scenes
            .as_ref()
            .map(|v| encode_value(v, key))
            .transpose()?,
        "audioExport" => document.audio_export.clone(),
        "status" => document
            .status
            .as_ref()
            .map(|v| encode_value(v, key))
            .transpose()?,
        _ => None,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{
        ChapterEntry, ChapterList, ChapterStatus, FilesSection, StatusSection,
    };
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = "\
---
type: project
schemaVersion: '1.0'
title: Dust and Light
shortTitle: Dust
author: R. Alvarez
created: 2025-03-01T10:00:00Z
updated: 2025-06-15
intent: A story told in letters.
files:
  chapters:
    items:
    - file: chapter-01.md
      focus: Bernard
      status: complete
appSettings:
  theme: dark
---

Notes about the draft live here.
";

    #[test]
    fn test_decode_fixture() {
        let (doc, body) = decode(FIXTURE).unwrap();

        assert_eq!(doc.doc_type, "project");
        assert_eq!(doc.schema_version, "1.0");
        assert_eq!(doc.title, "Dust and Light");
        assert_eq!(doc.short_title, "Dust");
        assert_eq!(doc.intent.as_deref(), Some("A story told in letters."));
        assert_eq!(body, "Notes about the draft live here.");

        let files = doc.files.as_ref().unwrap();
        assert_eq!(files.chapters.items.len(), 1);
        assert_eq!(files.chapters.items[0].file, "chapter-01.md");
        assert_eq!(files.chapters.items[0].status, ChapterStatus::Complete);

        // Unknown section preserved, typed-decodable on demand.
        assert_eq!(doc.extensions.len(), 1);
        assert_eq!(doc.extensions[0].0, "appSettings");
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(
            decode("type: project\n").unwrap_err(),
            FormatError::MissingDelimiters
        );
        assert_eq!(
            decode("---\ntype: project\n").unwrap_err(),
            FormatError::MissingDelimiters
        );
    }

    #[test]
    fn test_missing_required_field() {
        let text = "---\ntype: project\nschemaVersion: '1.0'\n---\n";
        assert_eq!(
            decode(text).unwrap_err(),
            FormatError::MissingRequiredField("title".to_string())
        );
    }

    #[test]
    fn test_malformed_structure() {
        let text = "---\n- just\n- a\n- list\n---\n";
        assert!(matches!(
            decode(text).unwrap_err(),
            FormatError::MalformedStructure(_)
        ));

        // Wrong type inside a known field.
        let text = "\
---
type: project
schemaVersion: '1.0'
title: T
shortTitle: T
author: A
created: 2025-03-01T10:00:00Z
updated: not-a-date
---
";
        let err = decode(text).unwrap_err();
        assert!(matches!(err, FormatError::MalformedStructure(ref d) if d.contains("updated")));
    }

    #[test]
    fn test_roundtrip_with_sections_and_extensions() {
        let (doc, body) = decode(FIXTURE).unwrap();
        let encoded = encode(&doc, &body).unwrap();
        let (doc2, body2) = decode(&encoded).unwrap();

        assert_eq!(doc2, doc);
        assert_eq!(body2, body);
    }

    #[test]
    fn test_absent_sections_are_omitted() {
        let mut doc = FrontMatterDocument::empty("T", "S", "A");
        doc.status = Some(StatusSection {
            phase: "drafting".to_string(),
            chapters_complete: 1,
            chapters_total: 3,
            threads: vec!["Who sent the last letter?".to_string()],
            rebuilt: None,
        });

        let text = encode(&doc, "").unwrap();
        assert!(!text.contains("voices"));
        assert!(!text.contains("intent"));
        assert!(!text.contains("null"));
        assert!(text.contains("status:"));
    }

    #[test]
    fn test_body_separated_by_one_blank_line() {
        let doc = FrontMatterDocument::empty("T", "S", "A");
        let text = encode(&doc, "Body prose.").unwrap();
        assert!(text.ends_with("---\n\nBody prose.\n"));

        let empty = encode(&doc, "").unwrap();
        assert!(empty.ends_with("---\n"));
        assert!(!empty.ends_with("\n\n"));
    }

    #[test]
    fn test_field_order_is_stable() {
        let mut doc = FrontMatterDocument::empty("T", "S", "A");
        doc.files = Some(FilesSection {
            chapters: ChapterList {
                rebuilt: None,
                items: vec![ChapterEntry {
                    file: "chapter-01.md".to_string(),
                    focus: None,
                    intent: None,
                    status: ChapterStatus::Incomplete,
                }],
            },
        });

        let text = encode(&doc, "").unwrap();
        let type_pos = text.find("type:").unwrap();
        let version_pos = text.find("schemaVersion:").unwrap();
        let files_pos = text.find("files:").unwrap();
        assert!(type_pos < version_pos);
        assert!(version_pos < files_pos);
    }
}
