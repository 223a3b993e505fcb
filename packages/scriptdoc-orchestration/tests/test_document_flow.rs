//! Decode → rebuild → encode flow, the way the host application drives a
//! persisted project: collaborators read the file and the chapter texts,
//! the core does everything in between, the serialized result goes back
//! to storage.

use pretty_assertions::assert_eq;
use scriptdoc_core::{decode, encode};
use scriptdoc_orchestration::{ChapterSet, RebuildOrchestrator};
use std::collections::BTreeMap;

const PROJECT_TEXT: &str = "\
---
type: project
schemaVersion: '1.0'
title: Dust and Light
shortTitle: Dust
author: R. Alvarez
created: 2025-03-01T10:00:00Z
updated: 2025-06-15
intent: A story told in letters nobody sent.
audioExport:
  format: wav
  sampleRate: 44100
appSettings:
  theme: dark
---

Working notes: the cemetery scene still needs a second pass.
";

const CHAPTER: &str = "\
EXT. PALM SPRINGS STREET - NIGHT

DONNIE (20s, M) jogs across the street.

DONNIE
Tell her I found the box.
";

#[test]
fn test_decode_rebuild_encode_preserves_curated_content() {
    let (doc, body) = decode(PROJECT_TEXT).unwrap();

    let mut texts = BTreeMap::new();
    texts.insert("chapter-01.md".to_string(), CHAPTER.to_string());
    let chapters = ChapterSet::from_texts(texts);

    let orchestrator = RebuildOrchestrator::new();
    let (rebuilt, report) = orchestrator.rebuild_all(&doc, &chapters).unwrap();
    assert!(report.warnings.is_empty());

    // Derived sections appeared.
    assert!(rebuilt.files.is_some());
    assert!(rebuilt.scenes.is_some());
    assert_eq!(rebuilt.characters.as_ref().unwrap().list[0].name, "DONNIE");

    // Curated content never touched by any stage.
    assert_eq!(rebuilt.intent, doc.intent);
    assert_eq!(rebuilt.audio_export, doc.audio_export);
    assert_eq!(rebuilt.extensions, doc.extensions);

    // Serialize and read back: everything round-trips.
    let text = encode(&rebuilt, &body).unwrap();
    let (reread, reread_body) = decode(&text).unwrap();
    assert_eq!(reread, rebuilt);
    assert_eq!(reread_body, body);
    assert_eq!(
        reread_body,
        "Working notes: the cemetery scene still needs a second pass."
    );
}

#[test]
fn test_raw_codec_works_on_unsupported_versions() {
    let text = PROJECT_TEXT.replace("schemaVersion: '1.0'", "schemaVersion: '3.1'");
    let (doc, body) = decode(&text).unwrap();
    assert_eq!(doc.schema_version, "3.1");

    // Readable but unrebuildable.
    let orchestrator = RebuildOrchestrator::new();
    assert!(orchestrator
        .rebuild_all(&doc, &ChapterSet::default())
        .is_err());

    // Parse/serialize still succeed.
    let reencoded = encode(&doc, &body).unwrap();
    let (again, _) = decode(&reencoded).unwrap();
    assert_eq!(again, doc);
}
