//! Chapter input model
//!
//! The file-discovery collaborator hands over already-read text per
//! chapter file; the orchestrator never touches storage. Chapter numbers
//! are fixed at construction so occurrence ordering stays deterministic
//! regardless of worker completion order.

use std::collections::BTreeMap;

/// Raw text of one chapter, or the reason it could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterText {
    Ready(String),
    Unreadable(String),
}

/// One chapter source handed to a rebuild pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSource {
    pub file: String,
    pub number: u32,
    pub text: ChapterText,
}

impl ChapterSource {
    pub fn ready<S: Into<String>, T: Into<String>>(file: S, number: u32, text: T) -> Self {
        Self {
            file: file.into(),
            number,
            text: ChapterText::Ready(text.into()),
        }
    }

    pub fn unreadable<S: Into<String>, T: Into<String>>(file: S, number: u32, detail: T) -> Self {
        Self {
            file: file.into(),
            number,
            text: ChapterText::Unreadable(detail.into()),
        }
    }

    pub fn readable_text(&self) -> Option<&str> {
        match &self.text {
            ChapterText::Ready(text) => Some(text),
            ChapterText::Unreadable(_) => None,
        }
    }
}

/// All chapter sources of one rebuild pass, number-ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterSet {
    sources: Vec<ChapterSource>,
}

impl ChapterSet {
    pub fn new(mut sources: Vec<ChapterSource>) -> Self {
        sources.sort_by_key(|source| source.number);
        Self { sources }
    }

    /// Number chapters 1-based in lexicographic file-name order.
    pub fn from_texts(texts: BTreeMap<String, String>) -> Self {
        let sources = texts
            .into_iter()
            .enumerate()
            .map(|(idx, (file, text))| ChapterSource::ready(file, (idx + 1) as u32, text))
            .collect();
        Self { sources }
    }

    /// Like [`from_texts`](Self::from_texts), but a failed read becomes an
    /// unreadable source instead of being dropped.
    pub fn from_results(texts: BTreeMap<String, Result<String, String>>) -> Self {
        let sources = texts
            .into_iter()
            .enumerate()
            .map(|(idx, (file, result))| {
                let number = (idx + 1) as u32;
                match result {
                    Ok(text) => ChapterSource::ready(file, number, text),
                    Err(detail) => ChapterSource::unreadable(file, number, detail),
                }
            })
            .collect();
        Self { sources }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChapterSource> {
        self.sources.iter()
    }

    /// Readable sources with their text, number-ascending.
    pub fn readable(&self) -> impl Iterator<Item = (&ChapterSource, &str)> {
        self.sources
            .iter()
            .filter_map(|source| source.readable_text().map(|text| (source, text)))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_texts_numbers_lexicographically() {
        let mut texts = BTreeMap::new();
        texts.insert("chapter-02.md".to_string(), "two".to_string());
        texts.insert("chapter-01.md".to_string(), "one".to_string());

        let set = ChapterSet::from_texts(texts);
        let numbered: Vec<(&str, u32)> = set
            .iter()
            .map(|source| (source.file.as_str(), source.number))
            .collect();
        assert_eq!(numbered, vec![("chapter-01.md", 1), ("chapter-02.md", 2)]);
    }

    #[test]
    fn test_new_sorts_by_number() {
        let set = ChapterSet::new(vec![
            ChapterSource::ready("b.md", 2, "b"),
            ChapterSource::ready("a.md", 1, "a"),
        ]);
        assert_eq!(set.iter().next().unwrap().number, 1);
    }

    #[test]
    fn test_readable_skips_unreadable() {
        let mut texts = BTreeMap::new();
        texts.insert("chapter-01.md".to_string(), Ok("one".to_string()));
        texts.insert(
            "chapter-02.md".to_string(),
            Err("invalid UTF-8".to_string()),
        );

        let set = ChapterSet::from_results(texts);
        assert_eq!(set.len(), 2);
        let readable: Vec<&str> = set.readable().map(|(_, text)| text).collect();
        assert_eq!(readable, vec!["one"]);
    }
}
