use crate::features::alias::AliasResolver;
use crate::features::slugline::SluglineParser;
use crate::shared::models::Gender;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    // Name token, optional parenthetical, optional dual-dialogue caret.
    static ref CUE_RE: Regex =
        Regex::new(r"^(?P<name>[A-Z][A-Z0-9 .'\-]+?)\s*(?P<paren>\([^)]*\))?\s*(?P<caret>\^)?$")
            .unwrap();
    static ref PAREN_RE: Regex = Regex::new(r"\s*\([^)]*\)").unwrap();
}

/// One recognized dialogue cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Cue text exactly as written (`BERNARD (V.O.)`).
    pub raw: String,

    /// Normalized, alias-resolved name (`Bernard`).
    pub canonical: String,

    /// 1-based source line of the cue.
    pub line: u32,

    /// Contiguous dialogue lines attributed to this cue.
    pub dialogue_lines: u32,
}

/// Extraction result for one chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterCharacters {
    pub cues: Vec<Cue>,
}

impl ChapterCharacters {
    /// Dialogue-line totals per canonical name.
    pub fn dialogue_totals(&self) -> BTreeMap<String, u32> {
        let mut totals = BTreeMap::new();
        for cue in &self.cues {
            *totals.entry(cue.canonical.clone()).or_insert(0) += cue.dialogue_lines;
        }
        totals
    }

    /// First cue line per canonical name, in cue order.
    pub fn first_cue_lines(&self) -> BTreeMap<String, u32> {
        let mut firsts = BTreeMap::new();
        for cue in &self.cues {
            firsts.entry(cue.canonical.clone()).or_insert(cue.line);
        }
        firsts
    }

    /// Character with the most dialogue lines; ties break alphabetically.
    pub fn top_speaker(&self) -> Option<String> {
        self.dialogue_totals()
            .into_iter()
            .max_by(|(name_a, lines_a), (name_b, lines_b)| {
                lines_a.cmp(lines_b).then(name_b.cmp(name_a))
            })
            .map(|(name, _)| name)
    }
}

/// Scans chapter text for dialogue cues and introduction descriptors.
#[derive(Debug, Clone, Default)]
pub struct CharacterExtractor {
    resolver: AliasResolver,
}

impl CharacterExtractor {
    pub fn new(resolver: AliasResolver) -> Self {
        Self { resolver }
    }

    /// Full single-pass extraction: cues with normalized names and
    /// attributed dialogue counts, in document order.
    pub fn extract(&self, text: &str) -> ChapterCharacters {
        let lines: Vec<&str> = text.lines().collect();
        let mut cues = Vec::new();

        for (idx, raw_line) in lines.iter().enumerate() {
            if Self::cue_shape(raw_line).is_none() {
                continue;
            }

            // A cue precedes a dialogue block: the next line must exist,
            // be non-blank and not open a new scene.
            let next = lines.get(idx + 1).map(|l| l.trim()).unwrap_or("");
            if next.is_empty() || SluglineParser::is_heading(next) {
                continue;
            }

            let mut dialogue_lines = 0u32;
            for follow in &lines[idx + 1..] {
                let trimmed = follow.trim();
                if trimmed.is_empty()
                    || SluglineParser::is_heading(trimmed)
                    || Self::cue_shape(trimmed).is_some()
                {
                    break;
                }
                dialogue_lines += 1;
            }

            let raw = raw_line.trim().to_string();
            let canonical = self.normalize(&raw);
            cues.push(Cue {
                raw,
                canonical,
                line: (idx + 1) as u32,
                dialogue_lines,
            });
        }

        ChapterCharacters { cues }
    }

    /// Raw cue lines and their line numbers, without normalization.
    pub fn extract_cues(&self, text: &str) -> Vec<(String, u32)> {
        self.extract(text)
            .cues
            .into_iter()
            .map(|cue| (cue.raw, cue.line))
            .collect()
    }

    /// Strip suffix markers - `(V.O.)`, `(O.S.)`, `(O.C.)`, `(CONT'D)`, any
    /// other parenthetical, a trailing `^` - then resolve aliases. The
    /// first-seen casing of an unaliased name is its canonical display form.
    pub fn normalize(&self, raw_cue: &str) -> String {
        let stripped = raw_cue.trim().trim_end_matches('^');
        let stripped = PAREN_RE.replace_all(stripped, "");
        let stripped = stripped.trim();

        match self.resolver.resolve(stripped) {
            Some(canonical) => canonical.to_string(),
            None => stripped.to_string(),
        }
    }

    /// Find the gender marker in the character's introduction descriptor:
    /// the first action line matching `NAME (<descriptor>)`, taking the
    /// descriptor's trailing comma-separated token when it is one of
    /// `M`/`F`/`NB`. Anything else is `NS`.
    pub fn detect_gender(text: &str, name: &str) -> Gender {
        let needle = name.to_uppercase();
        if needle.is_empty() {
            return Gender::NotSpecified;
        }

        for line in text.lines() {
            let trimmed = line.trim();
            // Cue lines carry performance notes, not introductions.
            if Self::cue_shape(trimmed).is_some() {
                continue;
            }
            let Some(pos) = trimmed.find(&needle) else {
                continue;
            };
            let after = trimmed[pos + needle.len()..].trim_start();
            let Some(inner) = after.strip_prefix('(') else {
                continue;
            };
            let Some(end) = inner.find(')') else {
                continue;
            };
            let descriptor = &inner[..end];
            let token = descriptor.rsplit(',').next().unwrap_or("").trim();
            return Gender::from_token(token);
        }

        Gender::NotSpecified
    }

    /// Cue shape test: ALL-CAPS name token, optional parenthetical,
    /// optional `^`, nothing else. Headings and transitions are excluded.
    fn cue_shape(line: &str) -> Option<&str> {
        let trimmed = line.trim();
        if trimmed.is_empty() || SluglineParser::is_heading(trimmed) {
            return None;
        }
        let caps = CUE_RE.captures(trimmed)?;
        let name = caps.name("name")?.as_str().trim();
        if name.len() < 2 {
            return None;
        }
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::AliasTable;
    use pretty_assertions::assert_eq;

    const CHAPTER: &str = "\
INT. SYLVIA'S HOUSE - KITCHEN - DAY

SYLVIA PRICE (40s, F) stands at the counter. BERNARD (60s, M) watches.

BERNARD (V.O.)
I never told her about the letters.
Not once in thirty years.

SYLVIA
You should have.

DONNIE (on phone)
Yeah. Yeah, I got it.

CUT TO:

EXT. PALM SPRINGS STREET - NIGHT

MASON (CONT'D)
Keep walking.
";

    #[test]
    fn test_extract_cues_in_order() {
        let extractor = CharacterExtractor::default();
        let cues = extractor.extract_cues(CHAPTER);

        let names: Vec<&str> = cues.iter().map(|(raw, _)| raw.as_str()).collect();
        assert_eq!(
            names,
            vec!["BERNARD (V.O.)", "SYLVIA", "DONNIE (on phone)", "MASON (CONT'D)"]
        );
    }

    #[test]
    fn test_normalize_strips_suffix_markers() {
        let extractor = CharacterExtractor::default();
        assert_eq!(extractor.normalize("BERNARD (V.O.)"), "BERNARD");
        assert_eq!(extractor.normalize("DONNIE (on phone)"), "DONNIE");
        assert_eq!(extractor.normalize("MASON (CONT'D)"), "MASON");
        assert_eq!(extractor.normalize("SYLVIA (O.S.) ^"), "SYLVIA");
        assert_eq!(extractor.normalize("RIVER (O.C.)"), "RIVER");
    }

    #[test]
    fn test_normalize_resolves_aliases() {
        let mut table = AliasTable::new();
        table.insert("Bernard", vec!["BERNIE".to_string(), "BERNARD".to_string()]);
        let (resolver, _) = AliasResolver::build(&table);
        let extractor = CharacterExtractor::new(resolver);

        assert_eq!(extractor.normalize("BERNIE (V.O.)"), "Bernard");
        assert_eq!(extractor.normalize("BERNARD"), "Bernard");
    }

    #[test]
    fn test_dialogue_line_counting() {
        let extractor = CharacterExtractor::default();
        let result = extractor.extract(CHAPTER);

        let totals = result.dialogue_totals();
        assert_eq!(totals["BERNARD"], 2);
        assert_eq!(totals["SYLVIA"], 1);
        assert_eq!(totals["DONNIE"], 1);
        assert_eq!(totals["MASON"], 1);
    }

    #[test]
    fn test_transitions_are_not_cues() {
        let extractor = CharacterExtractor::default();
        let cues = extractor.extract_cues("CUT TO:\n\nBERNARD\nHello.\n");
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].0, "BERNARD");
    }

    #[test]
    fn test_cue_requires_following_dialogue() {
        let extractor = CharacterExtractor::default();
        // Trailing caps line with nothing after it is not a cue.
        let cues = extractor.extract_cues("Some prose.\n\nBERNARD\n");
        assert!(cues.is_empty());
    }

    #[test]
    fn test_detect_gender_from_introduction() {
        assert_eq!(
            CharacterExtractor::detect_gender(CHAPTER, "Sylvia Price"),
            Gender::Female
        );
        assert_eq!(
            CharacterExtractor::detect_gender(CHAPTER, "Bernard"),
            Gender::Male
        );
        // No introduction descriptor anywhere.
        assert_eq!(
            CharacterExtractor::detect_gender(CHAPTER, "Donnie"),
            Gender::NotSpecified
        );
    }

    #[test]
    fn test_detect_gender_nonbinary_and_unparseable() {
        let text = "RIVER (20s, NB) leans against the wall.\nCOLE (rumpled) yawns.";
        assert_eq!(CharacterExtractor::detect_gender(text, "River"), Gender::NonBinary);
        assert_eq!(CharacterExtractor::detect_gender(text, "Cole"), Gender::NotSpecified);
    }

    #[test]
    fn test_first_cue_lines_and_top_speaker() {
        let extractor = CharacterExtractor::default();
        let result = extractor.extract(CHAPTER);

        let firsts = result.first_cue_lines();
        assert_eq!(firsts["BERNARD"], 5);
        assert_eq!(firsts["SYLVIA"], 9);

        assert_eq!(result.top_speaker(), Some("BERNARD".to_string()));
    }
}
