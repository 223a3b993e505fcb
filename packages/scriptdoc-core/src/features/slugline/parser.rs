use crate::features::alias::AliasResolver;
use crate::shared::models::{AreaKey, Lighting};
use crate::shared::text::title_case;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Token alternation is ordered longest-first so INT/EXT wins over INT.
    static ref HEADING_RE: Regex =
        Regex::new(r"^\s*(INT/EXT|I/E|INT|EXT|EST)\.\s*(.*)$").unwrap();
    static ref TRAILING_PAREN_RE: Regex = Regex::new(r"\s*\([^)]*\)\s*$").unwrap();
}

/// What kind of heading a line turned out to be. Establishing shots are
/// tagged distinctly so callers route them to shot linking, never into the
/// normal scene table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SluglineKind {
    Scene(Lighting),
    Establishing,
}

/// One parsed scene heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slugline {
    pub kind: SluglineKind,

    /// Alias-resolved location display name.
    pub location: String,

    pub area: AreaKey,

    /// Time-of-day token with any trailing parenthetical stripped; empty
    /// when the heading carried no time segment.
    pub time: String,
}

impl Slugline {
    pub fn is_establishing(&self) -> bool {
        matches!(self.kind, SluglineKind::Establishing)
    }
}

/// Parses one line into a heading or nothing. Holds the location resolver
/// so every parsed location comes out canonical.
#[derive(Debug, Clone, Default)]
pub struct SluglineParser {
    resolver: AliasResolver,
}

impl SluglineParser {
    pub fn new(resolver: AliasResolver) -> Self {
        Self { resolver }
    }

    /// Cheap shape check without alias resolution, for callers that only
    /// need a scene-boundary test (dialogue counting, cue detection).
    pub fn is_heading(line: &str) -> bool {
        HEADING_RE.is_match(line)
    }

    /// `None` means "not a scene heading" - that is not an error; most
    /// lines of a chapter are prose or dialogue.
    pub fn parse(&self, line: &str) -> Option<Slugline> {
        let caps = HEADING_RE.captures(line)?;

        let kind = match &caps[1] {
            "INT" => SluglineKind::Scene(Lighting::Int),
            "EXT" => SluglineKind::Scene(Lighting::Ext),
            "INT/EXT" | "I/E" => SluglineKind::Scene(Lighting::IntExt),
            "EST" => SluglineKind::Establishing,
            _ => unreachable!("token set fixed by HEADING_RE"),
        };

        let rest = caps[2].trim();
        let segments: Vec<&str> = rest.split(" - ").collect();

        let raw_location = segments[0].trim();
        let location = match self.resolver.resolve(raw_location) {
            Some(canonical) => canonical.to_string(),
            None => title_case(raw_location),
        };

        let (area, raw_time) = match segments.len() {
            1 => (AreaKey::Default, ""),
            2 => (AreaKey::Default, segments[1]),
            n => {
                let middle = segments[1..n - 1].join(" - ");
                let middle = middle.trim().to_string();
                let area = if middle.is_empty() {
                    AreaKey::Default
                } else {
                    AreaKey::named(title_case(&middle))
                };
                (area, segments[n - 1])
            }
        };

        // Narrative context like (PRESENT) or (FLASHBACK) is not part of
        // the time token.
        let time = TRAILING_PAREN_RE.replace(raw_time, "").trim().to_string();

        Some(Slugline {
            kind,
            location,
            area,
            time,
        })
    }
}
