use crate::shared::models::{AliasTable, ValidationError};
use std::collections::HashMap;
use tracing::warn;

/// Case-insensitive variant → canonical lookup built from a curated
/// [`AliasTable`].
///
/// A variant claimed by two canonicals is a collision: the first mapping
/// (table iteration order) wins for resolution and the collision is
/// reported to the caller, never silently resolved. Canonical names
/// resolve to themselves, so callers can run every raw name through one
/// `resolve` call.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    index: HashMap<String, String>,
}

impl AliasResolver {
    /// Resolver that maps nothing - for documents without alias tables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Invert the table into a variant index, collecting collisions.
    pub fn build(table: &AliasTable) -> (Self, Vec<ValidationError>) {
        let mut index: HashMap<String, String> = HashMap::new();
        let mut collisions = Vec::new();

        for (canonical, variants) in table.iter() {
            // The canonical spelling is itself resolvable.
            let self_key = canonical.to_lowercase();
            index.entry(self_key).or_insert_with(|| canonical.clone());

            for variant in variants {
                let key = variant.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                match index.get(&key) {
                    Some(existing) if existing != canonical => {
                        warn!(
                            variant = %variant,
                            first = %existing,
                            second = %canonical,
                            "alias collision"
                        );
                        collisions.push(ValidationError::AliasCollision {
                            variant: variant.clone(),
                            first: existing.clone(),
                            second: canonical.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        index.insert(key, canonical.clone());
                    }
                }
            }
        }

        (Self { index }, collisions)
    }

    /// Canonical name for a raw spelling, if the table knows it.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.index
            .get(&raw.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Resolve with a fallback display form for unknown names.
    pub fn resolve_or<'a>(&'a self, raw: &str, fallback: &'a str) -> &'a str {
        self.resolve(raw).unwrap_or(fallback)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::AliasTable;

    fn house_table() -> AliasTable {
        let mut table = AliasTable::new();
        table.insert(
            "Sylvia's House",
            vec!["HOME".to_string(), "HOUSE".to_string()],
        );
        table
    }

    #[test]
    fn test_resolves_variants_case_insensitively() {
        let (resolver, collisions) = AliasResolver::build(&house_table());
        assert!(collisions.is_empty());

        assert_eq!(resolver.resolve("HOME"), Some("Sylvia's House"));
        assert_eq!(resolver.resolve("house"), Some("Sylvia's House"));
        assert_eq!(resolver.resolve("Sylvia's House"), Some("Sylvia's House"));
        assert_eq!(resolver.resolve("CEMETERY"), None);
    }

    #[test]
    fn test_collision_reported_first_mapping_wins() {
        let mut table = house_table();
        table.insert("Bernard's House", vec!["HOME".to_string()]);

        let (resolver, collisions) = AliasResolver::build(&table);

        assert_eq!(collisions.len(), 1);
        assert!(matches!(
            &collisions[0],
            ValidationError::AliasCollision { variant, .. } if variant == "HOME"
        ));
        // BTreeMap iteration order: "Bernard's House" registered HOME first.
        assert_eq!(resolver.resolve("HOME"), Some("Bernard's House"));
    }

    #[test]
    fn test_empty_resolver() {
        let resolver = AliasResolver::empty();
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve("ANYTHING"), None);
        assert_eq!(resolver.resolve_or("ANYTHING", "Anything"), "Anything");
    }
}
