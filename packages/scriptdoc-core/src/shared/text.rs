//! Small text utilities shared by the extraction features.

/// Title-case an ALL-CAPS source token: first letter of each
/// whitespace-separated word upper, the rest lower.
///
/// `SYLVIA'S HOUSE` → `Sylvia's House`, `PALM SPRINGS STREET` →
/// `Palm Springs Street`.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
