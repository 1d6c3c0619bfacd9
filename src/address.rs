//! Address normalization shared by exclusion matching and dedup keys.

/// Street-suffix abbreviations applied symmetrically, whole tokens only.
const SUFFIX_TOKENS: &[(&str, &str)] = &[
    ("STREET", "ST"),
    ("AVENUE", "AVE"),
    ("BOULEVARD", "BLVD"),
    ("ROAD", "RD"),
    ("DRIVE", "DR"),
    ("LANE", "LN"),
];

/// Normalize an address: uppercase, collapse internal whitespace to single
/// spaces, expand common street-suffix abbreviations, trim. Blank input
/// normalizes to the empty string.
pub fn normalize(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let upper = input.to_uppercase();
    upper
        .split_whitespace()
        .map(|token| {
            SUFFIX_TOKENS
                .iter()
                .find(|(long, _)| *long == token)
                .map_or(token, |(_, short)| *short)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
