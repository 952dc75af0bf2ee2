//! Fuzzy restaurant-name matching.
//!
//! Search results on a map-listing site rarely carry the exact name that was
//! typed in ("Meghana Foods" comes back as "Meghana Foods, Residency Road").
//! Candidates are scored with a token-set ratio: word order is ignored and a
//! query whose words are all contained in the candidate scores 100.

use std::collections::BTreeSet;

/// Best-scoring candidate for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    /// Position of the candidate in the input slice.
    pub index: usize,
    pub name: String,
    /// Similarity in `0..=100`.
    pub score: u8,
}

/// Picks the candidate most similar to `query`.
///
/// Returns `None` for an empty candidate list or when the best score is below
/// `min_score`. Ties go to the earliest candidate.
pub fn best_match<S: AsRef<str>>(query: &str, candidates: &[S], min_score: u8) -> Option<NameMatch> {
    let mut best: Option<NameMatch> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        let score = token_set_ratio(query, candidate);
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(NameMatch {
                index,
                name: candidate.to_string(),
                score,
            });
        }
    }

    best.filter(|m| m.score >= min_score)
}

/// Order-insensitive similarity based on shared tokens, in `0..=100`.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = join(tokens_a.intersection(&tokens_b));
    let diff_ab = join(tokens_a.difference(&tokens_b));
    let diff_ba = join(tokens_b.difference(&tokens_a));

    let combined_ab = format!("{} {}", intersection, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", intersection, diff_ba).trim().to_string();

    [
        ratio(&intersection, &combined_ab),
        ratio(&intersection, &combined_ba),
        ratio(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Lowercases and replaces every non-alphanumeric character with a space.
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}
