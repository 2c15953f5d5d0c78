use rapidfuzz::distance::indel;

use crate::models::CandidateMatch;

// OpenRefine only shows this many candidates
pub const MAX_RESULTS: usize = 3;

/// Token-order-insensitive similarity, 0 to 100.
///
/// Both sides are lowercased, stripped of punctuation, split into words and
/// the words sorted before comparing, so "Miles Davis" and "Davis Miles"
/// are identical. The sorted strings are compared by Indel similarity
/// (2 * matching chars / total chars), the same number fuzzywuzzy's
/// `token_sort_ratio` reports. A missing name scores 0.
pub fn score(query: &str, name: Option<&str>) -> u8 {
    let Some(name) = name else {
        return 0;
    };

    let left = sorted_tokens(query);
    let right = sorted_tokens(name);
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let similarity = indel::normalized_similarity(left.chars(), right.chars());
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

// Case-insensitive equality, nothing else normalized
pub fn is_exact_match(query: &str, name: Option<&str>) -> bool {
    name.is_some_and(|name| query.to_lowercase() == name.to_lowercase())
}

// Highest score first, ties keep arrival order
pub fn rank(mut candidates: Vec<CandidateMatch>, limit: usize) -> Vec<CandidateMatch> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(limit.min(MAX_RESULTS));
    candidates
}

fn sorted_tokens(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
