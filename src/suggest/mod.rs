//! Search-box suggestions.
//! Ranks catalog terms against a partial query: a direct substring hit
//! scores 3, otherwise the share of query characters present anywhere in
//! the term (order-insensitive, not edit distance). Scores at or below the
//! floor are dropped; the top few survivors are returned in score order,
//! catalog order breaking ties.

pub mod catalog;
pub mod normalize;

use catalog::Catalog;
use normalize::Transliterator;

/// Score assigned when the normalized query is a substring of the term.
pub const DIRECT_MATCH_SCORE: f64 = 3.0;

/// A scored catalog term.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub term: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Minimum trimmed query length, in characters.
    pub min_query_len: usize,
    /// Candidates scoring at or below this are discarded.
    pub score_floor: f64,
    pub max_suggestions: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            score_floor: 0.4,
            max_suggestions: 6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionMatcher {
    transliterator: Transliterator,
    config: MatcherConfig,
}

impl SuggestionMatcher {
    pub fn new(transliterator: Transliterator, config: MatcherConfig) -> Self {
        Self {
            transliterator,
            config,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn transliterator(&self) -> &Transliterator {
        &self.transliterator
    }

    /// Scored, filtered and ordered candidates for `query`.
    pub fn rank<T: AsRef<str>>(&self, query: &str, catalog: &[T]) -> Vec<Candidate> {
        if query.trim().chars().count() < self.config.min_query_len {
            return Vec::new();
        }
        let needle = self.transliterator.normalize(query);

        let mut candidates: Vec<Candidate> = catalog
            .iter()
            .map(|term| Candidate {
                term: term.as_ref().to_string(),
                score: score(&needle, term.as_ref()),
            })
            .filter(|c| c.score > self.config.score_floor)
            .collect();

        // sort_by is stable: equal scores keep catalog order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(self.config.max_suggestions);
        candidates
    }

    /// Term names of the ranked candidates.
    pub fn suggest<T: AsRef<str>>(&self, query: &str, catalog: &[T]) -> Vec<String> {
        self.rank(query, catalog)
            .into_iter()
            .map(|c| c.term)
            .collect()
    }

    pub fn suggest_from(&self, query: &str, catalog: &Catalog) -> Vec<String> {
        self.suggest(query, catalog.terms())
    }
}

/// Suggestions using the built-in substitution table and default limits.
pub fn suggest<T: AsRef<str>>(query: &str, catalog: &[T]) -> Vec<String> {
    SuggestionMatcher::default().suggest(query, catalog)
}

/// Score one term against an already-normalized query.
pub fn score(normalized_query: &str, term: &str) -> f64 {
    let haystack = term.to_lowercase();
    if haystack.contains(normalized_query) {
        return DIRECT_MATCH_SCORE;
    }
    let len = normalized_query.chars().count();
    if len == 0 {
        return 0.0;
    }
    let found = normalized_query
        .chars()
        .filter(|&c| haystack.contains(c))
        .count();
    found as f64 / len as f64
}
