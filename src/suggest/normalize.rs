//! Query normalization before suggestion scoring.
//! Folds alternate romanizations and common misspellings onto the spelling
//! used in the catalog. Only the query is normalized, never catalog terms.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

/// A compiled "replace all `pattern` with `replacement`" rule.
#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    pub pattern: Regex,
    pub replacement: String,
}

/// On-disk substitution table format.
#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    pattern: String,
    replacement: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransliterationError {
    #[error("substitution table IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("substitution table parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Ordered set of substitution rules, applied to lowercased input.
#[derive(Debug, Clone)]
pub struct Transliterator {
    rules: Vec<SubstitutionRule>,
}

/// Built-in table: (pattern, canonical spelling).
const DEFAULT_RULES: &[(&str, &str)] = &[
    // Hindi "sari" spellings
    (r"saari|sari", "saree"),
    (r"noize", "noise"),
];

impl Transliterator {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(pattern, replacement)| SubstitutionRule {
                    pattern: Regex::new(pattern).expect("built-in substitution pattern"),
                    replacement: (*replacement).to_string(),
                })
                .collect(),
        }
    }

    /// No substitutions; normalization reduces to lowercasing.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Compile rules from `(pattern, replacement)` pairs.
    pub fn from_pairs<P, R>(pairs: impl IntoIterator<Item = (P, R)>) -> Result<Self, TransliterationError>
    where
        P: AsRef<str>,
        R: Into<String>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, replacement)| {
                let pattern = pattern.as_ref();
                Regex::new(pattern)
                    .map(|re| SubstitutionRule {
                        pattern: re,
                        replacement: replacement.into(),
                    })
                    .map_err(|source| TransliterationError::Pattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Load a substitution table from a JSON file:
    /// `{ "rules": [ { "pattern": "...", "replacement": "..." } ] }`.
    pub fn load_from_file(path: &Path) -> Result<Self, TransliterationError> {
        let content = std::fs::read_to_string(path)?;
        let file: RuleFile = serde_json::from_str(&content)?;
        Self::from_pairs(file.rules.into_iter().map(|r| (r.pattern, r.replacement)))
    }

    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    /// Lowercase, then apply every rule in order. Whitespace is kept: it
    /// takes part in scoring.
    pub fn normalize(&self, query: &str) -> String {
        let mut normalized = query.to_lowercase();
        for rule in &self.rules {
            // Replacement is literal text, not a capture template.
            let replaced = rule
                .pattern
                .replace_all(&normalized, regex::NoExpand(&rule.replacement));
            normalized = replaced.into_owned();
        }
        normalized
    }
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::new()
    }
}
