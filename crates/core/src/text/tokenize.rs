use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tokens of this many bytes or more are dropped, as the full-text engine does.
pub const MAX_TOKEN_LEN: usize = 40;

/// Splits text into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty() && token.len() < MAX_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Weighted term frequencies for one document.
///
/// Each field contributes its tokens multiplied by the field weight, so a
/// term-frequency ranking function sees name matches as stronger than
/// description matches. Terms are kept sorted, which makes two builds from
/// the same source compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedDocument {
    terms: BTreeMap<String, u32>,
}

impl TokenizedDocument {
    pub fn from_weighted_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut terms = BTreeMap::new();
        for (text, weight) in fields {
            if weight == 0 {
                continue;
            }
            for token in tokenize(text) {
                *terms.entry(token).or_insert(0) += weight;
            }
        }
        Self { terms }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, u32)> {
        self.terms.iter().map(|(term, freq)| (term.as_str(), *freq))
    }

    /// Flattens the weighted terms back into text, repeating each term by
    /// its frequency, for engines that count occurrences themselves.
    pub fn to_index_text(&self) -> String {
        let mut out = String::new();
        for (term, freq) in &self.terms {
            for _ in 0..*freq {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(term);
            }
        }
        out
    }
}
