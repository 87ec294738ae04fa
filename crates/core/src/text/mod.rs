pub mod similarity;
pub mod tokenize;

pub use similarity::trigram_similarity;
pub use tokenize::{tokenize, TokenizedDocument};

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
