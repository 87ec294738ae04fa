use serde::Serialize;

pub const MIN_SUGGESTION_INPUT_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    Product,
    Brand,
    Category,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedSuggestion {
    pub suggestion: String,
    pub suggestion_type: SuggestionType,
    pub relevance_score: f64,
}

/// Inputs shorter than this never reach the document store.
pub fn is_suggestible(input: &str) -> bool {
    input.trim().chars().count() >= MIN_SUGGESTION_INPUT_LEN
}

#[cfg(test)]
mod tests {
    use super::is_suggestible;

    #[test]
    fn short_inputs_are_not_suggestible() {
        assert!(!is_suggestible(""));
        assert!(!is_suggestible(" n "));
        assert!(is_suggestible("ni"));
    }
}
