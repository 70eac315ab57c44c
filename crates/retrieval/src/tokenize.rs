//! Query and document tokenization.

/// Lowercase `text` and split it into alphanumeric words.
///
/// Anything that isn't a Unicode letter or digit separates tokens, so
/// `"ada.lovelace@example.com"` yields `["ada", "lovelace", "example", "com"]`.
/// Queries and documents must go through the same function.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_lowercases() {
        assert_eq!(tokenize("Lady Ada LOVELACE"), vec!["lady", "ada", "lovelace"]);
    }

    #[test]
    fn punctuation_separates_tokens() {
        assert_eq!(
            tokenize("Name: Ada\nEmail: ada.lovelace@example.com"),
            vec!["name", "ada", "email", "ada", "lovelace", "example", "com"]
        );
    }

    #[test]
    fn empty_and_symbol_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("?! -- ...").is_empty());
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(tokenize("Marie Curie-Skłodowska"), vec!["marie", "curie", "skłodowska"]);
    }
}
