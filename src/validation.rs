use std::fmt;

/// Words which may not appear anywhere in submitted text, in any letter case.
pub const FORBIDDEN_WORDS: &[&str] = &[
    "лох",
    "дебил",
    "чмо",
    "мразь",
    "сдохни",
    "сосать",
    "хутин пуй",
];

/// Longest comment accepted, in characters.
pub const COMMENT_MAX_CHARS: usize = 100;

/// Reasons submitted text is refused. Rendered directly as a form error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty or whitespace only.
    Required,
    /// Longer than the field allows, counted in characters.
    TooLong { max: usize, actual: usize },
    /// Every forbidden word found, in list order.
    Forbidden(Vec<&'static str>),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "This field is required."),
            Self::TooLong { max, actual } => write!(
                f,
                "Ensure this value has at most {} characters (it has {}).",
                max, actual
            ),
            Self::Forbidden(words) => write!(
                f,
                "The field must be filled in without swearing, \"{}\" may not be used!",
                words.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Returns each forbidden word contained in `text`, ignoring case.
pub fn find_forbidden_words(text: &str) -> Vec<&'static str> {
    let haystack = text.to_lowercase();
    FORBIDDEN_WORDS
        .iter()
        .copied()
        .filter(|word| haystack.contains(word))
        .collect()
}

/// Accepts post text, returning it trimmed.
pub fn validate_post_text(text: &str) -> Result<String, ValidationError> {
    validate_text(text, None)
}

/// Accepts comment text, returning it trimmed.
pub fn validate_comment_text(text: &str) -> Result<String, ValidationError> {
    validate_text(text, Some(COMMENT_MAX_CHARS))
}

fn validate_text(text: &str, max_chars: Option<usize>) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Required);
    }

    if let Some(max) = max_chars {
        let actual = text.chars().count();
        if actual > max {
            return Err(ValidationError::TooLong { max, actual });
        }
    }

    let words = find_forbidden_words(text);
    if !words.is_empty() {
        return Err(ValidationError::Forbidden(words));
    }

    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_accepted() {
        assert_eq!(
            validate_post_text("  A perfectly polite post.\n"),
            Ok("A perfectly polite post.".to_owned())
        );
        assert_eq!(validate_comment_text("Nice!"), Ok("Nice!".to_owned()));
    }

    #[test]
    fn test_blank_text_is_required() {
        assert_eq!(validate_post_text(""), Err(ValidationError::Required));
        assert_eq!(validate_comment_text(" \n\t"), Err(ValidationError::Required));
    }

    #[test]
    fn test_forbidden_words_ignore_case() {
        assert_eq!(
            validate_post_text("Ты ЛОХ"),
            Err(ValidationError::Forbidden(vec!["лох"]))
        );
        assert_eq!(
            validate_comment_text("Хутин Пуй"),
            Err(ValidationError::Forbidden(vec!["хутин пуй"]))
        );
    }

    #[test]
    fn test_every_forbidden_word_is_reported() {
        let err = validate_post_text("мразь и дебил").unwrap_err();
        assert_eq!(err, ValidationError::Forbidden(vec!["дебил", "мразь"]));
        assert!(err.to_string().contains("\"дебил, мразь\""));
    }

    #[test]
    fn test_substring_match() {
        // Matching is by substring, not by whole word.
        assert_eq!(find_forbidden_words("блохастый"), vec!["лох"]);
        assert!(find_forbidden_words("hello world").is_empty());
    }

    #[test]
    fn test_comment_length_is_bounded() {
        let at_limit = "a".repeat(COMMENT_MAX_CHARS);
        assert!(validate_comment_text(&at_limit).is_ok());

        // Cyrillic letters are two bytes each; the limit counts characters.
        let over = "я".repeat(COMMENT_MAX_CHARS + 1);
        assert_eq!(
            validate_comment_text(&over),
            Err(ValidationError::TooLong {
                max: COMMENT_MAX_CHARS,
                actual: COMMENT_MAX_CHARS + 1
            })
        );

        // Posts have no such limit.
        assert!(validate_post_text(&over).is_ok());
    }
}
