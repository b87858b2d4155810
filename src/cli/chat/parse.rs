/// Normalize a raw answer for the given step.
///
/// `None` means the question was skipped: the user answered "no"/"none"
/// (any case) or left it blank. Product types are lower-cased; models keep
/// their casing since model names are often case-sensitive.
pub fn parse(step: usize, raw: &str) -> Option<String> {
    let answer = raw.trim();

    if answer.is_empty() || answer.eq_ignore_ascii_case("no") || answer.eq_ignore_ascii_case("none") {
        return None;
    }

    match step {
        0 => Some(answer.to_lowercase()),
        1 => Some(answer.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_words_are_case_insensitive() {
        for step in [0, 1] {
            for word in ["no", "NO", "No", "none", "None", "NONE"] {
                assert_eq!(parse(step, word), None, "step {} answer {:?}", step, word);
            }
        }
    }

    #[test]
    fn type_is_lowercased_and_model_keeps_case() {
        assert_eq!(parse(0, "Laptop"), Some("laptop".to_string()));
        assert_eq!(parse(1, "X200"), Some("X200".to_string()));
        assert_eq!(parse(0, "Teléfono"), Some("teléfono".to_string()));
    }

    #[test]
    fn blank_answers_are_skips() {
        assert_eq!(parse(0, ""), None);
        assert_eq!(parse(1, "   \t"), None);
        assert_eq!(parse(1, "  X200 "), Some("X200".to_string()));
    }

    #[test]
    fn out_of_range_steps_yield_nothing() {
        assert_eq!(parse(2, "laptop"), None);
    }

    #[test]
    fn words_containing_no_are_kept() {
        assert_eq!(parse(0, "notebook"), Some("notebook".to_string()));
    }
}
