//! Character-budget and template helpers applied to resume and job text
//! before it is placed into any prompt.

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
///
/// Cuts on a char boundary, so multi-byte text never panics.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// True when the text has no non-whitespace content.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Fills `{name}` placeholders in one left-to-right pass.
///
/// Values are copied in verbatim and never scanned again, so a value holding
/// `{resume_text}` stays literal. Braces that do not form a known placeholder
/// are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match filled {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_shorter_than_limit_is_identity() {
        assert_eq!(truncate_chars("rust", 10), "rust");
    }

    #[test]
    fn test_truncate_cuts_at_limit() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }

    #[test]
    fn test_truncate_respects_multibyte_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_chars(text, 2);
        assert_eq!(cut, "hé");
        assert_eq!(cut.chars().count(), 2);
    }

    #[test]
    fn test_truncate_zero_is_empty() {
        assert_eq!(truncate_chars("anything", 0), "");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank("   \n\t"));
        assert!(is_blank(""));
        assert!(!is_blank("  x "));
    }

    #[test]
    fn test_fill_template_substitutes_known_names() {
        let filled = fill_template("Hi {name}, you have {count} jobs", &[("name", "Ada"), ("count", "3")]);
        assert_eq!(filled, "Hi Ada, you have 3 jobs");
    }

    #[test]
    fn test_fill_template_never_expands_inside_values() {
        let filled = fill_template(
            "Title: {title}\nResume: {resume}",
            &[("title", "Dev {resume}"), ("resume", "SECRET")],
        );
        assert_eq!(filled, "Title: Dev {resume}\nResume: SECRET");
        assert_eq!(filled.matches("SECRET").count(), 1);
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_json_braces() {
        let filled = fill_template(
            r#"Return {"skill": "<name>"} for {unknown} and {x"#,
            &[("x", "y")],
        );
        assert_eq!(filled, r#"Return {"skill": "<name>"} for {unknown} and {x"#);
    }
}
