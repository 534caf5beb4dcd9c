// Free-text sanitizers
//
// Two variants exist on purpose: the push path filters aggressively before
// values reach the broker, while the pull path only trims what the broker
// returns. Each pipeline selects its own variant.

/// Punctuation allowed through the strict sanitizer, in addition to
/// Unicode alphanumerics, `_`, and whitespace.
const ALLOWED_PUNCT: &[char] = &['-', '_', '.', '@', '/', ':', ';', '!'];

/// Strict variant used on the push path.
///
/// Drops characters outside the allow-set, folds carriage returns,
/// newlines, and tabs into single spaces, trims, and maps an empty
/// result to `None`.
pub fn sanitize_strict(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\r' | '\n' | '\t') {
            out.push(' ');
        } else if ch.is_alphanumeric() || ch.is_whitespace() || ALLOWED_PUNCT.contains(&ch) {
            out.push(ch);
        }
        // everything else is dropped
    }
    let trimmed = out.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Light variant used on the pull path: trim only, empty becomes `None`.
pub fn sanitize_trim(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_folds_control_whitespace() {
        assert_eq!(
            sanitize_strict("  Hello\tWorld\n"),
            Some("Hello World".to_string())
        );
    }

    #[test]
    fn strict_drops_disallowed_characters() {
        assert_eq!(
            sanitize_strict("a\"b'c<d>e"),
            Some("abcde".to_string())
        );
        assert_eq!(sanitize_strict("\"<>#$%&"), None);
    }

    #[test]
    fn strict_keeps_allowed_punctuation() {
        assert_eq!(
            sanitize_strict("mail@example.com; tel:03-1234!"),
            Some("mail@example.com; tel:03-1234!".to_string())
        );
    }

    #[test]
    fn strict_keeps_japanese_text() {
        assert_eq!(
            sanitize_strict("イベント名（仮）"),
            Some("イベント名仮".to_string())
        );
    }

    #[test]
    fn strict_is_idempotent() {
        let once = sanitize_strict("  Hello\tWorld\n").unwrap();
        assert_eq!(sanitize_strict(&once), Some(once.clone()));
    }

    #[test]
    fn trim_only_trims() {
        assert_eq!(
            sanitize_trim("  秋祭り 2024  "),
            Some("秋祭り 2024".to_string())
        );
        assert_eq!(sanitize_trim("   "), None);
        // the light variant never touches interior characters
        assert_eq!(sanitize_trim("a\"b"), Some("a\"b".to_string()));
    }
}
