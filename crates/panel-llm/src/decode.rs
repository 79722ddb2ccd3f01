//! Resilient JSON decoding
//!
//! Models wrap JSON in prose, Markdown fences, or cut it off mid-object.
//! [`resilient_decode`] tries, in order:
//! 1. strict parse of the trimmed text
//! 2. the body of the first fenced code block
//! 3. the first balanced `{...}` span (string and escape aware)
//! 4. the span from the first `{` to the last `}`
//!
//! and reports a tagged [`Decoded`] result instead of an error.

use crate::error::LlmError;
use serde::de::DeserializeOwned;

const EXCERPT_CHARS: usize = 120;

/// Outcome of a lenient decode
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// One of the strategies produced a value
    Parsed(T),
    /// Every strategy failed
    Failed {
        /// Last parse error seen
        reason: String,
        /// Leading part of the raw text, for traces
        excerpt: String,
    },
}

impl<T> Decoded<T> {
    /// Whether decoding succeeded
    #[inline]
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Parsed value, discarding failure details
    #[inline]
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// Convert into a `Result`
    ///
    /// # Errors
    /// `LlmError::Decode` carrying the last parse error.
    pub fn into_result(self) -> Result<T, LlmError> {
        match self {
            Self::Parsed(value) => Ok(value),
            Self::Failed { reason, excerpt } => Err(LlmError::Decode {
                reason: format!("{reason} (response began: {excerpt:?})"),
            }),
        }
    }
}

/// Decode model output into `T`, tolerating surrounding noise
pub fn resilient_decode<T: DeserializeOwned>(raw: &str) -> Decoded<T> {
    let trimmed = raw.trim();
    let mut last_error = String::from("empty response");

    let candidates = [
        Some(trimmed),
        fenced_block(trimmed),
        balanced_object(trimmed),
        outer_braces(trimmed),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Decoded::Parsed(value),
            Err(e) => last_error = e.to_string(),
        }
    }

    Decoded::Failed {
        reason: last_error,
        excerpt: trimmed.chars().take(EXCERPT_CHARS).collect(),
    }
}

/// Body of the first ``` fenced block, language tag stripped
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let body = &after_fence[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(body[..end].trim())
}

/// First `{...}` span whose braces balance outside of string literals
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Span from the first `{` to the last `}`
fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        id: String,
    }

    #[test]
    fn strict_json_parses() {
        let decoded: Decoded<Pick> = resilient_decode(r#"{"id": "a"}"#);
        assert_eq!(decoded, Decoded::Parsed(Pick { id: "a".into() }));
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "Here you go:\n```json\n{\"id\": \"b\"}\n```\nThanks";
        let decoded: Decoded<Pick> = resilient_decode(raw);
        assert_eq!(decoded.ok(), Some(Pick { id: "b".into() }));
    }

    #[test]
    fn balanced_span_ignores_braces_in_strings() {
        let raw = r#"Sure! {"id": "c}{"} and then {"id": "d"}"#;
        let decoded: Decoded<Pick> = resilient_decode(raw);
        assert_eq!(decoded.ok(), Some(Pick { id: "c}{".into() }));
    }

    #[test]
    fn escaped_quotes_stay_inside_string() {
        let raw = r#"noise {"id": "say \"hi\" }"} tail"#;
        let decoded: Decoded<Pick> = resilient_decode(raw);
        assert_eq!(decoded.ok(), Some(Pick { id: "say \"hi\" }".into() }));
    }

    #[test]
    fn truncated_response_fails_with_excerpt() {
        let raw = r#"{"id": "unterminated"#;
        let decoded: Decoded<Pick> = resilient_decode(raw);
        match decoded {
            Decoded::Failed { excerpt, .. } => assert!(excerpt.starts_with("{\"id\"")),
            Decoded::Parsed(_) => panic!("truncated JSON must not parse"),
        }
    }

    #[test]
    fn empty_response_fails() {
        let decoded: Decoded<Pick> = resilient_decode("   ");
        assert!(!decoded.is_parsed());
        assert!(matches!(
            decoded.into_result(),
            Err(LlmError::Decode { .. })
        ));
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let raw = "告警".repeat(200);
        let decoded: Decoded<Pick> = resilient_decode(&raw);
        match decoded {
            Decoded::Failed { excerpt, .. } => assert_eq!(excerpt.chars().count(), EXCERPT_CHARS),
            Decoded::Parsed(_) => panic!("non-JSON must not parse"),
        }
    }
}
