//! Lenient JSON recovery for model output.
//!
//! Models wrap JSON in code fences, surround it with prose, cut it off at the
//! token limit, or leave trailing commas. [`parse_lenient`] tries, in order:
//! the fence-stripped text, the first brace-matched object (closed if
//! truncated), and the object cut back to its last complete element. Each
//! candidate is also retried with trailing commas removed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\s*\n?([\s\S]*?)\n?```").expect("valid regex"));

static OPEN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(?:json|JSON)?\s*").expect("valid regex"));

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// Parse `content` as `T`, repairing common model-output damage.
pub fn parse_lenient<T: DeserializeOwned>(content: &str) -> Option<T> {
    let stripped = strip_code_fences(content.trim());
    if stripped.is_empty() {
        return None;
    }

    let mut candidates = vec![stripped.to_string()];
    if let Some(object) = extract_object(stripped) {
        candidates.push(object.closed);
        if let Some(cut) = object.cut_back {
            candidates.push(cut);
        }
    }

    for candidate in &candidates {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Some(value);
        }
        let repaired = remove_trailing_commas(candidate);
        if let Ok(value) = serde_json::from_str(&repaired) {
            return Some(value);
        }
    }

    None
}

/// Strip a markdown code fence, including an unterminated opening fence.
pub fn strip_code_fences(content: &str) -> &str {
    if let Some(inner) = CODE_FENCE.captures(content).and_then(|caps| caps.get(1)) {
        return inner.as_str().trim();
    }
    if let Some(m) = OPEN_FENCE.find(content) {
        return content[m.end()..].trim();
    }
    content
}

/// Remove commas directly before a closing bracket.
pub fn remove_trailing_commas(json: &str) -> String {
    TRAILING_COMMA.replace_all(json, "$1").into_owned()
}

/// The first JSON object found in some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedObject {
    /// The object, with any brackets left open by truncation closed.
    pub closed: String,
    /// For truncated input, the object cut back to its last complete element
    /// and closed; `None` when the object was complete.
    pub cut_back: Option<String>,
}

/// Find the first `{` and scan to its matching `}`, honoring strings and
/// escapes.
pub fn extract_object(content: &str) -> Option<ExtractedObject> {
    let start = content.find('{')?;
    let body = &content[start..];

    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    // Byte offset and open brackets at the last point where cutting leaves
    // only complete elements.
    let mut safe_point: Option<(usize, Vec<char>)> = None;

    for (offset, ch) in body.char_indices() {
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
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
                if closers.is_empty() {
                    return Some(ExtractedObject {
                        closed: body[..=offset].to_string(),
                        cut_back: None,
                    });
                }
                safe_point = Some((offset + ch.len_utf8(), closers.clone()));
            }
            ',' => safe_point = Some((offset, closers.clone())),
            _ => {}
        }
    }

    // Truncated: close whatever is still open
    let mut closed = body.trim_end().to_string();
    if in_string {
        if escaped {
            closed.pop();
        }
        closed.push('"');
    }
    let closed = close_brackets(closed.trim_end_matches(',').to_string(), &closers);

    let cut_back = safe_point.map(|(end, open)| close_brackets(body[..end].to_string(), &open));

    Some(ExtractedObject { closed, cut_back })
}

fn close_brackets(mut text: String, closers: &[char]) -> String {
    text.extend(closers.iter().rev());
    text
}
