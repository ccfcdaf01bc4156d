use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Phrases that indicate navigation/boilerplate page content rather than
/// article text (subscribe prompts, login walls, menus).
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "subscribe",
    "login",
    "newsletter",
    "e-paper",
    "back to the page",
    "use the weekly",
];

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip HTML tags and collapse whitespace. Feed descriptions routinely
/// carry markup that would otherwise leak into summaries and translations.
pub fn strip_html(input: &str) -> String {
    let without_tags = HTML_TAG.replace_all(input, " ");
    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    WHITESPACE.replace_all(decoded.trim(), " ").to_string()
}

/// Count how many boilerplate phrases appear in the text.
pub fn boilerplate_hits(text: &str) -> usize {
    let lower = text.to_lowercase();
    BOILERPLATE_PHRASES
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .count()
}

/// Split into sentences on '.', dropping empty fragments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join the first `count` sentences back into prose with a trailing period.
pub fn lead_sentences(text: &str, count: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return String::new();
    }
    let mut lead = sentences
        .into_iter()
        .take(count)
        .collect::<Vec<_>>()
        .join(". ");
    if !lead.ends_with('.') {
        lead.push('.');
    }
    lead
}

/// Remove duplicates in place while keeping the first occurrence of each
/// value in its original position.
pub fn dedup_preserve_order(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

/// Truncate to at most `max_chars`, preferring a sentence boundary, then a
/// word boundary. Always cuts on a char boundary.
pub fn smart_truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    if let Some(pos) = truncated.rfind('.') {
        truncated[..pos + 1].to_string()
    } else if let Some(pos) = truncated.rfind(' ') {
        format!("{}...", &truncated[..pos])
    } else {
        format!("{}...", truncated)
    }
}

/// Split text into pieces of at most `max_chars` characters, breaking at
/// sentence boundaries where possible so each chunk stays translatable on
/// its own.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in text.split_inclusive('.') {
        if !current.is_empty() && current.chars().count() + sentence.chars().count() > max_chars {
            chunks.push(current.trim().to_string());
            current = String::new();
        }
        // A single oversized sentence gets hard-split on word boundaries.
        if sentence.chars().count() > max_chars {
            for word in sentence.split_whitespace() {
                if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
                    chunks.push(current.trim().to_string());
                    current = String::new();
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
        } else {
            current.push_str(sentence);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

/// Rough token estimate for sizing model inputs (~4 chars per token).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
