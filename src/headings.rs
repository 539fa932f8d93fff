//! Heading extraction for the outline.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static NON_ANCHOR_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A markdown heading in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Anchor id, unique within the document it was extracted from
    pub id: String,
}

/// Derive the anchor id for a heading text.
///
/// Lowercases, drops everything that is not a word character, whitespace or
/// `-`, then turns each whitespace run into a single `-`.
pub fn anchor_id(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_ANCHOR_CHARS_RE.replace_all(&lowered, "");
    WHITESPACE_RUN_RE.replace_all(&stripped, "-").into_owned()
}

/// Parse markdown headings from content, skipping fenced code blocks.
///
/// Repeated anchor ids get a numeric suffix (`intro`, `intro-1`, ...) so every
/// heading in the result can be addressed on its own.
pub fn extract_headings(content: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut used_ids = HashSet::new();
    let mut in_code_block = false;

    for line in content.lines() {
        // Toggle code block state on fence lines
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }

        let Some(caps) = HEADING_RE.captures(line) else {
            continue;
        };
        let text = caps[2].trim();
        let id = unique_id(anchor_id(text), &mut used_ids);
        headings.push(Heading {
            level: caps[1].len() as u8,
            text: text.to_string(),
            id,
        });
    }

    headings
}

fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
