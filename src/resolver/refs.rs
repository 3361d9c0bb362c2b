//! Extraction of referenced file paths from a skill's markdown text.
//!
//! Three passes: markdown link targets, inline code spans that look like a
//! file path, and bare path-like tokens on their own line. Extracted targets
//! are raw; `resolve_reference` normalizes them against the skill directory
//! and rejects anything that escapes it.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static MD_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static PATH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.?/?[A-Za-z0-9._\-]+(/[A-Za-z0-9._\-]+)*\.[A-Za-z0-9]{1,8}$").unwrap());

/// True for strings shaped like a relative file path with an extension.
fn looks_like_path(s: &str) -> bool {
    !s.contains("://") && PATH_TOKEN.is_match(s)
}

/// Collects raw reference targets from the skill text, de-duplicated in
/// first-seen order.
pub fn extract_references(markdown: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let mut push = |target: &str| {
        if seen.insert(target.to_string()) {
            out.push(target.to_string());
        }
    };

    // Pass 1: markdown link targets.
    for cap in MD_LINK.captures_iter(markdown) {
        let target = cap[1].split('#').next().unwrap_or("");
        if !target.is_empty() && !target.contains("://") {
            push(target);
        }
    }

    // Pass 2: inline code spans that look like a file path.
    for cap in INLINE_CODE.captures_iter(markdown) {
        let span = cap[1].trim();
        if looks_like_path(span) {
            push(span);
        }
    }

    // Pass 3: bare path-like tokens on their own line.
    for line in markdown.lines() {
        let trimmed = line.trim().trim_start_matches("- ").trim();
        if looks_like_path(trimmed) {
            push(trimmed);
        }
    }

    out
}

/// Normalizes `target` relative to `skill_dir`. Returns `None` for absolute
/// paths, URLs, and anything that traverses outside the skill directory.
pub fn resolve_reference(skill_dir: &str, target: &str) -> Option<String> {
    if target.starts_with('/') || target.contains("://") || target.starts_with('#') {
        return None;
    }

    let base: Vec<&str> = skill_dir.split('/').filter(|s| !s.is_empty()).collect();
    let mut stack: Vec<&str> = base.clone();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Popping past the skill directory is a traversal attempt.
                if stack.len() <= base.len() {
                    return None;
                }
                stack.pop();
            }
            seg => stack.push(seg),
        }
    }

    if stack.len() <= base.len() {
        return None;
    }
    Some(stack.join("/"))
}
