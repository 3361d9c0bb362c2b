//! Extraction of executable content from Markdown.
//!
//! Markdown is never scanned verbatim: narrative prose mentioning `curl` or
//! `rm` must not trip destructive/exfiltration signatures. Only three kinds
//! of sub-content are surfaced to the rule table: fenced code block bodies,
//! inline code spans that look like shell commands, and shell-prompt lines.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Command-name tokens that make an inline span or prompt line worth scanning.
const COMMAND_TOKENS: &[&str] = &[
    "curl", "wget", "bash", "sh", "zsh", "python", "python3", "node", "ruby", "perl", "rm",
    "sudo", "chmod", "eval", "exec", "base64", "nc",
];

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// True when the text contains a standalone command-name token.
pub fn looks_like_command(text: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|word| COMMAND_TOKENS.contains(&word))
}

/// Runs the three extraction passes and returns de-duplicated candidates in
/// first-seen order.
pub fn extract_executable_content(markdown: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let mut push = |candidate: String| {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_string()) {
            out.push(trimmed.to_string());
        }
    };

    for block in fenced_blocks(markdown) {
        push(block);
    }
    for span in inline_command_spans(markdown) {
        push(span);
    }
    for line in prompt_lines(markdown) {
        push(line);
    }

    out
}

/// Pass 1: bodies of ``` / ~~~ fenced code blocks.
fn fenced_blocks(markdown: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        let fence = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (&mut current, fence) {
            (Some((open, body)), Some(marker)) if open == marker => {
                blocks.push(body.join("\n"));
                current = None;
            }
            (Some((_, body)), _) => body.push(line),
            (None, Some(marker)) => current = Some((marker.to_string(), Vec::new())),
            (None, None) => {}
        }
    }

    // An unterminated fence still counts; content after it is code-like.
    if let Some((_, body)) = current {
        blocks.push(body.join("\n"));
    }

    blocks
}

/// Pass 2: inline code spans that look like a shell command.
fn inline_command_spans(markdown: &str) -> Vec<String> {
    let mut in_fence = false;
    let mut spans = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        for cap in INLINE_CODE.captures_iter(line) {
            let span = &cap[1];
            if looks_like_command(span) {
                spans.push(span.to_string());
            }
        }
    }

    spans
}

/// Pass 3: lines led by a shell-prompt marker whose remainder looks like a
/// command.
fn prompt_lines(markdown: &str) -> Vec<String> {
    let mut in_fence = false;
    let mut lines = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let rest = ["$ ", "PS> ", "> ", "- "]
            .iter()
            .find_map(|marker| trimmed.strip_prefix(marker));
        if let Some(rest) = rest
            && looks_like_command(rest)
        {
            lines.push(rest.to_string());
        }
    }

    lines
}
