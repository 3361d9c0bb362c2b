pub mod markdown;

use crate::resolver::{ResolvedFile, ResolvedSkill};
use crate::rules::{Finding, Rule, all_rules};
use tracing::{debug, trace};

/// Output of a content scan: zero or more findings plus whether any part of
/// the skill could not be read and verified.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub has_unverifiable_content: bool,
}

/// Static rule-based scanner over a resolved skill. Pure: no I/O, no
/// execution of scanned content.
pub struct SkillScanner {
    rules: &'static [Rule],
}

impl SkillScanner {
    pub fn new() -> Self {
        Self { rules: all_rules() }
    }

    pub fn scan(&self, skill: &ResolvedSkill) -> ScanReport {
        debug!(
            skill = %skill.skill_name,
            files = skill.files.len(),
            rules = self.rules.len(),
            "Scanning resolved skill"
        );

        let mut findings = Vec::new();
        for file in &skill.files {
            findings.extend(self.scan_file(file));
        }

        ScanReport {
            findings,
            has_unverifiable_content: !skill.unverifiable_reasons.is_empty(),
        }
    }

    fn scan_file(&self, file: &ResolvedFile) -> Vec<Finding> {
        let segments = scannable_content(&file.path, &file.content);
        if segments.is_empty() {
            return Vec::new();
        }

        trace!(file = %file.path, segments = segments.len(), "Checking scannable content");

        // At most one finding per rule per file, however many segments match.
        self.rules
            .iter()
            .filter(|rule| segments.iter().any(|s| rule.is_match(s)))
            .map(|rule| Finding::new(rule, &file.path))
            .collect()
    }
}

impl Default for SkillScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_markdown(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

/// Markdown files yield only their extracted executable sub-contents; every
/// other resolved file is scanned in full.
fn scannable_content(path: &str, content: &str) -> Vec<String> {
    if is_markdown(path) {
        markdown::extract_executable_content(content)
    } else if content.is_empty() {
        Vec::new()
    } else {
        vec![content.to_string()]
    }
}
