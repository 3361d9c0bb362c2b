use crate::rules::types::{Confidence, FindingType, Matcher, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![pe_001(), ds_001(), ds_002()]
}

/// Bare `sudo` on a harmless verb is not flagged; the prefix must sit
/// immediately before a risky verb.
fn pe_001() -> Rule {
    Rule {
        id: "PE-001",
        title: "Privilege escalation before risky verb",
        severity: Severity::Critical,
        confidence: Confidence::High,
        finding_type: FindingType::PrivEscalation,
        matcher: Matcher::Any(vec![
            Regex::new(
                r"\bsudo\s+(rm|chmod|chown|dd|mkfs\w*|mv|tee|bash|sh|curl|wget|systemctl|launchctl)\b",
            )
            .unwrap(),
        ]),
        exclusions: vec![],
        message: "sudo immediately precedes a destructive or execution verb",
    }
}

fn ds_001() -> Rule {
    Rule {
        id: "DS-001",
        title: "Destructive filesystem operation",
        severity: Severity::Critical,
        confidence: Confidence::High,
        finding_type: FindingType::DestructiveOp,
        matcher: Matcher::Any(vec![
            Regex::new(r"\brm\s+-[a-zA-Z]*r[a-zA-Z]*f[a-zA-Z]*\s+(/|~/?|\$HOME/?)(\s|$|\*)")
                .unwrap(),
            Regex::new(r"\bdd\s+[^\n]*of=/dev/(sd|nvme|disk|hd)").unwrap(),
            Regex::new(r"\bmkfs\.\w+\s+/dev/").unwrap(),
            Regex::new(r">\s*/dev/sd[a-z]\b").unwrap(),
        ]),
        exclusions: vec![],
        message: "Recursive delete or raw-device write targeting the root or home tree",
    }
}

/// Recursive delete with a variable target. Lower confidence: the variable
/// may expand to a scratch path.
fn ds_002() -> Rule {
    Rule {
        id: "DS-002",
        title: "Recursive delete of variable target",
        severity: Severity::High,
        confidence: Confidence::Medium,
        finding_type: FindingType::DestructiveOp,
        matcher: Matcher::Any(vec![
            Regex::new(r#"\brm\s+-[a-zA-Z]*r[a-zA-Z]*f[a-zA-Z]*\s+"?\$\{?[A-Za-z_]"#).unwrap(),
        ]),
        exclusions: vec![Regex::new(r"\$\{?(TMPDIR|TMP|TEMP)\b").unwrap()],
        message: "Recursive force delete of a shell-variable path",
    }
}
