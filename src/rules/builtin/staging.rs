use crate::rules::types::{Confidence, FindingType, Matcher, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![st_001(), st_002()]
}

fn st_001() -> Rule {
    Rule {
        id: "ST-001",
        title: "Executable-bit change followed by local invocation",
        severity: Severity::Medium,
        confidence: Confidence::Medium,
        finding_type: FindingType::FileStage,
        matcher: Matcher::Near {
            a: Regex::new(r"\bchmod\s+(\+x|u\+x|a\+x|0?7[0-7][0-7])\b").unwrap(),
            b: Regex::new(r"(^|[;&\n])\s*\./[A-Za-z0-9._/-]+").unwrap(),
            window: 160,
        },
        exclusions: vec![],
        message: "A file is made executable and immediately invoked",
    }
}

fn st_002() -> Rule {
    Rule {
        id: "ST-002",
        title: "Files staged into shared temp location",
        severity: Severity::Low,
        confidence: Confidence::Medium,
        finding_type: FindingType::FileStage,
        matcher: Matcher::Any(vec![
            Regex::new(r"\b(cp|mv)\s+(-[a-zA-Z]+\s+)*[^\n|;]+\s+/tmp/").unwrap(),
            Regex::new(r"\btar\s+-?c[a-zA-Z]*f?\s+/tmp/").unwrap(),
        ]),
        exclusions: vec![],
        message: "Collects files into a shared temp directory, a common exfiltration staging step",
    }
}
