use crate::rules::types::{Confidence, FindingType, Matcher, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![rc_001(), rc_002(), rc_003(), de_001()]
}

const INTERPRETERS: &str = "bash|sh|zsh|python3?|node|perl|ruby";

fn rc_001() -> Rule {
    Rule {
        id: "RC-001",
        title: "Download piped into interpreter",
        severity: Severity::Critical,
        confidence: Confidence::High,
        finding_type: FindingType::RemoteCodeExec,
        matcher: Matcher::Any(vec![
            Regex::new(&format!(
                r"\b(curl|wget)\b[^|\n]*\|\s*(sudo\s+)?({})\b",
                INTERPRETERS
            ))
            .unwrap(),
        ]),
        exclusions: vec![Regex::new(r"localhost|127\.0\.0\.1|::1").unwrap()],
        message: "Remote content is downloaded and piped directly into an interpreter",
    }
}

/// Interleaves `\W*` between the letters of a command name so that
/// separator-based evasion (`c'u'r'l`, `c\u\r\l`) still matches.
fn spaced(word: &str) -> String {
    word.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(r"\W*")
}

fn rc_002() -> Rule {
    let download = format!(r"({}|{})", spaced("curl"), spaced("wget"));
    let shell = format!(r"({}|{})\b", spaced("bash"), spaced("sh"));
    Rule {
        id: "RC-002",
        title: "Obfuscated download piped into shell",
        severity: Severity::Critical,
        confidence: Confidence::High,
        finding_type: FindingType::RemoteCodeExec,
        matcher: Matcher::Any(vec![
            Regex::new(&format!(r"\b{}[^\n]*\|\W*{}", download, shell)).unwrap(),
        ]),
        exclusions: vec![Regex::new(r"localhost|127\.0\.0\.1|::1").unwrap()],
        message: "Download-pipe-shell signature with separator characters between command letters",
    }
}

/// Archive fetched, extracted, then executed locally. All three behaviors
/// must be present before this fires.
fn rc_003() -> Rule {
    Rule {
        id: "RC-003",
        title: "Archive fetch, extract, and execute",
        severity: Severity::High,
        confidence: Confidence::Medium,
        finding_type: FindingType::RemoteCodeExec,
        matcher: Matcher::AllOf(vec![
            Regex::new(r"\b(curl|wget)\b[^\n]*\.(tar\.gz|tgz|tar\.bz2|tar\.xz|zip)\b").unwrap(),
            Regex::new(r"\b(tar\s+-?x\w*|unzip)\b").unwrap(),
            Regex::new(r"((^|[;&\n])\s*\./[A-Za-z0-9._/-]+|\b(bash|sh)\s+[A-Za-z0-9._/-]+\.sh\b)")
                .unwrap(),
        ]),
        exclusions: vec![],
        message: "Downloads an archive, extracts it, and runs the extracted payload",
    }
}

fn de_001() -> Rule {
    Rule {
        id: "DE-001",
        title: "Decode primitive feeding an execution sink",
        severity: Severity::High,
        confidence: Confidence::High,
        finding_type: FindingType::DecodeExec,
        matcher: Matcher::Near {
            a: Regex::new(r"(base64\s+(-d|-D|--decode)\b|atob\s*\(|b64decode|openssl\s+enc\s+-d)")
                .unwrap(),
            b: Regex::new(r"(\|\s*(bash|sh|zsh)\b|\beval\b|\bexec\s*\(|\bsource\s)").unwrap(),
            window: 120,
        },
        exclusions: vec![],
        message: "Encoded payload is decoded and handed to an execution primitive",
    }
}
