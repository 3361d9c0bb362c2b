use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Base score contribution before the confidence multiplier.
    pub fn points(&self) -> f64 {
        match self {
            Severity::Critical => 50.0,
            Severity::High => 25.0,
            Severity::Medium => 12.0,
            Severity::Low => 5.0,
            Severity::Info => 0.0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence level for findings. Higher confidence means less likely to be a false positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Score multiplier applied to the severity points.
    pub fn multiplier(&self) -> f64 {
        match self {
            Confidence::High => 1.0,
            Confidence::Medium => 0.7,
            Confidence::Low => 0.4,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of behavior types a rule can report. Attack chains and the
/// hard-block override key off these, not off individual rule ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingType {
    CredentialExfil,
    DestructiveOp,
    RemoteCodeExec,
    PrivEscalation,
    SecretRead,
    NetworkPost,
    DecodeExec,
    EnvAccess,
    FileStage,
    Other,
}

impl FindingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::CredentialExfil => "CREDENTIAL_EXFIL",
            FindingType::DestructiveOp => "DESTRUCTIVE_OP",
            FindingType::RemoteCodeExec => "REMOTE_CODE_EXEC",
            FindingType::PrivEscalation => "PRIV_ESCALATION",
            FindingType::SecretRead => "SECRET_READ",
            FindingType::NetworkPost => "NETWORK_POST",
            FindingType::DecodeExec => "DECODE_EXEC",
            FindingType::EnvAccess => "ENV_ACCESS",
            FindingType::FileStage => "FILE_STAGE",
            FindingType::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for FindingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a rule decides whether a piece of scannable content matches.
///
/// Composite variants exist so that high-risk signatures can require
/// co-occurring behaviors instead of single tokens.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Any one pattern matches.
    Any(Vec<Regex>),
    /// Every pattern matches somewhere in the content.
    AllOf(Vec<Regex>),
    /// Both patterns match within `window` characters of each other.
    Near { a: Regex, b: Regex, window: usize },
}

impl Matcher {
    pub fn matches(&self, content: &str) -> bool {
        match self {
            Matcher::Any(patterns) => patterns.iter().any(|p| p.is_match(content)),
            Matcher::AllOf(patterns) => patterns.iter().all(|p| p.is_match(content)),
            Matcher::Near { a, b, window } => {
                let starts_a: Vec<usize> = a.find_iter(content).map(|m| m.start()).collect();
                if starts_a.is_empty() {
                    return false;
                }
                b.find_iter(content)
                    .any(|mb| starts_a.iter().any(|&sa| sa.abs_diff(mb.start()) <= *window))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    pub confidence: Confidence,
    pub finding_type: FindingType,
    pub matcher: Matcher,
    pub exclusions: Vec<Regex>,
    pub message: &'static str,
}

impl Rule {
    /// True when the content triggers this rule and no exclusion fires.
    pub fn is_match(&self, content: &str) -> bool {
        self.matcher.matches(content) && !self.exclusions.iter().any(|e| e.is_match(content))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// `RULE-ID:file-path`, unique within a single scan.
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub confidence: Confidence,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub file: String,
    pub message: String,
}

impl Finding {
    pub fn new(rule: &Rule, file: &str) -> Self {
        Self {
            id: format!("{}:{}", rule.id, file),
            title: rule.title.to_string(),
            severity: rule.severity,
            confidence: rule.confidence,
            finding_type: rule.finding_type,
            file: file.to_string(),
            message: rule.message.to_string(),
        }
    }
}
