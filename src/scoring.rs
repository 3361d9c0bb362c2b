use crate::rules::{Finding, FindingType, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const MAX_SCORE: f64 = 100.0;
const MAX_TRUST_CREDITS: f64 = 20.0;

const UNVERIFIABLE_REASON: &str =
    "Some skill content could not be read and verified; blocked by default";

/// Finding types that trigger an unconditional hard block when reported at
/// CRITICAL severity with high confidence. Appendable.
pub const HARD_BLOCK_TYPES: &[FindingType] = &[
    FindingType::CredentialExfil,
    FindingType::DestructiveOp,
    FindingType::RemoteCodeExec,
    FindingType::PrivEscalation,
];

/// Multi-step attack patterns: a chain matches when every required finding
/// type occurs at least once anywhere in the finding set. Appendable.
pub struct ChainDef {
    pub id: &'static str,
    pub description: &'static str,
    pub required: &'static [FindingType],
    pub bonus: f64,
}

pub const CHAINS: &[ChainDef] = &[
    ChainDef {
        id: "CHAIN_SECRET_EXFIL",
        description: "Secret read combined with an outbound POST",
        required: &[FindingType::SecretRead, FindingType::NetworkPost],
        bonus: 25.0,
    },
    ChainDef {
        id: "CHAIN_ENV_EXFIL",
        description: "Environment dump combined with an outbound POST",
        required: &[FindingType::EnvAccess, FindingType::NetworkPost],
        bonus: 15.0,
    },
    ChainDef {
        id: "CHAIN_STAGE_EXFIL",
        description: "File staging combined with an outbound POST",
        required: &[FindingType::FileStage, FindingType::NetworkPost],
        bonus: 15.0,
    },
    ChainDef {
        id: "CHAIN_DECODE_STAGE",
        description: "Payload decode combined with file staging",
        required: &[FindingType::DecodeExec, FindingType::FileStage],
        bonus: 10.0,
    },
];

/// Decision level for a scanned skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe,
    Warning,
    Unsafe,
    Critical,
    Unverifiable,
}

impl RiskLevel {
    pub fn from_score(score: f64, strict: bool) -> Self {
        let (safe, warning, unsafe_) = if strict {
            (20.0, 40.0, 60.0)
        } else {
            (30.0, 60.0, 80.0)
        };
        if score < safe {
            RiskLevel::Safe
        } else if score < warning {
            RiskLevel::Warning
        } else if score < unsafe_ {
            RiskLevel::Unsafe
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Warning => "WARNING",
            RiskLevel::Unsafe => "UNSAFE",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Unverifiable => "UNVERIFIABLE",
        }
    }

    /// Ordering used when aggregating several skills: worst wins.
    fn gate_rank(&self) -> u8 {
        match self {
            RiskLevel::Safe => 0,
            RiskLevel::Warning => 1,
            RiskLevel::Unsafe => 2,
            RiskLevel::Critical => 3,
            RiskLevel::Unverifiable => 4,
        }
    }

    pub fn worst_of(levels: impl IntoIterator<Item = RiskLevel>) -> RiskLevel {
        levels
            .into_iter()
            .max_by_key(RiskLevel::gate_rank)
            .unwrap_or(RiskLevel::Safe)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainMatch {
    pub id: String,
    pub description: String,
    pub bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub findings_subtotal: f64,
    pub chain_bonus: f64,
    pub trust_credits: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreOptions {
    pub strict: bool,
    pub trust_credits: f64,
    pub has_unverifiable_content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    /// 0..=100, or `None` when the level is UNVERIFIABLE.
    pub risk_score: Option<f64>,
    /// `100 - risk_score`, or `None` when the level is UNVERIFIABLE.
    pub safety_score: Option<f64>,
    pub level: RiskLevel,
    pub findings: Vec<Finding>,
    pub chain_matches: Vec<ChainMatch>,
    pub breakdown: ScoreBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Registry moderation signal attached to a curated-registry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Suspicious,
    MalwareBlocked,
}

/// Turn a finding set into a single risk decision.
pub fn score(findings: Vec<Finding>, opts: &ScoreOptions) -> ScoringResult {
    // Unverifiable content overrides everything: a skill that cannot be
    // fully read must never pass on the strength of what *was* readable.
    if opts.has_unverifiable_content {
        return ScoringResult {
            risk_score: None,
            safety_score: None,
            level: RiskLevel::Unverifiable,
            findings,
            chain_matches: Vec::new(),
            breakdown: ScoreBreakdown {
                findings_subtotal: 0.0,
                chain_bonus: 0.0,
                trust_credits: 0.0,
            },
            reason: Some(UNVERIFIABLE_REASON.to_string()),
        };
    }

    let findings_subtotal: f64 = findings
        .iter()
        .map(|f| f.severity.points() * f.confidence.multiplier())
        .sum();

    if let Some(blocker) = hard_block(&findings) {
        let reason = format!("hard block: {} ({})", blocker.id, blocker.finding_type);
        debug!(finding = %blocker.id, "Hard-block finding forces CRITICAL");
        return ScoringResult {
            risk_score: Some(MAX_SCORE),
            safety_score: Some(0.0),
            level: RiskLevel::Critical,
            findings,
            chain_matches: Vec::new(),
            breakdown: ScoreBreakdown {
                findings_subtotal,
                chain_bonus: 0.0,
                trust_credits: 0.0,
            },
            reason: Some(reason),
        };
    }

    let chain_matches = match_chains(&findings);
    let chain_bonus: f64 = chain_matches.iter().map(|c| c.bonus).sum();

    // Trust credits may soften borderline results, never genuinely risky ones.
    let any_high = findings
        .iter()
        .any(|f| f.severity >= Severity::High);
    let trust_credits = if any_high {
        0.0
    } else {
        opts.trust_credits.clamp(0.0, MAX_TRUST_CREDITS)
    };

    let risk = (findings_subtotal + chain_bonus - trust_credits).clamp(0.0, MAX_SCORE);
    let level = RiskLevel::from_score(risk, opts.strict);

    debug!(
        risk,
        subtotal = findings_subtotal,
        chain_bonus,
        trust_credits,
        level = %level,
        "Scored finding set"
    );

    ScoringResult {
        risk_score: Some(risk),
        safety_score: Some(MAX_SCORE - risk),
        level,
        findings,
        chain_matches,
        breakdown: ScoreBreakdown {
            findings_subtotal,
            chain_bonus,
            trust_credits,
        },
        reason: None,
    }
}

fn hard_block(findings: &[Finding]) -> Option<&Finding> {
    findings.iter().find(|f| {
        f.severity == Severity::Critical
            && f.confidence == crate::rules::Confidence::High
            && HARD_BLOCK_TYPES.contains(&f.finding_type)
    })
}

fn match_chains(findings: &[Finding]) -> Vec<ChainMatch> {
    let present: HashSet<FindingType> = findings.iter().map(|f| f.finding_type).collect();
    CHAINS
        .iter()
        .filter(|chain| chain.required.iter().all(|t| present.contains(t)))
        .map(|chain| ChainMatch {
            id: chain.id.to_string(),
            description: chain.description.to_string(),
            bonus: chain.bonus,
        })
        .collect()
}

/// Registry moderation post-override. Applied after local scoring, never
/// instead of it; findings and chain data are preserved for reporting.
pub fn apply_moderation(mut result: ScoringResult, status: ModerationStatus) -> ScoringResult {
    match status {
        ModerationStatus::MalwareBlocked => {
            result.risk_score = Some(MAX_SCORE);
            result.safety_score = Some(0.0);
            result.level = RiskLevel::Critical;
            result.reason = Some("registry moderation: flagged as malware".to_string());
        }
        ModerationStatus::Suspicious => {
            if result.level == RiskLevel::Safe {
                let raised = result.risk_score.unwrap_or(0.0).max(30.0);
                result.risk_score = Some(raised);
                result.safety_score = Some(MAX_SCORE - raised);
                result.level = RiskLevel::Warning;
                result.reason = Some("registry moderation: flagged as suspicious".to_string());
            }
        }
    }
    result
}

/// Ten-character bar for terminal score rendering.
pub fn score_bar(score: f64, max: f64) -> String {
    let filled = ((score / max) * 10.0).round() as usize;
    let filled = filled.min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Confidence;

    fn finding(severity: Severity, confidence: Confidence, ftype: FindingType) -> Finding {
        Finding {
            id: format!("T-000:file-{}", ftype.as_str()),
            title: "Test".into(),
            severity,
            confidence,
            finding_type: ftype,
            file: "test.sh".into(),
            message: "test".into(),
        }
    }

    fn opts() -> ScoreOptions {
        ScoreOptions::default()
    }

    #[test]
    fn test_empty_findings_is_safe_zero() {
        let result = score(vec![], &opts());
        assert_eq!(result.level, RiskLevel::Safe);
        assert_eq!(result.risk_score, Some(0.0));
        assert_eq!(result.safety_score, Some(100.0));
    }

    #[test]
    fn test_unverifiable_overrides_everything() {
        let findings = vec![finding(
            Severity::Critical,
            Confidence::High,
            FindingType::RemoteCodeExec,
        )];
        let result = score(
            findings,
            &ScoreOptions {
                has_unverifiable_content: true,
                ..Default::default()
            },
        );
        assert_eq!(result.level, RiskLevel::Unverifiable);
        assert_eq!(result.risk_score, None);
        assert_eq!(result.safety_score, None);
        assert!(result.reason.is_some());
    }

    #[test]
    fn test_hard_block_forces_critical_100() {
        let findings = vec![
            finding(Severity::Low, Confidence::Low, FindingType::FileStage),
            finding(Severity::Critical, Confidence::High, FindingType::DestructiveOp),
        ];
        let result = score(findings, &opts());
        assert_eq!(result.level, RiskLevel::Critical);
        assert_eq!(result.risk_score, Some(100.0));
        assert_eq!(result.safety_score, Some(0.0));
        assert!(result.chain_matches.is_empty());
    }

    #[test]
    fn test_critical_medium_confidence_is_not_hard_block() {
        let findings = vec![finding(
            Severity::Critical,
            Confidence::Medium,
            FindingType::RemoteCodeExec,
        )];
        let result = score(findings, &opts());
        // 50 * 0.7 = 35 -> WARNING on standard thresholds
        assert_eq!(result.risk_score, Some(35.0));
        assert_eq!(result.level, RiskLevel::Warning);
    }

    #[test]
    fn test_critical_non_block_type_is_not_hard_block() {
        let findings = vec![finding(
            Severity::Critical,
            Confidence::High,
            FindingType::DecodeExec,
        )];
        let result = score(findings, &opts());
        assert_eq!(result.risk_score, Some(50.0));
        assert_ne!(result.risk_score, Some(100.0));
    }

    #[test]
    fn test_weighted_subtotal() {
        let findings = vec![
            finding(Severity::High, Confidence::Medium, FindingType::Other),
            finding(Severity::Medium, Confidence::High, FindingType::Other),
            finding(Severity::Low, Confidence::Low, FindingType::Other),
        ];
        let result = score(findings, &opts());
        // 25*0.7 + 12*1.0 + 5*0.4 = 17.5 + 12 + 2 = 31.5
        assert_eq!(result.breakdown.findings_subtotal, 31.5);
        assert_eq!(result.risk_score, Some(31.5));
    }

    #[test]
    fn test_chain_secret_exfil_requires_both_types() {
        let only_secret = vec![finding(
            Severity::Medium,
            Confidence::High,
            FindingType::SecretRead,
        )];
        let result = score(only_secret, &opts());
        assert!(result.chain_matches.is_empty());

        let both = vec![
            finding(Severity::Medium, Confidence::High, FindingType::SecretRead),
            finding(Severity::Medium, Confidence::High, FindingType::NetworkPost),
        ];
        let result = score(both, &opts());
        assert!(result.chain_matches.iter().any(|c| c.id == "CHAIN_SECRET_EXFIL"));
        // 12 + 12 + 25 = 49 -> WARNING on standard thresholds
        assert_eq!(result.risk_score, Some(49.0));
        assert_eq!(result.level, RiskLevel::Warning);
    }

    #[test]
    fn test_chain_matches_across_files() {
        let mut a = finding(Severity::Medium, Confidence::High, FindingType::SecretRead);
        a.file = "a.js".into();
        let mut b = finding(Severity::Medium, Confidence::High, FindingType::NetworkPost);
        b.file = "b.sh".into();
        let result = score(vec![a, b], &opts());
        assert!(result.chain_matches.iter().any(|c| c.id == "CHAIN_SECRET_EXFIL"));
    }

    #[test]
    fn test_trust_credits_reduce_borderline_score() {
        let findings = vec![
            finding(Severity::Medium, Confidence::High, FindingType::Other),
            finding(Severity::Medium, Confidence::High, FindingType::Other),
            finding(Severity::Medium, Confidence::High, FindingType::Other),
        ];
        // 36 -> WARNING; 10 trust credits -> 26 -> SAFE
        let result = score(
            findings,
            &ScoreOptions {
                trust_credits: 10.0,
                ..Default::default()
            },
        );
        assert_eq!(result.risk_score, Some(26.0));
        assert_eq!(result.level, RiskLevel::Safe);
        assert_eq!(result.breakdown.trust_credits, 10.0);
    }

    #[test]
    fn test_trust_credits_zeroed_by_high_severity() {
        let findings = vec![finding(
            Severity::High,
            Confidence::High,
            FindingType::Other,
        )];
        let result = score(
            findings,
            &ScoreOptions {
                trust_credits: 20.0,
                ..Default::default()
            },
        );
        assert_eq!(result.breakdown.trust_credits, 0.0);
        assert_eq!(result.risk_score, Some(25.0));
    }

    #[test]
    fn test_trust_credits_capped_at_20() {
        let findings = vec![finding(
            Severity::Medium,
            Confidence::High,
            FindingType::Other,
        )];
        let result = score(
            findings,
            &ScoreOptions {
                trust_credits: 500.0,
                ..Default::default()
            },
        );
        assert_eq!(result.breakdown.trust_credits, 20.0);
        assert_eq!(result.risk_score, Some(0.0));
    }

    #[test]
    fn test_score_clamped_at_100() {
        let findings: Vec<Finding> = (0..5)
            .map(|i| {
                let mut f = finding(Severity::Critical, Confidence::Medium, FindingType::Other);
                f.id = format!("T-00{}:x", i);
                f
            })
            .collect();
        let result = score(findings, &opts());
        assert_eq!(result.risk_score, Some(100.0));
        assert_eq!(result.safety_score, Some(0.0));
    }

    #[test]
    fn test_standard_threshold_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0, false), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(29.9, false), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(30.0, false), RiskLevel::Warning);
        assert_eq!(RiskLevel::from_score(59.9, false), RiskLevel::Warning);
        assert_eq!(RiskLevel::from_score(60.0, false), RiskLevel::Unsafe);
        assert_eq!(RiskLevel::from_score(79.9, false), RiskLevel::Unsafe);
        assert_eq!(RiskLevel::from_score(80.0, false), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100.0, false), RiskLevel::Critical);
    }

    #[test]
    fn test_strict_threshold_boundaries() {
        assert_eq!(RiskLevel::from_score(19.9, true), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(20.0, true), RiskLevel::Warning);
        assert_eq!(RiskLevel::from_score(40.0, true), RiskLevel::Unsafe);
        assert_eq!(RiskLevel::from_score(60.0, true), RiskLevel::Critical);
    }

    #[test]
    fn test_threshold_monotonicity() {
        for strict in [false, true] {
            let mut prev = RiskLevel::Safe;
            for step in 0..=1000 {
                let level = RiskLevel::from_score(step as f64 / 10.0, strict);
                assert!(level.gate_rank() >= prev.gate_rank());
                prev = level;
            }
        }
    }

    #[test]
    fn test_worst_of_ordering() {
        assert_eq!(
            RiskLevel::worst_of([RiskLevel::Safe, RiskLevel::Warning]),
            RiskLevel::Warning
        );
        assert_eq!(
            RiskLevel::worst_of([RiskLevel::Critical, RiskLevel::Unverifiable]),
            RiskLevel::Unverifiable
        );
        assert_eq!(RiskLevel::worst_of([]), RiskLevel::Safe);
    }

    #[test]
    fn test_moderation_malware_blocked_forces_critical() {
        let result = score(vec![], &opts());
        let overridden = apply_moderation(result, ModerationStatus::MalwareBlocked);
        assert_eq!(overridden.level, RiskLevel::Critical);
        assert_eq!(overridden.risk_score, Some(100.0));
    }

    #[test]
    fn test_moderation_suspicious_raises_safe_to_warning() {
        let result = score(vec![], &opts());
        let overridden = apply_moderation(result, ModerationStatus::Suspicious);
        assert_eq!(overridden.level, RiskLevel::Warning);
        assert_eq!(overridden.risk_score, Some(30.0));
    }

    #[test]
    fn test_moderation_suspicious_leaves_warning_alone() {
        let findings = vec![
            finding(Severity::Medium, Confidence::High, FindingType::SecretRead),
            finding(Severity::Medium, Confidence::High, FindingType::NetworkPost),
        ];
        let result = score(findings, &opts());
        let before = result.risk_score;
        let overridden = apply_moderation(result, ModerationStatus::Suspicious);
        assert_eq!(overridden.risk_score, before);
        assert_eq!(overridden.level, RiskLevel::Warning);
        assert!(!overridden.findings.is_empty());
    }

    #[test]
    fn test_moderation_preserves_findings_and_chains() {
        let findings = vec![
            finding(Severity::Medium, Confidence::High, FindingType::SecretRead),
            finding(Severity::Medium, Confidence::High, FindingType::NetworkPost),
        ];
        let result = score(findings, &opts());
        let overridden = apply_moderation(result, ModerationStatus::MalwareBlocked);
        assert_eq!(overridden.findings.len(), 2);
        assert!(!overridden.chain_matches.is_empty());
    }

    #[test]
    fn test_safety_is_complement_of_risk() {
        let findings = vec![finding(
            Severity::Medium,
            Confidence::Medium,
            FindingType::Other,
        )];
        let result = score(findings, &opts());
        let risk = result.risk_score.unwrap();
        assert_eq!(result.safety_score, Some(100.0 - risk));
        assert!((0.0..=100.0).contains(&risk));
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(0.0, 100.0), "░░░░░░░░░░");
        assert_eq!(score_bar(50.0, 100.0), "█████░░░░░");
        assert_eq!(score_bar(100.0, 100.0), "██████████");
    }
}
