use crate::reporter::{GateReport, Reporter};
use crate::rules::{Confidence, Finding, Severity};
use crate::scoring::{RiskLevel, score_bar};
use colored::Colorize;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn severity_label(&self, severity: &Severity) -> colored::ColoredString {
        let label = format!("[{severity}]");
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.yellow().bold(),
            Severity::Medium => label.cyan(),
            Severity::Low | Severity::Info => label.white(),
        }
    }

    fn confidence_label(&self, confidence: &Confidence) -> colored::ColoredString {
        match confidence {
            Confidence::High => "high".green(),
            Confidence::Medium => "medium".cyan(),
            Confidence::Low => "low".yellow(),
        }
    }

    fn level_label(&self, level: &RiskLevel) -> colored::ColoredString {
        let label = level.as_str();
        match level {
            RiskLevel::Safe => label.green().bold(),
            RiskLevel::Warning => label.yellow().bold(),
            RiskLevel::Unsafe => label.red(),
            RiskLevel::Critical => label.red().bold(),
            RiskLevel::Unverifiable => label.magenta().bold(),
        }
    }

    fn format_finding(&self, finding: &Finding) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}: {}\n",
            self.severity_label(&finding.severity),
            finding.id,
            finding.title
        ));
        output.push_str(&format!("  File: {}\n", finding.file));
        if self.verbose {
            output.push_str(&format!("  Type: {}\n", finding.finding_type));
            output.push_str(&format!(
                "  Confidence: {}\n",
                self.confidence_label(&finding.confidence)
            ));
            output.push_str(&format!("  Detail: {}\n", finding.message));
        }
        output
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &GateReport) -> String {
        let skill = report.skill;
        let result = report.result;
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!(
                "skillgate v{} - Skill Install Gate",
                env!("CARGO_PKG_VERSION")
            )
            .bold()
        ));
        output.push_str(&format!("Skill:  {}\n", skill.skill_name));
        output.push_str(&format!("Source: {}\n", skill.source));
        if let Some(branch) = &skill.default_branch
            && let Some(commit) = &skill.commit_or_version
        {
            let short = &commit[..commit.len().min(8)];
            output.push_str(&format!("Pinned: {branch} @ {short}\n"));
        }
        output.push_str(&format!("Files:  {} scanned\n\n", skill.files.len()));

        match result.risk_score {
            Some(score) => {
                output.push_str(&format!(
                    "{}\n",
                    format!(
                        "━━━ RISK SCORE: {:.0}/100 ({}) ━━━",
                        score,
                        self.level_label(&result.level)
                    )
                    .bold()
                ));
                output.push_str(&format!("  {}\n", score_bar(score, 100.0).dimmed()));
                let b = &result.breakdown;
                output.push_str(&format!(
                    "  findings {:.1}  chains +{:.1}  trust -{:.1}\n\n",
                    b.findings_subtotal, b.chain_bonus, b.trust_credits
                ));
            }
            None => {
                output.push_str(&format!(
                    "{}\n\n",
                    format!("━━━ RISK: {} ━━━", self.level_label(&result.level)).bold()
                ));
            }
        }

        if let Some(reason) = &result.reason {
            output.push_str(&format!("{}\n\n", reason.yellow()));
        }

        if !skill.unverifiable_reasons.is_empty() {
            output.push_str(&"Unverified content:\n".magenta().to_string());
            for reason in &skill.unverifiable_reasons {
                output.push_str(&format!("  - {reason}\n"));
            }
            output.push('\n');
        }

        if result.findings.is_empty() {
            output.push_str(&"No suspicious patterns found.\n".green().to_string());
        } else {
            for finding in &result.findings {
                output.push_str(&self.format_finding(finding));
            }
        }

        if !result.chain_matches.is_empty() {
            output.push('\n');
            output.push_str(&"Attack chains:\n".red().bold().to_string());
            for chain in &result.chain_matches {
                output.push_str(&format!(
                    "  {} (+{:.0}): {}\n",
                    chain.id, chain.bonus, chain.description
                ));
            }
        }

        output.push_str(&format!("\n{}\n", "━".repeat(50)));
        let verdict = if report.decision.can_install {
            "ALLOW".green().bold()
        } else {
            "BLOCK".red().bold()
        };
        output.push_str(&format!(
            "Gate: {} (exit code {}) - {}\n",
            verdict, report.decision.exit_code, report.decision.gate_note
        ));

        output
    }
}
