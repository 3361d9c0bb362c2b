use crate::reporter::{GateReport, Reporter};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

/// Machine-readable output for CI and tooling. One JSON document per skill.
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: &'static str,
    scanned_at: String,
    skill: &'a crate::resolver::ResolvedSkill,
    scanned_files: Vec<&'a str>,
    result: &'a crate::scoring::ScoringResult,
    decision: &'a crate::gate::GateDecision,
}

impl Reporter for JsonReporter {
    fn report(&self, report: &GateReport) -> String {
        let envelope = Envelope {
            version: env!("CARGO_PKG_VERSION"),
            scanned_at: Utc::now().to_rfc3339(),
            skill: report.skill,
            scanned_files: report.skill.files.iter().map(|f| f.path.as_str()).collect(),
            result: report.result,
            decision: report.decision,
        };
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|e| {
            json!({ "error": format!("Failed to serialize result: {e}") }).to_string()
        })
    }
}
