pub mod json;
pub mod terminal;

use crate::gate::GateDecision;
use crate::resolver::ResolvedSkill;
use crate::scoring::ScoringResult;

/// Everything a reporter needs to render one gated skill.
pub struct GateReport<'a> {
    pub skill: &'a ResolvedSkill,
    pub result: &'a ScoringResult,
    pub decision: &'a GateDecision,
}

pub trait Reporter {
    fn report(&self, report: &GateReport) -> String;
}
