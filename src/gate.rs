use crate::scoring::RiskLevel;
use serde::{Deserialize, Serialize};

/// Exit code for a blocked install that an override flag could allow.
pub const EXIT_BLOCKED_SOFT: u8 = 10;
/// Exit code for a blocked install.
pub const EXIT_BLOCKED: u8 = 20;
/// Exit code used by the shell layer for pipeline errors; never produced by
/// the gate itself.
pub const EXIT_RUNTIME_ERROR: u8 = 30;

/// Caller-supplied override flags. `ci` / `dry_run` are deliberately absent:
/// the caller checks those after the gate, not inside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateFlags {
    pub yes: bool,
    pub force: bool,
    pub allow_unverifiable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    pub exit_code: u8,
    pub can_install: bool,
    pub gate_note: String,
}

impl GateDecision {
    fn allow(note: &str) -> Self {
        Self {
            exit_code: 0,
            can_install: true,
            gate_note: note.to_string(),
        }
    }

    fn block(exit_code: u8, note: &str) -> Self {
        Self {
            exit_code,
            can_install: false,
            gate_note: note.to_string(),
        }
    }
}

/// Pure decision table over the level and override flags. Every call
/// produces exactly one decision; there is no retry inside the gate.
pub fn evaluate(level: RiskLevel, flags: GateFlags) -> GateDecision {
    match level {
        RiskLevel::Unverifiable => {
            if flags.allow_unverifiable {
                GateDecision::allow("unverifiable content allowed by --allow-unverifiable")
            } else {
                GateDecision::block(
                    EXIT_BLOCKED,
                    "content could not be verified; pass --allow-unverifiable to override",
                )
            }
        }
        RiskLevel::Critical => {
            GateDecision::block(EXIT_BLOCKED, "critical risk; install is never allowed")
        }
        RiskLevel::Unsafe => {
            if flags.force {
                GateDecision::allow("unsafe result overridden by --force")
            } else {
                GateDecision::block(EXIT_BLOCKED, "unsafe risk; pass --force to override")
            }
        }
        RiskLevel::Warning => {
            if flags.yes {
                GateDecision::allow("warnings accepted by --yes")
            } else {
                GateDecision::block(
                    EXIT_BLOCKED_SOFT,
                    "warnings present; pass --yes to accept them",
                )
            }
        }
        RiskLevel::Safe => GateDecision::allow("no significant risk detected"),
    }
}
