pub mod cli;
pub mod error;
pub mod gate;
pub mod reporter;
pub mod resolver;
pub mod rules;
pub mod scanner;
pub mod scoring;

pub use cli::{Cli, ModerationArg, OutputFormat};
pub use error::{GateError, Result};
pub use gate::{GateDecision, GateFlags};
pub use reporter::{GateReport, Reporter, json::JsonReporter, terminal::TerminalReporter};
pub use resolver::{
    ArchiveResolver, GithubResolver, LocalResolver, ResolveError, ResolvedFile, ResolvedSkill,
    ResolverOptions, SourceKind,
};
pub use rules::{Confidence, Finding, FindingType, Severity};
pub use scanner::{ScanReport, SkillScanner};
pub use scoring::{ModerationStatus, RiskLevel, ScoreOptions, ScoringResult};
