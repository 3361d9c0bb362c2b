pub mod builtin;
pub mod types;

pub use builtin::all_rules;
pub use types::{Confidence, Finding, FindingType, Matcher, Rule, Severity};
