mod execution;
mod exfiltration;
mod privilege;
mod staging;

use crate::rules::types::Rule;
use std::sync::LazyLock;

static ALL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = Vec::with_capacity(16);
    rules.extend(exfiltration::rules());
    rules.extend(execution::rules());
    rules.extend(privilege::rules());
    rules.extend(staging::rules());
    rules
});

pub fn all_rules() -> &'static [Rule] {
    &ALL_RULES
}
