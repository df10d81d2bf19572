//! Exclusion rules: threshold configuration, the declarative rule table,
//! the evaluation engine, and the precedence classifier.

pub mod classify;
pub mod config;
pub mod engine;
pub mod table;

pub use classify::{classify, error_device};
pub use config::{ConfigError, Thresholds};
pub use engine::{Evaluation, SkippedRule, evaluate};
pub use table::{Applicability, Rule, RuleKind, rule_table};
