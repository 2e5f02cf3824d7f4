//! Query parser adapters.

mod rule_based;

pub use rule_based::RuleBasedQueryParser;
