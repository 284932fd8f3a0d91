//! Configuration loading and atomic ruleset replacement.
//!
//! The configuration layer supplies the raw rule-text list and the
//! allowed/required plan sets. Loading always builds a complete new
//! [`RuleSet`]; [`SharedRuleSet`] swaps it in atomically so concurrent
//! matchers only ever observe a fully validated set.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use tracing::debug;

use crate::{build_rule_set, RuleSet, ValidationError};

/// The operator-supplied rule configuration.
///
/// ```yaml
/// rules:
///   - aws
///   - aws(PR=cf-eu11) -> EU
///   - trial -> S
/// allowed_plans: [aws, trial]
/// required_plans: [aws]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Rule entries, one DSL rule each.
    pub rules: Vec<String>,

    /// Plans rules may reference. Empty disables the allowed-plan check.
    #[serde(default)]
    pub allowed_plans: BTreeSet<String>,

    /// Plans that must be covered by at least one rule.
    #[serde(default)]
    pub required_plans: BTreeSet<String>,
}

impl RulesConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// The underlying YAML error; rule validation happens later in
    /// [`build`](Self::build).
    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// The underlying JSON error.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Parse and validate the configured rules into a [`RuleSet`].
    ///
    /// # Errors
    ///
    /// A [`ValidationError`] carrying every finding of the first failing
    /// validation pass.
    pub fn build(&self) -> Result<RuleSet, ValidationError> {
        let rule_set = build_rule_set(&self.rules, &self.allowed_plans, &self.required_plans)?;
        debug!(rules = rule_set.len(), "rule configuration loaded");
        Ok(rule_set)
    }
}

/// A ruleset slot shared across request handlers.
///
/// Readers take a cheap `Arc` snapshot and keep matching against it even
/// while a reload swaps in a replacement; there is no partially updated
/// state to observe.
#[derive(Debug, Default)]
pub struct SharedRuleSet {
    inner: RwLock<Arc<RuleSet>>,
}

impl SharedRuleSet {
    /// Create a slot holding the given set.
    #[must_use]
    pub fn new(rule_set: RuleSet) -> Self {
        Self {
            inner: RwLock::new(Arc::new(rule_set)),
        }
    }

    /// Snapshot the current set.
    #[must_use]
    pub fn current(&self) -> Arc<RuleSet> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole set atomically.
    pub fn replace(&self, rule_set: RuleSet) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(rule_set);
    }
}
