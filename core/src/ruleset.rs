//! Validated rules and the immutable ruleset.
//!
//! [`PatternAttribute`] is the post-validation representation of an input
//! attribute: either an exact literal or an explicit wildcard. A
//! [`ValidRule`] is built from a successfully parsed [`Rule`] and is
//! immutable from then on; a [`RuleSet`] is the ordered collection the
//! matcher works against, built once per configuration load and replaced
//! wholesale on reload.

use crate::{ProvisioningAttributes, RawData, Rule};

/// An input attribute pattern: a literal value or match-anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternAttribute {
    literal: String,
    match_any: bool,
}

impl PatternAttribute {
    /// A wildcard pattern that matches every value.
    #[must_use]
    pub fn any() -> Self {
        Self {
            literal: String::new(),
            match_any: true,
        }
    }

    /// An exact-equality pattern.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            literal: value.into(),
            match_any: false,
        }
    }

    /// Build from a parsed attribute value, where empty means unset.
    fn from_raw(value: &str) -> Self {
        if value.is_empty() {
            Self::any()
        } else {
            Self::literal(value)
        }
    }

    /// True when the pattern is a wildcard or exactly equals `value`.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.match_any || self.literal == value
    }

    /// True when the source rule left this attribute unset.
    #[must_use]
    pub fn is_match_any(&self) -> bool {
        self.match_any
    }

    /// The literal value; empty for wildcards.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.literal
    }
}

/// A rule that survived parsing and validation.
///
/// Immutable once constructed. `match_any_count` is precomputed so the
/// matcher's specificity sort is a plain integer comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRule {
    plan: String,
    platform_region: PatternAttribute,
    hyperscaler_region: PatternAttribute,
    eu_access: bool,
    shared: bool,
    platform_region_suffix: bool,
    hyperscaler_region_suffix: bool,
    match_any_count: u8,
    raw: RawData,
}

impl ValidRule {
    /// Build from a parsed rule, keeping the original text for diagnostics.
    #[must_use]
    pub fn from_rule(rule: &Rule, raw: RawData) -> Self {
        Self {
            plan: rule.plan.clone(),
            platform_region: PatternAttribute::from_raw(&rule.platform_region),
            hyperscaler_region: PatternAttribute::from_raw(&rule.hyperscaler_region),
            eu_access: rule.eu_access,
            shared: rule.shared,
            platform_region_suffix: rule.platform_region_suffix,
            hyperscaler_region_suffix: rule.hyperscaler_region_suffix,
            match_any_count: rule.match_any_count(),
            raw,
        }
    }

    /// The plan literal.
    #[must_use]
    pub fn plan(&self) -> &str {
        &self.plan
    }

    /// The platform region pattern.
    #[must_use]
    pub fn platform_region(&self) -> &PatternAttribute {
        &self.platform_region
    }

    /// The hyperscaler region pattern.
    #[must_use]
    pub fn hyperscaler_region(&self) -> &PatternAttribute {
        &self.hyperscaler_region
    }

    /// Whether this rule targets an EU-access pool.
    #[must_use]
    pub fn eu_access(&self) -> bool {
        self.eu_access
    }

    /// Whether this rule resolves from the shared pool.
    #[must_use]
    pub fn shared(&self) -> bool {
        self.shared
    }

    /// Number of wildcarded input attributes, 0..=2. Lower is more specific.
    #[must_use]
    pub fn match_any_count(&self) -> u8 {
        self.match_any_count
    }

    /// Provenance: original text and position in the configuration.
    #[must_use]
    pub fn raw(&self) -> &RawData {
        &self.raw
    }

    /// True when both region patterns accept the request's regions.
    #[must_use]
    pub(crate) fn matches(&self, attrs: &ProvisioningAttributes) -> bool {
        self.platform_region.matches(&attrs.platform_region)
            && self.hyperscaler_region.matches(&attrs.hyperscaler_region)
    }

    /// Whether the produced hyperscaler type carries a platform region suffix.
    #[must_use]
    pub fn platform_region_suffix(&self) -> bool {
        self.platform_region_suffix
    }

    /// Whether the produced hyperscaler type carries a hyperscaler region suffix.
    #[must_use]
    pub fn hyperscaler_region_suffix(&self) -> bool {
        self.hyperscaler_region_suffix
    }
}

/// The ordered, immutable collection of validated rules.
///
/// Safe for unbounded concurrent readers; reload builds a complete new set
/// and swaps it in, there are no partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<ValidRule>,
}

impl RuleSet {
    /// Build from validated rules, preserving configuration order.
    #[must_use]
    pub(crate) fn new(rules: Vec<ValidRule>) -> Self {
        Self { rules }
    }

    /// The validated rules, in configuration order.
    #[must_use]
    pub fn rules(&self) -> &[ValidRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
