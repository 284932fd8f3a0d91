//! Specificity-ordered rule matching.
//!
//! Matching a request against a [`RuleSet`] is pure and read-only: safe for
//! unbounded concurrent callers, deterministic for identical inputs, and
//! "no rule matched" is an ordinary `None`, never a panic.

use crate::{ProvisioningAttributes, RawData, RuleSet, ValidRule};

/// The outcome of a successful match.
///
/// Consumed immediately by the label-selector projection and the pool
/// claimer; never persisted by this engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    /// The hyperscaler type to look up in the pool, possibly suffixed with
    /// the platform and/or hyperscaler region.
    pub hyperscaler_type: String,

    /// Whether the credential must come from an EU-access pool.
    pub eu_access: bool,

    /// Whether to resolve from the shared pool (no exclusive claim).
    pub shared: bool,

    /// Provenance of the winning rule, for diagnostics.
    pub rule: RawData,
}

impl RuleSet {
    /// Find the most specific rule matching `attrs`.
    ///
    /// Candidates are the rules whose plan literal equals `attrs.plan`,
    /// stable-sorted ascending by wildcard count: a fully literal rule
    /// always outranks a wildcard rule that also matches, and rules of equal
    /// specificity keep configuration order, so earlier-declared rules win.
    /// The first candidate whose region patterns both accept the request is
    /// materialized into a [`Match`].
    ///
    /// Returns `None` when no candidate matches; this is a normal outcome
    /// the caller is expected to handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use hap::ProvisioningAttributes;
    ///
    /// let allowed: BTreeSet<String> = ["aws"].iter().map(|p| p.to_string()).collect();
    /// let rule_set =
    ///     hap::build_rule_set(&["aws", "aws(PR=cf-eu11)->EU"], &allowed, &BTreeSet::new())
    ///         .unwrap();
    ///
    /// let m = rule_set
    ///     .matching(&ProvisioningAttributes {
    ///         plan: "aws".into(),
    ///         platform_region: "cf-eu11".into(),
    ///         hyperscaler_region: "eu-central-1".into(),
    ///         hyperscaler: "aws".into(),
    ///     })
    ///     .unwrap();
    /// assert!(m.eu_access);
    /// ```
    #[must_use]
    pub fn matching(&self, attrs: &ProvisioningAttributes) -> Option<Match> {
        let mut candidates: Vec<&ValidRule> = self
            .rules()
            .iter()
            .filter(|rule| rule.plan() == attrs.plan)
            .collect();
        // Stable sort: ties keep configuration order.
        candidates.sort_by_key(|rule| rule.match_any_count());

        candidates
            .into_iter()
            .find(|rule| rule.matches(attrs))
            .map(|rule| materialize(rule, attrs))
    }
}

/// Turn the winning rule into a [`Match`] for the given request.
fn materialize(rule: &ValidRule, attrs: &ProvisioningAttributes) -> Match {
    let mut hyperscaler_type = attrs.hyperscaler.clone();
    // Suffix order is fixed: platform region first, hyperscaler region second.
    if rule.platform_region_suffix() {
        hyperscaler_type.push('_');
        hyperscaler_type.push_str(&attrs.platform_region);
    }
    if rule.hyperscaler_region_suffix() {
        hyperscaler_type.push('_');
        hyperscaler_type.push_str(&attrs.hyperscaler_region);
    }

    Match {
        hyperscaler_type,
        eu_access: rule.eu_access(),
        shared: rule.shared(),
        rule: rule.raw().clone(),
    }
}
