//! Parsed rule shape and per-request query attributes.
//!
//! A [`Rule`] is the direct output of the parser: attribute values are plain
//! strings with the empty string meaning "unset". Validation turns rules into
//! [`ValidRule`](crate::ValidRule)s with explicit wildcard patterns.

/// One parsed, not-yet-validated rule entry.
///
/// Region attributes use the empty string for "unset"; the parser rejects
/// attempts to set any attribute twice, so a non-empty value (or a `true`
/// flag) always comes from exactly one token in the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// The plan literal left of the attribute list. Never empty after a
    /// successful parse.
    pub plan: String,

    /// `PR=<value>` input attribute; empty when the rule matches any
    /// platform region.
    pub platform_region: String,

    /// `HR=<value>` input attribute; empty when the rule matches any
    /// hyperscaler region.
    pub hyperscaler_region: String,

    /// `-> EU`: the selected credential must live in an EU-access pool.
    pub eu_access: bool,

    /// `-> S`: resolve against the shared pool instead of claiming a
    /// dedicated credential.
    pub shared: bool,

    /// `-> PR`: append `_<platformRegion>` to the hyperscaler type.
    pub platform_region_suffix: bool,

    /// `-> HR`: append `_<hyperscalerRegion>` to the hyperscaler type.
    pub hyperscaler_region_suffix: bool,
}

impl Rule {
    /// Create an empty rule for the given plan.
    #[must_use]
    pub fn new(plan: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            ..Self::default()
        }
    }

    /// Number of unset (wildcard) input attributes, 0..=2.
    #[must_use]
    pub fn match_any_count(&self) -> u8 {
        u8::from(self.platform_region.is_empty()) + u8::from(self.hyperscaler_region.is_empty())
    }
}

/// Provenance of a validated rule, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawData {
    /// The rule entry exactly as it appeared in the configuration.
    pub original_text: String,

    /// Zero-based position of the entry in the configuration.
    pub ordinal: usize,
}

/// The per-request query resolved against a validated ruleset.
///
/// Ephemeral: supplied by the caller for one resolution, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProvisioningAttributes {
    /// The requested plan, compared literally against rule plans.
    pub plan: String,

    /// Platform region of the request (e.g. `cf-eu11`). May be empty.
    pub platform_region: String,

    /// Hyperscaler region of the request (e.g. `eu-central-1`). May be empty.
    pub hyperscaler_region: String,

    /// The hyperscaler backing the plan; becomes the base of
    /// [`Match::hyperscaler_type`](crate::Match::hyperscaler_type).
    pub hyperscaler: String,
}
