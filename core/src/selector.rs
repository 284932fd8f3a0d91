//! Label-selector projection of a [`Match`].
//!
//! A pure transform from a match to the Kubernetes-style label selector the
//! pool repository understands: comma-joined requirements of the forms
//! `key=value`, `key!=value` and `!key` (key must be absent).

use std::collections::BTreeMap;
use std::fmt;

use crate::Match;

/// Well-known pool resource label keys.
pub mod labels {
    /// The hyperscaler type a credential serves, possibly region-suffixed.
    pub const HYPERSCALER_TYPE: &str = "hyperscalerType";
    /// Present with value `"true"` on EU-access pool resources.
    pub const EU_ACCESS: &str = "euAccess";
    /// Present with value `"true"` on shared pool resources.
    pub const SHARED: &str = "shared";
    /// Marks a resource temporarily unusable; excluded from claiming.
    pub const DIRTY: &str = "dirty";
    /// The claiming tenant of a dedicated pool resource.
    pub const TENANT_NAME: &str = "tenantName";
}

/// One label requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// `key=value`: the label must be present with exactly this value.
    Eq(String, String),
    /// `key!=value`: the label must be absent or carry a different value.
    NotEq(String, String),
    /// `!key`: the label must be absent.
    NotExists(String),
}

impl Requirement {
    /// Evaluate this requirement against a resource's labels.
    ///
    /// `NotEq` follows Kubernetes semantics: an absent key satisfies it.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Eq(key, value) => labels.get(key) == Some(value),
            Self::NotEq(key, value) => labels.get(key) != Some(value),
            Self::NotExists(key) => !labels.contains_key(key),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(key, value) => write!(f, "{key}={value}"),
            Self::NotEq(key, value) => write!(f, "{key}!={value}"),
            Self::NotExists(key) => write!(f, "!{key}"),
        }
    }
}

/// An ordered conjunction of label requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// The base selector for a match.
    ///
    /// Always constrains the hyperscaler type and EU access. Shared matches
    /// stop there plus `shared=true`; dedicated matches instead exclude
    /// shared resources and anything flagged dirty.
    #[must_use]
    pub fn for_match(m: &Match) -> Self {
        let mut requirements = vec![Requirement::Eq(
            labels::HYPERSCALER_TYPE.to_string(),
            m.hyperscaler_type.clone(),
        )];

        if m.eu_access {
            requirements.push(Requirement::Eq(
                labels::EU_ACCESS.to_string(),
                "true".to_string(),
            ));
        } else {
            requirements.push(Requirement::NotExists(labels::EU_ACCESS.to_string()));
        }

        if m.shared {
            requirements.push(Requirement::Eq(
                labels::SHARED.to_string(),
                "true".to_string(),
            ));
        } else {
            requirements.push(Requirement::NotEq(
                labels::SHARED.to_string(),
                "true".to_string(),
            ));
            requirements.push(Requirement::NotExists(labels::DIRTY.to_string()));
        }

        Self { requirements }
    }

    /// Derive the tenant-matching variant: resources already claimed by
    /// `tenant`.
    #[must_use]
    pub fn with_tenant(&self, tenant: &str) -> Self {
        let mut derived = self.clone();
        derived.requirements.push(Requirement::Eq(
            labels::TENANT_NAME.to_string(),
            tenant.to_string(),
        ));
        derived
    }

    /// Derive the claim-candidate variant: resources not yet claimed by
    /// anyone.
    #[must_use]
    pub fn unclaimed(&self) -> Self {
        let mut derived = self.clone();
        derived
            .requirements
            .push(Requirement::NotExists(labels::TENANT_NAME.to_string()));
        derived
    }

    /// The requirements in projection order.
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Evaluate the whole conjunction against a resource's labels.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(","))
    }
}
