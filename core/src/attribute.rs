//! Rule attribute kinds and their application to a [`Rule`].
//!
//! The grammar has two attribute namespaces: input attributes (left of `->`,
//! written `name=value`) and output attributes (right of `->`, bare names).
//! Both are fixed tagged enums with a total match, so "unknown attribute"
//! stays a distinct error and the compiler checks exhaustiveness when the
//! grammar grows.

use crate::{ParseError, Rule};

/// An input attribute: constrains which requests the rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAttribute {
    /// `PR` — the platform region of the provisioning request.
    PlatformRegion,
    /// `HR` — the hyperscaler region of the provisioning request.
    HyperscalerRegion,
}

impl InputAttribute {
    /// Resolve an input attribute token.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PR" => Some(Self::PlatformRegion),
            "HR" => Some(Self::HyperscalerRegion),
            _ => None,
        }
    }

    /// The field name used in "already set" diagnostics.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::PlatformRegion => "PlatformRegion",
            Self::HyperscalerRegion => "HyperscalerRegion",
        }
    }

    /// Set this attribute on `rule`.
    ///
    /// # Errors
    ///
    /// [`ParseError::EmptyValue`] when `value` is empty,
    /// [`ParseError::AttributeAlreadySet`] when the rule already carries a
    /// value for this attribute.
    pub fn apply(self, rule: &mut Rule, value: &str) -> Result<(), ParseError> {
        if value.is_empty() {
            return Err(ParseError::EmptyValue(self.field_name().to_string()));
        }
        let slot = match self {
            Self::PlatformRegion => &mut rule.platform_region,
            Self::HyperscalerRegion => &mut rule.hyperscaler_region,
        };
        if !slot.is_empty() {
            return Err(ParseError::AttributeAlreadySet(self.field_name()));
        }
        *slot = value.to_string();
        Ok(())
    }
}

/// An output attribute: shapes the [`Match`](crate::Match) a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAttribute {
    /// `EU` — require an EU-access pool.
    EuAccess,
    /// `S` — resolve from the shared pool.
    Shared,
    /// `PR` — suffix the hyperscaler type with the platform region.
    PlatformRegionSuffix,
    /// `HR` — suffix the hyperscaler type with the hyperscaler region.
    HyperscalerRegionSuffix,
}

impl OutputAttribute {
    /// Resolve an output attribute token.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "EU" => Some(Self::EuAccess),
            "S" => Some(Self::Shared),
            "PR" => Some(Self::PlatformRegionSuffix),
            "HR" => Some(Self::HyperscalerRegionSuffix),
            _ => None,
        }
    }

    /// The field name used in "already set" diagnostics.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::EuAccess => "EuAccess",
            Self::Shared => "Shared",
            Self::PlatformRegionSuffix => "PlatformRegionSuffix",
            Self::HyperscalerRegionSuffix => "HyperscalerRegionSuffix",
        }
    }

    /// Toggle this flag on `rule`.
    ///
    /// # Errors
    ///
    /// [`ParseError::AttributeAlreadySet`] when the flag is already on.
    pub fn apply(self, rule: &mut Rule) -> Result<(), ParseError> {
        let flag = match self {
            Self::EuAccess => &mut rule.eu_access,
            Self::Shared => &mut rule.shared,
            Self::PlatformRegionSuffix => &mut rule.platform_region_suffix,
            Self::HyperscalerRegionSuffix => &mut rule.hyperscaler_region_suffix,
        };
        if *flag {
            return Err(ParseError::AttributeAlreadySet(self.field_name()));
        }
        *flag = true;
        Ok(())
    }
}
