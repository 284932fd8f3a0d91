//! hap - rule-driven hyperscaler account pool selection
//!
//! This crate is the brain of hyperscaler account selection for runtime
//! provisioning: it compiles a small declarative rule language, statically
//! validates it so every plan/region input resolves to exactly one outcome,
//! matches concrete requests against the validated set, and leases a pool
//! credential consistent with the winning rule.
//!
//! # Pipeline
//!
//! - [`parse`] — one DSL entry → [`Rule`]
//! - [`build_rule_set`] — all entries + plan sets → validated [`RuleSet`]
//! - [`RuleSet::matching`] — request attributes → most specific [`Match`]
//! - [`LabelSelector::for_match`] — match → pool label selector
//! - [`AccountPool::resolve`] — selector + tenant → claimed resource name
//!
//! Parsing, validation and matching are pure over immutable data and safe
//! for unbounded concurrent callers. The only mutable critical section is
//! the dedicated-pool claim, serialized per [`AccountPool`] instance.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use hap::{build_rule_set, LabelSelector, ProvisioningAttributes};
//!
//! let allowed: BTreeSet<String> = ["aws", "trial"].iter().map(|p| p.to_string()).collect();
//! let rule_set = build_rule_set(
//!     &["aws", "aws(PR=cf-eu11) -> EU", "trial -> S"],
//!     &allowed,
//!     &BTreeSet::new(),
//! )
//! .unwrap();
//!
//! let m = rule_set
//!     .matching(&ProvisioningAttributes {
//!         plan: "aws".into(),
//!         platform_region: "cf-eu11".into(),
//!         hyperscaler_region: "eu-central-1".into(),
//!         hyperscaler: "aws".into(),
//!     })
//!     .unwrap();
//! assert!(m.eu_access);
//! assert_eq!(
//!     LabelSelector::for_match(&m).to_string(),
//!     "hyperscalerType=aws,euAccess=true,shared!=true,!dirty"
//! );
//! ```
//!
//! # Boundaries
//!
//! The engine issues no network calls of its own: the pool store is reached
//! through the [`ResourceRepository`] and [`UsageLister`] traits, which the
//! embedding broker implements. Errors are typed, never logged-and-swallowed,
//! and never retried internally; retry/backoff policy belongs to callers.

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod attribute;
mod error;
mod matcher;
mod parser;
mod pool;
mod rule;
mod ruleset;
mod selector;
mod validator;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use attribute::{InputAttribute, OutputAttribute};
pub use error::{ParseError, PoolError, ProcessingError, RepositoryError};
pub use matcher::Match;
pub use parser::parse;
pub use pool::{
    AccountPool, ClusterUsage, PoolResource, ResourceRepository, SecretRef, UsageLister,
};
pub use rule::{ProvisioningAttributes, RawData, Rule};
pub use ruleset::{PatternAttribute, RuleSet, ValidRule};
pub use selector::{labels, LabelSelector, Requirement};
pub use validator::{build_rule_set, validate, ParsingResult, ValidationError};

#[cfg(feature = "config")]
pub use config::{RulesConfig, SharedRuleSet};

/// Prelude module for convenient imports.
///
/// ```
/// use hap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        build_rule_set,
        parse,
        AccountPool,
        ClusterUsage,
        LabelSelector,
        Match,
        ParseError,
        PatternAttribute,
        PoolError,
        PoolResource,
        ProcessingError,
        ProvisioningAttributes,
        RawData,
        RepositoryError,
        Requirement,
        ResourceRepository,
        Rule,
        RuleSet,
        SecretRef,
        UsageLister,
        ValidRule,
        ValidationError,
    };
}
