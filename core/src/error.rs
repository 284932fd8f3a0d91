//! Error taxonomy for the rule engine.
//!
//! Four independent families, matching the pipeline stages:
//!
//! - [`ParseError`] is local to one rule entry and never aborts sibling entries.
//! - [`ProcessingError`] is produced by the validator passes; any occurrence
//!   invalidates the whole ruleset (collected into a [`ValidationError`]).
//! - "No matching rule" is not an error at all: the matcher returns `None`.
//! - [`PoolError`] covers credential resolution, keeping "nothing there"
//!   distinguishable from infrastructure failure so callers can pick their
//!   retry strategy.
//!
//! The engine itself never logs-and-swallows or retries. Errors propagate
//! typed and the caller decides.

use thiserror::Error;

/// Malformed rule syntax, scoped to a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `(` and `)` must both be present or both absent, at most once each.
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    /// More than one `->` in the entry.
    #[error("only one \"->\" allowed")]
    MultipleArrows,

    /// Text found after the closing parenthesis, before any `->`.
    #[error("unexpected input after \")\"")]
    TrailingInput,

    /// The plan token left of the attribute list is empty.
    #[error("plan is empty")]
    EmptyPlan,

    /// An empty comma-separated attribute entry.
    #[error("empty attribute")]
    EmptyAttribute,

    /// An input attribute entry without exactly one `=`.
    #[error("attribute \"{0}\" must have the form <name>=<value>")]
    MalformedAttribute(String),

    /// An attribute name outside the grammar (`PR`/`HR` inputs,
    /// `EU`/`S`/`PR`/`HR` outputs).
    #[error("unknown attribute \"{0}\"")]
    UnknownAttribute(String),

    /// The same attribute set twice anywhere in the entry.
    #[error("{0} already set")]
    AttributeAlreadySet(&'static str),

    /// An input attribute with an empty value, e.g. `PR=`.
    #[error("attribute \"{0}\" has an empty value")]
    EmptyValue(String),
}

/// A validation-pass finding against an otherwise well-formed rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// Two rules reduce to the same `plan(PR=...,HR=...)` key.
    #[error("rule \"{duplicate}\" is already defined by \"{original}\"")]
    DuplicateRule {
        /// The later entry, reported as the duplicate.
        duplicate: String,
        /// The first entry with the same key.
        original: String,
    },

    /// Two partially-specified rules jointly cover a plan/region combination
    /// without a fully-specific rule to break the tie.
    #[error(
        "rules \"{first}\" and \"{second}\" are ambiguous, add \"{resolving}\" to disambiguate"
    )]
    AmbiguousRules {
        /// The rule with only the platform region specified.
        first: String,
        /// The rule with only the hyperscaler region specified.
        second: String,
        /// The missing fully-specific rule text.
        resolving: String,
    },

    /// A rule references a plan outside the operator-supplied allowed set.
    #[error("plan \"{plan}\" is not supported")]
    UnsupportedPlan {
        /// The unsupported plan literal.
        plan: String,
    },

    /// Operator-required plans with no rule covering them.
    #[error("required plans not covered: {}", missing.join(", "))]
    RequiredPlansNotCovered {
        /// The required plans with no matching rule, sorted.
        missing: Vec<String>,
    },
}

/// Errors from the collaborating pool resource store.
///
/// The boundary keeps [`NotFound`](RepositoryError::NotFound) separate so the
/// claimer can treat "nothing matched the selector" as a normal state while
/// propagating everything else unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store has no resource matching the request.
    #[error("resource not found")]
    NotFound,

    /// Any other store failure (network, auth, conflict). Opaque to the
    /// engine; callers classify it for retry purposes.
    #[error("{0}")]
    Other(String),
}

/// Credential resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The candidate list for the selector was empty. For callers this is a
    /// transient absence (eventual consistency) worth retrying with backoff.
    #[error("no shared resource found for selector \"{selector}\"")]
    NotFound {
        /// The selector that matched nothing.
        selector: String,
    },

    /// The dedicated pool has no unclaimed resource left. Terminal until an
    /// operator adds capacity; not worth retrying indefinitely.
    #[error("failed to find unassigned resource for selector \"{selector}\"")]
    NoUnassignedResource {
        /// The claim-candidate selector that matched nothing.
        selector: String,
    },

    /// A store error other than not-found, propagated unchanged.
    #[error("pool repository error: {0}")]
    Repository(#[from] RepositoryError),
}
