//! Ruleset validation: uniqueness, ambiguity and plan coverage.
//!
//! Validation runs as three passes over the parsed entries, in order, and
//! short-circuits per pass: parse errors suppress everything else, duplicate
//! errors suppress the ambiguity pass, and so on. A ruleset is either fully
//! usable or not usable at all; there is no partial activation.
//!
//! # The ambiguity pass
//!
//! A rule's *signature* keeps the plan literal but reduces each input
//! attribute to specified/wildcard. When one rule specifies only `PR` and a
//! sibling rule of the same plan specifies only `HR`, a request carrying
//! both region values would match either one at equal specificity. The pass
//! demands a *resolving rule* that pins the exact literal pair,
//! `plan(PR=<a>,HR=<b>)`, and reports an ambiguity naming that missing rule
//! otherwise. Each missing resolving rule is proposed at most once per run.
//!
//! This mirroring is deliberately a two-attribute algorithm; extending the
//! grammar past `PR`/`HR` would require a power-set coverage check instead.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::{parse, ParseError, ProcessingError, RawData, Rule, RuleSet, ValidRule};

/// The parse/validate outcome for one configuration entry.
///
/// Created at parse time; validation appends to `processing_errors`. Never
/// mutated after validation completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingResult {
    id: usize,
    original_text: String,
    rule: Option<Rule>,
    parsing_errors: Vec<ParseError>,
    processing_errors: Vec<ProcessingError>,
}

impl ParsingResult {
    /// Parse one entry, capturing the outcome either way.
    #[must_use]
    pub fn parse(id: usize, text: &str) -> Self {
        let original_text = text.trim().to_string();
        match parse(text) {
            Ok(rule) => Self {
                id,
                original_text,
                rule: Some(rule),
                parsing_errors: Vec::new(),
                processing_errors: Vec::new(),
            },
            Err(err) => Self {
                id,
                original_text,
                rule: None,
                parsing_errors: vec![err],
                processing_errors: Vec::new(),
            },
        }
    }

    /// Position of the entry in the configuration.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// The entry text, trimmed.
    #[must_use]
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// The parsed rule, when parsing succeeded.
    #[must_use]
    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    /// Syntax errors for this entry.
    #[must_use]
    pub fn parsing_errors(&self) -> &[ParseError] {
        &self.parsing_errors
    }

    /// Validation findings for this entry.
    #[must_use]
    pub fn processing_errors(&self) -> &[ProcessingError] {
        &self.processing_errors
    }

    /// True when the entry carries any error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.parsing_errors.is_empty() || !self.processing_errors.is_empty()
    }
}

/// An invalid ruleset: per-entry findings plus set-level findings.
///
/// Any single error anywhere makes the whole ruleset unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    results: Vec<ParsingResult>,
    set_errors: Vec<ProcessingError>,
}

impl ValidationError {
    fn new(results: Vec<ParsingResult>, set_errors: Vec<ProcessingError>) -> Self {
        Self {
            results,
            set_errors,
        }
    }

    /// All per-entry outcomes, including clean entries.
    #[must_use]
    pub fn results(&self) -> &[ParsingResult] {
        &self.results
    }

    /// Findings that apply to the set as a whole (required-plan coverage).
    #[must_use]
    pub fn set_errors(&self) -> &[ProcessingError] {
        &self.set_errors
    }

    /// Total number of findings across all entries and the set.
    #[must_use]
    pub fn error_count(&self) -> usize {
        let per_entry: usize = self
            .results
            .iter()
            .map(|r| r.parsing_errors.len() + r.processing_errors.len())
            .sum();
        per_entry + self.set_errors.len()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for result in &self.results {
            for err in &result.parsing_errors {
                lines.push(format!("rule \"{}\": {err}", result.original_text));
            }
            for err in &result.processing_errors {
                lines.push(format!("rule \"{}\": {err}", result.original_text));
            }
        }
        for err in &self.set_errors {
            lines.push(err.to_string());
        }
        write!(f, "{}", lines.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Parse and validate a whole configuration.
///
/// This is the single entry point for turning rule text into a usable
/// [`RuleSet`]; there is no way to construct one around validation.
///
/// # Errors
///
/// A [`ValidationError`] carrying every finding of the first failing pass.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
///
/// let allowed: BTreeSet<String> = ["aws", "trial"].iter().map(|p| p.to_string()).collect();
/// let rule_set = hap::build_rule_set(
///     &["aws", "aws(PR=cf-eu11) -> EU", "trial -> S"],
///     &allowed,
///     &BTreeSet::new(),
/// )
/// .unwrap();
/// assert_eq!(rule_set.len(), 3);
/// ```
pub fn build_rule_set<S: AsRef<str>>(
    entries: &[S],
    allowed_plans: &BTreeSet<String>,
    required_plans: &BTreeSet<String>,
) -> Result<RuleSet, ValidationError> {
    let results = entries
        .iter()
        .enumerate()
        .map(|(id, entry)| ParsingResult::parse(id, entry.as_ref()))
        .collect();
    validate(results, allowed_plans, required_plans)
}

/// Validate already-parsed entries into a [`RuleSet`].
///
/// # Errors
///
/// See [`build_rule_set`].
pub fn validate(
    mut results: Vec<ParsingResult>,
    allowed_plans: &BTreeSet<String>,
    required_plans: &BTreeSet<String>,
) -> Result<RuleSet, ValidationError> {
    if results.iter().any(|r| !r.parsing_errors.is_empty()) {
        return Err(ValidationError::new(results, Vec::new()));
    }

    if check_uniqueness(&mut results) {
        return Err(ValidationError::new(results, Vec::new()));
    }

    if check_ambiguity(&mut results) {
        return Err(ValidationError::new(results, Vec::new()));
    }

    let set_errors = check_plans(&mut results, allowed_plans, required_plans);
    if !set_errors.is_empty() || results.iter().any(ParsingResult::has_errors) {
        return Err(ValidationError::new(results, set_errors));
    }

    let rules = results
        .iter()
        .filter_map(|result| {
            result.rule.as_ref().map(|rule| {
                ValidRule::from_rule(
                    rule,
                    RawData {
                        original_text: result.original_text.clone(),
                        ordinal: result.id,
                    },
                )
            })
        })
        .collect();
    Ok(RuleSet::new(rules))
}

/// Canonical key of a rule's input shape, wildcards rendered empty.
///
/// Doubles as the text of a resolving rule when both literals are present.
fn uniqueness_key(plan: &str, platform_region: &str, hyperscaler_region: &str) -> String {
    format!("{plan}(PR={platform_region},HR={hyperscaler_region})")
}

/// Uniqueness pass. Returns true when any duplicate was found.
fn check_uniqueness(results: &mut [ParsingResult]) -> bool {
    let mut first_by_key: HashMap<String, String> = HashMap::new();
    let mut found = false;

    for result in results.iter_mut() {
        let Some(rule) = &result.rule else { continue };
        let key = uniqueness_key(&rule.plan, &rule.platform_region, &rule.hyperscaler_region);
        match first_by_key.get(&key) {
            Some(original) => {
                result.processing_errors.push(ProcessingError::DuplicateRule {
                    duplicate: result.original_text.clone(),
                    original: original.clone(),
                });
                found = true;
            }
            None => {
                first_by_key.insert(key, result.original_text.clone());
            }
        }
    }
    found
}

/// Ambiguity pass. Returns true when any unresolved mirror pair was found.
fn check_ambiguity(results: &mut [ParsingResult]) -> bool {
    // Partition by signature: which input attributes are specified.
    let mut platform_only: Vec<usize> = Vec::new();
    let mut hyperscaler_only: Vec<usize> = Vec::new();
    let mut fully_specified: HashSet<String> = HashSet::new();

    for (index, result) in results.iter().enumerate() {
        let Some(rule) = &result.rule else { continue };
        match (
            rule.platform_region.is_empty(),
            rule.hyperscaler_region.is_empty(),
        ) {
            (false, true) => platform_only.push(index),
            (true, false) => hyperscaler_only.push(index),
            (false, false) => {
                fully_specified.insert(uniqueness_key(
                    &rule.plan,
                    &rule.platform_region,
                    &rule.hyperscaler_region,
                ));
            }
            (true, true) => {}
        }
    }

    let mut proposed: HashSet<String> = HashSet::new();
    let mut findings: Vec<(usize, ProcessingError)> = Vec::new();

    for &pr_index in &platform_only {
        for &hr_index in &hyperscaler_only {
            let (Some(pr_rule), Some(hr_rule)) =
                (&results[pr_index].rule, &results[hr_index].rule)
            else {
                continue;
            };
            if pr_rule.plan != hr_rule.plan {
                continue;
            }

            // The two rules mirror each other; only a rule pinning both
            // literals can decide a request carrying both region values.
            let resolving = uniqueness_key(
                &pr_rule.plan,
                &pr_rule.platform_region,
                &hr_rule.hyperscaler_region,
            );
            if fully_specified.contains(&resolving) {
                continue;
            }
            if proposed.insert(resolving.clone()) {
                findings.push((
                    pr_index,
                    ProcessingError::AmbiguousRules {
                        first: results[pr_index].original_text.clone(),
                        second: results[hr_index].original_text.clone(),
                        resolving,
                    },
                ));
            }
        }
    }

    let found = !findings.is_empty();
    for (index, error) in findings {
        results[index].processing_errors.push(error);
    }
    found
}

/// Plan coverage pass. Returns set-level findings; per-rule findings are
/// appended in place.
///
/// An empty allowed set disables the allowed-plan check so configurations
/// without plan restrictions still validate.
fn check_plans(
    results: &mut [ParsingResult],
    allowed_plans: &BTreeSet<String>,
    required_plans: &BTreeSet<String>,
) -> Vec<ProcessingError> {
    let mut covered: BTreeSet<&str> = BTreeSet::new();

    for result in results.iter_mut() {
        let Some(rule) = &result.rule else { continue };
        if !allowed_plans.is_empty() && !allowed_plans.contains(&rule.plan) {
            result
                .processing_errors
                .push(ProcessingError::UnsupportedPlan {
                    plan: rule.plan.clone(),
                });
        }
    }
    for result in results.iter() {
        if let Some(rule) = &result.rule {
            covered.insert(&rule.plan);
        }
    }

    let missing: Vec<String> = required_plans
        .iter()
        .filter(|plan| !covered.contains(plan.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        Vec::new()
    } else {
        vec![ProcessingError::RequiredPlansNotCovered { missing }]
    }
}
