//! Conformance test fixture runner
//!
//! Loads YAML fixtures describing a rule configuration, the expected
//! validation outcome and a list of match cases, then runs them against the
//! engine.
//!
//! ```yaml
//! name: specificity
//! rules:
//!   - aws
//!   - aws(PR=cf-eu11) -> EU
//! expect: valid
//! cases:
//!   - name: eu-region
//!     attributes: { plan: aws, platform_region: cf-eu11 }
//!     expect: { rule: "aws(PR=cf-eu11) -> EU", eu_access: true }
//! ```

use std::collections::BTreeSet;

use hap::{build_rule_set, LabelSelector, ProvisioningAttributes, RuleSet, ValidationError};
use serde::Deserialize;

/// A complete test fixture.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// Fixture name, used in assertion messages.
    pub name: String,
    /// Optional human description.
    #[serde(default)]
    pub description: String,
    /// Rule entries, one DSL rule each.
    pub rules: Vec<String>,
    /// Allowed plans; empty disables the allowed-plan check.
    #[serde(default)]
    pub allowed_plans: BTreeSet<String>,
    /// Required plans.
    #[serde(default)]
    pub required_plans: BTreeSet<String>,
    /// Whether validation is expected to succeed.
    pub expect: Expect,
    /// Substrings that must appear in the validation error message
    /// (only meaningful with `expect: invalid`).
    #[serde(default)]
    pub errors: Vec<String>,
    /// Match cases to run against a valid ruleset.
    #[serde(default)]
    pub cases: Vec<Case>,
}

/// Expected validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    /// The ruleset must validate.
    Valid,
    /// The ruleset must be rejected.
    Invalid,
}

/// One match case.
#[derive(Debug, Deserialize)]
pub struct Case {
    /// Case name, used in assertion messages.
    pub name: String,
    /// The request attributes to match.
    pub attributes: Attributes,
    /// Expected match; absent means "no rule matches".
    #[serde(default)]
    pub expect: Option<Expected>,
}

/// Request attributes from YAML.
#[derive(Debug, Deserialize)]
pub struct Attributes {
    /// The requested plan.
    pub plan: String,
    /// Platform region; defaults to empty.
    #[serde(default)]
    pub platform_region: String,
    /// Hyperscaler region; defaults to empty.
    #[serde(default)]
    pub hyperscaler_region: String,
    /// Hyperscaler; defaults to the plan name.
    #[serde(default)]
    pub hyperscaler: String,
}

impl Attributes {
    /// Build the engine query.
    #[must_use]
    pub fn to_provisioning(&self) -> ProvisioningAttributes {
        let hyperscaler = if self.hyperscaler.is_empty() {
            self.plan.clone()
        } else {
            self.hyperscaler.clone()
        };
        ProvisioningAttributes {
            plan: self.plan.clone(),
            platform_region: self.platform_region.clone(),
            hyperscaler_region: self.hyperscaler_region.clone(),
            hyperscaler,
        }
    }
}

/// Expected fields of a match; absent fields are not checked.
#[derive(Debug, Default, Deserialize)]
pub struct Expected {
    /// Original text of the winning rule.
    #[serde(default)]
    pub rule: Option<String>,
    /// The produced hyperscaler type.
    #[serde(default)]
    pub hyperscaler_type: Option<String>,
    /// EU access flag.
    #[serde(default)]
    pub eu_access: Option<bool>,
    /// Shared flag.
    #[serde(default)]
    pub shared: Option<bool>,
    /// The projected base label selector.
    #[serde(default)]
    pub selector: Option<String>,
}

impl Fixture {
    /// Parse a fixture from YAML.
    ///
    /// # Errors
    ///
    /// The underlying YAML error.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    ///
    /// # Errors
    ///
    /// The underlying YAML error.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    fn build(&self) -> Result<RuleSet, ValidationError> {
        build_rule_set(&self.rules, &self.allowed_plans, &self.required_plans)
    }

    /// Run the fixture, panicking on the first deviation.
    pub fn run_and_assert(&self) {
        match self.build() {
            Err(error) => {
                assert_eq!(
                    self.expect,
                    Expect::Invalid,
                    "fixture '{}': expected a valid ruleset, got: {error}",
                    self.name
                );
                let message = error.to_string();
                for expected in &self.errors {
                    assert!(
                        message.contains(expected),
                        "fixture '{}': error message \"{message}\" does not contain \"{expected}\"",
                        self.name
                    );
                }
            }
            Ok(rule_set) => {
                assert_eq!(
                    self.expect,
                    Expect::Valid,
                    "fixture '{}': ruleset unexpectedly validated",
                    self.name
                );
                for case in &self.cases {
                    self.run_case(&rule_set, case);
                }
            }
        }
    }

    fn run_case(&self, rule_set: &RuleSet, case: &Case) {
        let actual = rule_set.matching(&case.attributes.to_provisioning());
        let Some(expected) = &case.expect else {
            assert!(
                actual.is_none(),
                "fixture '{}' case '{}': expected no match, got {actual:?}",
                self.name,
                case.name
            );
            return;
        };

        let Some(actual) = actual else {
            panic!(
                "fixture '{}' case '{}': expected a match, got none",
                self.name, case.name
            );
        };

        if let Some(rule) = &expected.rule {
            assert_eq!(
                &actual.rule.original_text, rule,
                "fixture '{}' case '{}': wrong winning rule",
                self.name, case.name
            );
        }
        if let Some(hyperscaler_type) = &expected.hyperscaler_type {
            assert_eq!(
                &actual.hyperscaler_type, hyperscaler_type,
                "fixture '{}' case '{}': wrong hyperscaler type",
                self.name, case.name
            );
        }
        if let Some(eu_access) = expected.eu_access {
            assert_eq!(
                actual.eu_access, eu_access,
                "fixture '{}' case '{}': wrong EU access flag",
                self.name, case.name
            );
        }
        if let Some(shared) = expected.shared {
            assert_eq!(
                actual.shared, shared,
                "fixture '{}' case '{}': wrong shared flag",
                self.name, case.name
            );
        }
        if let Some(selector) = &expected.selector {
            assert_eq!(
                &LabelSelector::for_match(&actual).to_string(),
                selector,
                "fixture '{}' case '{}': wrong selector",
                self.name,
                case.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_fixture_runs_cases() {
        let fixture = Fixture::from_yaml(
            "\
name: smoke
rules:
  - aws
  - aws(PR=cf-eu11) -> EU
expect: valid
cases:
  - name: eu
    attributes: { plan: aws, platform_region: cf-eu11 }
    expect: { rule: \"aws(PR=cf-eu11) -> EU\", eu_access: true }
  - name: no-match
    attributes: { plan: azure }
",
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn invalid_fixture_checks_error_substrings() {
        let fixture = Fixture::from_yaml(
            "\
name: ambiguity
rules:
  - aws(PR=x)
  - aws(HR=y)
expect: invalid
errors:
  - \"aws(PR=x,HR=y)\"
",
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn multi_document_yaml() {
        let fixtures = Fixture::from_yaml_multi(
            "\
name: one
rules: [aws]
expect: valid
---
name: two
rules: [\"aws(PR=\"]
expect: invalid
",
        )
        .unwrap();
        assert_eq!(fixtures.len(), 2);
        for fixture in fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    #[should_panic(expected = "expected a valid ruleset")]
    fn wrong_expectation_panics() {
        let fixture = Fixture::from_yaml(
            "\
name: broken
rules: [\"aws(PR=x\"]
expect: valid
",
        )
        .unwrap();
        fixture.run_and_assert();
    }
}
