//! Parser for the HAP rule DSL.
//!
//! One entry per call:
//!
//! ```text
//! plan[(ATTR=value[,ATTR=value])][->OUTATTR[,OUTATTR]]
//! ```
//!
//! Whitespace is insignificant everywhere and stripped before tokenizing;
//! tokens are case-sensitive. Attribute order is irrelevant to meaning.
//! `ATTR` is `PR` or `HR`; `OUTATTR` is `EU`, `S`, `PR` or `HR` (on the
//! output side `PR`/`HR` mean region suffixing, not constraints).

use crate::{InputAttribute, OutputAttribute, ParseError, Rule};

/// Parse one rule entry.
///
/// # Errors
///
/// All [`ParseError`] variants; each is scoped to this single entry and does
/// not affect sibling entries in the configuration.
///
/// # Examples
///
/// ```
/// use hap::parse;
///
/// let rule = parse("aws(PR=cf-eu11, HR=eu-central-1) -> EU, S").unwrap();
/// assert_eq!(rule.plan, "aws");
/// assert_eq!(rule.platform_region, "cf-eu11");
/// assert!(rule.eu_access);
/// assert!(rule.shared);
/// ```
pub fn parse(text: &str) -> Result<Rule, ParseError> {
    // Whitespace is insignificant: strip before tokenizing so that
    // "aws ( PR = x )" and "aws(PR=x)" parse identically.
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let open = compact.matches('(').count();
    let close = compact.matches(')').count();
    if open > 1 || close > 1 || open != close {
        return Err(ParseError::UnbalancedParentheses);
    }

    let mut segments = compact.split("->");
    let input = segments.next().unwrap_or_default();
    let output = segments.next();
    if segments.next().is_some() {
        return Err(ParseError::MultipleArrows);
    }

    let (plan, attr_list) = split_input_segment(input)?;
    if plan.is_empty() {
        return Err(ParseError::EmptyPlan);
    }

    let mut rule = Rule::new(plan);

    if let Some(attr_list) = attr_list {
        for entry in attr_list.split(',') {
            apply_input_entry(&mut rule, entry)?;
        }
    }

    if let Some(output) = output {
        for entry in output.split(',') {
            apply_output_entry(&mut rule, entry)?;
        }
    }

    Ok(rule)
}

/// Split the left-of-arrow segment into plan and optional attribute list.
fn split_input_segment(input: &str) -> Result<(&str, Option<&str>), ParseError> {
    let Some(open) = input.find('(') else {
        // No parenthesis on the input side. A paren in the output segment
        // was already counted, so a lone ')' here is unbalanced.
        if input.contains(')') {
            return Err(ParseError::UnbalancedParentheses);
        }
        return Ok((input, None));
    };

    let close = input.find(')').ok_or(ParseError::UnbalancedParentheses)?;
    if close < open {
        return Err(ParseError::UnbalancedParentheses);
    }
    if close != input.len() - 1 {
        return Err(ParseError::TrailingInput);
    }

    Ok((&input[..open], Some(&input[open + 1..close])))
}

/// Apply one `name=value` entry from the attribute list.
fn apply_input_entry(rule: &mut Rule, entry: &str) -> Result<(), ParseError> {
    if entry.is_empty() {
        return Err(ParseError::EmptyAttribute);
    }
    if entry.matches('=').count() != 1 {
        return Err(ParseError::MalformedAttribute(entry.to_string()));
    }
    // Exactly one '=' was checked above, split cannot fail.
    let (name, value) = entry
        .split_once('=')
        .ok_or_else(|| ParseError::MalformedAttribute(entry.to_string()))?;

    let attribute = InputAttribute::from_name(name)
        .ok_or_else(|| ParseError::UnknownAttribute(name.to_string()))?;
    attribute.apply(rule, value)
}

/// Apply one bare output attribute name.
fn apply_output_entry(rule: &mut Rule, entry: &str) -> Result<(), ParseError> {
    if entry.is_empty() {
        return Err(ParseError::EmptyAttribute);
    }
    let attribute = OutputAttribute::from_name(entry)
        .ok_or_else(|| ParseError::UnknownAttribute(entry.to_string()))?;
    attribute.apply(rule)
}
