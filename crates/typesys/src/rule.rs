//! Rules applied by bounded configuration fields
//!
//! A [`Rule`] pairs a configuration bound (`minLength: 5`) with a candidate
//! (the default value or an Instance value) and reports the violated
//! predicate, e.g. `must have a minimum length of 5`. Callers prepend the
//! subject.

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::value_kind::{as_integer, ValueKind};

/// Predicate checked between a bound and a candidate value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Candidate has at least `n` characters
    MinLength,
    /// Candidate has at most `n` characters
    MaxLength,
    /// Candidate matches the whole regular expression
    Regex,
    /// Candidate is `>= n`
    MinValue,
    /// Candidate is `<= n`
    MaxValue,
    /// Candidate has at least `n` uppercase characters
    MinUppers,
    /// Candidate has at least `n` digits
    MinNumbers,
    /// Candidate has at least `n` symbols
    MinSymbols,
    /// No character repeats more than `n` times in a row
    MaxRepeat,
}

impl Rule {
    /// Kind the bound itself must have
    pub fn bound_kind(&self) -> ValueKind {
        match self {
            Rule::Regex => ValueKind::Text,
            _ => ValueKind::Integer,
        }
    }

    /// Check that a well-typed bound is usable
    ///
    /// Only regular expressions can be malformed.
    pub fn check_bound(&self, field: &str, bound: &JsonValue) -> Option<String> {
        match (self, bound.as_str()) {
            (Rule::Regex, Some(pattern)) if compile(pattern).is_none() => {
                Some(format!("the {} value is not a valid regular expression", field))
            }
            _ => None,
        }
    }

    /// Apply the rule; returns the violated predicate
    ///
    /// Candidates of the wrong kind pass: kind errors are reported by the
    /// type check, not by the rule.
    pub fn check(&self, bound: &JsonValue, candidate: &JsonValue) -> Option<String> {
        match self {
            Rule::Regex => {
                let pattern = bound.as_str()?;
                let text = candidate.as_str()?;
                let re = compile(pattern)?;
                (!re.is_match(text)).then(|| format!("does not match the regex {}", pattern))
            }
            Rule::MinValue => {
                let n = bound.as_i64()?;
                let v = as_integer(candidate)?;
                (v < n).then(|| format!("must be greater than or equal to {}", n))
            }
            Rule::MaxValue => {
                let n = bound.as_i64()?;
                let v = as_integer(candidate)?;
                (v > n).then(|| format!("must be less than or equal to {}", n))
            }
            _ => {
                let n = bound.as_i64()?;
                let text = candidate.as_str()?;
                self.check_text(n, text)
            }
        }
    }

    fn check_text(&self, n: i64, text: &str) -> Option<String> {
        let count = |pred: fn(&char) -> bool| text.chars().filter(pred).count() as i64;
        match self {
            Rule::MinLength => (count(|_| true) < n)
                .then(|| format!("must have a minimum length of {}", n)),
            Rule::MaxLength => (count(|_| true) > n)
                .then(|| format!("must have a maximum length of {}", n)),
            Rule::MinUppers => (count(|c| c.is_uppercase()) < n)
                .then(|| format!("must have at least {} uppercase characters", n)),
            Rule::MinNumbers => (count(|c| c.is_ascii_digit()) < n)
                .then(|| format!("must have at least {} numbers", n)),
            Rule::MinSymbols => (count(is_symbol) < n)
                .then(|| format!("must have at least {} symbols", n)),
            Rule::MaxRepeat => (longest_run(text) > n).then(|| {
                format!("must not repeat a character more than {} times in a row", n)
            }),
            Rule::Regex | Rule::MinValue | Rule::MaxValue => None,
        }
    }
}

fn is_symbol(c: &char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

fn longest_run(text: &str) -> i64 {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for c in text.chars() {
        if previous == Some(c) {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}

/// Compile anchored, so the whole candidate has to match
fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_length_rules() {
        assert_eq!(
            Rule::MinLength.check(&json!(5), &json!("abc")),
            Some("must have a minimum length of 5".to_string())
        );
        assert_eq!(Rule::MinLength.check(&json!(3), &json!("abc")), None);
        assert_eq!(
            Rule::MaxLength.check(&json!(2), &json!("abc")),
            Some("must have a maximum length of 2".to_string())
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert_eq!(Rule::MaxLength.check(&json!(2), &json!("éé")), None);
    }

    #[test]
    fn test_regex_matches_whole_value() {
        assert_eq!(Rule::Regex.check(&json!("[a-z]+"), &json!("abc")), None);
        assert_eq!(
            Rule::Regex.check(&json!("[a-z]+"), &json!("abc1")),
            Some("does not match the regex [a-z]+".to_string())
        );
    }

    #[test]
    fn test_regex_bound_must_compile() {
        assert_eq!(
            Rule::Regex.check_bound("regex", &json!("([a-z")),
            Some("the regex value is not a valid regular expression".to_string())
        );
        assert_eq!(Rule::Regex.check_bound("regex", &json!("[a-z]")), None);
        assert_eq!(Rule::MinLength.check_bound("minLength", &json!(3)), None);
    }

    #[test]
    fn test_value_rules_coerce_numeric_strings() {
        assert_eq!(
            Rule::MinValue.check(&json!(10), &json!("3")),
            Some("must be greater than or equal to 10".to_string())
        );
        assert_eq!(
            Rule::MaxValue.check(&json!(10), &json!(11)),
            Some("must be less than or equal to 10".to_string())
        );
        assert_eq!(Rule::MaxValue.check(&json!(10), &json!(10)), None);
    }

    #[test]
    fn test_password_rules() {
        let value = json!("aaB1!");
        assert_eq!(Rule::MinUppers.check(&json!(1), &value), None);
        assert!(Rule::MinUppers.check(&json!(2), &value).is_some());
        assert_eq!(Rule::MinNumbers.check(&json!(1), &value), None);
        assert_eq!(
            Rule::MinSymbols.check(&json!(2), &value),
            Some("must have at least 2 symbols".to_string())
        );
        assert_eq!(Rule::MaxRepeat.check(&json!(2), &value), None);
        assert_eq!(
            Rule::MaxRepeat.check(&json!(1), &value),
            Some("must not repeat a character more than 1 times in a row".to_string())
        );
    }

    #[test]
    fn test_wrong_kind_candidates_pass() {
        assert_eq!(Rule::MinLength.check(&json!(3), &json!(1)), None);
        assert_eq!(Rule::MinValue.check(&json!(3), &json!("x")), None);
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run(""), 0);
        assert_eq!(longest_run("abc"), 1);
        assert_eq!(longest_run("abbbc"), 3);
    }
}
