//! The matcher library.
//!
//! Matchers are looked up by name (`to_equal` or `toEqual`), take a fixed number of expected
//! values and produce a failure message such as `Expected 1 to equal 2.`.

use std::cmp::Ordering;

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    ToEqual,
    ToBe,
    ToBeNull,
    ToBeTruthy,
    ToBeFalsy,
    ToContain,
    ToBeLessThan,
    ToBeGreaterThan,
    ToMatch,
}

#[derive(Debug, Error, PartialEq)]
pub enum MatcherError {
    #[error("matcher `{matcher}` takes {expected} argument(s) but {found} were given")]
    Arity {
        matcher: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid pattern for `to_match`: {0}")]
    InvalidPattern(String),
}

const ALL: [Matcher; 9] = [
    Matcher::ToEqual,
    Matcher::ToBe,
    Matcher::ToBeNull,
    Matcher::ToBeTruthy,
    Matcher::ToBeFalsy,
    Matcher::ToContain,
    Matcher::ToBeLessThan,
    Matcher::ToBeGreaterThan,
    Matcher::ToMatch,
];

impl Matcher {
    /// Look a matcher up by its snake_case or camelCase name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL.into_iter()
            .find(|m| m.name() == name || m.camel_name() == name)
    }

    /// Every matcher name, for "did you mean" hints.
    pub fn names() -> impl Iterator<Item = &'static str> {
        ALL.into_iter().map(|m| m.name())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Matcher::ToEqual => "to_equal",
            Matcher::ToBe => "to_be",
            Matcher::ToBeNull => "to_be_null",
            Matcher::ToBeTruthy => "to_be_truthy",
            Matcher::ToBeFalsy => "to_be_falsy",
            Matcher::ToContain => "to_contain",
            Matcher::ToBeLessThan => "to_be_less_than",
            Matcher::ToBeGreaterThan => "to_be_greater_than",
            Matcher::ToMatch => "to_match",
        }
    }

    fn camel_name(&self) -> &'static str {
        match self {
            Matcher::ToEqual => "toEqual",
            Matcher::ToBe => "toBe",
            Matcher::ToBeNull => "toBeNull",
            Matcher::ToBeTruthy => "toBeTruthy",
            Matcher::ToBeFalsy => "toBeFalsy",
            Matcher::ToContain => "toContain",
            Matcher::ToBeLessThan => "toBeLessThan",
            Matcher::ToBeGreaterThan => "toBeGreaterThan",
            Matcher::ToMatch => "toMatch",
        }
    }

    /// Words used in failure messages.
    fn words(&self) -> &'static str {
        match self {
            Matcher::ToEqual => "to equal",
            Matcher::ToBe => "to be",
            Matcher::ToBeNull => "to be null",
            Matcher::ToBeTruthy => "to be truthy",
            Matcher::ToBeFalsy => "to be falsy",
            Matcher::ToContain => "to contain",
            Matcher::ToBeLessThan => "to be less than",
            Matcher::ToBeGreaterThan => "to be greater than",
            Matcher::ToMatch => "to match",
        }
    }

    /// Number of expected values the matcher takes.
    pub fn arity(&self) -> usize {
        match self {
            Matcher::ToBeNull | Matcher::ToBeTruthy | Matcher::ToBeFalsy => 0,
            _ => 1,
        }
    }

    pub fn check_arity(&self, found: usize) -> Result<(), MatcherError> {
        if found == self.arity() {
            Ok(())
        } else {
            Err(MatcherError::Arity {
                matcher: self.name(),
                expected: self.arity(),
                found,
            })
        }
    }

    /// Evaluate the matcher without negation.
    pub fn evaluate(&self, actual: &Value, expected: &[Value]) -> Result<bool, MatcherError> {
        self.check_arity(expected.len())?;
        let matched = match self {
            Matcher::ToEqual => actual.loose_eq(&expected[0]),
            Matcher::ToBe => *actual == expected[0],
            Matcher::ToBeNull => matches!(actual, Value::Null),
            Matcher::ToBeTruthy => actual.is_truthy(),
            Matcher::ToBeFalsy => !actual.is_truthy(),
            Matcher::ToContain => match (actual, &expected[0]) {
                (Value::List(items), needle) => items.iter().any(|item| item.loose_eq(needle)),
                (Value::Str(haystack), Value::Str(needle)) => haystack.contains(needle.as_str()),
                _ => false,
            },
            Matcher::ToBeLessThan => actual.compare(&expected[0]) == Some(Ordering::Less),
            Matcher::ToBeGreaterThan => actual.compare(&expected[0]) == Some(Ordering::Greater),
            Matcher::ToMatch => {
                let pattern = expected[0].to_message();
                let re = regex::Regex::new(&pattern).map_err(|e| MatcherError::InvalidPattern(e.to_string()))?;
                re.is_match(&actual.to_message())
            }
        };
        Ok(matched)
    }

    /// `Expected <actual> [not ]<words>[ <expected>].`
    pub fn message(&self, actual: &Value, expected: &[Value], negated: bool) -> String {
        let mut msg = format!("Expected {} ", actual);
        if negated {
            msg.push_str("not ");
        }
        msg.push_str(self.words());
        if !expected.is_empty() {
            let rendered: Vec<String> = expected.iter().map(|v| v.to_string()).collect();
            msg.push(' ');
            msg.push_str(&rendered.join(", "));
        }
        msg.push('.');
        msg
    }
}
