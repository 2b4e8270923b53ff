//! # Condition Evaluation
//!
//! [`evaluate_condition`] applies one [`Condition`] to a fact bag and returns
//! `Some(result)` or `None` when the fact is missing.
//!
//! Comparisons never fail. A type mismatch (ordering a string, `in` against a
//! non-array, an invalid regular expression) evaluates to `false` and is
//! recorded in the trace like any other outcome.
//!
//! Numbers compare by value regardless of representation, so `1` equals
//! `1.0` both at the top level and inside arrays and objects.

use regex::Regex;
use serde_json::{Number, Value};
use tracing::warn;

use droit_core::{Condition, ConditionOp, Facts};

/// Evaluate a condition against the facts.
///
/// Returns `None` when the fact path is absent and the operator needs a
/// value. `nil?` and `some?` always return `Some`.
pub fn evaluate_condition(condition: &Condition, facts: &Facts) -> Option<bool> {
    let Some(actual) = facts.resolve(&condition.fact) else {
        let op = condition.op;
        return op.decides_absence().then_some(op == ConditionOp::IsNil);
    };
    let expected = &condition.value;

    let result = match condition.op {
        ConditionOp::Eq => values_equal(actual, expected),
        ConditionOp::Neq => !values_equal(actual, expected),
        ConditionOp::Gt => compare_numbers(actual, expected, |o| o.is_gt()),
        ConditionOp::Lt => compare_numbers(actual, expected, |o| o.is_lt()),
        ConditionOp::Gte => compare_numbers(actual, expected, |o| o.is_ge()),
        ConditionOp::Lte => compare_numbers(actual, expected, |o| o.is_le()),
        ConditionOp::In => match expected {
            Value::Array(items) => items.iter().any(|item| values_equal(actual, item)),
            _ => false,
        },
        ConditionOp::Contains => match actual {
            Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
            _ => false,
        },
        ConditionOp::Matches => matches_pattern(&condition.fact, actual, expected),
        ConditionOp::IsNil => actual.is_null(),
        ConditionOp::IsSome => !actual.is_null(),
    };
    Some(result)
}

/// Deep equality with numeric normalization.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn compare_numbers(
    actual: &Value,
    expected: &Value,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> bool {
    let (Some(a), Some(b)) = (actual.as_f64(), expected.as_f64()) else {
        return false;
    };
    a.partial_cmp(&b).is_some_and(accept)
}

fn matches_pattern(fact: &str, actual: &Value, expected: &Value) -> bool {
    let Value::String(pattern) = expected else {
        warn!(fact, "matches operator needs a string pattern");
        return false;
    };
    match Regex::new(pattern) {
        Ok(re) => re.is_match(&as_text(actual)),
        Err(e) => {
            warn!(fact, pattern = pattern.as_str(), error = %e, "invalid regular expression");
            false
        }
    }
}

/// Text form of a fact value for pattern matching. Strings are used as is,
/// everything else in its JSON rendering.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
