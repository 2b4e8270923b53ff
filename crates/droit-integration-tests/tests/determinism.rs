//! # Boundary and Determinism
//!
//! The engine is a pure function of its inputs: repeated runs produce
//! byte-identical JSON, evaluation keys ignore how facts are spelled, and
//! cross-border composition does not depend on jurisdiction order.

use droit_conflict::{evaluate_cross_border, CrossBorderScenario, JurisdictionRule};
use droit_core::{Facts, JurisdictionCode, JurisdictionRole};
use droit_eval::{evaluate_tree, evaluation_key};
use droit_integration_tests::security_token_tree;
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_instrument_type() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("security_token")),
        Just(json!("payment_token")),
        Just(json!(null)),
        any::<i64>().prop_map(Value::from),
        "[a-z_]{0,12}".prop_map(Value::from),
    ]
}

fn arb_facts() -> impl Strategy<Value = Facts> {
    (prop::option::of(arb_instrument_type()), any::<bool>()).prop_map(|(kind, noise)| {
        let mut facts = Facts::new();
        if let Some(kind) = kind {
            facts = facts.with("instrument", json!({ "type": kind }));
        }
        if noise {
            facts = facts.with("unrelated", json!({"deep": [1, 2, 3]}));
        }
        facts
    })
}

proptest! {
    #[test]
    fn repeated_evaluation_serializes_identically(facts in arb_facts()) {
        let tree = security_token_tree();
        let first = serde_json::to_string(&evaluate_tree(&tree, &facts).unwrap()).unwrap();
        let second = serde_json::to_string(&evaluate_tree(&tree, &facts).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn unrelated_facts_do_not_change_the_outcome(kind in arb_instrument_type()) {
        let tree = security_token_tree();
        let base = Facts::new().with("instrument", json!({ "type": kind }));
        let noisy = base.clone().with("unrelated", json!(true));
        prop_assert_eq!(
            evaluate_tree(&tree, &base).unwrap(),
            evaluate_tree(&tree, &noisy).unwrap()
        );
    }

    #[test]
    fn cross_border_is_independent_of_jurisdiction_order(facts in arb_facts()) {
        let rule = |code: &str, role| JurisdictionRule {
            jurisdiction: JurisdictionCode::new(code).unwrap(),
            role,
            regime_id: format!("{code}-regime"),
            tree: security_token_tree(),
        };
        let forward = CrossBorderScenario {
            facts: facts.clone(),
            rules: vec![rule("EU", JurisdictionRole::Home), rule("US", JurisdictionRole::Target)],
        };
        let mut reversed = forward.clone();
        reversed.rules.reverse();
        let a = evaluate_cross_border(&forward).unwrap();
        let b = evaluate_cross_border(&reversed).unwrap();
        prop_assert_eq!(a.overall_status, b.overall_status);
        prop_assert_eq!(a.conflicts, b.conflicts);
        prop_assert_eq!(a.merged_obligations, b.merged_obligations);
    }
}

#[test]
fn evaluation_key_ignores_fact_key_order() {
    let tree = security_token_tree();
    let a: Facts =
        serde_json::from_str(r#"{"a": 1, "instrument": {"type": "x", "n": 2}}"#).unwrap();
    let b: Facts =
        serde_json::from_str(r#"{"instrument": {"n": 2, "type": "x"}, "a": 1}"#).unwrap();
    assert_eq!(evaluation_key(&tree, &a).unwrap(), evaluation_key(&tree, &b).unwrap());
}

#[test]
fn evaluation_key_distinguishes_facts() {
    let tree = security_token_tree();
    let a = Facts::new().with("instrument", json!({"type": "security_token"}));
    let b = Facts::new().with("instrument", json!({"type": "payment_token"}));
    assert_ne!(evaluation_key(&tree, &a).unwrap(), evaluation_key(&tree, &b).unwrap());
}

#[test]
fn inputs_are_not_mutated() {
    let tree = security_token_tree();
    let facts = Facts::new().with("instrument", json!({"type": "security_token"}));
    let (tree_before, facts_before) = (tree.clone(), facts.clone());
    let _ = evaluate_tree(&tree, &facts).unwrap();
    assert_eq!(tree, tree_before);
    assert_eq!(facts, facts_before);
}
