//! # Rule Tree Serialization Fidelity
//!
//! Rule trees are authored in YAML, exchanged as JSON and hashed as canonical
//! bytes. These tests check that a tree survives every hop with its meaning
//! intact and that its digest does not depend on the source format.

use droit_core::{
    sha256_digest, CanonicalBytes, ComplianceStatus, DecisionNode, NodeKind, RuleDefinition,
    TreeIndex,
};

const MICA_YAML: &str = r#"
id: mica-token-classification
version: 2.1.0
name: MiCA token classification
metadata:
  jurisdiction: EU
  framework: MiCA
  effectiveDate: 2024-06-30
  tags: [crypto, classification]
tree:
  nodeId: root
  type: group
  label: Classification
  entryNodeId: is-security
  children:
    - nodeId: is-security
      type: condition
      annotation: Is the token a financial instrument?
      condition: { fact: instrument.type, op: eq, value: security_token }
      sourceRef: { documentId: MiCA, article: "2", paragraph: "4" }
      children:
        "true":
          nodeId: out-of-scope
          type: leaf
          decision: Out of MiCA scope (MiFID II applies)
          status: no_applicable_rules
        "false":
          nodeId: emt-anchor
          type: conflict_anchor
          pairedAnchorId: sg-dpt-anchor
          label: EMT vs DPT
          next:
            nodeId: is-emt
            type: condition
            condition: { fact: instrument.references, op: contains, value: fiat }
            children:
              "true":
                nodeId: emt
                type: leaf
                decision: E-money token
                status: requires_action
                classification: e_money_token
                obligations: [white_paper, emi_authorisation]
                deadlines:
                  - { action: white_paper, minDays: 0, maxDays: 20 }
              "false":
                nodeId: other
                type: leaf
                decision: Other crypto-asset
                status: requires_action
                obligations: [white_paper]
"#;

fn rule() -> RuleDefinition {
    serde_yaml::from_str(MICA_YAML).unwrap()
}

#[test]
fn yaml_rule_parses_into_a_valid_tree() {
    let r = rule();
    r.validate().unwrap();
    let index = TreeIndex::build(&r.tree).unwrap();
    assert_eq!(index.len(), 7);
    assert_eq!(index.get("emt-anchor").unwrap().kind(), NodeKind::ConflictAnchor);

    let emt = index.get("emt").unwrap().as_leaf().unwrap();
    assert_eq!(emt.status, ComplianceStatus::RequiresAction);
    assert_eq!(emt.obligations(), ["white_paper", "emi_authorisation"]);
    assert_eq!(emt.deadlines()[0].max_days, 20);
    assert!(emt.deadlines()[0].prerequisites.is_empty());
}

#[test]
fn yaml_to_json_and_back_preserves_the_tree() {
    let r = rule();
    let json = serde_json::to_string_pretty(&r).unwrap();
    let back: RuleDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);

    let yaml = serde_yaml::to_string(&back).unwrap();
    let again: RuleDefinition = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(again, r);
}

#[test]
fn digest_is_independent_of_source_format() {
    let from_yaml = rule();
    let json = serde_json::to_value(&from_yaml).unwrap();
    let from_json: RuleDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(
        from_yaml.tree_digest().unwrap(),
        from_json.tree_digest().unwrap()
    );
}

#[test]
fn absent_optional_fields_stay_absent() {
    let r = rule();
    let json = serde_json::to_value(&r.tree).unwrap();
    let other = &json["children"][0]["children"]["false"]["next"]["children"]["false"];
    assert_eq!(other["nodeId"], "other");
    assert!(other.get("classification").is_none());
    assert!(other.get("deadlines").is_none());
    assert!(other.get("sourceRef").is_none());
    assert!(json.get("collapsed").is_none());
}

#[test]
fn presence_checks_round_trip_without_a_value() {
    let yaml = r#"
nodeId: has-licence
type: condition
condition: { fact: issuer.licence, op: "nil?" }
children:
  "true": { nodeId: unlicensed, type: leaf, decision: Unlicensed, status: blocked }
  "false": { nodeId: licensed, type: leaf, decision: Licensed, status: compliant }
"#;
    let tree: DecisionNode = serde_yaml::from_str(yaml).unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert!(json["condition"].get("value").is_none());

    let back = serde_yaml::to_string(&serde_json::from_value::<DecisionNode>(json).unwrap())
        .unwrap();
    assert!(!back.contains("value"));
    assert_eq!(serde_yaml::from_str::<DecisionNode>(&back).unwrap(), tree);
}

#[test]
fn unknown_node_type_is_rejected() {
    let err = serde_json::from_str::<DecisionNode>(
        r#"{"nodeId": "x", "type": "switch", "children": []}"#,
    );
    assert!(err.is_err());
}

#[test]
fn tree_digest_changes_when_a_label_changes() {
    let a = rule();
    let mut b = rule();
    if let DecisionNode::Group(g) = &mut b.tree {
        g.label = "Renamed".into();
    }
    let da = sha256_digest(&CanonicalBytes::new(&a.tree).unwrap());
    let db = sha256_digest(&CanonicalBytes::new(&b.tree).unwrap());
    assert_ne!(da, db);
}
