use indexmap::IndexMap;
use weave_ir::{Node, NodeKind};

use crate::error::{Error, RuleFailedSnafu};
use crate::rules::{RuleArgs, RuleRegistry, call_expr};

fn node() -> Node {
    Node::builder().id(1).name("op").kind(NodeKind::fw_op("torch.add")).build()
}

#[test]
fn test_call_expr() {
    let inputs = vec!["a_1".to_string(), "b_2".to_string()];
    let mut kwargs = IndexMap::new();
    kwargs.insert("alpha".to_string(), "2".to_string());

    assert_eq!(call_expr("torch.add", &inputs, &kwargs), "torch.add(a_1, b_2, alpha=2)");
    assert_eq!(call_expr("torch.add", &inputs, &IndexMap::new()), "torch.add(a_1, b_2)");
    assert_eq!(call_expr("f", &[], &kwargs), "f(alpha=2)");
    assert_eq!(call_expr("f", &[], &IndexMap::new()), "f()");
}

#[test]
fn test_missing_rule_is_an_error() {
    let rules = RuleRegistry::new();
    let err = rules.get("torch.add").err().unwrap();

    assert_eq!(err, Error::MissingRule { signature: "torch.add".into() });
    assert!(rules.is_empty());
    assert!(!rules.contains("torch.add"));
}

#[test]
fn test_register_call_renders_plain_call() {
    let mut rules = RuleRegistry::new();
    rules.register_call("torch.add");

    let node = node();
    let inputs = vec!["x_1".to_string()];
    let kwargs = IndexMap::new();
    let args = RuleArgs { node: &node, inputs: &inputs, kwargs: &kwargs, runtime_devid: 0, plan_ndevs: 1, runtime_ndevs: 1 };

    let rule = rules.get("torch.add").unwrap();
    assert_eq!(rule(&args).unwrap(), "torch.add(x_1)");
    assert_eq!(rules.len(), 1);
}

#[test]
fn test_rule_sees_device_scale() {
    let mut rules = RuleRegistry::new();
    rules.register("weave.runtime.rank_slice", |args| {
        let replica = args.runtime_devid / args.plan_ndevs;
        Ok(format!("{}[{replica}::{}]", args.inputs[0], args.runtime_ndevs / args.plan_ndevs))
    });

    let node = node();
    let inputs = vec!["x_1".to_string()];
    let kwargs = IndexMap::new();
    let args = RuleArgs { node: &node, inputs: &inputs, kwargs: &kwargs, runtime_devid: 5, plan_ndevs: 2, runtime_ndevs: 8 };

    assert_eq!(rules.get("weave.runtime.rank_slice").unwrap()(&args).unwrap(), "x_1[2::4]");
}

#[test]
fn test_register_replaces_previous_rule() {
    let mut rules = RuleRegistry::new();
    rules.register("f", |_| Ok("first".into())).register("f", |_| Ok("second".into()));

    let node = node();
    let kwargs = IndexMap::new();
    let args = RuleArgs { node: &node, inputs: &[], kwargs: &kwargs, runtime_devid: 0, plan_ndevs: 1, runtime_ndevs: 1 };

    assert_eq!(rules.get("f").unwrap()(&args).unwrap(), "second");
    assert_eq!(rules.len(), 1);
}

#[test]
fn test_rule_errors_propagate() {
    let mut rules = RuleRegistry::new();
    rules.register("f", |args| RuleFailedSnafu { signature: "f", reason: format!("{} inputs", args.inputs.len()) }.fail());

    let node = node();
    let kwargs = IndexMap::new();
    let args = RuleArgs { node: &node, inputs: &[], kwargs: &kwargs, runtime_devid: 0, plan_ndevs: 1, runtime_ndevs: 1 };

    let err = rules.get("f").unwrap()(&args).unwrap_err();
    assert_eq!(err.to_string(), "emit rule for 'f' failed: 0 inputs");
}

#[test]
fn test_debug_lists_sorted_signatures() {
    let mut rules = RuleRegistry::new();
    rules.register_call("torch.sum").register_call("torch.add");
    assert_eq!(format!("{rules:?}"), r#"RuleRegistry { signatures: ["torch.add", "torch.sum"] }"#);
}
