use test_case::test_case;

use crate::{Arg, DeviceSpec, Literal, ScalarDType, Value};

#[test]
fn test_visit_values_walks_all_containers() {
    let a = Value::tensor("a", [1], ScalarDType::Float32);
    let b = Value::object("b");
    let c = Value::tensor("c", [1], ScalarDType::Float32);
    let d = Value::object("d");

    let arg = Arg::list([
        Arg::from(&a),
        Arg::dict([(Arg::from("k"), Arg::tuple([Arg::from(&b), Arg::from(1i64)]))]),
        Arg::slice(Some(Arg::from(&c)), None, Some(Arg::from(&d))),
    ]);

    let ids: Vec<u64> = arg.values().iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec![a.id(), b.id(), c.id(), d.id()]);
}

#[test]
fn test_dict_keys_can_be_values() {
    let k = Value::object("key");
    let arg = Arg::dict([(Arg::from(&k), Arg::from(2i64))]);
    assert_eq!(arg.values().len(), 1);
}

#[test]
fn test_as_tensor_filters_objects() {
    let t = Value::tensor("t", [2], ScalarDType::Float16);
    let o = Value::object("o");
    assert!(Arg::from(&t).as_tensor().is_some());
    assert!(Arg::from(&o).as_tensor().is_none());
    assert!(Arg::from(&o).as_value().is_some());
    assert!(Arg::from(1i64).as_value().is_none());
}

#[test]
fn test_is_attr() {
    let w = Value::parameter("w", [2], ScalarDType::Float32);
    assert!(Arg::from(&w).is_attr());
    assert!(!Arg::list([Arg::from(&w)]).is_attr());
}

#[test_case(Arg::from(true), Arg::Literal(Literal::Bool(true)) ; "bool")]
#[test_case(Arg::from(u32::MAX), Arg::Literal(Literal::Int(4_294_967_295)) ; "u32 max")]
#[test_case(Arg::from(-2i32), Arg::Literal(Literal::Int(-2)) ; "i32")]
#[test_case(Arg::from(0.5), Arg::Literal(Literal::Float(0.5)) ; "float")]
#[test_case(Arg::from("s"), Arg::Literal(Literal::Str("s".into())) ; "str")]
#[test_case(Arg::from(None::<i64>), Arg::NONE ; "none")]
#[test_case(Arg::from(ScalarDType::Int8), Arg::Literal(Literal::DType(ScalarDType::Int8)) ; "dtype")]
#[test_case(Arg::from(DeviceSpec::cuda(1)), Arg::Device(DeviceSpec::cuda(1)) ; "device")]
fn test_from_conversions(actual: Arg, expected: Arg) {
    assert_eq!(actual, expected);
}

#[test]
fn test_type_name() {
    assert_eq!(Arg::opaque("torch.Generator").type_name(), "torch.Generator");
    assert_eq!(Arg::list(Vec::<Arg>::new()).type_name(), "list");
    assert_eq!(Arg::slice(None, None, None).type_name(), "slice");
}
