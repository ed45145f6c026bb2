use crate::{deep_equal, Class, Constructor, Function, Node, Object, PropertyKey, Symbol, Value};

#[test]
fn strict_eq_compares_primitives_by_value() {
    assert!(Value::from(1).strict_eq(&Value::from(1.0)));
    assert!(Value::from("a").strict_eq(&Value::from("a".to_string())));
    assert!(Value::Undefined.strict_eq(&Value::Undefined));
    assert!(!Value::Undefined.strict_eq(&Value::Null));
    assert!(!Value::from(f64::NAN).strict_eq(&Value::from(f64::NAN)));
}

#[test]
fn strict_eq_compares_objects_by_identity() {
    let o = Object::new();
    assert!(Value::from(o.clone()).strict_eq(&o.clone().into()));
    assert!(!Value::from(o).strict_eq(&Object::new().into()));

    let s = Symbol::new(Some("s"));
    assert!(Value::from(s.clone()).strict_eq(&s.into()));
    assert!(!Value::from(Symbol::new(Some("s"))).strict_eq(&Symbol::new(Some("s")).into()));
}

#[test]
fn type_of() {
    assert_eq!(Value::Undefined.type_of(), "undefined");
    assert_eq!(Value::Null.type_of(), "object");
    assert_eq!(Value::from(Object::new()).type_of(), "object");
    assert_eq!(Value::from(Function::new("() => 1")).type_of(), "function");
    assert_eq!(Value::from(Node::element("div")).type_of(), "object");
    assert!(!Value::Null.is_object_like());
    assert!(Value::from(Node::element("div")).is_object_like());
}

#[test]
fn constructor() {
    assert_eq!(Value::Null.constructor(), None);
    assert_eq!(Value::from(1).constructor(), Some(Constructor::Number));
    assert_eq!(Value::array(Vec::new()).constructor(), Some(Constructor::Array));
    assert_eq!(
        Value::from(Node::element("div")).constructor(),
        Some(Constructor::Node("div".into()))
    );
    let class = Class::new("A");
    assert_eq!(
        Value::from(Object::with_class(&class)).constructor(),
        Some(Constructor::Class(class.clone()))
    );
    assert_ne!(
        Value::from(Object::with_class(&class)).constructor(),
        Some(Constructor::Class(Class::new("A")))
    );
}

#[test]
fn object_keys_keep_insertion_order() {
    let o = Object::new();
    o.set("b", 1);
    o.set("a", 2);
    o.set("b", 3);
    o.set(Symbol::new(None), 4);
    let keys: Vec<String> = o.keys().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["b", "a"]);
    assert_eq!(o.get("b").and_then(|v| v.as_f64()), Some(3.0));
    assert_eq!(o.len(), 2);

    assert!(o.remove("b").is_some());
    assert!(!o.has_own("b"));
    assert_eq!(o.len(), 1);
}

#[test]
fn array_keys_are_indices() {
    let a = Object::array([Value::from("x"), Value::from("y")]);
    a.push("z");
    let keys: Vec<String> = a.keys().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["0", "1", "2"]);
    assert_eq!(a.get("2").unwrap().as_str(), Some("z"));
}

#[test]
fn function_call_and_properties() {
    let f = Function::builder("(a, b) => a + b")
        .name("add")
        .body(|args| {
            let sum: f64 = args.iter().filter_map(|a| a.as_f64()).sum();
            Value::from(sum)
        })
        .build();
    assert_eq!(f.call(&[1.into(), 2.into()]).as_f64(), Some(3.0));
    assert_eq!(f.name(), Some("add"));
    assert!(f.prototype().is_nullish());
    assert!(Function::new("() => {}").call(&[]).is_nullish());

    let sym = Symbol::new(Some("meta"));
    f.set(sym.clone(), true);
    f.set("displayName", "Add");
    assert_eq!(
        f.own_property_keys(),
        [PropertyKey::from("displayName"), PropertyKey::from(sym)]
    );
    assert_eq!(Value::from(f).get("displayName").as_str(), Some("Add"));
}

#[test]
fn deserialize_json() {
    let v: Value = serde_json::from_str(r#"{"a":[1,true,null],"b":{"c":"d"},"e":1.5}"#).unwrap();
    let a = v.get("a");
    assert!(a.as_object().unwrap().is_array());
    assert_eq!(a.get("0").as_f64(), Some(1.0));
    assert_eq!(a.get("1").as_bool(), Some(true));
    assert!(matches!(a.get("2"), Value::Null));
    assert_eq!(v.get("b").get("c").as_str(), Some("d"));
    assert_eq!(v.get("e").as_f64(), Some(1.5));
}

#[test]
fn serialize_json() {
    let v: Value = serde_json::from_str(r#"{"b":[1,2.5],"a":"x"}"#).unwrap();
    assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"b":[1,2.5],"a":"x"}"#);

    let back: Value = serde_json::from_str(&serde_json::to_string(&v).unwrap()).unwrap();
    assert!(deep_equal(&v, &back));
}

#[test]
fn serialize_rejects_cycles_and_host_values() {
    let o = Object::new();
    o.set("self", o.clone());
    let err = serde_json::to_string(&Value::from(o)).unwrap_err();
    assert!(err.to_string().contains("cyclic"));

    assert!(serde_json::to_string(&Value::from(Function::new("() => 1"))).is_err());
    assert!(serde_json::to_string(&Value::from(Node::element("div"))).is_err());
}

#[test]
fn serialize_allows_shared_non_cyclic_objects() {
    let shared = Object::new();
    shared.set("v", 1);
    let o = Object::new();
    o.set("a", shared.clone());
    o.set("b", shared);
    assert_eq!(
        serde_json::to_string(&Value::from(o)).unwrap(),
        r#"{"a":{"v":1},"b":{"v":1}}"#
    );
}

#[test]
fn debug_marks_cycles() {
    let o = Object::new();
    o.set("self", o.clone());
    assert_eq!(format!("{:?}", Value::from(o)), r#"{"self": [Circular]}"#);
}

#[test]
fn symbol_keys_do_not_count_toward_len() {
    let o = Object::new();
    let sym = Symbol::new(Some("s"));
    o.set(sym.clone(), 1);
    o.set(sym.clone(), 2);
    o.set("a", 1);
    assert_eq!(o.len(), 1);
    assert_eq!(
        o.get_key(&PropertyKey::from(sym.clone()))
            .and_then(|v| v.as_f64()),
        Some(2.0)
    );

    assert!(o.remove(sym).is_some());
    assert_eq!(o.len(), 1);
    assert!(o.remove("a").is_some());
    assert!(o.is_empty());
}

#[test]
fn remove_keeps_order_of_remaining_keys() {
    let o: Object = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    o.remove("b");
    o.set("b", 4);
    let keys: Vec<String> = o.keys().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["a", "c", "b"]);
}

#[test]
fn many_keys() {
    let o: Object = (0..10_000).map(|i| (i.to_string(), i)).collect();
    assert_eq!(o.len(), 10_000);
    assert_eq!(o.get("9999").and_then(|v| v.as_f64()), Some(9999.0));

    let a = Object::array(Vec::new());
    for i in 0..10_000 {
        a.push(i);
    }
    assert_eq!(a.len(), 10_000);
    assert_eq!(a.get("9999").and_then(|v| v.as_f64()), Some(9999.0));
}
