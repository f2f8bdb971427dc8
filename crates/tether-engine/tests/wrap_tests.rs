//! Wrap pipeline and wrapper tests
//!
//! Covers:
//! - wrapper identity within one scope and across scopes
//! - reflective property access, assignment and calls
//! - adapter substitution and the substitution bound
//! - collection wrappers (length, indices, keyed entries, forEach, indexOf)
//! - custom links

mod common;

use std::sync::Arc;

use common::*;
use parking_lot::Mutex;
use tether_engine::{
    BridgeContext, BridgeError, LinkOutcome, ScriptObject, ScriptValue, WrapLink, WrapScope,
};
use tether_sdk::{HostList, HostMap, HostRef, HostValue, NativeFunction};

fn object_of(value: &ScriptValue) -> &tether_engine::ScriptRef {
    value.as_object().expect("wrapped object")
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_same_object_same_wrapper_within_scope() {
    let context = context();
    let scope = context.new_scope();
    let ada = HostValue::Object(person("Ada", 36));

    let first = scope.wrap(&ada);
    let second = scope.wrap(&ada);
    assert!(first.same(&second));
    assert_eq!(scope.len(), 1);
}

#[test]
fn test_separate_scopes_separate_wrappers() {
    let context = context();
    let ada = HostValue::Object(person("Ada", 36));

    let one = context.new_scope();
    let two = context.new_scope();
    assert!(!one.wrap(&ada).same(&two.wrap(&ada)));
}

#[test]
fn test_nested_object_identity() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::Object(person("Ada", 36)));
    let ada = object_of(&wrapped);

    let first = ada.get("address", &scope).unwrap();
    let second = ada.get("address", &scope).unwrap();
    assert!(first.same(&second));
    assert_eq!(object_of(&first).class_name(), "Address");
}

#[test]
fn test_unwrap_returns_host_object() {
    let context = context();
    let scope = context.new_scope();
    let ada = HostValue::Object(person("Ada", 36));

    let wrapped = scope.wrap(&ada);
    assert!(scope.unwrap(&wrapped).same(&ada));
}

#[test]
fn test_primitives_pass_through() {
    let context = context();
    let scope = context.new_scope();
    assert_eq!(scope.wrap(&HostValue::Int(7)).as_int(), Some(7));
    assert_eq!(scope.wrap(&HostValue::Float(0.5)).as_number(), Some(0.5));
    assert_eq!(scope.wrap(&"hi".into()).as_str(), Some("hi"));
    assert!(scope.wrap(&HostValue::Null).is_null());
    assert!(scope.wrap(&HostValue::Undefined).is_undefined());
    assert!(scope.is_empty());
}

// ============================================================================
// Reflective wrappers
// ============================================================================

#[test]
fn test_reflective_get_and_call() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::Object(person("Ada", 36)));
    let ada = object_of(&wrapped);

    assert_eq!(ada.class_name(), "Person");
    assert_eq!(ada.get("name", &scope).unwrap().as_str(), Some("Ada"));
    assert_eq!(ada.get("age", &scope).unwrap().as_int(), Some(36));
    let greeting = ada.call("greet", &["Bob".into()], &scope).unwrap();
    assert_eq!(greeting.as_str(), Some("Hello Bob, I am Ada"));
}

#[test]
fn test_method_read_as_value_stays_bound() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::Object(person("Ada", 36)));
    let greet = object_of(&wrapped).get("greet", &scope).unwrap();

    let function = greet.as_function().expect("bound method");
    assert_eq!(function.name(), Some("greet"));
    let result = function.call(&["Eve".into()]).unwrap();
    assert_eq!(result.as_str(), Some("Hello Eve, I am Ada"));
}

#[test]
fn test_method_value_is_stable_within_wrapper() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&object(Calc));
    let calc = object_of(&wrapped);

    let first = calc.get("f", &scope).unwrap();
    assert!(first.same(&calc.get("f", &scope).unwrap()));
    assert!(!first.same(&calc.get("pick", &scope).unwrap()));

    let list = scope.wrap(&numbers());
    let list = object_of(&list);
    assert!(list.get("forEach", &scope).unwrap().same(&list.get("forEach", &scope).unwrap()));
}

#[test]
fn test_method_value_call_keeps_overload_errors() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&object(Calc));
    let f = object_of(&wrapped).get("f", &scope).unwrap();
    let f = f.as_function().expect("bound method");

    let fault = scope.call_function(f, &[ScriptValue::Null]).unwrap_err();
    assert!(matches!(
        fault.cause,
        Some(BridgeError::AmbiguousOverload { ref class, ref name, .. }) if class == "Calc" && name == "f"
    ));

    let result = scope.call_function(f, &["x".into()]).unwrap();
    assert_eq!(result.as_str(), Some("string"));
}

#[test]
fn test_unknown_name_reads_undefined() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::Object(person("Ada", 36)));
    let ada = object_of(&wrapped);

    assert!(ada.get("email", &scope).unwrap().is_undefined());
    assert!(!ada.has("email"));
    assert!(ada.has("greet"));
}

#[test]
fn test_put_assigns_host_property() {
    let context = context();
    let scope = context.new_scope();
    let host = person("Ada", 36);
    let wrapped = scope.wrap(&HostValue::Object(host.clone()));
    let ada = object_of(&wrapped);

    ada.put("name", &"Grace".into(), &scope).unwrap();
    ada.put("age", &ScriptValue::Int(40), &scope).unwrap();
    assert_eq!(*host.name.lock(), "Grace");
    assert_eq!(*host.age.lock(), 40);
}

#[test]
fn test_put_errors() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::Object(person("Ada", 36)));
    let ada = object_of(&wrapped);

    let err = ada.put("address", &ScriptValue::Null, &scope).unwrap_err();
    assert!(matches!(err, BridgeError::ReadOnly { .. }));
    let err = ada.put("email", &"a@b.c".into(), &scope).unwrap_err();
    assert!(matches!(err, BridgeError::UnknownMember { .. }));
}

#[test]
fn test_ungranted_object_is_opaque() {
    let context = Arc::new(BridgeContext::builder().build());
    let scope = context.new_scope();
    let host = HostValue::Object(person("Ada", 36));
    let wrapped = scope.wrap(&host);
    let ada = object_of(&wrapped);

    assert!(ada.ids().is_empty());
    assert!(ada.get("name", &scope).unwrap().is_undefined());
    assert!(matches!(
        ada.call("greet", &["Bob".into()], &scope),
        Err(BridgeError::UnknownMember { .. })
    ));
    assert!(scope.unwrap(&wrapped).same(&host));
}

// ============================================================================
// Adapters
// ============================================================================

#[test]
fn test_adapter_substitutes_view() {
    let context = Arc::new(builder().adapter::<Secret>(mask_secret).build());
    let scope = context.new_scope();
    let secret = HostValue::object(Secret {
        token: "hunter2".to_string(),
    });

    let wrapped = scope.wrap(&secret);
    let view = object_of(&wrapped);
    assert_eq!(view.class_name(), "SecretView");
    assert_eq!(view.get("masked", &scope).unwrap().as_str(), Some("*******"));
    assert!(view.get("token", &scope).unwrap().is_undefined());
    assert!(scope.unwrap(&wrapped).downcast_ref::<SecretView>().is_some());

    // the original object keeps mapping to the same view
    assert!(scope.wrap(&secret).same(&wrapped));
}

#[test]
fn test_adapter_for_class_descriptor() {
    let context = Arc::new(builder().adapter_for(&SECRET, mask_secret).build());
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::object(Secret {
        token: "abc".to_string(),
    }));
    assert_eq!(object_of(&wrapped).class_name(), "SecretView");
}

#[test]
fn test_adapter_to_primitive() {
    let context = Arc::new(
        builder()
            .adapter::<Triple>(|_: &HostRef| HostValue::from("triple"))
            .build(),
    );
    let scope = context.new_scope();
    assert_eq!(scope.wrap(&object(Triple)).as_str(), Some("triple"));
}

#[test]
fn test_adapter_cycle_stops_at_limit() {
    let calls = Arc::new(Mutex::new(0));
    let ping_calls = calls.clone();
    let pong_calls = calls.clone();
    let context = Arc::new(
        BridgeContext::builder()
            .adapter::<Ping>(move |_: &HostRef| {
                *ping_calls.lock() += 1;
                object(Pong)
            })
            .adapter::<Pong>(move |_: &HostRef| {
                *pong_calls.lock() += 1;
                object(Ping)
            })
            .max_adapter_depth(3)
            .build(),
    );
    let scope = context.new_scope();

    let wrapped = scope.wrap(&object(Ping));
    assert_eq!(object_of(&wrapped).class_name(), "Pong");
    assert_eq!(*calls.lock(), 4);
}

#[test]
fn test_adapter_not_applied_to_subclass() {
    let context = Arc::new(
        builder()
            .adapter::<Animal>(|_: &HostRef| HostValue::from("animal"))
            .build(),
    );
    let scope = context.new_scope();
    let wrapped = scope.wrap(&HostValue::Object(dog()));
    assert_eq!(object_of(&wrapped).class_name(), "Dog");
}

// ============================================================================
// Collections
// ============================================================================

fn numbers() -> HostValue {
    HostValue::object(HostList::new(vec![10.into(), 20.into(), 30.into()]))
}

#[test]
fn test_list_length_and_indices() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&numbers());
    let list = object_of(&wrapped);

    assert_eq!(list.get("length", &scope).unwrap().as_int(), Some(3));
    assert_eq!(list.get("1", &scope).unwrap().as_int(), Some(20));
    assert!(list.get("7", &scope).unwrap().is_undefined());
    assert!(list.has("2"));
    assert!(!list.has("3"));

    let ids = list.ids();
    assert_eq!(&ids[..4], &["0", "1", "2", "length"]);
    assert!(ids.contains(&"push".to_string()));
}

#[test]
fn test_list_index_assignment() {
    let context = context();
    let scope = context.new_scope();
    let host = numbers();
    let wrapped = scope.wrap(&host);
    let list = object_of(&wrapped);

    list.put("0", &ScriptValue::Int(11), &scope).unwrap();
    list.put("3", &ScriptValue::Int(40), &scope).unwrap();
    assert_eq!(list.get("0", &scope).unwrap().as_int(), Some(11));
    assert_eq!(list.get("length", &scope).unwrap().as_int(), Some(4));
    assert!(list.put("9", &ScriptValue::Int(0), &scope).is_err());
}

#[test]
fn test_list_for_each() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&numbers());
    let list = object_of(&wrapped);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback = NativeFunction::anonymous(move |args| {
        sink.lock().push((args[0].as_int().unwrap_or_default(), args[1].as_int().unwrap_or_default()));
        Ok(HostValue::Undefined)
    });

    let result = list.call("forEach", &[callback.into()], &scope).unwrap();
    assert!(result.is_undefined());
    assert_eq!(*seen.lock(), vec![(10, 0), (20, 1), (30, 2)]);
}

#[test]
fn test_list_for_each_requires_function() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&numbers());
    let err = object_of(&wrapped).call("forEach", &[ScriptValue::Int(1)], &scope).unwrap_err();
    assert!(matches!(err, BridgeError::InvocationFailed { ref member, .. } if member == "forEach"));
}

#[test]
fn test_list_index_of() {
    let context = context();
    let scope = context.new_scope();
    let ada = HostValue::Object(person("Ada", 36));
    let list = HostValue::object(HostList::new(vec!["x".into(), ada.clone()]));
    let wrapped = scope.wrap(&list);
    let list = object_of(&wrapped);

    let found = list.call("indexOf", &[scope.wrap(&ada)], &scope).unwrap();
    assert_eq!(found.as_int(), Some(1));
    let found = list.call("indexOf", &["x".into()], &scope).unwrap();
    assert_eq!(found.as_int(), Some(0));
    let missing = list.call("indexOf", &["y".into()], &scope).unwrap();
    assert_eq!(missing.as_int(), Some(-1));
}

#[test]
fn test_list_declared_methods_still_callable() {
    let context = context();
    let scope = context.new_scope();
    let wrapped = scope.wrap(&numbers());
    let list = object_of(&wrapped);

    list.call("push", &[ScriptValue::Int(40)], &scope).unwrap();
    assert_eq!(list.call("size", &[], &scope).unwrap().as_int(), Some(4));
}

#[test]
fn test_map_keyed_entries() {
    let context = context();
    let scope = context.new_scope();
    let map: HostMap = [("alpha", HostValue::from(1)), ("beta", HostValue::from(2))]
        .into_iter()
        .collect();
    let wrapped = scope.wrap(&HostValue::object(map));
    let map = object_of(&wrapped);

    assert_eq!(map.get("length", &scope).unwrap().as_int(), Some(2));
    assert_eq!(map.get("beta", &scope).unwrap().as_int(), Some(2));
    assert!(map.get("gamma", &scope).unwrap().is_undefined());
    assert_eq!(&map.ids()[..3], &["alpha", "beta", "length"]);

    map.put("gamma", &ScriptValue::Int(3), &scope).unwrap();
    assert_eq!(map.call("get", &["gamma".into()], &scope).unwrap().as_int(), Some(3));
}

#[test]
fn test_map_key_with_leading_zeros() {
    let context = context();
    let scope = context.new_scope();
    let map: HostMap = [("007", HostValue::from("bond"))].into_iter().collect();
    let host = HostValue::object(map);
    let wrapped = scope.wrap(&host);
    let agents = object_of(&wrapped);

    assert_eq!(agents.get("007", &scope).unwrap().as_str(), Some("bond"));
    assert!(agents.has("007"));
    assert!(!agents.has("7"));

    agents.put("007", &"changed".into(), &scope).unwrap();
    let map = host.downcast_ref::<HostMap>().expect("map host");
    assert_eq!(map.len(), 1);
    assert_eq!(map.lookup("007").and_then(|v| v.as_str().map(str::to_string)).as_deref(), Some("changed"));
}

// ============================================================================
// Custom links
// ============================================================================

struct Redact;

impl WrapLink for Redact {
    fn name(&self) -> &str {
        "redact"
    }

    fn wrap(&self, object: &HostRef, _scope: &WrapScope) -> LinkOutcome {
        if object.host_class().name() == "demo.model.Fragile" {
            LinkOutcome::Wrapped(ScriptValue::from("<redacted>"))
        } else {
            LinkOutcome::Delegate
        }
    }
}

#[test]
fn test_custom_link_runs_in_position() {
    let context = Arc::new(builder().link(1, Arc::new(Redact)).build());
    assert_eq!(
        context.pipeline().link_names(),
        vec!["adapter", "redact", "collection", "default"]
    );

    let scope = context.new_scope();
    assert_eq!(scope.wrap(&object(Fragile)).as_str(), Some("<redacted>"));
    assert!(scope.wrap(&object(Triple)).as_object().is_some());
}

struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl WrapLink for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn wrap(&self, object: &HostRef, _scope: &WrapScope) -> LinkOutcome {
        self.seen.lock().push(object.host_class().simple_name().to_string());
        LinkOutcome::Delegate
    }
}

#[test]
fn test_substitute_restarts_chain() {
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
    });
    let context = Arc::new(
        builder()
            .adapter::<Secret>(mask_secret)
            .link(usize::MAX, recorder.clone())
            .build(),
    );
    let scope = context.new_scope();
    let _ = scope.wrap(&HostValue::object(Secret {
        token: "t".to_string(),
    }));
    // the recorder sits after the default link and never sees anything
    assert!(recorder.seen.lock().is_empty());

    let context = Arc::new(
        builder()
            .adapter::<Secret>(mask_secret)
            .link(0, recorder.clone())
            .build(),
    );
    let scope = context.new_scope();
    let _ = scope.wrap(&HostValue::object(Secret {
        token: "t".to_string(),
    }));
    assert_eq!(*recorder.seen.lock(), vec!["Secret", "SecretView"]);
}

#[test]
fn test_scope_tracks_every_wrapped_object() {
    let context = context();
    let scope = context.new_scope();
    let kept: Vec<ScriptValue> = (0..3)
        .map(|i| scope.wrap(&HostValue::Object(person("P", i))))
        .collect();
    assert_eq!(scope.len(), 3);
    let ages: Vec<i64> = kept
        .iter()
        .filter_map(|v| v.as_object()?.get("age", &scope).ok()?.as_int())
        .collect();
    assert_eq!(ages, vec![0, 1, 2]);
}
