//! Integration Tests for Reactive Objects
//!
//! These tests drive facades from effects and memos the way application code
//! does, and check that writes reach exactly the dependents of the property
//! written.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use sprig_core::object::{wrap, Callable, Facade, ObjectRef, PropertyKey, ReactiveValue, Value};
use sprig_core::reactive::{Effect, Memo, Signal};

/// Run `f` in an effect and count its runs.
fn watch(f: impl Fn() + Send + Sync + 'static) -> (Effect, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let effect = Effect::new(move || {
        f();
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (effect, runs)
}

fn runs(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

#[test]
fn count_write_notifies_reader_exactly_once() {
    let data = wrap(ObjectRef::record([("count", 1)]));
    assert_eq!(data.get_number("count"), Some(1.0));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, count) = watch(move || {
        sink.lock().push(reader.get_number("count"));
    });

    assert!(data.set("count", 5));
    assert_eq!(data.get_number("count"), Some(5.0));
    assert_eq!(runs(&count), 2);
    assert_eq!(*seen.lock(), vec![Some(1.0), Some(5.0)]);
}

#[test]
fn plain_writes_read_back() {
    let data = wrap(ObjectRef::new_record());
    let values = [
        Value::Null,
        Value::from(true),
        Value::from(-3.5),
        Value::from("text"),
        Value::Undefined,
    ];

    for value in values {
        data.set("slot", value.clone());
        assert_eq!(Value::from(data.get("slot")), value);
    }
}

#[test]
fn unrelated_properties_do_not_notify() {
    let data = wrap(ObjectRef::record([("a", 1), ("b", 2)]));

    let reader = data.clone();
    let (_effect, count) = watch(move || {
        reader.get("a");
    });

    data.set("b", 20);
    assert_eq!(runs(&count), 1);
    data.set("a", 10);
    assert_eq!(runs(&count), 2);
}

#[test]
fn same_value_writes_are_silent() {
    let data = wrap(ObjectRef::record([("n", Value::from(f64::NAN))]));

    let reader = data.clone();
    let (_effect, count) = watch(move || {
        reader.get("n");
    });

    data.set("n", f64::NAN);
    assert_eq!(runs(&count), 1);
    data.set("n", 0.0);
    data.set("n", -0.0);
    assert_eq!(runs(&count), 3);
}

#[test]
fn repeated_reads_share_one_node() {
    let data = wrap(ObjectRef::record([("count", 1)]));

    assert_eq!(data.get("count"), data.get("count"));
    let first = data.tracking_node("count").unwrap();
    data.get("count");

    assert_eq!(data.tracked_keys(), vec![PropertyKey::from("count")]);
    assert!(data.tracking_node("count").unwrap().ptr_eq(&first));
}

#[test]
fn nodes_are_shared_between_facades() {
    let object = ObjectRef::record([("n", 1)]);
    let first = wrap(object.clone());
    let second = wrap(object);

    let reader = first.clone();
    let (_effect, count) = watch(move || {
        reader.get("n");
    });

    second.set("n", 2);
    assert_eq!(runs(&count), 2);
    assert_eq!(first.tracked_keys().len(), 1);
}

#[test]
fn writable_cell_slots_delegate_to_the_cell() {
    let signal = Signal::new(Value::from(1));
    let data = wrap(ObjectRef::record([("x", signal.clone())]));

    let reader = data.clone();
    let (_effect, count) = watch(move || {
        reader.get("x");
    });

    assert!(data.set("x", 9));
    assert_eq!(data.get_number("x"), Some(9.0));
    assert_eq!(signal.get_untracked(), Value::from(9));
    assert_eq!(runs(&count), 2);

    // Writing from outside the facade reaches the same dependents
    signal.set(Value::from(3));
    assert_eq!(runs(&count), 3);

    assert!(data.tracking_node("x").is_none());
    assert!(data.tracked_keys().is_empty());
}

#[test]
fn derived_cell_rejects_writes() {
    let data = wrap(ObjectRef::record([("x", Memo::new(|| Value::from(10)))]));

    assert!(!data.set("x", 20));
    assert_eq!(data.get_number("x"), Some(10.0));
    assert!(data.tracking_node("x").is_none());
}

#[test]
fn derived_cell_follows_its_sources() {
    let data = wrap(ObjectRef::record([("base", 2)]));
    let source = data.clone();
    let doubled = Memo::new(move || Value::from(source.get_number("base").unwrap_or(0.0) * 2.0));
    data.set("doubled", doubled);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, _) = watch(move || {
        sink.lock().push(reader.get_number("doubled"));
    });

    data.set("base", 7);
    assert_eq!(*seen.lock(), vec![Some(4.0), Some(14.0)]);
}

#[test]
fn delete_clears_existence_and_notifies() {
    let data = wrap(ObjectRef::record([("p", "v")]));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, _) = watch(move || {
        sink.lock().push(reader.has("p"));
    });

    assert!(data.delete("p"));
    assert!(!data.has("p"));
    assert_eq!(*seen.lock(), vec![true, false]);
}

#[test]
fn delete_notifies_value_readers() {
    let data = wrap(ObjectRef::record([("p", 1)]));

    let reader = data.clone();
    let (_effect, count) = watch(move || {
        reader.get("p");
    });

    data.delete("p");
    assert_eq!(runs(&count), 2);
    assert!(data.get("p").is_undefined());
}

#[test]
fn existence_checks_see_new_keys() {
    let data = wrap(ObjectRef::new_record());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, _) = watch(move || {
        sink.lock().push(reader.has("late"));
    });

    data.set("late", 1);
    assert_eq!(*seen.lock(), vec![false, true]);
}

#[test]
fn enumeration_sees_added_keys() {
    let data = wrap(ObjectRef::record([("a", 1)]));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, _) = watch(move || {
        sink.lock().push(reader.keys().len());
    });

    data.set("b", 2);
    data.set("b", 3);
    let seen = seen.lock().clone();
    assert_eq!(seen.first(), Some(&1));
    assert_eq!(seen.last(), Some(&2));
    assert!(seen.len() >= 2);
}

#[test]
fn enumeration_sees_removed_keys() {
    let data = wrap(ObjectRef::record([("a", 1), ("b", 2)]));

    let reader = data.clone();
    let (_effect, count) = watch(move || {
        reader.keys();
    });

    data.delete("b");
    assert!(runs(&count) >= 2);
    assert_eq!(data.keys(), vec![PropertyKey::from("a")]);
}

#[test]
fn nested_objects_come_back_as_distinct_facades() {
    let data = wrap(ObjectRef::record([("inner", ObjectRef::record([("n", 0)]))]));

    let first = data.get_object("inner").unwrap();
    let second = data.get_object("inner").unwrap();

    assert_ne!(first, second);
    assert!(first.same_target(&second));

    first.set("n", 1);
    assert_eq!(second.get_number("n"), Some(1.0));
    second.set("n", 2);
    assert_eq!(first.get_number("n"), Some(2.0));
}

#[test]
fn nested_writes_notify_deep_readers() {
    let data = wrap(ObjectRef::record([("inner", ObjectRef::record([("n", 0)]))]));

    let reader = data.clone();
    let (_effect, count) = watch(move || {
        if let Some(inner) = reader.get_object("inner") {
            inner.get("n");
        }
    });

    data.get_object("inner").unwrap().set("n", 5);
    assert_eq!(runs(&count), 2);

    // Replacing the nested object reaches readers of the old one
    data.set("inner", ObjectRef::record([("n", 9)]));
    assert_eq!(runs(&count), 3);
}

#[test]
fn arrays_track_indices_and_length() {
    let list = wrap(ObjectRef::array([1, 2, 3]));

    let sums = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (list.clone(), sums.clone());
    let (_effect, _) = watch(move || {
        let length = reader.get_number("length").unwrap_or(0.0) as usize;
        let sum: f64 = (0..length).filter_map(|i| reader.get_number(i)).sum();
        sink.lock().push(sum);
    });

    list.set(3usize, 4);
    list.set("length", 2);
    assert_eq!(*sums.lock(), vec![6.0, 10.0, 3.0]);
    assert!(list.get(2usize).is_undefined());
}

#[test]
fn callables_pass_through_untracked() {
    let data = wrap(ObjectRef::record([(
        "inc",
        Callable::new(|args| Value::from(args[0].as_number().unwrap_or(0.0) + 1.0)),
    )]));

    assert!(matches!(data.get("inc"), ReactiveValue::Function(_)));
    assert_eq!(data.call("inc", &[Value::from(1)]), Some(Value::from(2)));
    assert!(data.tracked_keys().is_empty());
}

#[test]
fn prototype_link_is_read_raw() {
    let proto = ObjectRef::record([("greeting", "hi")]);
    let object = ObjectRef::new_record();
    object.set_prototype(Some(proto.clone()));
    let data = wrap(object);

    assert_eq!(data.get("__proto__"), ReactiveValue::Untracked(Value::Object(proto)));
    assert_eq!(data.get_string("greeting").as_deref(), Some("hi"));
    assert_eq!(data.tracked_keys(), vec![PropertyKey::from("greeting")]);
}

#[test]
fn json_snapshot_is_reactive() {
    let data = wrap(ObjectRef::try_from(json!({"user": {"name": "ada"}, "tags": [1, 2]})).unwrap());

    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), snapshots.clone());
    let (_effect, _) = watch(move || {
        if let Ok(snapshot) = reader.to_json() {
            sink.lock().push(snapshot);
        }
    });

    data.get_object("user").unwrap().set("name", "grace");

    let snapshots = snapshots.lock();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[1], json!({"user": {"name": "grace"}, "tags": [1, 2]}));
}

#[test]
fn facades_convert_back_to_values() {
    let inner = ObjectRef::new_record();
    let data: Facade = wrap(ObjectRef::record([("inner", inner.clone())]));

    let outer = wrap(ObjectRef::new_record());
    outer.set("copy", data.get_object("inner").unwrap());
    assert_eq!(outer.raw().get(&"copy".into()), Value::Object(inner));
}

#[test]
fn existence_checks_see_keys_added_as_undefined() {
    let data = wrap(ObjectRef::new_record());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, _) = watch(move || {
        sink.lock().push(reader.has("k"));
    });

    data.set("k", Value::Undefined);
    assert!(data.has("k"));
    assert_eq!(*seen.lock(), vec![false, true]);
}

#[test]
fn existence_checks_see_undefined_keys_removed() {
    let data = wrap(ObjectRef::record([("k", Value::Undefined)]));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let (reader, sink) = (data.clone(), seen.clone());
    let (_effect, _) = watch(move || {
        sink.lock().push(reader.has("k"));
    });

    assert!(data.delete("k"));
    assert_eq!(*seen.lock(), vec![true, false]);
}

#[test]
fn oversized_digit_keys_do_not_grow_arrays() {
    let list = wrap(ObjectRef::array([1]));

    assert!(list.set("18446744073709551615", 1));
    assert!(list.set("4294967295", 2));

    assert_eq!(list.get_number("length"), Some(1.0));
    assert_eq!(list.get_number("4294967295"), Some(2.0));
    assert_eq!(list.to_json().unwrap(), json!([1]));
}
