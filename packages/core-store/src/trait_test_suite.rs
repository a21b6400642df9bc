//! Behavioral checks every `CacheProvider` implementation must pass.
//!
//! Each function takes a factory producing a fresh, empty store so the checks
//! stay independent of one another.

use serde::{Deserialize, Serialize};

use crate::{CacheProvider, Key, Lookup};

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct SimpleStruct {
    pub example: String,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct MoreComplexStruct {
    pub sub_struct: SimpleStruct,
    pub array_of_things: Vec<SimpleStruct>,
}

pub fn complex_value() -> MoreComplexStruct {
    MoreComplexStruct {
        sub_struct: SimpleStruct {
            example: "Hello, world!".to_string(),
        },
        array_of_things: vec![
            SimpleStruct {
                example: "Oh my goodness.".to_string(),
            },
            SimpleStruct {
                example: "Look how working this is".to_string(),
            },
            SimpleStruct {
                example: "Just so functional!".to_string(),
            },
        ],
    }
}

fn key(s: &str) -> Key {
    Key::parse(s).unwrap()
}

pub fn put_then_get_works<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    store.put(&key("answer"), &42u64).unwrap();
    assert_eq!(store.get::<u64>(&key("answer")).unwrap(), Some(42));

    store.put(&key("deeply.nested.value"), &complex_value()).unwrap();
    let actual: MoreComplexStruct = store
        .get(&key("deeply.nested.value"))
        .unwrap()
        .unwrap();
    assert_eq!(actual, complex_value());
}

pub fn absent_keys_yield_default<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    assert_eq!(
        store.lookup::<String>(&key("missing")).unwrap(),
        Lookup::Absent
    );
    assert_eq!(store.get::<String>(&key("missing.child")).unwrap(), None);
    assert!(!store.get_or(&key("missing"), false).unwrap());
    assert!(!store.contains(&key("missing")).unwrap());

    // A parent key holding a value says nothing about its children.
    store.put(&key("parent"), "value").unwrap();
    assert_eq!(store.get::<String>(&key("parent.child")).unwrap(), None);
}

pub fn overwrite_replaces_value<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    store.put(&key("value"), "first").unwrap();
    store.put(&key("value"), "second").unwrap();

    assert_eq!(
        store.get::<String>(&key("value")).unwrap(),
        Some("second".to_owned())
    );
    assert_eq!(store.keys().unwrap(), vec![key("value")]);
}

pub fn parent_and_child_keys_coexist<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    store.put(&key("foo"), "v1").unwrap();
    store.put(&key("foo.bar"), "v2").unwrap();

    assert_eq!(store.get::<String>(&key("foo")).unwrap(), Some("v1".into()));
    assert_eq!(
        store.get::<String>(&key("foo.bar")).unwrap(),
        Some("v2".into())
    );

    assert!(store.delete(&key("foo")).unwrap());
    assert_eq!(store.get::<String>(&key("foo")).unwrap(), None);
    assert_eq!(
        store.get::<String>(&key("foo.bar")).unwrap(),
        Some("v2".into())
    );
}

pub fn delete_is_idempotent<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    assert!(!store.delete(&key("never.written")).unwrap());

    store.put(&key("a.b.c"), &1u8).unwrap();
    assert!(store.delete(&key("a.b.c")).unwrap());
    assert!(!store.delete(&key("a.b.c")).unwrap());
    assert!(store.keys().unwrap().is_empty());
}

pub fn keys_track_puts_and_deletes<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    for k in ["b", "a.x", "a.y", "a", "c.d.e", "c.d.f"] {
        store.put(&key(k), k).unwrap();
    }
    store.delete(&key("a.x")).unwrap();
    store.delete(&key("c.d.e")).unwrap();
    store.put(&key("a.z"), "a.z").unwrap();

    let expected: Vec<Key> = ["a", "a.y", "a.z", "b", "c.d.f"]
        .into_iter()
        .map(key)
        .collect();
    assert_eq!(store.keys().unwrap(), expected);
    assert_eq!(store.len().unwrap(), expected.len());

    let values: Vec<String> = store.values().unwrap();
    let expected_values: Vec<String> = expected.iter().map(ToString::to_string).collect();
    assert_eq!(values, expected_values);

    let entries: Vec<(Key, String)> = store.entries().unwrap();
    for (k, v) in entries {
        assert_eq!(k.to_string(), v);
    }
}

pub fn reset_removes_everything<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();

    for k in ["one", "two.three", "two.four.five"] {
        store.put(&key(k), &complex_value()).unwrap();
    }
    assert!(!store.is_empty().unwrap());

    store.reset().unwrap();

    assert!(store.keys().unwrap().is_empty());
    assert!(store.is_empty().unwrap());
    assert_eq!(store.size().unwrap(), 0);

    // The store stays usable afterwards.
    store.put(&key("two"), &2u8).unwrap();
    assert_eq!(store.get::<u8>(&key("two")).unwrap(), Some(2));
}

pub fn size_counts_encoded_bytes<S: CacheProvider>(store_factory: fn() -> S) {
    let mut store = store_factory();
    assert_eq!(store.size().unwrap(), 0);

    let format = store.format();
    let first = format.encode(&complex_value()).unwrap().len() as u64;
    let second = format.encode("short").unwrap().len() as u64;

    store.put(&key("first"), &complex_value()).unwrap();
    store.put(&key("nested.second"), "short").unwrap();
    assert_eq!(store.size().unwrap(), first + second);

    store.delete(&key("first")).unwrap();
    assert_eq!(store.size().unwrap(), second);
}

/// Run every check in this module.
pub fn run_all<S: CacheProvider>(store_factory: fn() -> S) {
    put_then_get_works(store_factory);
    absent_keys_yield_default(store_factory);
    overwrite_replaces_value(store_factory);
    parent_and_child_keys_coexist(store_factory);
    delete_is_idempotent(store_factory);
    keys_track_puts_and_deletes(store_factory);
    reset_removes_everything(store_factory);
    size_counts_encoded_bytes(store_factory);
}
