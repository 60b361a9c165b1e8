//! Integration tests for serializing fiber-shaped component trees.
//!
//! These tests build graphs the way a UI host lays out its internal tree:
//! a root container pointing at the current fiber, fibers linked through
//! `child`, `sibling` and `return`, and `alternate` pairs pointing at each
//! other. Every one of those links except the first path down is a
//! back-edge that must be pruned.

use pretty_assertions::assert_eq;
use reactree_graph::{
    FunctionPolicy, Function, GraphSerializer, Object, SerializationError, SerializerConfig,
    Value,
};
use serde_json::json;

fn fiber(tag: i64, element_type: Value, props: Object) -> Object {
    Object::new()
        .with("tag", tag)
        .with("elementType", element_type)
        .with("memoizedProps", props)
}

/// Root container -> App -> (Header, List -> Item), with return pointers,
/// an alternate for App and the container's `current` entry.
fn build_tree() -> Object {
    let container = Object::new().with("tag", 1);
    let host_root = fiber(3, Value::Null, Object::new());
    host_root.set("stateNode", container.clone());
    container.set("current", host_root.clone());

    let app = fiber(0, Function::named("App").into(), Object::new());
    let header = fiber(
        5,
        "header".into(),
        Object::new().with("className", "top"),
    );
    let list = fiber(0, Function::named("List").into(), Object::new().with("count", 1));
    let item = fiber(
        0,
        Function::named("Item").into(),
        Object::new().with("label", "first").with("onClick", Function::named("select")),
    );

    host_root.set("child", app.clone());
    app.set("return", host_root.clone());
    app.set("child", header.clone());
    header.set("return", app.clone());
    header.set("sibling", list.clone());
    list.set("return", app.clone());
    list.set("child", item.clone());
    item.set("return", list.clone());

    let app_alternate = fiber(0, Function::named("App").into(), Object::new());
    app.set("alternate", app_alternate.clone());
    app_alternate.set("alternate", app.clone());

    container
}

#[test]
fn test_current_tree_is_expanded_once() {
    let container = build_tree();
    let serializer = GraphSerializer::default();

    let document = serializer
        .to_document(&reactree_graph::select_entry(&container.clone().into(), "current"))
        .unwrap()
        .unwrap();

    let expected = json!({
        "tag": 3,
        "elementType": null,
        "memoizedProps": {},
        "stateNode": { "tag": 1 },
        "child": {
            "tag": 0,
            "elementType": { "name": "App" },
            "memoizedProps": {},
            "child": {
                "tag": 5,
                "elementType": "header",
                "memoizedProps": { "className": "top" },
                "sibling": {
                    "tag": 0,
                    "elementType": { "name": "List" },
                    "memoizedProps": { "count": 1 },
                    "child": {
                        "tag": 0,
                        "elementType": { "name": "Item" },
                        "memoizedProps": { "label": "first" }
                    }
                }
            },
            "alternate": {
                "tag": 0,
                "elementType": { "name": "App" },
                "memoizedProps": {}
            }
        }
    });
    assert_eq!(document, expected);

    container.clear();
}

#[test]
fn test_serialize_entry_matches_document() {
    let container = build_tree();
    let serializer = GraphSerializer::default();

    let text = serializer
        .serialize_entry(&container.clone().into(), "current")
        .unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    let document = serializer
        .to_document(&reactree_graph::select_entry(&container.clone().into(), "current"))
        .unwrap()
        .unwrap();
    assert_eq!(reparsed, document);

    container.clear();
}

#[test]
fn test_structurally_identical_graphs_serialize_identically() {
    let first = build_tree();
    let second = build_tree();
    let serializer = GraphSerializer::default();

    let a = serializer.serialize(&first.clone().into()).unwrap();
    let b = serializer.serialize(&second.clone().into()).unwrap();
    assert_eq!(a, b);

    // Repeating the call on the same graph gives the same text.
    assert_eq!(a, serializer.serialize(&first.clone().into()).unwrap());

    first.clear();
    second.clear();
}

#[test]
fn test_output_has_no_back_references() {
    let container = build_tree();
    let text = GraphSerializer::default()
        .serialize_entry(&container.clone().into(), "current")
        .unwrap();

    assert!(!text.contains("\"return\""));
    assert!(!text.contains("\"current\""));
    assert_eq!(text.matches("\"name\":\"App\"").count(), 2);

    container.clear();
}

#[test]
fn test_strict_functions_reject_props_callbacks() {
    let container = build_tree();
    let serializer = GraphSerializer::new(SerializerConfig {
        function_policy: FunctionPolicy::Reject,
        ..SerializerConfig::default()
    });

    let err = serializer
        .serialize_entry(&container.clone().into(), "current")
        .unwrap_err();
    match err {
        SerializationError::UnsupportedFunction { name, path } => {
            assert_eq!(name, "select");
            assert_eq!(
                path,
                "/child/child/sibling/child/memoizedProps/onClick"
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    container.clear();
}

#[test]
fn test_long_sibling_chain() {
    let parent = Object::new().with("tag", 3);
    let first = fiber(0, Function::named("Row").into(), Object::new().with("i", 0));
    first.set("return", parent.clone());
    parent.set("child", first.clone());

    let mut previous = first;
    for i in 1..200 {
        let next = fiber(0, Function::named("Row").into(), Object::new().with("i", i));
        next.set("return", parent.clone());
        previous.set("sibling", next.clone());
        previous = next;
    }

    let text = GraphSerializer::default()
        .serialize(&parent.clone().into())
        .unwrap();
    assert_eq!(text.matches("\"name\":\"Row\"").count(), 200);

    parent.clear();
}
