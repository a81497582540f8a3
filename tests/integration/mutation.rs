//! Integration tests for incremental mutation and width maintenance

use super::test_utils::{dict_a, leaf_values, named_a, unnamed};
use strata::{nested, ErrorKind, Key, LeveledMap, MapError, Nested, Node, Shape};

#[test]
fn test_delete_top_level_key() {
    let mut map = named_a();
    let removed = map.delete(&Key::from("key2")).unwrap();

    assert_eq!(removed.as_branch().unwrap().dim(), &[2, 3]);
    assert_eq!(leaf_values(&map), vec!["val1_1_1", "val1_1_2"]);
    assert_eq!(map.dim(), &[2, 1, 2]);
    assert_eq!(map.recount_dim(), vec![2, 1, 2]);
}

#[test]
fn test_set_empty_mapping() {
    let mut map = named_a();
    map.set_nested(&Key::path(["newkey"]), Nested::empty()).unwrap();

    assert_eq!(map.dim(), &[4, 3, 5]);
    let child = map.get(&Key::path(["newkey"])).unwrap().as_branch().unwrap();
    assert_eq!(child.levels(), 2);
    assert_eq!(child.level_names(), vec!["b", "c"]);
}

#[test]
fn test_set_too_shallow_mapping_is_rejected() {
    let mut map = named_a();
    let err = map
        .set_nested(&Key::path(["newkey"]), nested!({ 1 => "1" }))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(!map.contains_key(&Key::from("newkey")));
    assert_eq!(map.dim(), &[3, 3, 5]);
}

#[test]
fn test_set_mapping_with_integer_keys() {
    let mut map = named_a();
    map.set_nested(&Key::path(["newkey"]), nested!({ 1 => { 2 => "3", 4 => "5" } }))
        .unwrap();

    assert_eq!(map.dim(), &[4, 4, 7]);
    let child = map.get(&Key::path(["newkey"])).unwrap().as_branch().unwrap();
    assert_eq!(child.levels(), 2);
    assert_eq!(child.level_names(), vec!["b", "c"]);
    assert_eq!(map.leaf(&[Key::from("newkey"), Key::from(1), Key::from(4)]).unwrap(), &"5");
}

#[test]
fn test_nested_set_and_get() {
    let mut map = unnamed(dict_a());
    assert!(map.has_key(&Key::path(["key1", "key1_1", "key1_1_1"])).unwrap());
    assert!(!map.has_key(&Key::path(["keyX", "keyX_1", "keyX_1_1"])).unwrap());

    map.set_leaf(&Key::path(["keyX", "keyX_1", "keyX_1_1"]), "valX_1_1")
        .unwrap();
    assert!(map.has_key(&Key::path(["keyX", "keyX_1", "keyX_1_1"])).unwrap());
    assert_eq!(
        map.leaf(&Key::path(["keyX", "keyX_1", "keyX_1_1"])).unwrap(),
        &"valX_1_1"
    );
    assert_eq!(map.dim(), &[4, 4, 6]);
}

#[test]
fn test_missing_path_lookup_fails() {
    let map = unnamed(dict_a());
    let err = map.leaf(&Key::path(["keyX", "keyX_1", "keyX_1_1"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Key);

    let fallback = Node::Leaf("none");
    let found = map.get_or(&Key::path(["keyX"]), &fallback).unwrap();
    assert_eq!(found.as_leaf(), Some(&"none"));
}

/// Replacing a subtree with a differently shaped one keeps widths exact
#[test]
fn test_overwrite_with_other_shape() {
    let mut map = unnamed(dict_a());
    let replacement = LeveledMap::from_nested(
        nested!({ "only" => { "one" => "leaf" } }),
        Shape::new(2).unwrap(),
    )
    .unwrap();

    let previous = map
        .set(&Key::path(["key2"]), Node::Branch(replacement))
        .unwrap()
        .unwrap();
    assert_eq!(previous.as_branch().unwrap().dim(), &[2, 3]);
    assert_eq!(map.dim(), &[3, 2, 3]);
    assert_eq!(map.dim().to_vec(), map.recount_dim());

    map.set(&Key::path(["key3"]), Node::Branch(LeveledMap::with_levels(2).unwrap()))
        .unwrap();
    assert_eq!(map.dim(), &[3, 2, 3]);
}

#[test]
fn test_remove_path_and_setdefault() {
    let mut map = unnamed(dict_a());
    let removed = map
        .remove_path(&Key::path(["key2", "key2_1", "key2_1_2"]))
        .unwrap();
    assert_eq!(removed.as_leaf(), Some(&"val2_1_2"));
    assert_eq!(map.dim(), &[3, 3, 4]);

    let existing = map
        .setdefault(&Key::path(["key1", "key1_1", "key1_1_1"]), Node::Leaf("other"))
        .unwrap();
    assert_eq!(existing.as_leaf(), Some(&"val1_1_1"));

    map.setdefault(&Key::path(["key3", "new", "leaf"]), Node::Leaf("fresh"))
        .unwrap();
    assert_eq!(map.dim(), &[3, 4, 5]);
}

#[test]
fn test_empty_and_long_paths_rejected() {
    let mut map = unnamed(dict_a());
    assert_eq!(map.set_leaf(&[], "v").unwrap_err(), MapError::EmptyKeyPath);
    assert_eq!(
        map.set_leaf(&Key::path(["a", "b", "c", "d"]), "v")
            .unwrap_err()
            .kind(),
        ErrorKind::Shape
    );
    assert_eq!(map.dim(), &[3, 3, 5]);
}
