//! Integration tests for flattening, stratifying and unique keys

use super::test_utils::{dict_a, dict_c, leaf_values, named_a, unnamed};
use strata::{ErrorKind, FlattenOptions, Key, Node};

fn plain(parts: &[&str]) -> Key {
    Key::tuple(parts.iter().copied())
}

#[test]
fn test_iter_flatten_paths_and_values() {
    let map = unnamed(dict_a());
    let paths: Vec<Vec<Key>> = map.iter_flatten(1).unwrap().map(|(p, _)| p).collect();
    assert_eq!(
        paths,
        vec![
            Key::path(["key1", "key1_1"]),
            Key::path(["key2", "key2_1"]),
            Key::path(["key2", "key2_2"]),
        ]
    );

    let values: Vec<&str> = map
        .iter_flatten(2)
        .unwrap()
        .filter_map(|(_, node)| node.as_leaf().copied())
        .collect();
    assert_eq!(
        values,
        vec!["val1_1_1", "val1_1_2", "val2_1_1", "val2_1_2", "val2_2_1"]
    );

    // Negative levels count from the deepest level
    let negative: Vec<Vec<Key>> = map.iter_flatten(-2).unwrap().map(|(p, _)| p).collect();
    assert_eq!(negative, paths);
    assert_eq!(
        map.iter_flatten(-1).unwrap().count(),
        map.iter_flatten(2).unwrap().count()
    );
}

#[test]
fn test_flatten_one_level() {
    let map = named_a();
    assert_eq!(map.flatten(0).unwrap(), map);

    let flat = map.flatten(1).unwrap();
    assert_eq!(flat.dim(), &[3, 5]);
    assert_eq!(flat.level_names(), vec!["a___b", "c"]);
    assert_eq!(
        flat.keys().cloned().collect::<Vec<_>>(),
        vec![
            plain(&["key1", "key1_1"]),
            plain(&["key2", "key2_1"]),
            plain(&["key2", "key2_2"]),
        ]
    );

    // Named tuple keys expose their fields by level name
    let first = flat.keys().next().unwrap().as_tuple().unwrap();
    assert_eq!(first.field("b"), Some(&Key::from("key1_1")));

    assert_eq!(map.flatten(3).unwrap_err().kind(), ErrorKind::Level);
    assert_eq!(map.flatten_keys(-1, true).unwrap().len(), map.dim()[2]);
}

#[test]
fn test_flatten_with_custom_name() {
    let options = FlattenOptions {
        named: false,
        flattened_name: Some("ab".to_string()),
    };
    let flat = named_a().flatten_with(1, &options).unwrap();
    assert_eq!(flat.level_names(), vec!["ab", "c"]);
    assert!(flat.keys().all(|k| k.as_tuple().unwrap().names().is_none()));
}

#[test]
fn test_flatten_then_stratify() {
    let map = named_a();
    let restored = map.flatten(1).unwrap().stratify(1).unwrap();

    assert_eq!(restored.level_names(), vec!["a", "b", "c"]);
    // The empty `key3` branch has no flattened key to come back from
    assert_eq!(restored.dim(), &[2, 3, 5]);
    assert_eq!(leaf_values(&restored), leaf_values(&map));
    assert_eq!(restored.dim().to_vec(), restored.recount_dim());
}

#[test]
fn test_stratify_inferred_from_tuple_keys() {
    let map = named_a();
    let flat = map.flatten(-1).unwrap();
    assert_eq!(flat.levels(), 1);

    let restored = flat.stratify_inferred().unwrap();
    assert_eq!(restored.levels(), 3);
    assert_eq!(restored.level_names(), vec!["a", "b", "c"]);
    assert_eq!(leaf_values(&restored), leaf_values(&map));
}

#[test]
fn test_unique_keys_across_branches() {
    let map = unnamed(dict_c());
    assert_eq!(
        map.unique_keys(false),
        vec![
            Key::path(["key1", "key2", "key3"]),
            Key::path(["keyX_1", "keyX_2"]),
            Key::path(["keyX_X_1", "keyX_X_2", "keyX_X_3", "keyX_X_4", "keyX_X_5"]),
        ]
    );

    let named = map.unique_keys_named(true);
    assert_eq!(named[1].0, "level1");
}

#[test]
fn test_flatten_values_at_middle_level() {
    let map = unnamed(dict_a());
    let branches: Vec<&Node<&str>> = map.flatten_values(1).unwrap();
    assert_eq!(branches.len(), 3);
    assert!(branches.iter().all(|node| !node.is_leaf()));
}
