//! Integration tests for key and value filters and selective assignment

use super::test_utils::{dict_a, dict_c, leaf_values, unnamed};
use strata::{Criteria, Criterion, FilterOptions, Key, MapError, Node};

fn top_keys<V>(map: &strata::LeveledMap<V>) -> Vec<Key> {
    map.keys().cloned().collect()
}

#[test]
fn test_filter_top_level() {
    let map = unnamed(dict_a());

    let single = map
        .filter_key(&vec![Criterion::equals("key1")].into(), FilterOptions::default())
        .unwrap();
    assert_eq!(top_keys(&single), Key::path(["key1"]));

    let either: Criteria = vec![Criterion::member_of(["key1", "key3"])].into();
    let kept = map.filter_key(&either, FilterOptions::default()).unwrap();
    assert_eq!(top_keys(&kept), Key::path(["key1", "key3"]));

    let options = FilterOptions {
        drop_empty: true,
        ..FilterOptions::default()
    };
    let non_empty = map.filter_key(&either, options).unwrap();
    assert_eq!(top_keys(&non_empty), Key::path(["key1"]));
    assert_eq!(non_empty.dim().to_vec(), non_empty.recount_dim());
}

#[test]
fn test_filter_second_level() {
    let map = unnamed(dict_a());
    let positional: Criteria = vec![Criterion::Wildcard, Criterion::equals("key1_1")].into();
    let filtered = map.filter_key(&positional, FilterOptions::default()).unwrap();
    assert_eq!(leaf_values(&filtered), vec!["val1_1_1", "val1_1_2"]);

    let by_name = Criteria::by_name([("level1", Criterion::equals("key1_1"))]);
    let filtered = map.filter_key(&by_name, FilterOptions::default()).unwrap();
    assert_eq!(leaf_values(&filtered), vec!["val1_1_1", "val1_1_2"]);

    let shared = unnamed(dict_c())
        .filter_key(&by_name_x1(), FilterOptions::default())
        .unwrap();
    assert_eq!(
        leaf_values(&shared),
        vec!["val1_1_1", "val1_1_2", "val2_1_1", "val2_1_2"]
    );
}

fn by_name_x1() -> Criteria {
    Criteria::by_name([("level1", Criterion::equals("keyX_1"))])
}

#[test]
fn test_filter_out_inverts_named_levels_only() {
    let filtered = unnamed(dict_c())
        .filter_key(
            &by_name_x1(),
            FilterOptions {
                filter_out: true,
                drop_empty: true,
            },
        )
        .unwrap();

    // Level 0 was not named, so every top-level key may survive
    assert_eq!(top_keys(&filtered), Key::path(["key2"]));
    assert_eq!(
        leaf_values(&filtered),
        vec!["val2_2_1", "val2_2_2", "val2_2_3", "val2_2_4", "val2_2_5"]
    );
}

#[test]
fn test_filter_values_by_suffix() {
    let map = unnamed(dict_c());
    let filtered = map
        .filter_values(
            |node| node.as_leaf().map_or(false, |v| v.ends_with('2')),
            None,
            FilterOptions::default(),
        )
        .unwrap();

    assert_eq!(
        filtered.flatten_keys(1, false).unwrap(),
        vec![
            Key::tuple(["key1", "keyX_1"]),
            Key::tuple(["key2", "keyX_1"]),
            Key::tuple(["key2", "keyX_2"]),
        ]
    );
    assert_eq!(filtered.dim(), &[3, 3, 3]);
}

#[test]
fn test_filter_leaves_keeps_subsequence() {
    let map = unnamed(dict_a());
    let filtered = map.filter_leaves(|v| v.starts_with("val2"), FilterOptions::default());
    let all = leaf_values(&map);
    let kept = leaf_values(&filtered);

    assert_eq!(kept, vec!["val2_1_1", "val2_1_2", "val2_2_1"]);
    let mut remaining = all.iter();
    assert!(kept.iter().all(|k| remaining.any(|v| v == k)));
}

#[test]
fn test_set_where_middle_level() {
    let mut map = unnamed(dict_c());
    let criteria: Criteria = vec![
        Criterion::Wildcard,
        Criterion::equals("keyX_1"),
        Criterion::Wildcard,
    ]
    .into();

    let written = map.set_where(&criteria, Node::Leaf("NEW")).unwrap();
    assert_eq!(written, 4);
    assert_eq!(
        leaf_values(&map),
        vec![
            "NEW", "NEW", "NEW", "NEW", "val2_2_1", "val2_2_2", "val2_2_3", "val2_2_4", "val2_2_5"
        ]
    );
    assert_eq!(map.dim(), &[3, 3, 9]);
}

#[test]
fn test_select_paths() {
    let map = unnamed(dict_c());
    let selected = map
        .select(&vec![Criterion::Wildcard, Criterion::equals("keyX_2")].into())
        .unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].0, Key::path(["key2", "keyX_2"]));
    assert_eq!(selected[0].1.as_branch().unwrap().len(), 5);
}

#[test]
fn test_invalid_criteria() {
    let map = unnamed(dict_a());
    let empty: Criteria = Vec::new().into();
    assert_eq!(
        map.filter_key(&empty, FilterOptions::default()).unwrap_err(),
        MapError::EmptyCriteria
    );

    let unknown = Criteria::by_name([("nope", Criterion::Wildcard)]);
    assert!(matches!(
        map.filter_key(&unknown, FilterOptions::default()),
        Err(MapError::UnknownLevelName(_))
    ));

    let too_many: Criteria = vec![Criterion::Wildcard; 4].into();
    assert!(matches!(
        map.select(&too_many),
        Err(MapError::Level { .. })
    ));
}
