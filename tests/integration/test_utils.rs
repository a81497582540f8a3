//! Shared fixtures for integration tests

use strata::{nested, LeveledMap, Nested, Shape};

/// Three levels with uneven widths and one empty top-level entry
pub fn dict_a() -> Nested<&'static str> {
    nested!({
        "key1" => {
            "key1_1" => { "key1_1_1" => "val1_1_1", "key1_1_2" => "val1_1_2" }
        },
        "key2" => {
            "key2_1" => { "key2_1_1" => "val2_1_1", "key2_1_2" => "val2_1_2" },
            "key2_2" => { "key2_2_1" => "val2_2_1" }
        },
        "key3" => {}
    })
}

/// Same layout as `dict_a` but with middle keys repeated across branches
pub fn dict_c() -> Nested<&'static str> {
    nested!({
        "key1" => {
            "keyX_1" => { "keyX_X_1" => "val1_1_1", "keyX_X_2" => "val1_1_2" }
        },
        "key2" => {
            "keyX_1" => { "keyX_X_1" => "val2_1_1", "keyX_X_2" => "val2_1_2" },
            "keyX_2" => {
                "keyX_X_1" => "val2_2_1",
                "keyX_X_2" => "val2_2_2",
                "keyX_X_3" => "val2_2_3",
                "keyX_X_4" => "val2_2_4",
                "keyX_X_5" => "val2_2_5"
            }
        },
        "key3" => {}
    })
}

/// `dict_a` with levels named `a`, `b`, `c`
pub fn named_a() -> LeveledMap<&'static str> {
    LeveledMap::from_nested(dict_a(), Shape::named(["a", "b", "c"]).unwrap()).unwrap()
}

pub fn unnamed(tree: Nested<&'static str>) -> LeveledMap<&'static str> {
    LeveledMap::from_nested(tree, Shape::new(3).unwrap()).unwrap()
}

/// Leaf values in depth-first order
pub fn leaf_values<V: Clone>(map: &LeveledMap<V>) -> Vec<V> {
    map.leaves().map(|(_, v)| v.clone()).collect()
}
