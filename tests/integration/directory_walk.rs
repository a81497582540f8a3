//! Integration tests for building leveled maps from directory trees

use std::fs;
use strata::{
    Criteria, Criterion, DirectoryWalker, FilterOptions, Key, LoadError, Shape, WalkConfig,
};
use tempfile::TempDir;

fn dataset() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for (experiment, run, file) in [
        ("exp_a", "run1", "metrics.json"),
        ("exp_a", "run1", "log.txt"),
        ("exp_a", "run2", "metrics.json"),
        ("exp_b", "run1", "metrics.json"),
    ] {
        let dir = root.join(experiment).join(run);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), format!("{}/{}/{}", experiment, run, file)).unwrap();
    }
    fs::write(root.join("README"), "top level").unwrap();
    temp_dir
}

#[test]
fn test_leveled_map_from_directory() {
    let temp_dir = dataset();
    let walker = DirectoryWalker::new(temp_dir.path());
    let map = walker
        .leveled(Shape::named(["experiment", "run", "file"]).unwrap())
        .unwrap();

    assert_eq!(map.dim(), &[2, 3, 4]);
    assert_eq!(map.dim().to_vec(), map.recount_dim());

    let path = map
        .leaf(&Key::path(["exp_a", "run2", "metrics.json"]))
        .unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "exp_a/run2/metrics.json");
}

#[test]
fn test_directory_map_can_be_rearranged() {
    let temp_dir = dataset();
    let map = DirectoryWalker::new(temp_dir.path())
        .leveled(Shape::named(["experiment", "run", "file"]).unwrap())
        .unwrap();

    let by_file = map.rearrange_by_name(&["file", "run", "experiment"]).unwrap();
    assert_eq!(by_file.level_names(), vec!["file", "run", "experiment"]);
    let metrics = by_file.get_key(&Key::from("metrics.json")).unwrap();
    assert_eq!(metrics.as_branch().unwrap().dim(), &[2, 3]);

    let run1 = map
        .filter_key(
            &Criteria::by_name([("run", Criterion::equals("run1"))]),
            FilterOptions::default(),
        )
        .unwrap();
    assert_eq!(run1.leaves().count(), 3);
}

#[test]
fn test_ignored_components_are_skipped() {
    let temp_dir = dataset();
    let config = WalkConfig {
        ignore_patterns: vec!["log*".to_string(), "exp_b".to_string()],
        ..WalkConfig::default()
    };
    let entries = DirectoryWalker::with_config(temp_dir.path(), config)
        .entries()
        .unwrap();

    let keys: Vec<Vec<Key>> = entries.into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            Key::path(["README"]),
            Key::path(["exp_a", "run1", "metrics.json"]),
            Key::path(["exp_a", "run2", "metrics.json"]),
        ]
    );
}

#[test]
fn test_walk_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = DirectoryWalker::new(temp_dir.path().join("absent")).leveled(Shape::new(1).unwrap());
    assert!(matches!(result, Err(LoadError::InvalidPath(_))));
}
