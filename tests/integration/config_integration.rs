//! Integration tests for Configuration System

use std::fs;
use strata::{nested, ConfigLoader, DirectoryWalker, LeveledMap, Shape, ValueMode};
use tempfile::TempDir;

#[test]
fn test_render_config_drives_tree_string() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("strata.toml");
    fs::write(
        &config_file,
        r#"
[render]
indent = "...."
branch_marker = "|-"
value_mode = "debug"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());

    let map = LeveledMap::from_nested(
        nested!({ "a" => { "x" => { "one" => 1 } } }),
        Shape::new(3).unwrap(),
    )
    .unwrap();
    assert_eq!(
        map.to_tree_string_with(&config.render),
        "a:\n|-x:\n....|-one: 1\n"
    );

    let hidden = strata::RenderConfig {
        value_mode: ValueMode::Hidden,
        ..config.render
    };
    assert_eq!(map.to_tree_string_with(&hidden), "a:\n|-x:\n....|-one\n");
}

#[test]
fn test_walk_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("data");
    fs::create_dir_all(data.join("keep")).unwrap();
    fs::create_dir_all(data.join(".cache")).unwrap();
    fs::write(data.join("keep").join("a.csv"), "1").unwrap();
    fs::write(data.join("keep").join("a.csv.bak"), "1").unwrap();
    fs::write(data.join(".cache").join("b.csv"), "2").unwrap();

    let config_file = temp_dir.path().join("strata.toml");
    fs::write(
        &config_file,
        "[walk]\nignore_patterns = [\".*\", \"*.bak\"]\n",
    )
    .unwrap();
    let config = ConfigLoader::load_from_file(&config_file).unwrap();

    let map = DirectoryWalker::with_config(&data, config.walk)
        .leveled(Shape::new(2).unwrap())
        .unwrap();
    assert_eq!(map.dim(), &[1, 1]);
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("strata.toml");
    fs::write(&config_file, "[render]\nbranch_marker = \"\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(err.to_string().contains("branch_marker"));
}
