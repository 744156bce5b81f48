//! Integration tests for environment variable overrides.
//!
//! Most tests inject the environment through `with_env_vars` so that the
//! application order is fixed; the process-environment tests run serially.

use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use yaconfig::{ConfigResolver, ErrorKind, Value};

const TEST_CONFIG1: &str = r#"
configitem:
    subitem1: 1
    subitem2: 2
    subitem3: 3
"#;

fn config_dir(root: &TempDir, dir: &str, name: &str) -> PathBuf {
    let dir = root.path().join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), TEST_CONFIG1).unwrap();
    dir
}

#[test]
fn test_env_overrides_file_values() {
    let temp = TempDir::new().unwrap();
    let dir = config_dir(&temp, "config", "myapp.yaml");

    let config = ConfigResolver::builder()
        .with_paths([&dir])
        .with_name("myapp.yaml")
        .with_env_vars([
            ("MYAPP_CONFIGITEM_SUBITEM1", "10"),
            ("MYAPP_CONFIGITEM_SUBITEM2", "20"),
            ("MYAPP_CONFIGITEM_SUBITEM4", "four"),
            ("UNRELATED_CONFIGITEM_SUBITEM3", "30"),
        ])
        .build()
        .unwrap();

    assert_eq!(config["configitem"]["subitem1"], Value::Integer(10));
    assert_eq!(config["configitem"]["subitem2"], Value::Integer(20));
    assert_eq!(config["configitem"]["subitem3"], Value::Integer(3));
    assert_eq!(config["configitem"]["subitem4"], Value::from("four"));
    assert_eq!(config.env_overrides().len(), 3);
}

#[test]
fn test_underscored_name_builds_deep_branches() {
    let temp = TempDir::new().unwrap();
    let dir = config_dir(&temp, "config2", "my_amazing_app.yaml");

    let config = ConfigResolver::builder()
        .with_paths([&dir])
        .with_name("my_amazing_app.yaml")
        .with_env_vars([
            ("MY_AMAZING_APP_CONFIGITEM_SUBITEM1", "11"),
            ("MY_AMAZING_APP_CONFIGITEM_CONTAINS_MANY_NESTED_SUBITEMS", "12"),
        ])
        .build()
        .unwrap();

    assert_eq!(config["configitem"]["subitem1"], 11i64);
    let nested = config.lookup("configitem.contains.many.nested").unwrap();
    assert!(nested.is_map());
    assert_eq!(nested["subitems"], 12i64);
    // siblings from the file survive
    assert_eq!(config["configitem"]["subitem2"], 2i64);
}

#[test]
fn test_float_and_string_sniffing() {
    let temp = TempDir::new().unwrap();
    let config = ConfigResolver::builder()
        .with_paths([temp.path()])
        .with_name("svc.yaml")
        .with_env_vars([
            ("SVC_RATIO", "0.25"),
            ("SVC_HOST", "example.org"),
            ("SVC_PORT", "8080"),
        ])
        .build()
        .unwrap();

    assert_eq!(config["ratio"], Value::Float(0.25));
    assert_eq!(config["host"], "example.org");
    assert_eq!(config["port"].as_i64(), Some(8080));
}

#[test]
fn test_scalar_after_container_wins() {
    let temp = TempDir::new().unwrap();
    let dir = config_dir(&temp, "config3", "another_app.yaml");

    let config = ConfigResolver::builder()
        .with_paths([&dir])
        .with_name("another_app.yaml")
        .with_env_vars([
            ("ANOTHER_APP_ERROR_ITEM_ONE_SUBITEM", "not_set"),
            ("ANOTHER_APP_ERROR_ITEM_ONE", "the_real_thing"),
        ])
        .build()
        .unwrap();

    let one = config.lookup("error.item.one").unwrap();
    assert_eq!(*one, "the_real_thing");
    let err = one.attr("subitem").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownKey);
    assert!(config.lookup("error.item.one.subitem").is_err());
}

#[test]
fn test_container_after_scalar_wins() {
    let temp = TempDir::new().unwrap();
    let config = ConfigResolver::builder()
        .with_paths([temp.path()])
        .with_name("another_app.yaml")
        .with_env_vars([
            ("ANOTHER_APP_ERROR_ITEM_ONE", "the_real_thing"),
            ("ANOTHER_APP_ERROR_ITEM_ONE_SUBITEM", "not_set"),
        ])
        .build()
        .unwrap();

    assert_eq!(
        *config.lookup("error.item.one.subitem").unwrap(),
        "not_set"
    );
}

#[test]
fn test_env_replaces_file_scalar_with_container() {
    let temp = TempDir::new().unwrap();
    let dir = config_dir(&temp, "config", "myapp.yaml");

    let config = ConfigResolver::builder()
        .with_paths([&dir])
        .with_name("myapp.yaml")
        .with_env_vars([("MYAPP_CONFIGITEM_SUBITEM1_DEEP", "x")])
        .build()
        .unwrap();

    let subitem1 = config.lookup("configitem.subitem1").unwrap();
    assert!(subitem1.is_map());
    assert_eq!(subitem1.as_map().unwrap().len(), 1);
    assert_eq!(subitem1["deep"], "x");
}

#[test]
fn test_without_environment_ignores_overrides() {
    let temp = TempDir::new().unwrap();
    let dir = config_dir(&temp, "config", "myapp.yaml");

    let config = ConfigResolver::builder()
        .with_paths([&dir])
        .with_name("myapp.yaml")
        .with_env_vars([("MYAPP_CONFIGITEM_SUBITEM1", "10")])
        .without_environment()
        .build()
        .unwrap();
    assert_eq!(config["configitem"]["subitem1"], 1i64);
    assert!(config.env_overrides().is_empty());
}

#[test]
#[serial]
fn test_process_environment_is_read_by_default() {
    let temp = TempDir::new().unwrap();
    let dir = config_dir(&temp, "config", "yacfgproc.yaml");

    // SAFETY: This test runs serially via #[serial] to avoid data races
    unsafe {
        std::env::set_var("YACFGPROC_CONFIGITEM_SUBITEM1", "10");
        std::env::set_var("YACFGPROC_EXTRA_NAME", "from env");
    }

    let config = ConfigResolver::with_paths([&dir], "yacfgproc.yaml").unwrap();

    // SAFETY: This test runs serially via #[serial] to avoid data races
    unsafe {
        std::env::remove_var("YACFGPROC_CONFIGITEM_SUBITEM1");
        std::env::remove_var("YACFGPROC_EXTRA_NAME");
    }

    assert_eq!(config["configitem"]["subitem1"], Value::Integer(10));
    assert_eq!(config["extra"]["name"], "from env");
}

#[test]
#[serial]
fn test_process_env_prefix_needs_underscore_boundary() {
    let temp = TempDir::new().unwrap();

    // SAFETY: This test runs serially via #[serial] to avoid data races
    unsafe {
        std::env::set_var("YACFGBOUNDX_ITEM", "1");
    }

    let config = ConfigResolver::with_paths([temp.path()], "yacfgbound.yaml").unwrap();

    // SAFETY: This test runs serially via #[serial] to avoid data races
    unsafe {
        std::env::remove_var("YACFGBOUNDX_ITEM");
    }

    assert!(config.is_empty());
}
