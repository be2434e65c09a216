//! Load/unload/reload idempotence. Loading a plugin makes it queryable by
//! id; unloading removes it; reloading restores it with a fresh class
//! resolver whose resolutions are independent of the first load's (closed)
//! resolver.

use std::fs;

use pipeline_engine::infrastructure::plugins::PluginManager;
use tempfile::tempdir;

fn write_plugin(dir: &std::path::Path, id: &str, main_class: &str) {
    fs::write(
        dir.join("plugin.properties"),
        format!("plugin.id={id}\nplugin.version=1.0.0\nplugin.name=Sample\nplugin.description=d\nplugin.author=a\nplugin.main-class={main_class}\n"),
    )
    .unwrap();
    let class_path = dir.join(main_class.replace('.', "/"));
    fs::create_dir_all(class_path.parent().unwrap()).unwrap();
    fs::write(format!("{}.class", class_path.display()), b"").unwrap();
}

#[test]
fn load_unload_reload_round_trips_with_a_fresh_resolver() {
    let dir = tempdir().unwrap();
    write_plugin(dir.path(), "acme.sample", "acme.sample.Plugin");

    let manager = PluginManager::new(None, true);

    let loaded = manager.load(dir.path()).unwrap();
    assert_eq!(loaded.id, "acme.sample");
    assert!(manager.get("acme.sample").is_some());

    let first_resolver = manager.get("acme.sample").unwrap().class_resolver;
    assert!(first_resolver.resolve("acme.sample.Plugin").is_ok(), "main class must resolve while loaded");

    manager.unload("acme.sample").unwrap();
    assert!(manager.get("acme.sample").is_none(), "unloaded plugin must be absent");
    assert!(first_resolver.resolve("acme.sample.Plugin").is_err(), "a closed resolver must fail every subsequent resolution deterministically");

    manager.load(dir.path()).unwrap();
    assert!(manager.reload("acme.sample").is_ok(), "reload must restore the plugin");
    assert!(manager.get("acme.sample").is_some());

    let second_resolver = manager.get("acme.sample").unwrap().class_resolver;
    assert!(second_resolver.resolve("acme.sample.Plugin").is_ok(), "the second load's resolver must be independently live");
}

#[test]
fn reloading_an_id_that_was_never_loaded_fails_informatively() {
    let manager = PluginManager::new(None, true);
    let err = manager.reload("nobody.home").unwrap_err();
    assert!(err.to_string().contains("nobody.home"));
}
