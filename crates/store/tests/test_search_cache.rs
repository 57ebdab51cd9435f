use codex_core::ToolManifest;
use codex_store::{SearchCache, Store};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn sample_matches() -> Vec<codex_core::ToolDescriptor> {
    ToolManifest::parse("tools:\n  - {name: Test Tool, description: sample, server: t.py, methods: [get_test_data]}\n")
        .unwrap()
        .tools
}

#[test]
fn test_miss_then_hit() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path().join("codex.db")).unwrap();
    let cache = SearchCache::new(store, chrono::Duration::hours(1));

    assert!(cache.get("test").unwrap().is_none());

    let matches = sample_matches();
    cache.put("test", &matches).unwrap();

    assert_eq!(cache.get("test").unwrap(), Some(matches));
}

#[test]
fn test_empty_result_is_cached() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path().join("codex.db")).unwrap();
    let cache = SearchCache::new(store, chrono::Duration::hours(1));

    cache.put("zzz", &[]).unwrap();
    assert_eq!(cache.get("zzz").unwrap(), Some(vec![]));
}

#[test]
fn test_keys_are_exact_strings() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path().join("codex.db")).unwrap();
    let cache = SearchCache::new(store, chrono::Duration::hours(1));

    cache.put("test", &sample_matches()).unwrap();
    assert!(cache.get("Test").unwrap().is_none());
}

#[test]
fn test_stale_entry_is_a_miss_but_kept() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path().join("codex.db")).unwrap();
    let cache = SearchCache::new(store, chrono::Duration::milliseconds(50));

    cache.put("test", &sample_matches()).unwrap();
    thread::sleep(Duration::from_millis(100));

    assert!(cache.get("test").unwrap().is_none());
    assert!(cache.entry("test").unwrap().is_some());
}

#[test]
fn test_put_resets_created_at() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path().join("codex.db")).unwrap();
    let cache = SearchCache::new(store, chrono::Duration::hours(1));

    let first = cache.put("test", &[]).unwrap();
    thread::sleep(Duration::from_millis(10));
    cache.put("test", &sample_matches()).unwrap();

    let entry = cache.entry("test").unwrap().unwrap();
    assert!(entry.created_at > first.created_at);
    assert_eq!(entry.matches.len(), 1);
}
