use codex_core::{ToolManifest, ToolStatus};
use codex_store::{Store, StoreError, ToolRegistry};
use tempfile::TempDir;

const TWO_TOOLS: &str = r#"
tools:
  - name: Test Tool
    description: Returns sample data
    server: tools/test_tool.py
    methods: [get_test_data]
    schemas:
      get_test_data: { type: object }
  - name: Archived Tool
    description: No longer served
    server: tools/archived.py
    methods: [run]
    enabled: false
"#;

fn registry(temp: &TempDir) -> ToolRegistry {
    let store = Store::open(temp.path().join("codex.db")).unwrap();
    ToolRegistry::new(store)
}

#[test]
fn test_load_and_lookup() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let loaded = registry.load(&ToolManifest::parse(TWO_TOOLS).unwrap()).unwrap();
    assert_eq!(loaded, 2);

    let tool = registry.lookup("test_tool").unwrap();
    assert_eq!(tool.name, "Test Tool");
    assert_eq!(tool.executable_path, "tools/test_tool.py");
    assert!(tool.supports("get_test_data"));
    assert!(tool.argument_schemas.contains_key("get_test_data"));
}

#[test]
fn test_lookup_inactive_is_not_found() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);
    registry.load(&ToolManifest::parse(TWO_TOOLS).unwrap()).unwrap();

    assert!(matches!(registry.lookup("archived_tool"), Err(StoreError::NotFound(id)) if id == "archived_tool"));
    assert!(matches!(registry.lookup("ghost"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_list_active_excludes_inactive() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);
    registry.load(&ToolManifest::parse(TWO_TOOLS).unwrap()).unwrap();

    let active = registry.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "test_tool");

    let all = registry.list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].status, ToolStatus::Inactive);
}

#[test]
fn test_reload_replaces_wholesale() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);
    registry.load(&ToolManifest::parse(TWO_TOOLS).unwrap()).unwrap();

    let replacement = "tools:\n  - {name: Weather, server: weather.js, methods: [forecast]}\n";
    registry.reload(&ToolManifest::parse(replacement).unwrap()).unwrap();

    assert_eq!(registry.count().unwrap(), 1);
    assert!(registry.lookup("weather").is_ok());
    assert!(matches!(registry.lookup("test_tool"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_reload_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);
    let manifest = ToolManifest::parse(TWO_TOOLS).unwrap();

    registry.reload(&manifest).unwrap();
    let first = registry.list_all().unwrap();
    registry.reload(&manifest).unwrap();
    let second = registry.list_all().unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_registry_order_follows_manifest() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);
    let doc = "tools:\n  - {name: Zeta, server: z.py}\n  - {name: Alpha, server: a.py}\n  - {name: Mid, server: m.py}\n";
    registry.load(&ToolManifest::parse(doc).unwrap()).unwrap();

    let ids: Vec<String> = registry.list_active().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_registry_survives_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let registry = registry(&temp);
        registry.load(&ToolManifest::parse(TWO_TOOLS).unwrap()).unwrap();
    }

    let reopened = registry(&temp);
    assert_eq!(reopened.count().unwrap(), 2);
    assert!(reopened.lookup("test_tool").is_ok());
}
