use codex_app::logging::{self, LOG_FILE};
use tempfile::TempDir;
use tracing::warn;

#[test]
fn test_dropping_guard_flushes_log_file() {
    let temp = TempDir::new().unwrap();
    let guard = logging::init(temp.path()).unwrap();

    warn!("ghost_tool.get_test_data failed after 0.010s");
    drop(guard);

    let contents = std::fs::read_to_string(temp.path().join(LOG_FILE)).unwrap();
    assert!(contents.contains("ghost_tool.get_test_data failed after"));
}
