use codex_core::{GatewayError, RuntimeSpec};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Extension-keyed allow-list of worker runtimes.
#[derive(Debug, Clone)]
pub struct RuntimeAllowList {
    runtimes: BTreeMap<String, RuntimeSpec>,
}

impl RuntimeAllowList {
    pub fn new(runtimes: BTreeMap<String, RuntimeSpec>) -> Self {
        let runtimes = runtimes
            .into_iter()
            .map(|(ext, spec)| (ext.to_lowercase(), spec))
            .collect();
        Self { runtimes }
    }

    pub fn resolve(&self, worker: &Path) -> Result<&RuntimeSpec, GatewayError> {
        let extension = worker
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.runtimes
            .get(&extension)
            .ok_or_else(|| GatewayError::UnsupportedWorkerType(extension.clone()))
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.runtimes.keys().map(String::as_str)
    }
}

/// Check that the runtime can be launched at all.
pub async fn probe(runtime: &RuntimeSpec) -> Result<(), GatewayError> {
    let status = Command::new(&runtime.program)
        .args(&runtime.probe_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| {
            debug!("Probe of {} failed: {}", runtime.program, e);
            GatewayError::RuntimeUnavailable(runtime.program.clone())
        })?;

    if status.success() {
        Ok(())
    } else {
        debug!("Probe of {} exited with {}", runtime.program, status);
        Err(GatewayError::RuntimeUnavailable(runtime.program.clone()))
    }
}

/// Resolve the worker file against `working_dir`, confirm it exists and
/// try to mark it executable.
pub fn prepare_worker_file(executable_path: &str, working_dir: &Path) -> Result<PathBuf, GatewayError> {
    let path = Path::new(executable_path);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };

    if !path.is_file() {
        return Err(GatewayError::WorkerNotFound(executable_path.to_string()));
    }

    ensure_executable(&path);

    Ok(path.canonicalize().unwrap_or(path))
}

#[cfg(unix)]
fn ensure_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = match std::fs::metadata(path) {
        Ok(meta) => meta.permissions(),
        Err(e) => {
            warn!("Could not stat {}: {}", path.display(), e);
            return;
        }
    };

    if perms.mode() & 0o111 == 0o111 {
        return;
    }

    perms.set_mode(perms.mode() | 0o111);
    if let Err(e) = std::fs::set_permissions(path, perms) {
        warn!("Could not set executable permission on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use codex_core::config::default_runtimes;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_by_extension() {
        let allow = RuntimeAllowList::new(default_runtimes());

        assert_eq!(allow.resolve(Path::new("tools/a.py")).unwrap().program, "python3");
        assert_eq!(allow.resolve(Path::new("tools/A.JSX")).unwrap().program, "node");
        assert_eq!(allow.resolve(Path::new("b.ts")).unwrap().program, "ts-node");
    }

    #[test]
    fn test_resolve_rejects_unknown_types() {
        let allow = RuntimeAllowList::new(default_runtimes());

        assert!(matches!(
            allow.resolve(Path::new("tool.rb")),
            Err(GatewayError::UnsupportedWorkerType(ext)) if ext == "rb"
        ));
        assert!(matches!(
            allow.resolve(Path::new("tool")),
            Err(GatewayError::UnsupportedWorkerType(_))
        ));
    }

    #[test]
    fn test_prepare_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            prepare_worker_file("missing.py", temp.path()),
            Err(GatewayError::WorkerNotFound(_))
        ));
    }

    #[test]
    fn test_prepare_resolves_relative_and_sets_exec_bit() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("tools")).unwrap();
        std::fs::write(temp.path().join("tools/worker.py"), "print('hi')\n").unwrap();

        let resolved = prepare_worker_file("tools/worker.py", temp.path()).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("tools/worker.py"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&resolved).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[tokio::test]
    async fn test_probe_missing_runtime() {
        let runtime = RuntimeSpec::new("definitely-not-a-runtime-binary");
        assert!(matches!(
            probe(&runtime).await,
            Err(GatewayError::RuntimeUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_failing_runtime() {
        let runtime = RuntimeSpec::new("sh").with_probe_args(&["-c", "exit 3"]);
        assert!(matches!(
            probe(&runtime).await,
            Err(GatewayError::RuntimeUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_working_runtime() {
        let runtime = RuntimeSpec::new("sh").with_probe_args(&["-c", "exit 0"]);
        assert!(probe(&runtime).await.is_ok());
    }
}
