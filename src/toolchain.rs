//! Toolchain resolution
//!
//! Locates compilers, interpreters and runtimes on the host. Lookup order is
//! the system PATH first, then a fixed list of conventional installation
//! directories. Resolution is read-only and never fails hard: a missing tool
//! is reported as `None` so callers can surface a "toolchain unavailable"
//! compile error distinct from an actual compilation failure.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conventional installation directories probed after the PATH lookup
const FALLBACK_DIRS: &[&str] = &["/usr/bin", "/bin", "/usr/local/bin", "/opt/bin"];

/// Resolve an executable name to an absolute path.
///
/// No caching: toolchains rarely move during a process lifetime and the
/// probe cost is a handful of stat calls.
pub fn resolve(name: &str) -> Option<PathBuf> {
    if let Ok(path) = which::which(name) {
        debug!(tool = name, path = %path.display(), "resolved toolchain via PATH");
        return Some(path);
    }

    for dir in FALLBACK_DIRS {
        let candidate = Path::new(dir).join(name);
        if is_executable_file(&candidate) {
            debug!(tool = name, path = %candidate.display(), "resolved toolchain via fallback dir");
            return Some(candidate);
        }
    }

    debug!(tool = name, "toolchain not found");
    None
}

/// Resolve the first available of several alternative names
/// (e.g. `python3` falling back to `python`).
pub fn resolve_any(names: &[&str]) -> Option<PathBuf> {
    names.iter().find_map(|name| resolve(name))
}

fn is_executable_file(path: &Path) -> bool {
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
