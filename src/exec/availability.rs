// src/exec/availability.rs

//! `PATH` lookup for executables, without running anything.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Whether an executable called `name` can be found.
///
/// - Names containing a path separator are checked as paths.
/// - Otherwise every `PATH` entry is searched (with `PATHEXT` extensions on
///   windows).
///
/// Never fails: a missing command, an empty name or an unset `PATH` are all
/// just `false`.
pub fn is_available(name: &str) -> bool {
    let found = find_executable(name).is_some();
    debug!(name, found, "availability check");
    found
}

/// Full path of the first matching executable, if any.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let as_path = Path::new(name);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        return candidates(as_path).into_iter().find(|p| is_executable(p));
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir.join(name)))
        .find(|p| is_executable(p))
}

#[cfg(windows)]
fn candidates(base: &Path) -> Vec<PathBuf> {
    use std::ffi::OsString;

    let exts = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    let mut out = vec![base.to_path_buf()];
    for ext in exts.split(';').filter(|e| !e.is_empty()) {
        let mut file: OsString = base.as_os_str().to_owned();
        file.push(ext);
        out.push(PathBuf::from(file));
    }
    out
}

#[cfg(not(windows))]
fn candidates(base: &Path) -> Vec<PathBuf> {
    vec![base.to_path_buf()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
