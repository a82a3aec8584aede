//! Config file discovery and the read/write location rules.
//!
//! # Discovery
//!
//! Each [`SearchPath`] resolves to one directory. Directories are checked in
//! order for `{dir}/{file_name}` and the first existing file wins. Missing
//! files are skipped; only real I/O errors (permissions, etc.) propagate.
//!
//! # Explicit locations
//!
//! `--read-config` and `--write-config` accept a file or a directory. An empty
//! value means the working directory, and a directory gets the configured
//! file name appended. For writes, a location that does not exist yet is
//! treated as a directory to create only when it ends in a path separator;
//! otherwise it is created as a file.

use std::fs;
use std::io::ErrorKind;
use std::path::{MAIN_SEPARATOR, PathBuf};

use crate::error::FlagfigError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath) -> Option<PathBuf> {
    match sp {
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Platform(app_name) => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
    }
}

/// Resolve all search paths, dropping those that cannot be resolved.
pub fn expand_search_paths(search_paths: &[SearchPath]) -> Vec<PathBuf> {
    search_paths.iter().filter_map(resolve_search_path).collect()
}

/// Find the first `{dir}/{file_name}` that exists as a file.
///
/// Returns `Ok(None)` when no directory holds the file.
pub fn find_config_file(dirs: &[PathBuf], file_name: &str) -> Result<Option<PathBuf>, FlagfigError> {
    for dir in dirs {
        let file_path = dir.join(file_name);
        match fs::metadata(&file_path) {
            Ok(meta) if meta.is_file() => return Ok(Some(file_path)),
            Ok(_) => continue,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(FlagfigError::io("stat", file_path, e)),
        }
    }
    Ok(None)
}

fn location_or_cwd(location: &str) -> PathBuf {
    if location.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(location)
    }
}

/// Resolve the `--read-config` value to the file to read.
///
/// Fails with [`FlagfigError::NoConfigAt`] when nothing exists at the location.
pub fn resolve_read_location(location: &str, file_name: &str) -> Result<PathBuf, FlagfigError> {
    let path = location_or_cwd(location);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(path.join(file_name)),
        Ok(_) => Ok(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(FlagfigError::NoConfigAt { path }),
        Err(e) => Err(FlagfigError::io("stat", path, e)),
    }
}

/// Resolve the `--write-config` value to the file to write, creating the
/// directory tree or an empty file when the location does not exist yet.
pub fn prepare_write_location(location: &str, file_name: &str) -> Result<PathBuf, FlagfigError> {
    let path = location_or_cwd(location);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(path.join(file_name)),
        Ok(_) => Ok(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if looks_like_dir(location) {
                fs::create_dir_all(&path)
                    .map_err(|e| FlagfigError::io("create directory", &path, e))?;
                Ok(path.join(file_name))
            } else {
                fs::File::create(&path).map_err(|e| FlagfigError::io("create", &path, e))?;
                Ok(path)
            }
        }
        Err(e) => Err(FlagfigError::io("stat", path, e)),
    }
}

fn looks_like_dir(location: &str) -> bool {
    location.ends_with('/') || location.ends_with(MAIN_SEPARATOR)
}
