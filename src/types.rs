use std::path::PathBuf;

/// A directory to scan for the config file. Search paths are tried in the
/// order they were added; the first directory holding the file wins.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Current working directory. Used when no search path is configured.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp".into())`.
    Home(String),
    /// Platform config directory for the named app (XDG on Linux,
    /// ~/Library/Application Support on macOS).
    Platform(String),
}

impl From<PathBuf> for SearchPath {
    fn from(p: PathBuf) -> Self {
        SearchPath::Path(p)
    }
}

impl From<&std::path::Path> for SearchPath {
    fn from(p: &std::path::Path) -> Self {
        SearchPath::Path(p.to_path_buf())
    }
}

impl From<&str> for SearchPath {
    fn from(p: &str) -> Self {
        SearchPath::Path(PathBuf::from(p))
    }
}
