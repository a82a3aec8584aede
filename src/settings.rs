//! Parser options and the settings they produce.

use std::fmt;
use std::path::PathBuf;

use crate::env::EnvMapper;
use crate::error::FlagfigError;
use crate::format::ConfigFormat;
use crate::types::SearchPath;

/// A setting applied to the parser before resolution. Options are applied in
/// order; a later option touching the same setting wins.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserOption {
    /// Base name of the config file (default `config`).
    ConfigName(String),
    /// Extension and format of the config file (default `yml`).
    ConfigType(String),
    /// Add a directory to the search path list.
    ConfigPath(SearchPath),
    /// Read this exact file, ignoring the search paths. Its extension picks
    /// the format unless a [`ConfigType`](Self::ConfigType) is given.
    ConfigFile(PathBuf),
    /// Prefix for environment variables, e.g. `APP` → `APP_SERVER_PORT`.
    EnvPrefix(String),
    /// Separator replacing `.` in env var names (default `_`).
    EnvKeyReplacer(String),
    /// Register `--read-config[=PATH]`.
    ReadFlag(bool),
    /// Register `--write-config[=PATH]`.
    WriteFlag(bool),
    /// Skip informational and warning log events.
    SuppressLogs(bool),
}

/// Base name plus extension of the config file, kept as separate parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileName {
    name: String,
    extension: String,
    format: ConfigFormat,
}

impl ConfigFileName {
    pub fn new(name: &str, extension: &str) -> Result<Self, FlagfigError> {
        if name.is_empty() {
            return Err(FlagfigError::EmptyConfigName);
        }
        let format = ConfigFormat::from_extension(extension)?;
        Ok(Self {
            name: name.to_string(),
            extension: extension.to_string(),
            format,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }
}

impl fmt::Display for ConfigFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.extension)
    }
}

/// Everything the parser options control, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub file_name: ConfigFileName,
    /// True when the format was set with [`ParserOption::ConfigType`].
    pub explicit_type: bool,
    pub search_paths: Vec<SearchPath>,
    pub config_file: Option<PathBuf>,
    pub env: EnvMapper,
    pub read_flag: bool,
    pub write_flag: bool,
    pub quiet: bool,
}

impl Settings {
    /// Start from the defaults and apply `options` in order.
    pub fn from_options(
        options: impl IntoIterator<Item = ParserOption>,
    ) -> Result<Self, FlagfigError> {
        let mut name = "config".to_string();
        let mut extension = "yml".to_string();
        let mut explicit_type = false;
        let mut search_paths = Vec::new();
        let mut config_file = None;
        let mut env = EnvMapper::default();
        let mut read_flag = false;
        let mut write_flag = false;
        let mut quiet = false;

        for option in options {
            match option {
                ParserOption::ConfigName(n) => name = n,
                ParserOption::ConfigType(t) => {
                    extension = t;
                    explicit_type = true;
                }
                ParserOption::ConfigPath(p) => search_paths.push(p),
                ParserOption::ConfigFile(f) => config_file = Some(f),
                ParserOption::EnvPrefix(p) => env.prefix = Some(p),
                ParserOption::EnvKeyReplacer(s) => env.separator = s,
                ParserOption::ReadFlag(on) => read_flag = on,
                ParserOption::WriteFlag(on) => write_flag = on,
                ParserOption::SuppressLogs(on) => quiet = on,
            }
        }

        if search_paths.is_empty() {
            search_paths.push(SearchPath::Cwd);
        }

        Ok(Self {
            file_name: ConfigFileName::new(&name, &extension)?,
            explicit_type,
            search_paths,
            config_file,
            env,
            read_flag,
            write_flag,
            quiet,
        })
    }

    /// Format to use for `path`: the configured type if one was set
    /// explicitly, else the path's extension, else the default type.
    pub fn format_for(&self, path: &std::path::Path) -> ConfigFormat {
        if self.explicit_type {
            return self.file_name.format();
        }
        ConfigFormat::from_path(path).unwrap_or_else(|| self.file_name.format())
    }
}
