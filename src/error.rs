use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlagfigError {
    #[error("Cannot use reserved flag name: {0}")]
    ReservedFlagName(String),

    #[error("Defined shorthand '{0}' for flag with no name")]
    ShorthandWithoutName(char),

    #[error("Flag '{0}' is defined more than once")]
    DuplicateFlag(String),

    #[error("Shorthand '-{short}' of flag '{flag}' is already in use")]
    DuplicateShorthand { short: char, flag: String },

    #[error("Config file name must not be empty")]
    EmptyConfigName,

    #[error("Unsupported config type '{0}' (expected yml, yaml, toml or json)")]
    UnsupportedConfigType(String),

    #[error("Config key must not be empty")]
    EmptyKey,

    #[error("Could not bind key '{key}' to undefined flag '{flag}'")]
    FlagNotFound { key: String, flag: String },

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("no config file found at location {}", path.display())]
    NoConfigAt { path: PathBuf },

    #[error("Config file {file_name} not found in {}", display_paths(searched))]
    ConfigFileNotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("Failed to {op} {}: {source}", path.display())]
    IoError {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to serialize config for {}: {reason}", path.display())]
    SerializeError { path: PathBuf, reason: String },

    #[error("Invalid value for '{key}' from ${var}: {reason}")]
    InvalidEnvValue {
        key: String,
        var: String,
        reason: String,
    },

    #[error("Could not unmarshal config: {0}")]
    Unmarshal(String),

    #[error("Config target must serialize to a struct or map")]
    UnsupportedTarget,
}

impl FlagfigError {
    /// True for the one failure the search-path lookup treats as informational.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlagfigError::ConfigFileNotFound { .. })
    }

    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlagfigError::IoError {
            op,
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<no search paths>".into();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_config_at_names_path() {
        let err = FlagfigError::NoConfigAt {
            path: "/nonexistent".into(),
        };
        assert_eq!(err.to_string(), "no config file found at location /nonexistent");
    }

    #[test]
    fn not_found_lists_search_paths() {
        let err = FlagfigError::ConfigFileNotFound {
            file_name: "config.yml".into(),
            searched: vec!["/etc/app".into(), "/home/me".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("config.yml"));
        assert!(msg.contains("/etc/app, /home/me"));
        assert!(err.is_not_found());
    }

    #[test]
    fn io_error_carries_operation() {
        let err = FlagfigError::io(
            "create directory",
            "/tmp/x",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.to_string().starts_with("Failed to create directory /tmp/x"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn messages_start_capitalized() {
        let errors = [
            FlagfigError::ShorthandWithoutName('x'),
            FlagfigError::DuplicateFlag("port".into()),
            FlagfigError::DuplicateShorthand {
                short: 'p',
                flag: "port".into(),
            },
            FlagfigError::EmptyConfigName,
            FlagfigError::UnsupportedConfigType("ini".into()),
            FlagfigError::EmptyKey,
            FlagfigError::FlagNotFound {
                key: "server.port".into(),
                flag: "port".into(),
            },
            FlagfigError::ConfigFileNotFound {
                file_name: "config.yml".into(),
                searched: vec![],
            },
            FlagfigError::UnsupportedTarget,
        ];
        for err in errors {
            let msg = err.to_string();
            assert!(msg.starts_with(char::is_uppercase), "{msg}");
        }
    }

    #[test]
    fn reserved_flag_formats() {
        let err = FlagfigError::ReservedFlagName("read-config".into());
        assert!(err.to_string().contains("read-config"));
    }
}
