use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::FlagfigError;
use crate::option::ConfigOption;
use crate::resolve::{self, Resolution, ResolveInput};
use crate::settings::{ParserOption, Settings};
use crate::types::SearchPath;

/// Entry point for building a flagfig resolution.
pub struct Flagfig;

impl Flagfig {
    pub fn builder() -> FlagfigBuilder {
        FlagfigBuilder::new()
    }
}

/// Builder for one resolution.
///
/// Each setter records a [`ParserOption`]; options apply in call order, so a
/// later call touching the same setting wins. Argv and the environment are
/// read from the process unless injected with [`args`](Self::args) and
/// [`env_vars`](Self::env_vars).
#[derive(Debug, Default)]
pub struct FlagfigBuilder {
    parser_options: Vec<ParserOption>,
    args: Option<Vec<OsString>>,
    env_vars: Option<HashMap<String, String>>,
}

impl FlagfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, option: ParserOption) -> Self {
        self.parser_options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = ParserOption>) -> Self {
        self.parser_options.extend(options);
        self
    }

    /// Base name of the config file (default `config`).
    pub fn config_name(self, name: &str) -> Self {
        self.option(ParserOption::ConfigName(name.to_string()))
    }

    /// Extension and format of the config file: `yml` (default), `yaml`,
    /// `toml` or `json`.
    pub fn config_type(self, extension: &str) -> Self {
        self.option(ParserOption::ConfigType(extension.to_string()))
    }

    /// Add a directory to search. Directories are tried in the order added.
    pub fn config_path(self, path: impl Into<SearchPath>) -> Self {
        self.option(ParserOption::ConfigPath(path.into()))
    }

    /// Read exactly this file instead of searching.
    pub fn config_file(self, path: impl Into<PathBuf>) -> Self {
        self.option(ParserOption::ConfigFile(path.into()))
    }

    pub fn env_prefix(self, prefix: &str) -> Self {
        self.option(ParserOption::EnvPrefix(prefix.to_string()))
    }

    /// Separator that replaces `.` in env var names (default `_`).
    pub fn env_key_replacer(self, separator: &str) -> Self {
        self.option(ParserOption::EnvKeyReplacer(separator.to_string()))
    }

    /// Register `--read-config[=PATH]`.
    pub fn read_flag(self, enabled: bool) -> Self {
        self.option(ParserOption::ReadFlag(enabled))
    }

    /// Register `--write-config[=PATH]`.
    pub fn write_flag(self, enabled: bool) -> Self {
        self.option(ParserOption::WriteFlag(enabled))
    }

    pub fn suppress_logs(self, quiet: bool) -> Self {
        self.option(ParserOption::SuppressLogs(quiet))
    }

    /// Parse these arguments instead of the process's. The first item is the
    /// program name.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Look keys up in these variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    fn build_input(self) -> Result<ResolveInput, FlagfigError> {
        let settings = Settings::from_options(self.parser_options)?;
        let args = self
            .args
            .unwrap_or_else(|| std::env::args_os().collect());
        let env_vars = self.env_vars.unwrap_or_else(process_env);
        Ok(ResolveInput {
            settings,
            args,
            env_vars,
        })
    }

    /// Resolve every layer and write the result into `target`. Fields that no
    /// layer sets keep their current value.
    pub fn resolve<T>(self, target: &mut T, options: &[ConfigOption]) -> Result<Resolution, FlagfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        let input = self.build_input()?;
        resolve::resolve(input, options, target)
    }

    /// Resolve into a fresh `T::default()`.
    pub fn load<T>(self, options: &[ConfigOption]) -> Result<T, FlagfigError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut target = T::default();
        self.resolve(&mut target, options)?;
        Ok(target)
    }
}

/// The process environment, skipping variables that are not valid UTF-8.
fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{ServerConfig, TimeoutConfig, server_options};
    use crate::option::OptionValue;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn builder_in(dir: &TempDir) -> FlagfigBuilder {
        Flagfig::builder()
            .config_path(dir.path())
            .suppress_logs(true)
            .env_vars(Vec::<(String, String)>::new())
    }

    #[test]
    fn setters_record_options_in_order() {
        let b = Flagfig::builder()
            .config_name("app")
            .config_type("toml")
            .env_prefix("APP")
            .read_flag(true)
            .config_name("other");
        assert_eq!(
            b.parser_options,
            vec![
                ParserOption::ConfigName("app".into()),
                ParserOption::ConfigType("toml".into()),
                ParserOption::EnvPrefix("APP".into()),
                ParserOption::ReadFlag(true),
                ParserOption::ConfigName("other".into()),
            ]
        );
    }

    #[test]
    fn server_port_scenario() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yml"), "server:\n  port: 7000\n").unwrap();

        let config: ServerConfig = builder_in(&dir)
            .args(["app", "--port=9090"])
            .load(&server_options())
            .unwrap();
        assert_eq!(config.server.port, 9090);

        let config: ServerConfig = builder_in(&dir)
            .args(["app"])
            .load(&server_options())
            .unwrap();
        assert_eq!(config.server.port, 7000);

        let empty = TempDir::new().unwrap();
        let config: ServerConfig = builder_in(&empty)
            .args(["app"])
            .load(&server_options())
            .unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn invalid_config_type_fails_before_parsing() {
        let err = Flagfig::builder()
            .config_type("ini")
            .args(["app", "--no-such-flag"])
            .env_vars(Vec::<(String, String)>::new())
            .load::<ServerConfig>(&server_options())
            .unwrap_err();
        assert!(matches!(err, FlagfigError::UnsupportedConfigType(_)));
    }

    #[test]
    fn json_config_type() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("svc.json"),
            r#"{"server": {"host": "jsonhost"}, "debug": true}"#,
        )
        .unwrap();
        let config: ServerConfig = builder_in(&dir)
            .config_name("svc")
            .config_type("json")
            .args(["app"])
            .load(&server_options())
            .unwrap();
        assert_eq!(config.server.host, "jsonhost");
        assert!(config.debug);
    }

    #[test]
    fn config_file_bypasses_search() {
        let search = TempDir::new().unwrap();
        fs::write(search.path().join("config.yml"), "server:\n  port: 1\n").unwrap();
        let other = TempDir::new().unwrap();
        let explicit = other.path().join("prod.toml");
        fs::write(&explicit, "[server]\nport = 2\n").unwrap();

        let mut config = ServerConfig::default();
        let res = builder_in(&search)
            .config_file(&explicit)
            .args(["app"])
            .resolve(&mut config, &server_options())
            .unwrap();
        assert_eq!(config.server.port, 2);
        assert_eq!(res.config_file, Some(explicit));
    }

    #[test]
    fn help_returned_as_cli_error() {
        let dir = TempDir::new().unwrap();
        let err = builder_in(&dir)
            .read_flag(true)
            .write_flag(true)
            .args(["app", "--help"])
            .load::<ServerConfig>(&server_options())
            .unwrap_err();
        match err {
            FlagfigError::Cli(e) => {
                let help = e.to_string();
                assert!(help.contains("port to listen on"));
                assert!(help.contains("(default 8080)"));
                assert!(help.contains("--write-config"));
            }
            other => panic!("expected Cli, got {other:?}"),
        }
    }

    #[test]
    fn case_insensitive_keys_across_layers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yml"), "Server:\n  HOST: upper\n").unwrap();
        let options = vec![ConfigOption::int(1).flag("port").key("SERVER.Port")];
        let config: ServerConfig = builder_in(&dir)
            .args(["app", "--port", "5"])
            .load(&options)
            .unwrap();
        assert_eq!(config.server.host, "upper");
        assert_eq!(config.server.port, 5);
    }

    #[test]
    fn duration_from_flag_and_env() {
        let dir = TempDir::new().unwrap();
        let options = vec![
            ConfigOption::duration(Duration::from_secs(2))
                .flag("timeout")
                .key("timeout"),
        ];
        let config: TimeoutConfig = builder_in(&dir)
            .args(["app", "--timeout=1h"])
            .load(&options)
            .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3600));

        let config: TimeoutConfig = builder_in(&dir)
            .env_vars([("TIMEOUT", "45s")])
            .args(["app"])
            .load(&options)
            .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    fn type_mismatch_in_file_is_unmarshal_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yml"), "debug: sometimes\n").unwrap();
        let err = builder_in(&dir)
            .args(["app"])
            .load::<ServerConfig>(&[])
            .unwrap_err();
        assert!(matches!(err, FlagfigError::Unmarshal(_)));
    }

    #[test]
    fn resolution_exposes_flags() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        let res = builder_in(&dir)
            .args(["app", "-p", "81"])
            .resolve(&mut config, &server_options())
            .unwrap();
        assert!(res.flags.changed("port"));
        assert!(!res.flags.changed("host"));
        assert_eq!(res.flags.get("port"), Some(&OptionValue::Int(81)));
        assert_eq!(
            res.flags.get("host"),
            Some(&OptionValue::String("localhost".into()))
        );
    }
}
