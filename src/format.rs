//! Config file formats, selected by the configured file extension.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::FlagfigError;

/// Supported on-disk formats. One format is active per resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Map a file extension (without the dot) to a format, case-insensitively.
    pub fn from_extension(ext: &str) -> Result<Self, FlagfigError> {
        match ext.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(FlagfigError::UnsupportedConfigType(ext.to_string())),
        }
    }

    /// Format implied by a path's extension, if any is recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext).ok()
    }

    /// Parse file content into a tree. An empty document is an empty tree.
    /// `path` is only used to label errors.
    pub fn parse(self, content: &str, path: &Path) -> Result<Map<String, Value>, FlagfigError> {
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let fail = |reason: String| FlagfigError::ParseError {
            path: path.to_path_buf(),
            reason,
        };
        let value: Value = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| fail(e.to_string()))?,
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| fail(e.to_string()))?,
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| fail(e.to_string()))?,
        };
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(fail(format!(
                "expected a mapping at the top level, found {}",
                kind_name(&other)
            ))),
        }
    }

    /// Serialize a tree. `path` is only used to label errors.
    pub fn render(self, tree: &Map<String, Value>, path: &Path) -> Result<String, FlagfigError> {
        let fail = |reason: String| FlagfigError::SerializeError {
            path: path.to_path_buf(),
            reason,
        };
        match self {
            ConfigFormat::Yaml => serde_yaml::to_string(tree).map_err(|e| fail(e.to_string())),
            ConfigFormat::Toml => toml::to_string(tree).map_err(|e| fail(e.to_string())),
            ConfigFormat::Json => serde_json::to_string_pretty(tree)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| fail(e.to_string())),
        }
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p() -> &'static Path {
        Path::new("test.cfg")
    }

    #[test]
    fn extensions_map_to_formats() {
        assert_eq!(ConfigFormat::from_extension("yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_extension("YAML").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_extension("toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_extension("json").unwrap(), ConfigFormat::Json);
        assert!(matches!(
            ConfigFormat::from_extension("ini"),
            Err(FlagfigError::UnsupportedConfigType(ext)) if ext == "ini"
        ));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("/etc/app/conf.toml")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("/etc/app/conf")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("conf.txt")), None);
    }

    #[test]
    fn parse_yaml() {
        let tree = ConfigFormat::Yaml
            .parse("server:\n  port: 7000\ndebug: true\n", p())
            .unwrap();
        assert_eq!(Value::Object(tree), json!({"server": {"port": 7000}, "debug": true}));
    }

    #[test]
    fn parse_toml() {
        let tree = ConfigFormat::Toml
            .parse("debug = true\n[server]\nport = 7000\n", p())
            .unwrap();
        assert_eq!(Value::Object(tree), json!({"server": {"port": 7000}, "debug": true}));
    }

    #[test]
    fn parse_json() {
        let tree = ConfigFormat::Json.parse(r#"{"server": {"port": 7000}}"#, p()).unwrap();
        assert_eq!(tree["server"]["port"], 7000);
    }

    #[test]
    fn empty_document_is_empty_tree() {
        assert!(ConfigFormat::Yaml.parse("", p()).unwrap().is_empty());
        assert!(ConfigFormat::Yaml.parse("# only a comment\n", p()).unwrap().is_empty());
        assert!(ConfigFormat::Toml.parse("  \n", p()).unwrap().is_empty());
    }

    #[test]
    fn malformed_content_names_path() {
        let err = ConfigFormat::Yaml
            .parse("server: [unclosed\n", Path::new("/srv/app.yml"))
            .unwrap_err();
        assert!(matches!(err, FlagfigError::ParseError { .. }));
        assert!(err.to_string().contains("/srv/app.yml"));
    }

    #[test]
    fn scalar_document_rejected() {
        let err = ConfigFormat::Yaml.parse("just a string\n", p()).unwrap_err();
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn rendered_yaml_parses_back() {
        let tree = match json!({"server": {"port": 7000, "host": "h"}, "timeout": "2s"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        for format in [ConfigFormat::Yaml, ConfigFormat::Toml, ConfigFormat::Json] {
            let text = format.render(&tree, p()).unwrap();
            assert_eq!(format.parse(&text, p()).unwrap(), tree, "{format:?}");
        }
    }

    #[test]
    fn toml_cannot_hold_null() {
        let tree = match json!({"missing": null}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let err = ConfigFormat::Toml.render(&tree, p()).unwrap_err();
        assert!(matches!(err, FlagfigError::SerializeError { .. }));
    }
}
