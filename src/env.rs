use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::FlagfigError;
use crate::merge::set_nested;
use crate::option::ValueKind;

/// Maps dotted config keys to environment variable names.
///
/// `server.port` with prefix `APP` and separator `_` becomes `APP_SERVER_PORT`.
/// Without a prefix it is `SERVER_PORT`. Names are uppercased.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvMapper {
    pub prefix: Option<String>,
    pub separator: String,
}

impl Default for EnvMapper {
    fn default() -> Self {
        Self {
            prefix: None,
            separator: "_".into(),
        }
    }
}

impl EnvMapper {
    pub fn var_name(&self, key: &str) -> String {
        let body = key.replace('.', &self.separator);
        let name = match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}{}{body}", self.separator),
            _ => body,
        };
        name.to_uppercase()
    }

    /// Build the env layer for `keys`: every key whose variable is present in
    /// `vars` gets the parsed value. `kinds` holds the declared kind of keys
    /// that came from an option; other keys are parsed heuristically.
    pub fn layer<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
        kinds: &HashMap<String, ValueKind>,
        vars: &HashMap<String, String>,
    ) -> Result<Map<String, Value>, FlagfigError> {
        let mut table = Map::new();
        for key in keys {
            let var = self.var_name(key);
            let Some(raw) = vars.get(&var) else {
                continue;
            };
            let value = match kinds.get(key) {
                Some(kind) => kind
                    .parse(raw)
                    .map(|v| v.to_tree())
                    .map_err(|reason| FlagfigError::InvalidEnvValue {
                        key: key.to_string(),
                        var: var.clone(),
                        reason,
                    })?,
                None => parse_env_value(raw),
            };
            set_nested(&mut table, key, value);
        }
        Ok(table)
    }
}

/// Parse an env var value for a key with no declared kind.
/// Tries: bool → integer → float → string.
fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::from(i);
    }
    // Only use float if the string actually contains a dot,
    // to avoid "NaN" / "inf" being parsed as float.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(f)
    {
        return Value::Number(n);
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn mapper(prefix: Option<&str>, sep: &str) -> EnvMapper {
        EnvMapper {
            prefix: prefix.map(str::to_string),
            separator: sep.into(),
        }
    }

    #[test]
    fn var_name_without_prefix() {
        assert_eq!(EnvMapper::default().var_name("server.port"), "SERVER_PORT");
        assert_eq!(EnvMapper::default().var_name("debug"), "DEBUG");
    }

    #[test]
    fn var_name_with_prefix() {
        assert_eq!(mapper(Some("demo"), "_").var_name("parser.option"), "DEMO_PARSER_OPTION");
    }

    #[test]
    fn var_name_custom_separator() {
        assert_eq!(mapper(Some("APP"), "__").var_name("db.pool_size"), "APP__DB__POOL_SIZE");
        assert_eq!(mapper(None, "-").var_name("a.b"), "A-B");
    }

    #[test]
    fn empty_prefix_is_no_prefix() {
        assert_eq!(mapper(Some(""), "_").var_name("port"), "PORT");
    }

    #[test]
    fn layer_uses_declared_kind() {
        let kinds = HashMap::from([
            ("server.port".to_string(), ValueKind::Int),
            ("name".to_string(), ValueKind::String),
            ("timeout".to_string(), ValueKind::Duration),
        ]);
        let table = EnvMapper::default()
            .layer(
                ["server.port", "name", "timeout"],
                &kinds,
                &vars(&[("SERVER_PORT", "9090"), ("NAME", "123"), ("TIMEOUT", "1m")]),
            )
            .unwrap();
        assert_eq!(
            Value::Object(table),
            json!({"server": {"port": 9090}, "name": "123", "timeout": "1m0s"})
        );
    }

    #[test]
    fn layer_rejects_bad_value_for_kind() {
        let kinds = HashMap::from([("port".to_string(), ValueKind::Int)]);
        let err = EnvMapper::default()
            .layer(["port"], &kinds, &vars(&[("PORT", "eighty")]))
            .unwrap_err();
        match err {
            FlagfigError::InvalidEnvValue { key, var, .. } => {
                assert_eq!(key, "port");
                assert_eq!(var, "PORT");
            }
            other => panic!("expected InvalidEnvValue, got {other:?}"),
        }
    }

    #[test]
    fn layer_skips_unset_and_unrelated_vars() {
        let table = EnvMapper::default()
            .layer(["port"], &HashMap::new(), &vars(&[("OTHER", "x")]))
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn heuristic_parse_for_undeclared_keys() {
        let table = mapper(Some("APP"), "_")
            .layer(
                ["debug", "rate", "count", "label"],
                &HashMap::new(),
                &vars(&[
                    ("APP_DEBUG", "TRUE"),
                    ("APP_RATE", "1.5"),
                    ("APP_COUNT", "-3"),
                    ("APP_LABEL", "inf"),
                ]),
            )
            .unwrap();
        assert_eq!(table["debug"], true);
        assert_eq!(table["rate"], 1.5);
        assert_eq!(table["count"], -3);
        assert_eq!(table["label"], "inf");
    }
}
