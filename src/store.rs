//! The layered value store.
//!
//! Four tiers, lowest to highest priority:
//!
//! 1. **Defaults** set per option key
//! 2. **File**: the one config file read for this resolution
//! 3. **Environment**: looked up for every known key
//! 4. **Flags**: bound flags that were given on the command line
//!
//! Tiers are kept apart and merged on demand, so reading the file after the
//! defaults and bindings are in place does not change precedence.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::FlagfigError;
use crate::file;
use crate::flags::ParsedFlags;
use crate::format::ConfigFormat;
use crate::merge::{align_keys, deep_merge, get_nested, leaf_keys, lowercase_keys, set_nested};
use crate::option::{OptionValue, ValueKind};
use crate::settings::Settings;

#[derive(Debug)]
pub struct Store {
    settings: Settings,
    env_vars: HashMap<String, String>,
    defaults: Map<String, Value>,
    kinds: HashMap<String, ValueKind>,
    file: Map<String, Value>,
    bound: BTreeSet<String>,
    overrides: BTreeMap<String, Value>,
    file_used: Option<PathBuf>,
}

impl Store {
    /// An empty store. `env_vars` is the environment to look keys up in.
    pub fn new(settings: &Settings, env_vars: HashMap<String, String>) -> Self {
        Self {
            settings: settings.clone(),
            env_vars,
            defaults: Map::new(),
            kinds: HashMap::new(),
            file: Map::new(),
            bound: BTreeSet::new(),
            overrides: BTreeMap::new(),
            file_used: None,
        }
    }

    /// Set the default for `key`. The value's kind also decides how an
    /// environment variable for this key is parsed.
    pub fn set_default(&mut self, key: &str, value: &OptionValue) -> Result<(), FlagfigError> {
        let key = normalize_key(key)?;
        set_nested(&mut self.defaults, &key, value.to_tree());
        self.kinds.insert(key, value.kind());
        Ok(())
    }

    /// Bind `key` to the flag `flag_name`. When the flag was given on the
    /// command line its value overrides every other tier.
    pub fn bind_flag(
        &mut self,
        key: &str,
        flags: &ParsedFlags,
        flag_name: &str,
    ) -> Result<(), FlagfigError> {
        let key = normalize_key(key)?;
        let flag = flags
            .lookup(flag_name)
            .ok_or_else(|| FlagfigError::FlagNotFound {
                key: key.clone(),
                flag: flag_name.to_string(),
            })?;
        self.kinds.entry(key.clone()).or_insert(flag.value.kind());
        if flag.changed {
            self.overrides.insert(key.clone(), flag.value.to_tree());
        }
        self.bound.insert(key);
        Ok(())
    }

    /// Replace the file tier with the content of `reader`, parsed in the
    /// configured format. `path` labels errors.
    pub fn read_config(&mut self, reader: impl Read, path: &Path) -> Result<(), FlagfigError> {
        let format = self.settings.file_name.format();
        self.read_config_as(reader, path, format)
    }

    fn read_config_as(
        &mut self,
        mut reader: impl Read,
        path: &Path,
        format: ConfigFormat,
    ) -> Result<(), FlagfigError> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| FlagfigError::io("read", path, e))?;
        self.file = lowercase_keys(format.parse(&content, path)?);
        Ok(())
    }

    /// Open and read the config file at `path` in the configured format.
    pub fn read_file(&mut self, path: &Path) -> Result<(), FlagfigError> {
        let format = self.settings.file_name.format();
        self.read_file_as(path, format)
    }

    fn read_file_as(&mut self, path: &Path, format: ConfigFormat) -> Result<(), FlagfigError> {
        let handle = fs::File::open(path).map_err(|e| FlagfigError::io("open", path, e))?;
        self.read_config_as(handle, path, format)?;
        self.file_used = Some(path.to_path_buf());
        Ok(())
    }

    /// Read the config file the settings point at: the explicit config file
    /// if one is set, else the first `<name>.<ext>` found in the search paths.
    ///
    /// A search that finds nothing is [`FlagfigError::ConfigFileNotFound`];
    /// a missing explicit file is an I/O error.
    pub fn read_in_config(&mut self) -> Result<PathBuf, FlagfigError> {
        if let Some(path) = self.settings.config_file.clone() {
            let format = self.settings.format_for(&path);
            self.read_file_as(&path, format)?;
            return Ok(path);
        }

        let file_name = self.settings.file_name.to_string();
        let dirs = file::expand_search_paths(&self.settings.search_paths);
        match file::find_config_file(&dirs, &file_name)? {
            Some(path) => {
                self.read_file(&path)?;
                Ok(path)
            }
            None => Err(FlagfigError::ConfigFileNotFound {
                file_name,
                searched: dirs,
            }),
        }
    }

    /// The file read by the last successful read, if any.
    pub fn file_used(&self) -> Option<&Path> {
        self.file_used.as_deref()
    }

    /// Every key the store knows of: defaults, file keys and bound flags.
    fn known_keys(&self) -> BTreeSet<String> {
        let mut keys: BTreeSet<String> = leaf_keys(&self.defaults).into_iter().collect();
        keys.extend(leaf_keys(&self.file));
        keys.extend(self.bound.iter().cloned());
        keys
    }

    /// The merged view of all tiers.
    pub fn all_settings(&self) -> Result<Map<String, Value>, FlagfigError> {
        let mut merged = deep_merge(self.defaults.clone(), self.file.clone());

        let keys = self.known_keys();
        let env = self.settings.env.layer(
            keys.iter().map(String::as_str),
            &self.kinds,
            &self.env_vars,
        )?;
        merged = deep_merge(merged, env);

        for (key, value) in &self.overrides {
            set_nested(&mut merged, key, value.clone());
        }
        Ok(merged)
    }

    /// The resolved value of one dotted key.
    pub fn get(&self, key: &str) -> Result<Option<Value>, FlagfigError> {
        let key = normalize_key(key)?;
        Ok(get_nested(&self.all_settings()?, &key).cloned())
    }

    /// Write the merged view to `path` in the configured format, replacing
    /// whatever is there.
    pub fn write_file(&self, path: &Path) -> Result<(), FlagfigError> {
        let tree = self.all_settings()?;
        let content = self.settings.file_name.format().render(&tree, path)?;
        fs::write(path, content).map_err(|e| FlagfigError::io("write", path, e))
    }

    /// Populate `target` from the merged view.
    ///
    /// The target's current values form the base, so fields no tier resolves
    /// keep what they had. Keys match field names ignoring case.
    pub fn unmarshal<T>(&self, target: &mut T) -> Result<(), FlagfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        let shape = match serde_json::to_value(&*target) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(FlagfigError::UnsupportedTarget),
            Err(e) => return Err(FlagfigError::Unmarshal(e.to_string())),
        };
        let resolved = align_keys(self.all_settings()?, &shape);
        let merged = deep_merge(shape, resolved);
        *target = serde_json::from_value(Value::Object(merged))
            .map_err(|e| FlagfigError::Unmarshal(e.to_string()))?;
        Ok(())
    }
}

fn normalize_key(key: &str) -> Result<String, FlagfigError> {
    if key.is_empty() {
        return Err(FlagfigError::EmptyKey);
    }
    Ok(key.to_lowercase())
}
