//! Core resolution pipeline: parse flags, layer all sources and populate the
//! target.
//!
//! Operates on injected argv and environment (`ResolveInput`), so the whole
//! pipeline is testable without touching process globals. Steps:
//!
//! 1. Define option flags, then the enabled `--read-config` / `--write-config`
//! 2. Parse the command line once
//! 3. Register defaults and flag bindings per option key
//! 4. Read the config file: the `--read-config` location when given, else the
//!    explicit config file or the first hit in the search paths
//! 5. Write the merged view when `--write-config` is given
//! 6. Unmarshal into the target

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::FlagfigError;
use crate::file;
use crate::flags::{FlagSet, ParsedFlags, READ_FLAG, WRITE_FLAG};
use crate::option::ConfigOption;
use crate::settings::Settings;
use crate::store::Store;

/// Everything a resolution reads from the outside world.
pub struct ResolveInput {
    pub settings: Settings,
    /// Command line, program name first.
    pub args: Vec<OsString>,
    pub env_vars: HashMap<String, String>,
}

/// What a successful resolution did besides filling the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The config file that was read, if any.
    pub config_file: Option<PathBuf>,
    /// Where `--write-config` wrote the merged config, if it was given.
    pub written: Option<PathBuf>,
    /// Parsed flags, including flag-only options.
    pub flags: ParsedFlags,
}

pub fn resolve<T>(
    input: ResolveInput,
    options: &[ConfigOption],
    target: &mut T,
) -> Result<Resolution, FlagfigError>
where
    T: Serialize + DeserializeOwned,
{
    let ResolveInput {
        settings,
        args,
        env_vars,
    } = input;
    let quiet = settings.quiet;

    // 1-2: Flags
    let mut flag_set = FlagSet::new(program_name(&args));
    flag_set.define(options)?;
    if settings.read_flag {
        flag_set.define_read_flag();
    }
    if settings.write_flag {
        flag_set.define_write_flag();
    }
    let flags = flag_set.parse_from(args)?;

    // 3: Defaults and bindings
    let mut store = Store::new(&settings, env_vars);
    for opt in options {
        let Some(key) = opt.key.as_deref() else {
            continue;
        };
        store.set_default(key, &opt.value)?;
        if let Some(name) = opt.flag_name.as_deref() {
            store.bind_flag(key, &flags, name)?;
        }
    }

    // 4: Config file
    let file_name = settings.file_name.to_string();
    match flags.location(READ_FLAG) {
        Some(location) => {
            let path = file::resolve_read_location(location, &file_name)?;
            store.read_file(&path)?;
        }
        None => match store.read_in_config() {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                if !quiet {
                    let hint = if settings.write_flag {
                        " Use --write-config to create it."
                    } else {
                        ""
                    };
                    warn!(file = %file_name, "Config file not found.{hint}");
                }
            }
            Err(e) => return Err(e),
        },
    }
    let config_file = store.file_used().map(Path::to_path_buf);
    if !quiet && let Some(path) = &config_file {
        info!(path = %path.display(), "read config file");
    }

    // 5: Write
    let written = match flags.location(WRITE_FLAG) {
        Some(location) => {
            if !quiet {
                info!("writing configuration file");
            }
            let path = file::prepare_write_location(location, &file_name)?;
            store.write_file(&path)?;
            if !quiet {
                info!(path = %path.display(), "wrote config");
            }
            Some(path)
        }
        None => None,
    };

    // 6: Unmarshal
    store.unmarshal(target)?;

    Ok(Resolution {
        config_file,
        written,
        flags,
    })
}

fn program_name(args: &[OsString]) -> String {
    args.first()
        .and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}
