//! Flag registry: turns [`ConfigOption`]s into typed clap arguments and
//! reports which flags were given on the command line.
//!
//! Each resolution builds its own [`FlagSet`] and parses it once, so nothing
//! is registered globally and resolutions never see each other's flags.
//!
//! Flag types follow the option's [`ValueKind`]:
//!
//! | Kind | Accepted forms |
//! |------|----------------|
//! | `Bool` | `--debug`, `--debug=false`, `-d` |
//! | `String` | `--name x`, `--name=x` |
//! | `Int`, `Int32` | `--port 80`, `--offset=-5` |
//! | `Duration` | `--timeout 1m30s` |
//!
//! A flag given more than once takes its last value.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ffi::OsString;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::duration;
use crate::error::FlagfigError;
use crate::option::{ConfigOption, OptionValue, ValueKind};

/// Flag that names an explicit location to read the config from.
pub const READ_FLAG: &str = "read-config";
/// Flag that names a location to write the merged config to.
pub const WRITE_FLAG: &str = "write-config";

const HELP_FLAG: &str = "help";
const HELP_SHORT: char = 'h';

const READ_HELP: &str = "Read the config from this location instead of the search paths; \
fails if no config file is there. An empty value means the working directory. A directory \
location is searched for the configured file name and type.";

const WRITE_HELP: &str = "Write the merged config to this location, overwriting any existing \
file. An empty value means the working directory. A directory location gets the configured \
file name and type; a location ending in a path separator is created as a directory.";

fn is_reserved(name: &str) -> bool {
    matches!(name, READ_FLAG | WRITE_FLAG | HELP_FLAG)
}

/// Flags registered for one resolution, not yet parsed.
#[derive(Debug)]
pub struct FlagSet {
    name: String,
    args: Vec<Arg>,
    defaults: BTreeMap<String, OptionValue>,
    shorts: HashMap<char, String>,
    locations: Vec<&'static str>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            defaults: BTreeMap::new(),
            shorts: HashMap::new(),
            locations: Vec::new(),
        }
    }

    /// Register a flag for every option with a flag name.
    ///
    /// All options are checked before any flag is registered, so on error the
    /// set is left unchanged.
    pub fn define(&mut self, options: &[ConfigOption]) -> Result<(), FlagfigError> {
        let mut names = HashSet::new();
        let mut shorts = self.shorts.clone();

        for opt in options {
            let Some(name) = opt.flag_name.as_deref() else {
                if let Some(c) = opt.shorthand {
                    return Err(FlagfigError::ShorthandWithoutName(c));
                }
                continue;
            };
            if is_reserved(name) {
                return Err(FlagfigError::ReservedFlagName(name.to_string()));
            }
            if self.defaults.contains_key(name) || !names.insert(name) {
                return Err(FlagfigError::DuplicateFlag(name.to_string()));
            }
            if let Some(c) = opt.shorthand {
                if c == HELP_SHORT {
                    return Err(FlagfigError::ReservedFlagName(format!("-{c}")));
                }
                if shorts.insert(c, name.to_string()).is_some() {
                    return Err(FlagfigError::DuplicateShorthand {
                        short: c,
                        flag: name.to_string(),
                    });
                }
            }
        }

        for opt in options {
            if let Some(name) = &opt.flag_name {
                self.args.push(option_arg(name, opt));
                self.defaults.insert(name.clone(), opt.value.clone());
            }
        }
        self.shorts = shorts;
        Ok(())
    }

    /// Register `--read-config[=PATH]`.
    pub fn define_read_flag(&mut self) {
        self.define_location(READ_FLAG, READ_HELP);
    }

    /// Register `--write-config[=PATH]`.
    pub fn define_write_flag(&mut self) {
        self.define_location(WRITE_FLAG, WRITE_HELP);
    }

    fn define_location(&mut self, name: &'static str, help: &'static str) {
        if self.locations.contains(&name) {
            return;
        }
        // No shorthand, so the reserved flags never take a letter from the app.
        self.args.push(
            Arg::new(name)
                .long(name)
                .help(help)
                .value_name("PATH")
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("")
                .value_parser(value_parser!(String)),
        );
        self.locations.push(name);
    }

    /// Parse `args` (program name first). `--help` and malformed input come
    /// back as [`FlagfigError::Cli`]; call `.exit()` on the inner error to
    /// print it the usual clap way.
    pub fn parse_from<I, T>(self, args: I) -> Result<ParsedFlags, FlagfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let command = Command::new(self.name)
            .args_override_self(true)
            .args(self.args);
        let matches = command.try_get_matches_from(args)?;

        let mut flags = BTreeMap::new();
        for (name, default) in self.defaults {
            let changed = from_command_line(&matches, &name);
            let value = if changed {
                read_value(&matches, &name, default.kind()).unwrap_or(default)
            } else {
                default
            };
            flags.insert(name, ParsedFlag { value, changed });
        }

        let mut locations = BTreeMap::new();
        for name in self.locations {
            if from_command_line(&matches, name) {
                let value = matches.get_one::<String>(name).cloned().unwrap_or_default();
                locations.insert(name, value);
            }
        }

        Ok(ParsedFlags { flags, locations })
    }
}

fn option_arg(name: &str, opt: &ConfigOption) -> Arg {
    let mut arg = Arg::new(name.to_string())
        .long(name.to_string())
        .help(help_text(opt))
        .action(ArgAction::Set);
    if let Some(c) = opt.shorthand {
        arg = arg.short(c);
    }
    match opt.value.kind() {
        ValueKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(BoolishValueParser::new()),
        ValueKind::String => arg.value_parser(value_parser!(String)),
        ValueKind::Int => arg
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i64)),
        ValueKind::Int32 => arg
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i32)),
        ValueKind::Duration => arg.value_parser(duration::parse),
    }
}

/// Usage text with the default appended, leaving out zero values.
fn help_text(opt: &ConfigOption) -> String {
    let default = match &opt.value {
        OptionValue::Bool(false) | OptionValue::Int(0) | OptionValue::Int32(0) => None,
        OptionValue::Duration(d) if d.is_zero() => None,
        OptionValue::String(s) if s.is_empty() => None,
        OptionValue::String(s) => Some(format!("{s:?}")),
        other => Some(other.to_string()),
    };
    match default {
        Some(d) if opt.usage.is_empty() => format!("(default {d})"),
        Some(d) => format!("{} (default {d})", opt.usage),
        None => opt.usage.clone(),
    }
}

fn from_command_line(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn read_value(matches: &ArgMatches, name: &str, kind: ValueKind) -> Option<OptionValue> {
    match kind {
        ValueKind::Bool => matches.get_one::<bool>(name).copied().map(OptionValue::Bool),
        ValueKind::String => matches
            .get_one::<String>(name)
            .cloned()
            .map(OptionValue::String),
        ValueKind::Int => matches.get_one::<i64>(name).copied().map(OptionValue::Int),
        ValueKind::Int32 => matches.get_one::<i32>(name).copied().map(OptionValue::Int32),
        ValueKind::Duration => matches
            .get_one::<Duration>(name)
            .copied()
            .map(OptionValue::Duration),
    }
}

/// One parsed flag: its effective value and whether the command line set it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFlag {
    pub value: OptionValue,
    pub changed: bool,
}

/// The outcome of parsing a [`FlagSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFlags {
    flags: BTreeMap<String, ParsedFlag>,
    locations: BTreeMap<&'static str, String>,
}

impl ParsedFlags {
    pub fn lookup(&self, name: &str) -> Option<&ParsedFlag> {
        self.flags.get(name)
    }

    /// Value of an option flag: the command-line value if given, else the default.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.lookup(name).map(|f| &f.value)
    }

    /// Whether `name` was given on the command line. Works for the reserved
    /// location flags too.
    pub fn changed(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|f| f.changed) || self.locations.contains_key(name)
    }

    /// The raw value of `--read-config` / `--write-config` when given.
    /// `Some("")` means the flag was given without a path.
    pub fn location(&self, name: &str) -> Option<&str> {
        self.locations.get(name).map(String::as_str)
    }
}
