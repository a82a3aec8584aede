//! Layered configuration from defaults, one config file, environment
//! variables and command-line flags, resolved into a typed struct in a
//! single call.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Default)]
//! struct AppConfig {
//!     server: Server,
//! }
//!
//! let options = [ConfigOption::int(8080)
//!     .flag("port")
//!     .short('p')
//!     .usage("port to listen on")
//!     .key("server.port")];
//!
//! let mut config = AppConfig::default();
//! flagfig::new_config(&mut config, &options, [ParserOption::ConfigName("app".into())])?;
//! ```
//!
//! That call defines `--port`/`-p`, parses the command line, looks for
//! `app.yml` in the working directory, checks `SERVER_PORT` in the
//! environment and writes the winning value into `config.server.port`.
//!
//! # Options
//!
//! A [`ConfigOption`] describes one value: its default (whose type also
//! picks the flag type), an optional flag name and shorthand, help text, and
//! an optional dotted key into the target struct. An option without a key is
//! flag-only; its value is reported in [`Resolution::flags`]. An option
//! without a flag name is set from the file and environment only.
//!
//! Durations travel through every layer in the `1m30s` notation. A
//! `std::time::Duration` field of the target needs
//! `#[serde(with = "flagfig::duration")]` to accept it; a plain `Duration`
//! field fails to unmarshal with an "expected struct Duration" error.
//!
//! # Lower-level access
//!
//! [`Store`] is the layered store the resolver drives. Build one from
//! [`Settings::from_options`] to set defaults, read a file, query merged keys
//! with [`Store::get`] or write the merged view without going through the
//! command line.
//!
//! # Layer precedence
//!
//! ```text
//! Defaults              ConfigOption value
//!        ↑ overridden by
//! Config file           first <name>.<ext> found in the search paths
//!        ↑ overridden by
//! Environment vars      PREFIX_SERVER_PORT
//!        ↑ overridden by
//! Flags                 --port=9090, only when given
//! ```
//!
//! Every layer is sparse. A flag that was not given on the command line does
//! not override anything, even though it has a default.
//!
//! Keys are case-insensitive: `Server.Port`, `server.port` and a file key
//! `SERVER: {PORT: 1}` all name the same value, and they land on the target
//! field whose serialized name matches ignoring case.
//!
//! # Config file
//!
//! The file name is `config.yml` unless changed with
//! [`ParserOption::ConfigName`] and [`ParserOption::ConfigType`]. Supported
//! types are `yml`/`yaml`, `toml` and `json`. Directories added with
//! [`ParserOption::ConfigPath`] are tried in order and the first hit wins;
//! with none added, the working directory is searched. A missing file is not
//! an error: a warning is logged and the other layers still apply.
//!
//! [`ParserOption::ConfigFile`] names one exact file instead; it must exist.
//!
//! # Environment variables
//!
//! Each known key (every default, bound flag and key present in the file)
//! is looked up as `UPPER(prefix + sep + key)` with `.` replaced by the
//! separator:
//!
//! | Prefix | Separator | Key | Variable |
//! |--------|-----------|-----|----------|
//! | none | `_` | `server.port` | `SERVER_PORT` |
//! | `demo` | `_` | `server.port` | `DEMO_SERVER_PORT` |
//! | `APP` | `__` | `db.pool_size` | `APP__DB__POOL_SIZE` |
//!
//! Values are parsed by the option's declared type. Keys that only appear in
//! the file are parsed heuristically: `true`/`false`, then integer, then
//! float, then string.
//!
//! # Read and write flags
//!
//! With [`ParserOption::ReadFlag`], `--read-config[=PATH]` replaces the
//! search with an explicit location. With [`ParserOption::WriteFlag`],
//! `--write-config[=PATH]` writes the merged configuration (all four layers)
//! to a file before the struct is populated. Both accept a file or a
//! directory; a directory gets the configured file name.
//!
//! # Logging
//!
//! Progress is reported through [`tracing`] (`read config file`, the
//! not-found warning, `wrote config`). No subscriber is installed by this
//! crate; [`ParserOption::SuppressLogs`] skips the events entirely.
//!
//! # Error handling
//!
//! All fallible operations return [`FlagfigError`]. Nothing here exits the
//! process: `--help` and bad flags come back as [`FlagfigError::Cli`], which
//! the caller can `.exit()` to get clap's usual behavior.

pub mod duration;
pub mod error;
pub mod types;

mod builder;
mod env;
mod file;
mod flags;
mod format;
pub(crate) mod merge;
mod option;
mod resolve;
mod settings;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::{Flagfig, FlagfigBuilder};
pub use env::EnvMapper;
pub use error::FlagfigError;
pub use flags::{ParsedFlag, ParsedFlags, READ_FLAG, WRITE_FLAG};
pub use format::ConfigFormat;
pub use option::{ConfigOption, OptionValue, ValueKind};
pub use resolve::Resolution;
pub use settings::{ConfigFileName, ParserOption, Settings};
pub use store::Store;
pub use types::SearchPath;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Resolve `options` from every layer into `target`, reading the process's
/// argv and environment.
///
/// Shorthand for [`Flagfig::builder()`] with `parser_options` applied in
/// order, then [`FlagfigBuilder::resolve`].
pub fn new_config<T>(
    target: &mut T,
    options: &[ConfigOption],
    parser_options: impl IntoIterator<Item = ParserOption>,
) -> Result<Resolution, FlagfigError>
where
    T: Serialize + DeserializeOwned,
{
    Flagfig::builder()
        .options(parser_options)
        .resolve(target, options)
}
