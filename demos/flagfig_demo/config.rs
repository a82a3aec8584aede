//! Configuration struct and option table for the flagfig demo application.
//!
//! The root [`DemoConfig`] holds two nested sections, [`ServerConfig`] and
//! [`DisplayConfig`], to show dotted keys landing on nested fields.
//!
//! # Env var mapping
//!
//! With the prefix `FLAGFIG_DEMO` and the default `_` separator:
//!
//! | Env var                               | Config key               |
//! |---------------------------------------|--------------------------|
//! | `FLAGFIG_DEMO_NAME`                   | `name`                   |
//! | `FLAGFIG_DEMO_VERBOSE`                | `verbose`                |
//! | `FLAGFIG_DEMO_SERVER_HOST`            | `server.host`            |
//! | `FLAGFIG_DEMO_SERVER_PORT`            | `server.port`            |
//! | `FLAGFIG_DEMO_SERVER_MAX_CONNECTIONS` | `server.max_connections` |
//! | `FLAGFIG_DEMO_SERVER_TIMEOUT`         | `server.timeout`         |
//! | `FLAGFIG_DEMO_DISPLAY_COLOR`          | `display.color`          |
//! | `FLAGFIG_DEMO_DISPLAY_FORMAT`         | `display.format`         |

use std::time::Duration;

use flagfig::ConfigOption;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub server: ServerConfig,
    pub display: DisplayConfig,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    #[serde(with = "flagfig::duration")]
    pub timeout: Duration,
}

/// `color` is used by the print output via ANSI codes.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DisplayConfig {
    pub color: String,
    /// `pretty` or `plain`.
    pub format: String,
}

/// Flag name of the flag-only option that selects a single key to print.
pub const KEY_FLAG: &str = "key";

pub fn options() -> Vec<ConfigOption> {
    vec![
        ConfigOption::string("flagfig-demo")
            .usage("application name shown in the banner")
            .key("name"),
        ConfigOption::bool(false)
            .flag("verbose")
            .short('v')
            .usage("enable verbose output")
            .key("verbose"),
        ConfigOption::string("127.0.0.1")
            .flag("host")
            .usage("hostname to bind to")
            .key("server.host"),
        ConfigOption::int32(3000)
            .flag("port")
            .short('p')
            .usage("port number")
            .key("server.port"),
        ConfigOption::int(100)
            .flag("max-connections")
            .usage("maximum number of allowed connections")
            .key("server.max_connections"),
        ConfigOption::duration(Duration::from_secs(30))
            .flag("timeout")
            .usage("request timeout")
            .key("server.timeout"),
        ConfigOption::string("yellow")
            .flag("color")
            .short('c')
            .usage("output color (red, green, yellow, blue, magenta, cyan, white)")
            .key("display.color"),
        ConfigOption::string("pretty")
            .usage("output format (pretty or plain)")
            .key("display.format"),
        ConfigOption::string("")
            .flag(KEY_FLAG)
            .short('k')
            .usage("print only this dotted key"),
    ]
}
