//! # flagfig demo application
//!
//! A sample CLI tool showing how flagfig is wired into an application. It
//! resolves its configuration and prints it.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagfig_demo
//! cargo run --example flagfig_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                                   |
//! |----------------------|----------------------------------------------------------------------|
//! | Defaults             | `cargo run --example flagfig_demo`                                   |
//! | Config file (cwd)    | Create `flagfig-demo.yml` in cwd, then run                           |
//! | Config file (home)   | Place the file under `~/.flagfig-demo/`                              |
//! | Env var override     | `FLAGFIG_DEMO_DISPLAY_COLOR=red cargo run --example flagfig_demo`     |
//! | Nested env var       | `FLAGFIG_DEMO_SERVER_PORT=9999 cargo run --example flagfig_demo`      |
//! | Flag override        | `cargo run --example flagfig_demo -- --port 8081 -c blue`            |
//! | Duration flag        | `cargo run --example flagfig_demo -- --timeout 1m30s`                |
//! | Explicit read        | `cargo run --example flagfig_demo -- --read-config=/etc/demo/`       |
//! | Write merged config  | `cargo run --example flagfig_demo -- --port 1 --write-config=out/`   |
//! | Flag-only option     | `cargo run --example flagfig_demo -- --key server.port`              |
//! | Logs                 | `RUST_LOG=flagfig=info cargo run --example flagfig_demo`             |

mod config;

use flagfig::{Flagfig, FlagfigError, OptionValue, SearchPath};
use tracing_subscriber::EnvFilter;

use config::{DemoConfig, KEY_FLAG};

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn entries(config: &DemoConfig) -> Vec<(&'static str, String)> {
    vec![
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        (
            "server.max_connections",
            config.server.max_connections.to_string(),
        ),
        (
            "server.timeout",
            flagfig::duration::format(config.server.timeout),
        ),
        ("display.color", config.display.color.clone()),
        ("display.format", config.display.format.clone()),
    ]
}

fn print_all(config: &DemoConfig) {
    let color = ansi_color_code(&config.display.color);

    if config.verbose {
        println!(
            "{color}[verbose] Resolved configuration for {:?}{RESET}",
            config.name
        );
        println!();
    }

    let entries = entries(config);
    if config.display.format == "plain" {
        for (key, value) in &entries {
            println!("{key}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

fn print_key(config: &DemoConfig, key: &str) {
    let color = ansi_color_code(&config.display.color);
    match entries(config).into_iter().find(|(k, _)| *k == key) {
        Some((key, value)) => println!("{color}{key}{RESET}  {value}"),
        None => {
            eprintln!("Unknown key: {key}");
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = DemoConfig::default();
    let result = Flagfig::builder()
        .config_name("flagfig-demo")
        .config_path(SearchPath::Cwd)
        .config_path(SearchPath::Home(".flagfig-demo".into()))
        .config_path(SearchPath::Platform("flagfig-demo".into()))
        .env_prefix("FLAGFIG_DEMO")
        .read_flag(true)
        .write_flag(true)
        .resolve(&mut config, &config::options());

    let resolution = match result {
        Ok(resolution) => resolution,
        Err(FlagfigError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("Failed to load config:\n{e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &resolution.written {
        eprintln!("wrote {}", path.display());
    }

    match resolution.flags.get(KEY_FLAG) {
        Some(OptionValue::String(key)) if !key.is_empty() => print_key(&config, key),
        _ => print_all(&config),
    }
}
