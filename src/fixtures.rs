#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use crate::option::ConfigOption;

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    pub struct ServerConfig {
        pub server: Server,
        pub debug: bool,
    }

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    pub struct Server {
        pub port: u16,
        pub host: String,
    }

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    pub struct TimeoutConfig {
        #[serde(with = "crate::duration")]
        pub timeout: Duration,
    }

    /// Field names in the capitalized style of structs written for other
    /// config loaders; keys still match ignoring case.
    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    pub struct Example1 {
        pub numberr: i64,
        pub stringg: String,
        pub booll: bool,
        #[serde(with = "crate::duration")]
        pub durationn: Duration,
    }

    pub const EXAMPLE1_YAML: &str = "numberr: 13\nstringg: hello\nbooll: true\ndurationn: 30s\n";

    pub fn example1_options() -> Vec<ConfigOption> {
        vec![
            ConfigOption::int(4).flag("0-numberr").key("numberr"),
            ConfigOption::string("aaa").flag("0-stringg").key("stringg"),
            ConfigOption::bool(false).flag("0-booll").key("booll"),
            ConfigOption::duration(Duration::from_secs(2))
                .flag("0-durationn")
                .key("durationn"),
        ]
    }

    pub fn server_options() -> Vec<ConfigOption> {
        vec![
            ConfigOption::int(8080)
                .flag("port")
                .short('p')
                .usage("port to listen on")
                .key("server.port"),
            ConfigOption::string("localhost")
                .flag("host")
                .usage("address to bind")
                .key("server.host"),
            ConfigOption::bool(false)
                .flag("debug")
                .short('d')
                .key("debug"),
        ]
    }

    #[test]
    fn example1_field_names_are_capitalized() {
        let v = serde_json::to_value(Example1::default()).unwrap();
        assert!(v.get("Numberr").is_some());
        assert!(v.get("Durationn").is_some());
    }
}
