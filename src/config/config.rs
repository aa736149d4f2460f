use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::sections::{
    AuthEndpointsConfig, BackendConfig, ClientConfig, GuardConfig, RefreshConfig,
};

/// Prefix for environment overrides, e.g. `PANELAUTH_BACKEND__BASE_URL`.
pub const ENV_PREFIX: &str = "PANELAUTH_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub backend: BackendConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub auth: AuthEndpointsConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    fn into_latest(self) -> ConfigV1 {
        match self {
            Config::ConfigV1(c) => c,
        }
    }
}

/// Load config from a YAML file, with `PANELAUTH_*` environment overrides.
pub fn load_config(path: &Path) -> Result<ConfigV1, figment::Error> {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract::<Config>()
        .map(Config::into_latest)
}

/// Parse a config from an in-memory YAML document.
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    Figment::new()
        .merge(Yaml::string(yaml))
        .extract::<Config>()
        .map(Config::into_latest)
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse_config(
            r#"
version: "1.0.0"
backend:
  base_url: "http://localhost:8000"
bind_address: "127.0.0.1:7070"
"#,
        )
        .expect("config should parse");

        assert_eq!(config.refresh.path, "/auth/refresh-token");
        assert!(!config.refresh.coalesce);
        assert_eq!(config.auth.login_path, "/auth/login");
        assert_eq!(config.guard.login_path, "/login");
        assert_eq!(config.guard.unauthorized_path, "/unauthorized");
        assert_eq!(config.client.timeout_in_ms, 10_000);
        assert_eq!(config.logging.service_name, "panelauth");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let result = parse_config(
            r#"
version: "0.9.0"
backend:
  base_url: "http://localhost:8000"
bind_address: "127.0.0.1:7070"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
version: "1.0.0"
backend:
  base_url: "http://localhost:8000"
bind_address: "127.0.0.1:7070"
"#,
            )?;
            jail.set_env("PANELAUTH_REFRESH__COALESCE", "true");

            let config = load_config(Path::new("config.yaml"))?;
            assert!(config.refresh.coalesce);
            Ok(())
        });
    }
}
