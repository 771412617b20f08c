use medsim_core::Timestamp;
use medsim_db_memory::{BackendConfig, QueryConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// List pipeline defaults
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        if self.query.default_limit == 0 {
            return Err("query.default_limit must be > 0".into());
        }
        if let Some(max) = self.query.max_limit {
            if max == 0 {
                return Err("query.max_limit must be > 0".into());
            }
            if self.query.default_limit > max {
                return Err("query.default_limit must be <= query.max_limit".into());
            }
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.simulation.fixed_now()?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Backend construction settings derived from this configuration.
    pub fn backend_config(&self) -> Result<BackendConfig, String> {
        Ok(BackendConfig {
            seed_fixtures: self.simulation.seed_fixtures,
            fixed_now: self.simulation.fixed_now()?.map(Timestamp::into_inner),
            query: self.query.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Load the fixture patients, appointments and records at startup
    #[serde(default = "default_true")]
    pub seed_fixtures: bool,
    /// Freeze "now" (RFC 3339 or ISO date/datetime) for upcoming-appointment reads
    #[serde(default)]
    pub fixed_now: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed_fixtures: true,
            fixed_now: None,
        }
    }
}

impl SimulationConfig {
    pub fn fixed_now(&self) -> Result<Option<Timestamp>, String> {
        match self.fixed_now.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<Timestamp>()
                .map(Some)
                .map_err(|e| format!("simulation.fixed_now: {e}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::fmt;
    use std::path::{Path, PathBuf};

    pub const DEFAULT_CONFIG_PATH: &str = "medsim.toml";
    pub const CONFIG_PATH_ENV: &str = "MEDSIM_CONFIG";

    /// How the configuration path was determined.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ConfigSource {
        /// From --config CLI argument
        CliArgument,
        /// From MEDSIM_CONFIG environment variable
        EnvironmentVariable,
        /// Default path (medsim.toml)
        Default,
    }

    impl fmt::Display for ConfigSource {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::CliArgument => write!(f, "CLI argument (--config)"),
                Self::EnvironmentVariable => write!(f, "environment variable (MEDSIM_CONFIG)"),
                Self::Default => write!(f, "default"),
            }
        }
    }

    /// Resolve the configuration file path.
    ///
    /// Priority order:
    /// 1. CLI argument: --config <path>
    /// 2. Environment variable: MEDSIM_CONFIG (empty counts as unset)
    /// 3. Default: medsim.toml
    pub fn resolve_config_path<I>(args: I, env_path: Option<String>) -> (String, ConfigSource)
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                if let Some(path) = args.next() {
                    return (path, ConfigSource::CliArgument);
                }
            }
        }

        match env_path {
            Some(path) if !path.is_empty() => (path, ConfigSource::EnvironmentVariable),
            _ => (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default),
        }
    }

    /// An explicitly requested file that does not exist. The loader falls
    /// back to defaults silently, so callers should warn about this case.
    pub fn explicit_file_missing(path: &str, source: ConfigSource) -> bool {
        source != ConfigSource::Default && !Path::new(path).exists()
    }

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., MEDSIM__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("MEDSIM")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.query.default_limit, 10);
        assert!(cfg.simulation.seed_fixtures);
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn fixed_now_is_parsed_into_backend_config() {
        let mut cfg = AppConfig::default();
        cfg.simulation.fixed_now = Some("2025-04-01".into());
        let backend = cfg.backend_config().unwrap();
        assert_eq!(backend.fixed_now.map(|t| t.year()), Some(2025));

        cfg.simulation.fixed_now = Some("next tuesday".into());
        assert!(cfg.validate().unwrap_err().contains("simulation.fixed_now"));
    }

    #[test]
    fn limit_bounds_are_checked() {
        let mut cfg = AppConfig::default();
        cfg.query.max_limit = Some(5);
        assert!(cfg.validate().unwrap_err().contains("default_limit"));

        cfg.query.max_limit = Some(50);
        assert!(cfg.validate().is_ok());

        cfg.query.default_limit = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_log_level_rejected() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());
    }
}
