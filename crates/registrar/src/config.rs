//! Configuration management for the registrar CLI.
//!
//! Configuration is loaded from (in order of precedence):
//! 1. Command-line arguments
//! 2. Environment variables (REGISTRAR_*)
//! 3. Config file (~/.config/registrar/config.toml)
//! 4. Default values

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the course catalog JSON file.
    #[serde(default = "default_course_file")]
    pub course_file: PathBuf,

    /// Path to the JSON event log file.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Service name reported on traces.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// OTLP endpoint for trace export.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_course_file() -> PathBuf {
    PathBuf::from("course_catalog.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logoutput.json")
}

fn default_service_name() -> String {
    "course-catalog-service".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            course_file: default_course_file(),
            log_file: default_log_file(),
            service_name: default_service_name(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Loads configuration from all sources.
    ///
    /// Reports warnings for configuration errors but falls back to defaults.
    pub fn load() -> Self {
        let config_path = Self::config_path();

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("REGISTRAR_"));

        match figment.extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                // Report the error clearly to the user
                eprintln!("\x1b[33mWarning:\x1b[0m Configuration error, using defaults");
                eprintln!("  Config file: {}", config_path.display());
                eprintln!("  Error: {}", e);
                eprintln!();
                Config::default()
            }
        }
    }

    /// Returns the path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("registrar")
            .join("config.toml")
    }
}

/// Prints the current configuration and its sources.
pub fn show_config() {
    let config = Config::load();
    let config_path = Config::config_path();

    println!("Registrar Configuration");
    println!("=======================\n");

    println!("Config file: {}", config_path.display());
    if config_path.exists() {
        println!("Status: Found\n");
    } else {
        println!("Status: Not found (using defaults)\n");
    }

    println!("Current settings:");
    println!("  host: {}", config.host);
    println!("  port: {}", config.port);
    println!("  course_file: {}", config.course_file.display());
    println!("  log_file: {}", config.log_file.display());
    println!("  service_name: {}", config.service_name);
    println!(
        "  otlp_endpoint: {}",
        config.otlp_endpoint.as_deref().unwrap_or("(not set)")
    );

    println!("\nEnvironment variables:");
    println!("  REGISTRAR_HOST");
    println!("  REGISTRAR_PORT");
    println!("  REGISTRAR_COURSE_FILE");
    println!("  REGISTRAR_LOG_FILE");
    println!("  REGISTRAR_SERVICE_NAME");
    println!("  REGISTRAR_OTLP_ENDPOINT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.course_file, PathBuf::from("course_catalog.json"));
        assert_eq!(config.log_file, PathBuf::from("logoutput.json"));
        assert_eq!(config.service_name, "course-catalog-service");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_config_path_ends_with_config_toml() {
        let path = Config::config_path();
        assert!(path.ends_with("registrar/config.toml"));
    }
}
