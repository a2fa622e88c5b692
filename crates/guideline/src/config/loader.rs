use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GUIDELINE_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// `~/.guideline/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".guideline").join("config.json"))
}

/// Loads the config named by `GUIDELINE_CONFIG`, else the default file.
///
/// An explicitly named file must exist. A missing default file yields the
/// built-in defaults.
pub fn load_or_default() -> Result<Config, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        log::info!("Loading config from {} ({})", path.display(), CONFIG_ENV_VAR);
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            log::info!("Loading config from {}", path.display());
            load_config(path)
        }
        _ => {
            log::info!("No config file found, using built-in defaults");
            let config = Config::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.worker_count == 0 {
        return Err(invalid("worker_count must be greater than 0"));
    }
    if config.queue_capacity == 0 {
        return Err(invalid("queue_capacity must be greater than 0"));
    }
    if config.max_input_chars == 0 {
        return Err(invalid("max_input_chars must be greater than 0"));
    }
    if config.database_path.trim().is_empty() {
        return Err(invalid("database_path must not be empty"));
    }

    let llm = &config.llm;
    if llm.base_url.trim().is_empty() {
        return Err(invalid("llm.base_url must not be empty"));
    }
    if llm.model.trim().is_empty() {
        return Err(invalid("llm.model must not be empty"));
    }
    if llm.timeout_secs == 0 {
        return Err(invalid("llm.timeout_secs must be greater than 0"));
    }
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                llm.temperature
            ),
        });
    }
    if llm.summary_max_tokens == 0 || llm.checklist_max_tokens == 0 {
        return Err(invalid("llm token limits must be greater than 0"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Validation {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "database_path": "/var/lib/guideline/jobs.db",
            "worker_count": 4,
            "queue_capacity": 64,
            "max_input_chars": 5000,
            "server": { "host": "0.0.0.0", "port": 9000 },
            "llm": {
                "base_url": "http://localhost:11434/v1",
                "model": "llama3",
                "timeout_secs": 30,
                "temperature": 0.1,
                "api_key_env": "LOCAL_KEY"
            },
            "logging": { "format": "json" }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.max_input_chars, 5000);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.llm.summary_max_tokens, 500);
        assert_eq!(config.llm.api_key_env.as_deref(), Some("LOCAL_KEY"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.version, "1.0");
        assert!(config.worker_count > 0);
        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.max_input_chars, 10_000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.llm.checklist_max_tokens, 800);
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.llm.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.database_path.ends_with("guideline.db"));
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{"version": "2.0"}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = load_config_from_str(r#"{"worker_count": 0}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_temperature_out_of_range() {
        let result = load_config_from_str(r#"{"llm": {"temperature": 3.5}}"#);
        match result {
            Err(ConfigError::Validation { message }) => assert!(message.contains("temperature")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/guideline/config.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    #[serial]
    fn test_load_or_default_reads_env_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"worker_count": 2, "server": {{"port": 8123}}}}"#).unwrap();

        std::env::set_var(CONFIG_ENV_VAR, file.path());
        let config = load_or_default();
        std::env::remove_var(CONFIG_ENV_VAR);

        let config = config.unwrap();
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    #[serial]
    fn test_load_or_default_env_path_must_exist() {
        std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/guideline.json");
        let result = load_or_default();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    #[serial]
    fn test_resolved_database_path_expands_home() {
        let config = load_config_from_str(r#"{"database_path": "~/data/jobs.db"}"#).unwrap();
        let resolved = config.resolved_database_path();
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(resolved, PathBuf::from(format!("{}/data/jobs.db", home)));
        }
    }
}
