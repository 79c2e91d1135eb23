mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./fluidbean.toml",
        "./config.toml",
        "/etc/fluidbean/config.toml",
    ];

    for path_str in default_paths {
        let path = Path::new(path_str);
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if !config.server.base_url.starts_with('/') {
        anyhow::bail!(
            "server.base_url must start with '/', got: {}",
            config.server.base_url
        );
    }
    if config.auth.username.is_some() != config.auth.password.is_some() {
        anyhow::bail!("auth.username and auth.password must be set together");
    }
    if config.database.path.is_empty() {
        anyhow::bail!("database.path must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_url, "/");
        assert!(config.auth.username.is_none());
        assert_eq!(config.auth.session_timeout_hours, 24);
        assert_eq!(config.database.path, "fluidbean.db");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            username = "admin"
            password = "secret"

            [server]
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.username.as_deref(), Some("admin"));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.server.base_url = "home".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_partial_credentials() {
        let mut config = Config::default();
        config.auth.username = Some("admin".to_string());
        assert!(validate_config(&config).is_err());

        config.auth.password = Some("secret".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
