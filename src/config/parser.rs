use super::validator::ConfigValidator;
use super::{Config, ConfigError};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read, parse, and validate a configuration file
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read,
/// [`ConfigError::Parse`] if it is not valid TOML for [`Config`], or
/// [`ConfigError::Invalid`] if a value is out of range.
pub fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&content).map_err(|err| match err {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parse configuration text, warning about keys that have no effect
///
/// # Errors
///
/// Same as [`parse_config_file`], except that parse errors carry an empty
/// path.
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: PathBuf::new(),
        source: Box::new(source),
    })?;

    if let Ok(raw) = toml::from_str::<toml::Table>(content) {
        for field in ConfigValidator::new().unknown_fields(&raw) {
            warn!(%field, "unknown configuration field ignored");
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;
    use tempfile::tempdir;

    #[test]
    fn test_parse_valid_config() {
        let toml_content = r#"
[scan]
workers = 8
buffer_size = 65536
follow_symlinks = false

[output]
progress = false
color = "never"
"#;

        let config = parse_config_str(toml_content).unwrap();
        assert_eq!(config.scan.workers, 8);
        assert_eq!(config.scan.buffer_size, 65536);
        assert!(!config.scan.follow_symlinks);
        assert!(!config.output.progress);
        assert_eq!(config.output.color, ColorMode::Never);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_partial_section() {
        let config = parse_config_str("[scan]\nworkers = 2\n").unwrap();
        assert_eq!(config.scan.workers, 2);
        assert_eq!(config.scan.buffer_size, Config::default().scan.buffer_size);
        assert!(config.scan.follow_symlinks);
        assert!(config.output.progress);
    }

    #[test]
    fn test_parse_malformed_toml() {
        let result = parse_config_str("[scan\nworkers = ");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_invalid_data_types() {
        let result = parse_config_str("[scan]\nworkers = \"many\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let result = parse_config_str("[output]\ncolor = \"sometimes\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_zero_workers() {
        let result = parse_config_str("[scan]\nworkers = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_parse_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not toml at all [").unwrap();

        match parse_config_file(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
