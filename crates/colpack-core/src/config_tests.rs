//! Tests for config module

#[cfg(test)]
mod tests {
    use crate::config::*;

    // ========================================================================
    // Default tests
    // ========================================================================

    #[test]
    fn test_config_default_values() {
        // Arrange & Act
        let config = CodecConfig::default();

        // Assert
        assert_eq!(config.rle.merge, RunMerge::Eager);
        assert_eq!(config.persistence.dictionary_suffix, "dictpath");
        assert_eq!(config.persistence.run_length_suffix, "newpath");
        assert!(config.persistence.verify_checksums);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_run_merge_serialization() {
        // Arrange
        let merge = RunMerge::Lazy;

        // Act
        let json = serde_json::to_string(&merge).expect("serialize");
        let deserialized: RunMerge = serde_json::from_str(&json).expect("deserialize");

        // Assert
        assert_eq!(json, "\"lazy\"");
        assert_eq!(deserialized, merge);
    }

    // ========================================================================
    // TOML parsing tests
    // ========================================================================

    #[test]
    fn test_config_from_toml_minimal() {
        // Arrange
        let toml = r#"
[rle]
merge = "lazy"
"#;

        // Act
        let config = CodecConfig::from_toml(toml).expect("parse");

        // Assert
        assert_eq!(config.rle.merge, RunMerge::Lazy);
        // Other values should be defaults
        assert_eq!(config.persistence, PersistenceConfig::default());
    }

    #[test]
    fn test_config_from_toml_full() {
        // Arrange
        let toml = r#"
[rle]
merge = "eager"

[persistence]
dictionary_suffix = ".dict"
run_length_suffix = ".runs"
verify_checksums = false

[logging]
level = "debug"
"#;

        // Act
        let config = CodecConfig::from_toml(toml).expect("parse");

        // Assert
        assert_eq!(config.rle.merge, RunMerge::Eager);
        assert_eq!(config.persistence.dictionary_suffix, ".dict");
        assert_eq!(config.persistence.run_length_suffix, ".runs");
        assert!(!config.persistence.verify_checksums);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml_invalid_merge() {
        // Arrange
        let toml = r#"
[rle]
merge = "sometimes"
"#;

        // Act
        let result = CodecConfig::from_toml(toml);

        // Assert
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_load_from_missing_file_uses_defaults() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");

        // Act
        let config = CodecConfig::load_from_path(&path).expect("load");

        // Assert
        assert_eq!(config.persistence, PersistenceConfig::default());
    }

    #[test]
    fn test_config_load_from_file() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("colpack.toml");
        std::fs::write(&path, "[persistence]\ndictionary_suffix = \"_dict\"\n").expect("write");

        // Act
        let config = CodecConfig::load_from_path(&path).expect("load");

        // Assert
        assert_eq!(config.persistence.dictionary_suffix, "_dict");
        assert_eq!(config.persistence.run_length_suffix, "newpath");
    }

    // ========================================================================
    // Validation tests
    // ========================================================================

    #[test]
    fn test_validate_default_ok() {
        assert!(CodecConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_suffix() {
        // Arrange
        let mut config = CodecConfig::default();
        config.persistence.dictionary_suffix = String::new();

        // Act
        let result = config.validate();

        // Assert
        match result {
            Err(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "persistence.dictionary_suffix");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_suffix_with_separator() {
        // Arrange
        let mut config = CodecConfig::default();
        config.persistence.run_length_suffix = "../runs".to_string();

        // Act
        let result = config.validate();

        // Assert
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "persistence.run_length_suffix"
        ));
    }

    #[test]
    fn test_validate_identical_suffixes() {
        let mut config = CodecConfig::default();
        config.persistence.run_length_suffix = config.persistence.dictionary_suffix.clone();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = CodecConfig::default();
        config.logging.level = "verbose".to_string();

        let result = config.validate();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "logging.level"
        ));
    }

    #[test]
    fn test_persistence_validate_ignores_logging() {
        let mut config = CodecConfig::default();
        config.logging.level = "verbose".to_string();

        assert!(config.validate().is_err());
        assert!(config.persistence.validate().is_ok());
    }

    #[test]
    fn test_persistence_validate_empty_run_length_suffix() {
        let config = CodecConfig::from_toml("[persistence]\nrun_length_suffix = \"\"\n")
            .expect("parse");

        let result = config.persistence.validate();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "persistence.run_length_suffix"
        ));
    }

    // ========================================================================
    // Serialization tests
    // ========================================================================

    #[test]
    fn test_config_to_toml_roundtrip() {
        // Arrange
        let mut config = CodecConfig::default();
        config.rle.merge = RunMerge::Lazy;
        config.persistence.verify_checksums = false;

        // Act
        let toml_str = config.to_toml().expect("serialize");
        let parsed = CodecConfig::from_toml(&toml_str).expect("parse");

        // Assert
        assert_eq!(parsed.rle.merge, RunMerge::Lazy);
        assert_eq!(parsed.persistence, config.persistence);
        assert_eq!(parsed.logging.level, config.logging.level);
    }
}
