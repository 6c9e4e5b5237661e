//! Tests for `error` module

use super::error::*;
use crate::types::{ElementType, Encoding};

// -------------------------------------------------------------------------
// Error code tests
// -------------------------------------------------------------------------

fn all_errors() -> Vec<Error> {
    vec![
        Error::TypeMismatch {
            expected: ElementType::Int32,
            actual: ElementType::Varchar,
        },
        Error::EmptyValue,
        Error::OutOfRange { tid: 7, size: 3 },
        Error::EmptyList,
        Error::UnsortedPositionList,
        Error::Io(std::io::Error::other("test")),
        Error::CorruptData("test".into()),
        Error::UnsupportedEncoding {
            encoding: Encoding::Delta,
            element_type: ElementType::Bool,
        },
        Error::DictionaryFull,
        Error::InvalidColumnName("a/b".into()),
        Error::Config("test".into()),
    ]
}

#[test]
fn test_error_codes_are_unique() {
    // Arrange
    let errors = all_errors();

    // Act
    let codes: Vec<&str> = errors.iter().map(Error::code).collect();

    // Assert
    let mut unique_codes = codes.clone();
    unique_codes.sort_unstable();
    unique_codes.dedup();
    assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");

    for code in &codes {
        assert!(
            code.starts_with("COLPACK-"),
            "Code {code} should start with COLPACK-"
        );
    }
}

#[test]
fn test_error_display_includes_code() {
    for err in all_errors() {
        let display = format!("{err}");
        assert!(
            display.contains(err.code()),
            "'{display}' should contain {}",
            err.code()
        );
    }
}

#[test]
fn test_out_of_range_display() {
    // Arrange
    let err = Error::OutOfRange { tid: 10, size: 4 };

    // Act
    let display = format!("{err}");

    // Assert
    assert!(display.contains("10"));
    assert!(display.contains('4'));
    assert!(display.contains("COLPACK-003"));
}

#[test]
fn test_type_mismatch_display_names_both_types() {
    // Arrange
    let err = Error::TypeMismatch {
        expected: ElementType::Int64,
        actual: ElementType::Float32,
    };

    // Act
    let display = format!("{err}");

    // Assert
    assert!(display.contains("int64"));
    assert!(display.contains("float32"));
}

#[test]
fn test_unsupported_encoding_display() {
    let err = Error::UnsupportedEncoding {
        encoding: Encoding::Delta,
        element_type: ElementType::Varchar,
    };
    let display = format!("{err}");
    assert!(display.contains("delta"));
    assert!(display.contains("varchar"));
}

// -------------------------------------------------------------------------
// Recoverability tests
// -------------------------------------------------------------------------

#[test]
fn test_only_corrupt_data_is_unrecoverable() {
    for err in all_errors() {
        let expected = !matches!(err, Error::CorruptData(_));
        assert_eq!(err.is_recoverable(), expected, "{}", err.code());
    }
}

// -------------------------------------------------------------------------
// Conversion tests
// -------------------------------------------------------------------------

#[test]
fn test_io_error_conversion() {
    // Arrange
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing stream");

    // Act
    let err: Error = io_err.into();

    // Assert
    assert_eq!(err.code(), "COLPACK-006");
    assert!(format!("{err}").contains("missing stream"));
}

#[test]
fn test_config_error_conversion() {
    // Arrange
    let config_err = crate::config::ConfigError::InvalidValue {
        key: "logging.level".into(),
        message: "bad".into(),
    };

    // Act
    let err: Error = config_err.into();

    // Assert
    assert_eq!(err.code(), "COLPACK-011");
    assert!(format!("{err}").contains("logging.level"));
}
