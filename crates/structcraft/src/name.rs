//! Field name and dot-path grammar.
//!
//! A name is one or more of `[A-Za-z0-9_-]`. A path is one or more names joined by `.`.

use crate::errors::{Error, Result};

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Fails with [Error::InvalidName] unless `name` matches the name grammar.
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

/// Splits a dot path into its segments, failing with [Error::InvalidPath] when any
/// segment is empty or contains characters outside the name grammar.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().all(|segment| is_valid_name(segment)) {
        Ok(segments)
    } else {
        Err(Error::InvalidPath {
            path: path.to_string(),
            reason: "segments must be made of letters, numbers, underscores, and dashes".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("a").is_ok());
        assert!(validate_name("sizeof_inner-32").is_ok());
        assert!(validate_name("0").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(
            validate_name("#notvalid"),
            Err(Error::InvalidName("#notvalid".to_string()))
        );
        assert!(validate_name("").is_err());
        assert!(validate_name("a.b").is_err());
        assert!(validate_name("héllo").is_err());
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("b").unwrap(), vec!["b"]);
        assert_eq!(split_path("inner.x").unwrap(), vec!["inner", "x"]);
    }

    #[test]
    fn test_split_path_rejects_malformed() {
        assert!(matches!(split_path("#.xa"), Err(Error::InvalidPath { .. })));
        assert!(split_path("").is_err());
        assert!(split_path("a..b").is_err());
        assert!(split_path(".a").is_err());
        assert!(split_path("a.").is_err());
    }
}
