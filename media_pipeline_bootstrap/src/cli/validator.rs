// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secure Command-Line Argument Parsing
//!
//! Security-first validation applied to every string/path argument
//! before it reaches a use case: length limits, shell-metacharacter and
//! path-traversal detection, and (for local paths) canonicalization with
//! a protected-system-directory check.

use std::path::{Path, PathBuf};

use thiserror::Error;

const MAX_ARG_LENGTH: usize = 1000;
const MAX_PATH_LENGTH: usize = 4096;

const DANGEROUS_PATTERNS: &[&str] = &[
    "..", "~", "$", "`", ";", "&", "|", ">", "<", "\n", "\r", "\0",
];

const PROTECTED_DIRS: &[&str] = &["/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc", "/dev"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("argument too long (max {MAX_ARG_LENGTH} characters): {0}")]
    ArgumentTooLong(String),

    #[error("dangerous pattern '{pattern}' detected in argument: {arg}")]
    DangerousPattern { pattern: String, arg: String },

    #[error("path exceeds maximum length (max {MAX_PATH_LENGTH})")]
    PathTooLong,

    #[error("access to protected system directory denied: {0}")]
    ProtectedDirectory(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid argument value for {arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
}

pub struct SecureArgParser;

impl SecureArgParser {
    /// Validates a free-form string argument (a URL, a language code, a
    /// user id) against length and shell-metacharacter attacks. Does
    /// NOT require the argument to be a filesystem path.
    pub fn validate_argument(arg: &str) -> Result<(), ParseError> {
        if arg.len() > MAX_ARG_LENGTH {
            return Err(ParseError::ArgumentTooLong(arg.chars().take(50).collect::<String>() + "..."));
        }

        for pattern in DANGEROUS_PATTERNS {
            if arg.contains(pattern) {
                return Err(ParseError::DangerousPattern {
                    pattern: pattern.to_string(),
                    arg: arg.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validates a free-form string argument that is allowed to be a
    /// URL - skips the dangerous-pattern scan for `://` schemes, since
    /// `?`, `&`, and `=` are ordinary query-string characters there.
    pub fn validate_media_argument(arg: &str) -> Result<(), ParseError> {
        if arg.contains("://") {
            if arg.len() > MAX_ARG_LENGTH {
                return Err(ParseError::ArgumentTooLong(arg.chars().take(50).collect::<String>() + "..."));
            }
            if arg.contains('\0') || arg.contains('\n') || arg.contains('\r') || arg.contains('`') || arg.contains(';') {
                return Err(ParseError::DangerousPattern {
                    pattern: "shell metacharacter".to_string(),
                    arg: arg.to_string(),
                });
            }
            Ok(())
        } else {
            Self::validate_path(arg).map(|_| ())
        }
    }

    /// Validates and canonicalizes a local filesystem path that is
    /// expected to already exist.
    pub fn validate_path(path: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(path).map_err(|e| match e {
            ParseError::ArgumentTooLong(_) => ParseError::InvalidPath(format!("path too long: {path}")),
            ParseError::DangerousPattern { pattern, .. } => {
                ParseError::InvalidPath(format!("path contains dangerous pattern '{pattern}': {path}"))
            }
            other => other,
        })?;

        let path_obj = Path::new(path);
        let canonical = path_obj.canonicalize().map_err(|e| {
            if !path_obj.exists() {
                ParseError::PathNotFound(path.to_string())
            } else {
                ParseError::InvalidPath(format!("{path}: {e}"))
            }
        })?;

        if canonical.to_string_lossy().len() > MAX_PATH_LENGTH {
            return Err(ParseError::PathTooLong);
        }

        for protected in PROTECTED_DIRS {
            if canonical.starts_with(protected) {
                return Err(ParseError::ProtectedDirectory(canonical.display().to_string()));
            }
        }

        Ok(canonical)
    }

    pub fn validate_number<T>(arg_name: &str, value: &str, min: Option<T>, max: Option<T>) -> Result<T, ParseError>
    where
        T: std::str::FromStr + PartialOrd + std::fmt::Display,
    {
        Self::validate_argument(value)?;

        let num = value.parse::<T>().map_err(|_| ParseError::InvalidValue {
            arg: arg_name.to_string(),
            reason: format!("not a valid number: {value}"),
        })?;

        if let Some(min_val) = min {
            if num < min_val {
                return Err(ParseError::InvalidValue {
                    arg: arg_name.to_string(),
                    reason: format!("value {value} is less than minimum {min_val}"),
                });
            }
        }

        if let Some(max_val) = max {
            if num > max_val {
                return Err(ParseError::InvalidValue {
                    arg: arg_name.to_string(),
                    reason: format!("value {value} is greater than maximum {max_val}"),
                });
            }
        }

        Ok(num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_safe_arguments() {
        assert!(SecureArgParser::validate_argument("en").is_ok());
        assert!(SecureArgParser::validate_argument("my-user-id").is_ok());
    }

    #[test]
    fn detects_dangerous_patterns() {
        let dangerous = ["../etc/passwd", "~/.ssh/id_rsa", "$(whoami)", "`ls`", "file;rm -rf /"];
        for arg in dangerous {
            assert!(matches!(SecureArgParser::validate_argument(arg), Err(ParseError::DangerousPattern { .. })));
        }
    }

    #[test]
    fn media_argument_allows_url_query_strings() {
        assert!(SecureArgParser::validate_media_argument("https://youtube.com/watch?v=abc123&t=10").is_ok());
    }

    #[test]
    fn validate_number_enforces_range() {
        let result = SecureArgParser::validate_number::<i32>("tmdb-year", "1800", Some(1900), Some(2100));
        assert!(matches!(result, Err(ParseError::InvalidValue { .. })));
    }
}
