// Licensed under the Apache-2.0 license

//! Error types for the register namespace.
//!
//! Each concern has its own error enum so callers can tell a malformed query
//! ([`PathError::Invalid`]) from a structural misuse of the tree
//! ([`NamespaceError::Conversion`]) or a failure reported by hardware
//! ([`BindingError`]). Plain "nothing there" lookups are not errors at all;
//! they come back as `Ok(None)`.

use thiserror::Error;

/// Errors raised while parsing or resolving a path.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The path text does not follow the path grammar.
    #[error("invalid path '{0}'")]
    Invalid(String),

    /// An alias target did not resolve when the alias was created or followed.
    #[error("path not found: '{0}'")]
    NotFound(String),
}

/// A string or value that a datatype cannot represent.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DatatypeError {
    #[error("invalid {datatype} input '{input}'")]
    Invalid {
        /// Short name of the datatype that rejected the input.
        datatype: &'static str,
        /// The rejected input, rendered as text.
        input: String,
    },
}

impl DatatypeError {
    pub fn invalid(datatype: &'static str, input: impl ToString) -> Self {
        Self::Invalid {
            datatype,
            input: input.to_string(),
        }
    }
}

/// Errors reported by a register-space binding.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BindingError {
    /// The underlying access failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The address or width is not acceptable to the binding.
    #[error("invalid arguments: {0}")]
    Args(String),

    /// The binding does not implement the requested operation.
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Errors from the [`Value`](crate::Value) numeral and byte codecs.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    #[error("not a numeral: '{0}'")]
    Parse(String),

    #[error("negative value {0} has no bit-buffer form")]
    Negative(String),

    #[error("value {value} does not fit in {bits} bits")]
    Overflow { value: String, bits: usize },
}

/// Top-level error for namespace operations.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum NamespaceError {
    #[error(transparent)]
    Path(#[from] PathError),

    /// A dirent was used as a kind it is not.
    #[error("conversion error: {0}")]
    Conversion(String),

    #[error(transparent)]
    Datatype(#[from] DatatypeError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Value(#[from] ValueError),

    /// A bit range does not fit its register.
    #[error("range error: {0}")]
    Range(String),

    /// Following an alias chain exceeded the configured depth.
    #[error("alias cycle while resolving '{0}'")]
    AliasCycle(String),

    /// Misuse of the construction builder.
    #[error("construction error: {0}")]
    Construction(String),
}

impl NamespaceError {
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// True for errors caused by malformed path text.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, NamespaceError::Path(PathError::Invalid(_)))
    }

    /// True for dirent kind mismatches.
    pub fn is_conversion(&self) -> bool {
        matches!(self, NamespaceError::Conversion(_))
    }
}

/// Result type for namespace operations.
pub type Result<T> = std::result::Result<T, NamespaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_error() {
        let err: NamespaceError = PathError::Invalid("a//[".into()).into();
        assert!(err.is_invalid_path());
        assert!(!err.is_conversion());
        assert_eq!(err.to_string(), "invalid path 'a//['");
    }

    #[test]
    fn test_datatype_error_message() {
        let err = DatatypeError::invalid("enum", "bogus");
        assert_eq!(err.to_string(), "invalid enum input 'bogus'");
        let err: NamespaceError = err.into();
        assert!(matches!(err, NamespaceError::Datatype(_)));
    }

    #[test]
    fn test_binding_error_passthrough() {
        let err: NamespaceError = BindingError::Io("bus timeout".into()).into();
        assert_eq!(err.to_string(), "I/O error: bus timeout");
    }
}
