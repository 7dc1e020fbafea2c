//! Error types for tsrank.
//!
//! Every failure is caller misuse, never a transient condition, so nothing
//! here is retried. [`RankError::kind`] groups the variants into the three
//! families callers usually branch on.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RankError>;

/// Coarse classification of a [`RankError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input at construction time (argument count, path shape,
    /// normalization values).
    Contract,
    /// The request does not match what the column or schema declares.
    Configuration,
    /// Reading or decoding a schema file failed.
    Io,
}

#[derive(Debug, Error)]
pub enum RankError {
    /// Construction-time contract violation.
    #[error("invalid {what}: {reason}")]
    Contract { what: &'static str, reason: String },

    /// An explicit dictionary is not registered as a transform on the column.
    #[error("unknown dictionary `{dictionary}` for column {column}")]
    UnknownDictionary { dictionary: String, column: String },

    /// The match lookup is not available on the column.
    #[error("unsupported lookup `{lookup}` for column {column}")]
    UnknownLookup { lookup: String, column: String },

    /// The attribute path does not lead to a search-indexed column.
    #[error("cannot resolve `{path}` on model `{model}`: {reason}")]
    Unresolved {
        model: String,
        path: String,
        reason: String,
    },

    /// The schema document is structurally valid YAML but inconsistent.
    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RankError {
    pub(crate) fn contract(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Contract {
            what,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Contract { .. } => ErrorKind::Contract,
            Self::UnknownDictionary { .. }
            | Self::UnknownLookup { .. }
            | Self::Unresolved { .. }
            | Self::Schema(_) => ErrorKind::Configuration,
            Self::Io(_) | Self::Yaml(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    pub fn is_contract(&self) -> bool {
        self.kind() == ErrorKind::Contract
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_error_message_names_the_argument() {
        let err = RankError::contract("lookup arguments", "expected exactly one, got 2");
        assert_eq!(
            err.to_string(),
            "invalid lookup arguments: expected exactly one, got 2"
        );
        assert!(err.is_contract());
        assert!(!err.is_configuration());
    }

    #[test]
    fn dictionary_and_lookup_errors_are_configuration() {
        let dict = RankError::UnknownDictionary {
            dictionary: "klingon".into(),
            column: "\"article\".\"body\"".into(),
        };
        let lookup = RankError::UnknownLookup {
            lookup: "contains".into(),
            column: "\"article\".\"body\"".into(),
        };
        assert_eq!(dict.kind(), ErrorKind::Configuration);
        assert_eq!(lookup.kind(), ErrorKind::Configuration);
        assert!(dict.to_string().contains("klingon"));
    }

    #[test]
    fn io_errors_convert() {
        let err: RankError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
