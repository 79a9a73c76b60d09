//! Result and error types for semloc.

use thiserror::Error;

/// Result type for locator operations
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Errors that can occur while classifying, compiling or resolving locators.
///
/// Classification and compilation errors are programmer errors (a malformed
/// locator) and surface immediately. An exhausted resolution chain is *not*
/// an error inside the engine; it is only turned into [`LocatorError::NotFound`]
/// when a caller asks for it via `Resolution::into_result`.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// A positioned `(...)[position()=n]` expression was nested where the
    /// operation needs to inject content before the trailing predicate
    #[error(
        "XPath with round brackets is not possible in `{operation}`; \
         a nested locator built with at(), first() or last() causes this"
    )]
    RoundBrackets {
        /// The composing operation that rejected the expression
        operation: &'static str,
    },

    /// Locator type has no XPath form
    #[error("{kind} locator can't be converted to XPath")]
    NotConvertible {
        /// Locator type name
        kind: String,
    },

    /// `at(0)` was requested
    #[error("0 is not a valid element position; XPath expects the first element to have index 1")]
    InvalidPosition,

    /// The null locator was compiled
    #[error("null locator matches nothing and can't be used for {operation}")]
    NullLocator {
        /// The compilation step that received the null locator
        operation: &'static str,
    },

    /// CSS selector could not be converted
    #[error("invalid CSS selector `{selector}`: {reason}")]
    InvalidCss {
        /// The offending selector
        selector: String,
        /// What went wrong
        reason: String,
    },

    /// Object locator used a key outside the known set
    #[error("unknown locator type `{0}`")]
    UnknownKind(String),

    /// Raw locator had an unusable shape
    #[error("invalid raw locator: {0}")]
    InvalidRaw(String),

    /// Engine configuration rejected
    #[error("invalid locator configuration: {0}")]
    InvalidConfig(String),

    /// Element search collaborator failed
    #[error("element search failed: {message}")]
    Search {
        /// Error message
        message: String,
    },

    /// Every strategy of a resolution chain came back empty
    #[error("element {locator} was not found (tried: {})", attempted.join(", "))]
    NotFound {
        /// Display form of the locator that was resolved
        locator: String,
        /// Strategy names in the order they were tried
        attempted: Vec<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl LocatorError {
    /// Build a search error from any displayable backend failure
    #[must_use]
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Build a CSS conversion error
    #[must_use]
    pub fn invalid_css(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCss {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means "element absent" rather than a broken locator
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_brackets_message_names_operation() {
        let err = LocatorError::RoundBrackets { operation: "find" };
        let msg = err.to_string();
        assert!(msg.contains("round brackets"));
        assert!(msg.contains("`find`"));
    }

    #[test]
    fn test_invalid_position_mentions_one_based_index() {
        let msg = LocatorError::InvalidPosition.to_string();
        assert!(msg.contains("index 1"));
    }

    #[test]
    fn test_not_found_lists_attempts() {
        let err = LocatorError::NotFound {
            locator: "Sign In".to_string(),
            attempted: vec!["narrow".to_string(), "wide".to_string()],
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("narrow, wide"));
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: LocatorError = json_err.into();
        assert!(matches!(err, LocatorError::Json(_)));
        assert!(!err.is_not_found());
    }
}
