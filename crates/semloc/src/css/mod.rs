//! CSS selector → XPath conversion.
//!
//! Two conversion strategies exist. The **basic** one covers type, id, class
//! and attribute selectors, the four combinators, selector groups and the
//! structural pseudo-classes that need no sibling arithmetic. The
//! **extended** one additionally understands the `:nth-*` family, the
//! `*-of-type` family, `:has`, `:lang` and the form-state pseudo-classes.
//!
//! The strategy is picked by scanning the selector text for those
//! pseudo-class markers before parsing. It is a dispatch, not a retry: a
//! selector the chosen strategy can't express is an error.
//!
//! Generated expressions are relative to the context node (`.//…`) so they
//! can be evaluated inside a scoped search.

mod parser;
mod translate;

use crate::result::LocatorResult;

/// Pseudo-class markers that route a selector to the extended conversion
pub const EXTENDED_MARKERS: &[&str] = &[
    ":nth-of-type",
    ":first-of-type",
    ":last-of-type",
    ":nth-last-child",
    ":nth-last-of-type",
    ":checked",
    ":disabled",
    ":enabled",
    ":required",
    ":lang",
    ":nth-child",
    ":has",
];

/// Which CSS→XPath grammar handles a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStrategy {
    /// Selectors without sibling arithmetic or form-state pseudo-classes
    Basic,
    /// Full pseudo-class grammar
    Extended,
}

impl ConversionStrategy {
    /// Pick the strategy for a selector by text scan
    #[must_use]
    pub fn for_selector(selector: &str) -> Self {
        if EXTENDED_MARKERS.iter().any(|marker| selector.contains(marker)) {
            Self::Extended
        } else {
            Self::Basic
        }
    }

    /// Convert `selector` with this strategy
    pub fn convert(self, selector: &str) -> LocatorResult<String> {
        let list = parser::parse(selector)?;
        translate::Translator::new(selector, self).selector_list(&list)
    }
}

/// Convert a CSS selector to an XPath expression relative to the context node.
///
/// # Errors
///
/// Returns [`crate::LocatorError::InvalidCss`] when the selector is malformed
/// or uses a feature with no XPath 1.0 equivalent.
pub fn css_to_xpath(selector: &str) -> LocatorResult<String> {
    let strategy = ConversionStrategy::for_selector(selector);
    tracing::trace!(selector, ?strategy, "converting css to xpath");
    strategy.convert(selector)
}

/// Quote `value` as a CSS string, escaping `\\` and `"`.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
