//! Custom attribute shorthand filter.
//!
//! Turns `$save` into a query on a test attribute, e.g.
//! `.//*[@data-test-id='save']` (XPath strategy) or `[data-test-id=save]`
//! (CSS strategy). Prefixes and attribute names are configurable; several
//! attributes are matched as alternatives.

use serde::{Deserialize, Serialize};

use crate::classify::{LocatorDraft, LocatorFilter, RawLocator};
use crate::css::quote_string;
use crate::locator::{LocatorKind, LocatorValue};
use crate::xpath::literal;

/// Default shorthand prefix
pub const DEFAULT_PREFIX: &str = "$";

/// Default test attribute
pub const DEFAULT_ATTRIBUTE: &str = "data-test-id";

/// Query language a shorthand expands to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomStrategy {
    /// `.//*[@attr='value']`
    #[default]
    Xpath,
    /// `[attr=value]`
    Css,
}

/// Filter expanding prefixed strings into attribute queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomLocatorFilter {
    prefixes: Vec<String>,
    attributes: Vec<String>,
    strategy: CustomStrategy,
    show_actual: bool,
}

impl Default for CustomLocatorFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_ATTRIBUTE)
    }
}

impl CustomLocatorFilter {
    /// Single prefix mapped to a single attribute, XPath strategy
    #[must_use]
    pub fn new(prefix: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            prefixes: vec![prefix.into()],
            attributes: vec![attribute.into()],
            strategy: CustomStrategy::Xpath,
            show_actual: false,
        }
    }

    /// Accept several prefixes
    #[must_use]
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Match any of several attributes
    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Choose the query language
    #[must_use]
    pub const fn with_strategy(mut self, strategy: CustomStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Label the locator with the generated query instead of the shorthand
    #[must_use]
    pub const fn with_show_actual(mut self, show_actual: bool) -> Self {
        self.show_actual = show_actual;
        self
    }

    /// Configured prefixes
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Configured attributes
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn strip_prefix<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| text.strip_prefix(prefix.as_str()))
    }

    /// Query for a shorthand value, already stripped of its prefix
    #[must_use]
    pub fn expand(&self, value: &str) -> (LocatorKind, String) {
        match self.strategy {
            CustomStrategy::Xpath => {
                let lit = literal(value);
                let conditions = self
                    .attributes
                    .iter()
                    .map(|attribute| format!("@{attribute}={lit}"))
                    .collect::<Vec<_>>()
                    .join(" or ");
                (LocatorKind::XPath, format!(".//*[{conditions}]"))
            }
            CustomStrategy::Css => {
                let value = css_attribute_value(value);
                let selectors = self
                    .attributes
                    .iter()
                    .map(|attribute| format!("[{attribute}={value}]"))
                    .collect::<Vec<_>>()
                    .join(",");
                (LocatorKind::Css, selectors)
            }
        }
    }
}

impl LocatorFilter for CustomLocatorFilter {
    fn apply(&self, raw: &RawLocator, draft: &mut LocatorDraft) {
        let Some(value) = raw.as_text().and_then(|text| self.strip_prefix(text)) else {
            return;
        };
        if self.attributes.is_empty() {
            return;
        }
        let (kind, query) = self.expand(value);
        tracing::trace!(shorthand = value, %query, "expanded custom locator");
        if self.show_actual {
            draft.label = Some(query.clone());
        }
        draft.kind = kind;
        draft.value = LocatorValue::Text(query);
    }

    fn name(&self) -> &str {
        "custom-locator"
    }
}

/// Bare identifiers stay unquoted; anything else is double-quoted
fn css_attribute_value(value: &str) -> String {
    let is_ident = !value.is_empty()
        && !value.starts_with(|c: char| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if is_ident {
        value.to_string()
    } else {
        quote_string(value)
    }
}
