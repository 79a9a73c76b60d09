//! Locator value: a classified, immutable description of how to find
//! page elements.
//!
//! # Design Philosophy
//!
//! - **Immutable**: once classification finishes a [`Locator`] never changes;
//!   composing operations return new values
//! - **Strict vs inferred**: `{css: "..."}` objects are authoritative, bare
//!   strings are classified heuristically
//! - **Compile, don't search**: a locator produces a [`Query`]; finding
//!   elements belongs to the driver adapter

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::RawLocator;
use crate::css::{css_to_xpath, quote_string};
use crate::result::{LocatorError, LocatorResult};
use crate::xpath;

/// Location strategy of a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorKind {
    /// CSS selector
    #[serde(rename = "css")]
    Css,
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath,
    /// Element id
    #[serde(rename = "id")]
    Id,
    /// `name` attribute
    #[serde(rename = "name")]
    Name,
    /// Human text resolved through the semantic strategies
    #[serde(rename = "fuzzy")]
    Fuzzy,
    /// Frame to switch into
    #[serde(rename = "frame")]
    Frame,
    /// Shadow-DOM path
    #[serde(rename = "shadow")]
    Shadow,
    /// Backend-defined custom strategy
    #[serde(rename = "custom")]
    Custom,
    /// Automation-engine syntax (`_react=…`, `_vue=…`)
    #[serde(rename = "pw")]
    EngineNative,
    /// Matches nothing
    #[serde(rename = "null")]
    Null,
}

impl LocatorKind {
    /// All kinds accepted as keys of an explicit `{type: value}` object
    pub const STRICT_KEYS: &'static [(&'static str, Self)] = &[
        ("css", Self::Css),
        ("xpath", Self::XPath),
        ("id", Self::Id),
        ("name", Self::Name),
        ("fuzzy", Self::Fuzzy),
        ("frame", Self::Frame),
        ("shadow", Self::Shadow),
        ("custom", Self::Custom),
        ("pw", Self::EngineNative),
        ("react", Self::EngineNative),
        ("vue", Self::EngineNative),
    ];

    /// Canonical type name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Name => "name",
            Self::Fuzzy => "fuzzy",
            Self::Frame => "frame",
            Self::Shadow => "shadow",
            Self::Custom => "custom",
            Self::EngineNative => "pw",
            Self::Null => "null",
        }
    }

    /// Look up an object key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::STRICT_KEYS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocatorValue {
    /// Single selector string
    Text(String),
    /// Ordered shadow-DOM segments, outermost host first
    Path(Vec<String>),
}

impl LocatorValue {
    /// The string payload, `None` for shadow paths
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Path(_) => None,
        }
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Path(segments) => segments.is_empty(),
        }
    }
}

impl fmt::Display for LocatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Path(segments) => write!(f, "[{}]", segments.join(", ")),
        }
    }
}

impl From<&str> for LocatorValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LocatorValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for LocatorValue {
    fn from(value: Vec<String>) -> Self {
        Self::Path(value)
    }
}

/// Executable form of a locator, handed to the element-search collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Query {
    /// CSS selector string
    Css(String),
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
    /// Backend-specific traversal (shadow paths, engine-native syntax, custom)
    Structured {
        /// Original locator type
        kind: LocatorKind,
        /// Original payload
        value: LocatorValue,
    },
}

impl Query {
    /// Selector text for CSS and XPath queries
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Css(s) | Self::XPath(s) => Some(s),
            Self::Structured { .. } => None,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Structured { kind, value } => write!(f, "{kind}={value}"),
        }
    }
}

/// A classified locator.
///
/// Built by [`crate::Classifier`]; composed with the query-builder methods
/// (`find`, `with_text`, `at`, …), each returning a new locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    kind: LocatorKind,
    value: LocatorValue,
    strict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Locator {
    pub(crate) const fn from_parts(
        kind: LocatorKind,
        value: LocatorValue,
        strict: bool,
        label: Option<String>,
    ) -> Self {
        Self {
            kind,
            value,
            strict,
            label,
        }
    }

    /// Explicit `{kind: value}` locator
    #[must_use]
    pub fn strict(kind: LocatorKind, value: impl Into<LocatorValue>) -> Self {
        Self::from_parts(kind, value.into(), true, None)
    }

    /// Explicit CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::strict(LocatorKind::Css, selector.into())
    }

    /// Explicit XPath locator
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::strict(LocatorKind::XPath, expression.into())
    }

    /// The null locator: matches nothing, and clears a search context
    #[must_use]
    pub fn null() -> Self {
        Self::from_parts(LocatorKind::Null, LocatorValue::Text(String::new()), false, None)
    }

    /// Classified type
    #[must_use]
    pub const fn kind(&self) -> LocatorKind {
        self.kind
    }

    /// Selector payload
    #[must_use]
    pub const fn value(&self) -> &LocatorValue {
        &self.value
    }

    /// String payload; empty for shadow paths
    #[must_use]
    pub fn text(&self) -> &str {
        self.value.as_text().unwrap_or_default()
    }

    /// Display label, if one was attached
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// CSS locator
    #[must_use]
    pub fn is_css(&self) -> bool {
        self.kind == LocatorKind::Css
    }

    /// XPath locator
    #[must_use]
    pub fn is_xpath(&self) -> bool {
        self.kind == LocatorKind::XPath
    }

    /// Fuzzy (human text) locator
    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.kind == LocatorKind::Fuzzy
    }

    /// Frame locator
    #[must_use]
    pub fn is_frame(&self) -> bool {
        self.kind == LocatorKind::Frame
    }

    /// Shadow-DOM path locator
    #[must_use]
    pub fn is_shadow(&self) -> bool {
        self.kind == LocatorKind::Shadow
    }

    /// Backend-defined custom locator
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.kind == LocatorKind::Custom
    }

    /// Automation-engine native locator
    #[must_use]
    pub fn is_engine_native(&self) -> bool {
        self.kind == LocatorKind::EngineNative
    }

    /// The null locator
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.kind == LocatorKind::Null
    }

    /// Built from an explicit `{type: value}` object
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// CSS or XPath: the kinds the query builder composes over
    #[must_use]
    pub fn is_basic(&self) -> bool {
        self.is_css() || self.is_xpath()
    }

    /// Fuzzy `~name` locators address elements by accessibility id
    #[must_use]
    pub fn is_accessibility_id(&self) -> bool {
        self.is_fuzzy() && self.text().starts_with('~')
    }

    /// Compile to the form a backend executes.
    ///
    /// # Errors
    ///
    /// Fails for the null locator.
    pub fn to_executable(&self) -> LocatorResult<Query> {
        let text = || self.text().to_string();
        let query = match self.kind {
            LocatorKind::Css | LocatorKind::Fuzzy => Query::Css(text()),
            LocatorKind::XPath => Query::XPath(text()),
            LocatorKind::Id => Query::Css(format!("#{}", self.text())),
            LocatorKind::Name => Query::Css(format!("[name={}]", quote_string(self.text()))),
            LocatorKind::Frame => {
                if xpath::looks_like_xpath(self.text()) {
                    Query::XPath(text())
                } else {
                    Query::Css(text())
                }
            }
            LocatorKind::Shadow | LocatorKind::EngineNative | LocatorKind::Custom => {
                Query::Structured {
                    kind: self.kind,
                    value: self.value.clone(),
                }
            }
            LocatorKind::Null => {
                return Err(LocatorError::NullLocator {
                    operation: "compilation",
                })
            }
        };
        Ok(query)
    }

    /// XPath form of a CSS or XPath locator.
    ///
    /// # Errors
    ///
    /// Fails for every other kind, and for CSS the converter can't express.
    pub fn to_xpath(&self) -> LocatorResult<String> {
        self.to_xpath_with_pseudo("")
    }

    /// XPath form with a CSS pseudo-class appended before conversion.
    ///
    /// The suffix only applies to CSS locators; XPath locators are returned
    /// unchanged.
    pub fn to_xpath_with_pseudo(&self, pseudo: &str) -> LocatorResult<String> {
        match self.kind {
            LocatorKind::XPath => Ok(self.text().to_string()),
            LocatorKind::Css => css_to_xpath(&format!("{}{pseudo}", self.text())),
            LocatorKind::Null => Err(LocatorError::NullLocator {
                operation: "XPath conversion",
            }),
            kind => Err(LocatorError::NotConvertible {
                kind: kind.to_string(),
            }),
        }
    }

    /// Explicit `{type: value}` form; `None` for the null locator
    #[must_use]
    pub fn to_strict(&self) -> Option<RawLocator> {
        if self.is_null() {
            return None;
        }
        Some(RawLocator::strict(self.kind, self.value.clone()))
    }

    /// Canonical `{type: value}` rendering regardless of label
    #[must_use]
    pub fn canonical(&self) -> String {
        if self.is_null() {
            return "{null}".to_string();
        }
        format!("{{{}: {}}}", self.kind, self.value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => f.write_str(&self.canonical()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_from_key_aliases() {
            assert_eq!(LocatorKind::from_key("css"), Some(LocatorKind::Css));
            assert_eq!(LocatorKind::from_key("react"), Some(LocatorKind::EngineNative));
            assert_eq!(LocatorKind::from_key("bogus"), None);
        }

        #[test]
        fn test_serde_names() {
            let json = serde_json::to_string(&LocatorKind::XPath).unwrap();
            assert_eq!(json, "\"xpath\"");
            let kind: LocatorKind = serde_json::from_str("\"pw\"").unwrap();
            assert_eq!(kind, LocatorKind::EngineNative);
        }
    }

    mod executable_tests {
        use super::*;

        #[test]
        fn test_id_compiles_to_hash() {
            let query = Locator::strict(LocatorKind::Id, "login").to_executable().unwrap();
            assert_eq!(query, Query::Css("#login".to_string()));
        }

        #[test]
        fn test_name_compiles_to_attribute() {
            let query = Locator::strict(LocatorKind::Name, "email").to_executable().unwrap();
            assert_eq!(query, Query::Css("[name=\"email\"]".to_string()));
        }

        #[test]
        fn test_name_with_quotes_is_escaped() {
            let query = Locator::strict(LocatorKind::Name, r#"q"x\"#).to_executable().unwrap();
            assert_eq!(query.as_str(), Some(r#"[name="q\"x\\"]"#));
            let xpath = css_to_xpath(query.as_str().unwrap()).unwrap();
            assert_eq!(xpath, r#".//*[@name = 'q"x\']"#);
        }

        #[test]
        fn test_css_and_xpath_pass_through() {
            assert_eq!(
                Locator::css("#a > b").to_executable().unwrap().as_str(),
                Some("#a > b")
            );
            assert_eq!(
                Locator::xpath("//div[@id='x']").to_executable().unwrap(),
                Query::XPath("//div[@id='x']".to_string())
            );
        }

        #[test]
        fn test_shadow_is_structured() {
            let segments = vec!["my-app".to_string(), "button".to_string()];
            let query = Locator::strict(LocatorKind::Shadow, segments.clone())
                .to_executable()
                .unwrap();
            assert_eq!(
                query,
                Query::Structured {
                    kind: LocatorKind::Shadow,
                    value: LocatorValue::Path(segments),
                }
            );
            assert_eq!(query.as_str(), None);
        }

        #[test]
        fn test_frame_picks_query_language() {
            let css = Locator::strict(LocatorKind::Frame, "#editor").to_executable().unwrap();
            assert!(matches!(css, Query::Css(_)));
            let xp = Locator::strict(LocatorKind::Frame, "//iframe[1]").to_executable().unwrap();
            assert!(matches!(xp, Query::XPath(_)));
        }

        #[test]
        fn test_null_fails_fast() {
            let err = Locator::null().to_executable().unwrap_err();
            assert!(matches!(err, LocatorError::NullLocator { .. }));
        }
    }

    mod xpath_tests {
        use super::*;

        #[test]
        fn test_xpath_unchanged() {
            let locator = Locator::xpath("(//a)[2]");
            assert_eq!(locator.to_xpath().unwrap(), "(//a)[2]");
        }

        #[test]
        fn test_css_converted() {
            assert_eq!(Locator::css("#x").to_xpath().unwrap(), ".//*[@id = 'x']");
        }

        #[test]
        fn test_pseudo_suffix_applies_to_css() {
            assert_eq!(
                Locator::css("li").to_xpath_with_pseudo(":first-child").unwrap(),
                ".//li[not(preceding-sibling::*)]"
            );
        }

        #[test]
        fn test_other_kinds_not_convertible() {
            for kind in [LocatorKind::Shadow, LocatorKind::EngineNative, LocatorKind::Fuzzy, LocatorKind::Id] {
                let err = Locator::strict(kind, "x").to_xpath().unwrap_err();
                assert!(matches!(err, LocatorError::NotConvertible { .. }), "{kind}");
            }
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_canonical_rendering() {
            assert_eq!(Locator::css(".a").to_string(), "{css: .a}");
            assert_eq!(
                Locator::strict(LocatorKind::Shadow, vec!["a".to_string(), "b".to_string()])
                    .to_string(),
                "{shadow: [a, b]}"
            );
            assert_eq!(Locator::null().to_string(), "{null}");
        }

        #[test]
        fn test_label_wins() {
            let locator = Locator::from_parts(
                LocatorKind::Css,
                ".a".into(),
                true,
                Some("Save button".to_string()),
            );
            assert_eq!(locator.to_string(), "Save button");
            assert_eq!(locator.canonical(), "{css: .a}");
        }

        #[test]
        fn test_to_strict() {
            let inferred = Locator::from_parts(LocatorKind::Css, "#a".into(), false, None);
            assert_eq!(
                inferred.to_strict(),
                Some(RawLocator::strict(LocatorKind::Css, "#a"))
            );
            assert_eq!(Locator::null().to_strict(), None);
        }
    }

    mod predicate_tests {
        use super::*;

        #[test]
        fn test_accessibility_id() {
            let locator = Locator::from_parts(LocatorKind::Fuzzy, "~menu".into(), false, None);
            assert!(locator.is_accessibility_id());
            assert!(!Locator::css("~menu").is_accessibility_id());
        }

        #[test]
        fn test_is_basic() {
            assert!(Locator::css("a").is_basic());
            assert!(Locator::xpath("//a").is_basic());
            assert!(!Locator::null().is_basic());
        }
    }
}
