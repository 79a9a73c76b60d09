//! Type classification of raw locators and the filter pipeline.
//!
//! Raw input arrives as a [`RawLocator`]: a bare string, an explicit
//! `{type: value}` object, a shadow path, or an already-built [`Locator`].
//! The [`Classifier`] assigns a type and then runs its filters in
//! registration order; filters may rewrite the result (this is how custom
//! attribute shorthands like `$save` are implemented).
//!
//! A classifier is configured once through [`ClassifierBuilder`] and is
//! read-only afterwards, so it can be shared across threads and test cases
//! without hidden coupling.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::locator::{Locator, LocatorKind, LocatorValue};
use crate::result::{LocatorError, LocatorResult};
use crate::xpath;

/// Markers of automation-engine selector syntax
const ENGINE_NATIVE_MARKERS: &[&str] = &["_react", "_vue"];

/// Unclassified locator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLocator {
    /// Bare string; classified heuristically
    Text(String),
    /// Explicit `{type: value}` object; the type is authoritative
    Strict {
        /// Declared type
        kind: LocatorKind,
        /// Payload
        value: LocatorValue,
    },
    /// `{shadow: [segments…]}` descriptor
    Shadow(Vec<String>),
    /// Already classified; passed through untouched
    Locator(Locator),
}

impl RawLocator {
    /// Explicit `{kind: value}` input
    #[must_use]
    pub fn strict(kind: LocatorKind, value: impl Into<LocatorValue>) -> Self {
        Self::Strict {
            kind,
            value: value.into(),
        }
    }

    /// Shadow path input
    #[must_use]
    pub fn shadow<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Shadow(segments.into_iter().map(Into::into).collect())
    }

    /// The bare string, if this is one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Parse the JSON shapes driver adapters send: a string, `null`, a
    /// single-key `{type: value}` object or `{shadow: [...]}`.
    ///
    /// # Errors
    ///
    /// Unknown keys, multi-key objects and non-string payloads are rejected.
    pub fn from_json(value: &Value) -> LocatorResult<Self> {
        match value {
            Value::Null => Ok(Self::Text(String::new())),
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Object(map) => {
                let mut entries = map.iter();
                let (Some((key, payload)), None) = (entries.next(), entries.next()) else {
                    return Err(LocatorError::InvalidRaw(format!(
                        "locator object must have exactly one key, got {}",
                        map.len()
                    )));
                };
                let kind = LocatorKind::from_key(key)
                    .ok_or_else(|| LocatorError::UnknownKind(key.clone()))?;

                if kind == LocatorKind::Shadow {
                    let segments = payload
                        .as_array()
                        .and_then(|items| {
                            items
                                .iter()
                                .map(|item| item.as_str().map(ToString::to_string))
                                .collect::<Option<Vec<_>>>()
                        })
                        .ok_or_else(|| {
                            LocatorError::InvalidRaw("shadow expects an array of strings".to_string())
                        })?;
                    return Ok(Self::Shadow(segments));
                }

                let text = payload.as_str().ok_or_else(|| {
                    LocatorError::InvalidRaw(format!("`{key}` expects a string value"))
                })?;
                let text = match key.as_str() {
                    "react" | "vue" => format!("_{key}={text}"),
                    _ => text.to_string(),
                };
                Ok(Self::strict(kind, text))
            }
            other => Err(LocatorError::InvalidRaw(format!(
                "unsupported locator value {other}"
            ))),
        }
    }

    /// Parse a JSON document into a raw locator.
    pub fn from_json_str(json: &str) -> LocatorResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }
}

impl From<&str> for RawLocator {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawLocator {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for RawLocator {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Locator> for RawLocator {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&Locator> for RawLocator {
    fn from(locator: &Locator) -> Self {
        Self::Locator(locator.clone())
    }
}

/// In-progress classification result a filter may rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorDraft {
    /// Type assigned so far
    pub kind: LocatorKind,
    /// Payload assigned so far
    pub value: LocatorValue,
    /// Display label
    pub label: Option<String>,
    strict: bool,
}

impl LocatorDraft {
    /// Whether the input was an explicit object
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    fn finish(self) -> Locator {
        Locator::from_parts(self.kind, self.value, self.strict, self.label)
    }
}

/// A rewrite rule applied to every classification.
///
/// Filters must ignore input outside their concern and must be idempotent.
pub trait LocatorFilter: Send + Sync {
    /// Inspect `raw` and optionally overwrite the draft
    fn apply(&self, raw: &RawLocator, draft: &mut LocatorDraft);

    /// Name for diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> LocatorFilter for F
where
    F: Fn(&RawLocator, &mut LocatorDraft) + Send + Sync,
{
    fn apply(&self, raw: &RawLocator, draft: &mut LocatorDraft) {
        self(raw, draft);
    }
}

/// Classifies raw locators; immutable once built
#[derive(Clone, Default)]
pub struct Classifier {
    filters: Vec<Arc<dyn LocatorFilter>>,
    default_kind: Option<LocatorKind>,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field(
                "filters",
                &self.filters.iter().map(|filter| filter.name()).collect::<Vec<_>>(),
            )
            .field("default_kind", &self.default_kind)
            .finish()
    }
}

impl Classifier {
    /// Start configuring a classifier
    #[must_use]
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::default()
    }

    /// Type used for bare strings with no structural markers
    #[must_use]
    pub const fn default_kind(&self) -> Option<LocatorKind> {
        self.default_kind
    }

    /// Number of registered filters
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Classify with the configured default type
    #[must_use]
    pub fn classify(&self, raw: impl Into<RawLocator>) -> Locator {
        self.classify_as(raw, None)
    }

    /// Classify, using `default_kind` (when given) instead of the configured
    /// default for unmarked strings.
    #[must_use]
    pub fn classify_as(&self, raw: impl Into<RawLocator>, default_kind: Option<LocatorKind>) -> Locator {
        let raw = raw.into();
        let default_kind = default_kind.or(self.default_kind).unwrap_or(LocatorKind::Fuzzy);

        let mut draft = match &raw {
            RawLocator::Locator(locator) => return locator.clone(),
            RawLocator::Shadow(segments) => {
                return Locator::strict(LocatorKind::Shadow, segments.clone());
            }
            RawLocator::Text(text) if text.is_empty() => return Locator::null(),
            RawLocator::Text(text) => LocatorDraft {
                kind: infer_kind(text, default_kind),
                value: LocatorValue::Text(text.clone()),
                label: None,
                strict: false,
            },
            RawLocator::Strict { kind, value } => LocatorDraft {
                kind: *kind,
                value: value.clone(),
                label: None,
                strict: true,
            },
        };

        for filter in &self.filters {
            filter.apply(&raw, &mut draft);
        }

        let locator = draft.finish();
        tracing::trace!(locator = %locator.canonical(), "classified locator");
        locator
    }
}

/// Structural classification of a bare, non-empty string
#[must_use]
pub fn infer_kind(text: &str, default_kind: LocatorKind) -> LocatorKind {
    if xpath::looks_like_xpath(text) {
        LocatorKind::XPath
    } else if xpath::looks_like_css(text) {
        LocatorKind::Css
    } else if ENGINE_NATIVE_MARKERS.iter().any(|marker| text.contains(marker)) {
        LocatorKind::EngineNative
    } else {
        default_kind
    }
}

/// Builder for [`Classifier`]
#[derive(Default)]
pub struct ClassifierBuilder {
    filters: Vec<Arc<dyn LocatorFilter>>,
    default_kind: Option<LocatorKind>,
}

impl fmt::Debug for ClassifierBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierBuilder")
            .field("filters", &self.filters.len())
            .field("default_kind", &self.default_kind)
            .finish()
    }
}

impl ClassifierBuilder {
    /// Append a filter; filters run in the order they are added
    #[must_use]
    pub fn filter(mut self, filter: impl LocatorFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append an already shared filter
    #[must_use]
    pub fn shared_filter(mut self, filter: Arc<dyn LocatorFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Type for unmarked strings instead of `fuzzy`
    #[must_use]
    pub const fn default_kind(mut self, kind: LocatorKind) -> Self {
        self.default_kind = Some(kind);
        self
    }

    /// Freeze the configuration
    #[must_use]
    pub fn build(self) -> Classifier {
        Classifier {
            filters: self.filters,
            default_kind: self.default_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn classify(raw: &str) -> Locator {
        Classifier::default().classify(raw)
    }

    mod string_tests {
        use super::*;

        #[test]
        fn test_css_markers() {
            assert!(classify("#login").is_css());
            assert!(classify(".btn").is_css());
            assert!(classify("[data-x]").is_css());
        }

        #[test]
        fn test_xpath_markers() {
            assert!(classify("//div[@id='x']").is_xpath());
            assert!(classify(".//a").is_xpath());
            assert!(classify("./self::a").is_xpath());
            assert!(classify("((//a)[1])").is_xpath());
        }

        #[test]
        fn test_engine_native() {
            assert!(classify("_react=Button").is_engine_native());
            assert!(classify("_vue=list-item").is_engine_native());
        }

        #[test]
        fn test_plain_text_is_fuzzy_and_not_strict() {
            let locator = classify("Sign In");
            assert!(locator.is_fuzzy());
            assert!(!locator.is_strict());
            assert_eq!(locator.text(), "Sign In");
        }

        #[test]
        fn test_default_kind_replaces_fuzzy() {
            let classifier = Classifier::builder().default_kind(LocatorKind::Css).build();
            assert!(classifier.classify("button").is_css());
            assert!(classifier.classify("//a").is_xpath());
        }

        #[test]
        fn test_call_site_default_wins() {
            let classifier = Classifier::builder().default_kind(LocatorKind::Name).build();
            let locator = classifier.classify_as("email", Some(LocatorKind::Css));
            assert!(locator.is_css());
        }

        #[test]
        fn test_empty_is_null() {
            assert!(classify("").is_null());
        }
    }

    mod object_tests {
        use super::*;

        #[test]
        fn test_explicit_type_is_authoritative() {
            let locator = Classifier::default().classify(RawLocator::strict(LocatorKind::Css, "Sign In"));
            assert!(locator.is_css());
            assert!(locator.is_strict());
        }

        #[test]
        fn test_passthrough_copy() {
            let original = Locator::xpath("//a");
            let copy = Classifier::builder()
                .filter(|_: &RawLocator, draft: &mut LocatorDraft| draft.kind = LocatorKind::Css)
                .build()
                .classify(&original);
            assert_eq!(copy, original);
        }

        #[test]
        fn test_shadow_descriptor() {
            let locator = Classifier::default().classify(RawLocator::shadow(["my-app", "button"]));
            assert!(locator.is_shadow());
            assert!(locator.is_strict());
            assert_eq!(
                locator.value(),
                &LocatorValue::Path(vec!["my-app".to_string(), "button".to_string()])
            );
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_json_shapes() {
            assert_eq!(
                RawLocator::from_json(&json!("Submit")).unwrap(),
                RawLocator::Text("Submit".to_string())
            );
            assert_eq!(
                RawLocator::from_json(&json!({"xpath": "//a"})).unwrap(),
                RawLocator::strict(LocatorKind::XPath, "//a")
            );
            assert_eq!(
                RawLocator::from_json(&json!({"shadow": ["a", "b"]})).unwrap(),
                RawLocator::shadow(["a", "b"])
            );
            assert_eq!(
                RawLocator::from_json(&json!(null)).unwrap(),
                RawLocator::Text(String::new())
            );
        }

        #[test]
        fn test_react_key_keeps_engine_prefix() {
            assert_eq!(
                RawLocator::from_json(&json!({"react": "Button"})).unwrap(),
                RawLocator::strict(LocatorKind::EngineNative, "_react=Button")
            );
        }

        #[test]
        fn test_json_errors() {
            assert!(matches!(
                RawLocator::from_json(&json!({"bogus": "x"})),
                Err(LocatorError::UnknownKind(_))
            ));
            assert!(matches!(
                RawLocator::from_json(&json!({"css": "a", "xpath": "b"})),
                Err(LocatorError::InvalidRaw(_))
            ));
            assert!(matches!(
                RawLocator::from_json(&json!({"shadow": "a"})),
                Err(LocatorError::InvalidRaw(_))
            ));
            assert!(matches!(
                RawLocator::from_json(&json!(42)),
                Err(LocatorError::InvalidRaw(_))
            ));
        }

        #[test]
        fn test_from_json_str() {
            let raw = RawLocator::from_json_str(r#"{"id": "login"}"#).unwrap();
            assert_eq!(raw, RawLocator::strict(LocatorKind::Id, "login"));
            assert!(matches!(
                RawLocator::from_json_str("{"),
                Err(LocatorError::Json(_))
            ));
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_filters_run_in_order() {
            let classifier = Classifier::builder()
                .filter(|_: &RawLocator, draft: &mut LocatorDraft| {
                    draft.value = LocatorValue::Text("first".to_string());
                })
                .filter(|_: &RawLocator, draft: &mut LocatorDraft| {
                    if draft.value.as_text() == Some("first") {
                        draft.value = LocatorValue::Text("second".to_string());
                    }
                })
                .build();
            assert_eq!(classifier.classify("x").text(), "second");
            assert_eq!(classifier.filter_count(), 2);
        }

        #[test]
        fn test_filters_see_strict_objects() {
            let classifier = Classifier::builder()
                .filter(|raw: &RawLocator, draft: &mut LocatorDraft| {
                    if matches!(raw, RawLocator::Strict { .. }) {
                        draft.label = Some("explicit".to_string());
                    }
                })
                .build();
            let locator = classifier.classify(RawLocator::strict(LocatorKind::Css, "a"));
            assert_eq!(locator.label(), Some("explicit"));
            assert!(classifier.classify("a").label().is_none());
        }

        #[test]
        fn test_classifiers_are_independent() {
            let with_filter = Classifier::builder()
                .filter(|_: &RawLocator, draft: &mut LocatorDraft| draft.kind = LocatorKind::Css)
                .build();
            let plain = Classifier::default();
            assert!(with_filter.classify("Save").is_css());
            assert!(plain.classify("Save").is_fuzzy());
        }
    }

    proptest! {
        #[test]
        fn prop_css_prefixes_classify_as_css(
            prefix in prop::sample::select(vec!['#', '.', '[']),
            rest in "[a-zA-Z0-9_=\\]-][a-zA-Z0-9 _=\\]-]{0,20}",
        ) {
            let text = format!("{prefix}{rest}");
            prop_assert!(classify(&text).is_css(), "{}", text);
        }

        #[test]
        fn prop_xpath_prefixes_classify_as_xpath(
            parens in "\\({0,3}",
            axis in prop::sample::select(vec!["//", "./"]),
            rest in "[a-z@\\[\\]=' ]{0,20}",
        ) {
            let text = format!("{parens}{axis}{rest}");
            prop_assert!(classify(&text).is_xpath(), "{}", text);
        }

        #[test]
        fn prop_plain_words_are_fuzzy(text in "[A-Za-z][A-Za-z0-9 ]{0,30}") {
            prop_assume!(!text.contains("_react") && !text.contains("_vue"));
            prop_assert!(classify(&text).is_fuzzy());
        }
    }
}
