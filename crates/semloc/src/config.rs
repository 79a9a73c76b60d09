//! Engine configuration.
//!
//! Loaded once at startup from YAML or JSON and frozen into a [`Classifier`].
//!
//! ```yaml
//! default_type: css
//! custom_locators:
//!   - prefix: ["$", "="]
//!     attribute: [data-qa, data-test]
//!     strategy: css
//!     show_actual: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, ClassifierBuilder};
use crate::filter::{CustomLocatorFilter, CustomStrategy, DEFAULT_ATTRIBUTE, DEFAULT_PREFIX};
use crate::locator::LocatorKind;
use crate::result::{LocatorError, LocatorResult};

/// A single string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// `prefix: "$"`
    One(String),
    /// `prefix: ["$", "="]`
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flatten into a list
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

/// One custom attribute shorthand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomLocatorConfig {
    /// Prefix(es) marking the shorthand
    pub prefix: OneOrMany,
    /// Attribute(s) the shorthand matches
    pub attribute: OneOrMany,
    /// Generated query language
    pub strategy: CustomStrategy,
    /// Label locators with the generated query
    pub show_actual: bool,
}

impl Default for CustomLocatorConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
            attribute: DEFAULT_ATTRIBUTE.into(),
            strategy: CustomStrategy::default(),
            show_actual: false,
        }
    }
}

impl CustomLocatorConfig {
    fn validate(&self, index: usize) -> LocatorResult<()> {
        let prefixes = self.prefix.to_vec();
        if prefixes.is_empty() || prefixes.iter().any(String::is_empty) {
            return Err(LocatorError::InvalidConfig(format!(
                "custom_locators[{index}].prefix must not be empty"
            )));
        }
        let attributes = self.attribute.to_vec();
        if attributes.is_empty() {
            return Err(LocatorError::InvalidConfig(format!(
                "custom_locators[{index}].attribute must not be empty"
            )));
        }
        if let Some(bad) = attributes.iter().find(|a| !is_attribute_name(a)) {
            return Err(LocatorError::InvalidConfig(format!(
                "custom_locators[{index}].attribute `{bad}` is not a valid attribute name"
            )));
        }
        Ok(())
    }

    /// Filter implementing this shorthand
    #[must_use]
    pub fn to_filter(&self) -> CustomLocatorFilter {
        CustomLocatorFilter::default()
            .with_prefixes(self.prefix.to_vec())
            .with_attributes(self.attribute.to_vec())
            .with_strategy(self.strategy)
            .with_show_actual(self.show_actual)
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Type for unmarked strings; `fuzzy` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_type: Option<LocatorKind>,
    /// Attribute shorthands, applied in order
    pub custom_locators: Vec<CustomLocatorConfig>,
}

impl EngineConfig {
    /// Load configuration from a YAML string
    ///
    /// # Errors
    /// Returns error if YAML parsing or validation fails
    pub fn from_yaml_str(yaml: &str) -> LocatorResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    ///
    /// # Errors
    /// Returns error if JSON parsing or validation fails
    pub fn from_json_str(json: &str) -> LocatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file; `.json` files are JSON, anything
    /// else YAML
    ///
    /// # Errors
    /// Returns error if the file can't be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> LocatorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> LocatorResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values serde can't
    ///
    /// # Errors
    /// The first invalid entry, as [`LocatorError::InvalidConfig`]
    pub fn validate(&self) -> LocatorResult<()> {
        if let Some(kind) = self.default_type {
            if matches!(kind, LocatorKind::Null | LocatorKind::Shadow) {
                return Err(LocatorError::InvalidConfig(format!(
                    "default_type can't be `{kind}`"
                )));
            }
        }
        for (index, custom) in self.custom_locators.iter().enumerate() {
            custom.validate(index)?;
        }
        Ok(())
    }

    /// Builder preloaded with this configuration
    #[must_use]
    pub fn builder(&self) -> ClassifierBuilder {
        let mut builder = Classifier::builder();
        if let Some(kind) = self.default_type {
            builder = builder.default_kind(kind);
        }
        for custom in &self.custom_locators {
            builder = builder.filter(custom.to_filter());
        }
        builder
    }

    /// Validate and freeze into a classifier
    ///
    /// # Errors
    /// See [`EngineConfig::validate`]
    pub fn build_classifier(&self) -> LocatorResult<Classifier> {
        self.validate()?;
        let classifier = self.builder().build();
        tracing::debug!(
            filters = classifier.filter_count(),
            default_kind = ?classifier.default_kind(),
            "classifier configured"
        );
        Ok(classifier)
    }
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}
