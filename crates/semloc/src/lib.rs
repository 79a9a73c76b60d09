//! semloc: semantic locator resolution for browser test automation
//!
//! Turns loosely specified element references ("Sign In", `#login`,
//! `//button`, `{name: "email"}`, `$save`) into executable CSS or XPath
//! queries, composes them through an XPath query builder, and resolves
//! human text to links, buttons, checkboxes and form fields through ordered
//! strategy chains.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     SEMLOC Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ RawLocator │    │ Classifier │    │  Locator   │            │
//! │   │ str / obj  │───►│ + filters  │───►│ kind+value │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │                    │
//! │          ┌──────────────────┬───────────────┼──────────┐        │
//! │          ▼                  ▼               ▼          │        │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐   │        │
//! │   │ Query DSL  │    │ CSS→XPath  │    │  Resolver  │───┘        │
//! │   │ find/at/…  │    │  compiler  │    │  chains    │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                    │
//! │                                    ┌────────────────┐           │
//! │                                    │ ElementSearch  │           │
//! │                                    │ (your backend) │           │
//! │                                    └────────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use semloc::prelude::*;
//!
//! let classifier = Classifier::builder()
//!     .filter(CustomLocatorFilter::default())
//!     .build();
//!
//! assert!(classifier.classify("#login").is_css());
//! assert!(classifier.classify("Sign In").is_fuzzy());
//! assert_eq!(
//!     classifier.classify("$save").text(),
//!     ".//*[@data-test-id='save']"
//! );
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

/// Type classification and the filter pipeline
pub mod classify;

/// Engine configuration (YAML/JSON)
pub mod config;

/// CSS selector to XPath compilation
pub mod css;

/// Composable XPath query builder
pub mod dsl;

/// Custom attribute shorthand filter
pub mod filter;

/// Locator value type
pub mod locator;

/// Semantic resolution against an element-search backend
pub mod resolve;

/// Result and error types
pub mod result;

/// Ordered strategy chains per element class
pub mod strategies;

/// XPath string helpers
pub mod xpath;

pub use classify::{
    infer_kind, Classifier, ClassifierBuilder, LocatorDraft, LocatorFilter, RawLocator,
};
pub use config::{CustomLocatorConfig, EngineConfig, OneOrMany};
pub use css::{css_to_xpath, ConversionStrategy};
pub use dsl::WILDCARD_XPATH;
pub use filter::{CustomLocatorFilter, CustomStrategy};
pub use locator::{Locator, LocatorKind, LocatorValue, Query};
pub use resolve::{Attempt, ElementSearch, Resolution, Resolver, SearchScope};
pub use result::{LocatorError, LocatorResult};
pub use strategies::{ElementClass, Needle, Strategy};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::classify::*;
    pub use super::config::*;
    pub use super::css::{css_to_xpath, ConversionStrategy};
    pub use super::filter::*;
    pub use super::locator::*;
    pub use super::resolve::*;
    pub use super::result::*;
    pub use super::strategies::*;
}
