//! Composable query builder.
//!
//! Every method takes the receiver by reference, converts it to XPath and
//! returns a brand-new XPath locator; the receiver is never modified.
//!
//! Sub-locators given as strings are classified with `css` as the default
//! type and without filters. Pass a locator produced by a configured
//! [`crate::Classifier`] to compose custom shorthands.
//!
//! Unions (`a, b` in CSS) are composed branch by branch: a predicate lands on
//! every branch and `find` searches every sub branch under every receiver
//! branch.
//!
//! ```
//! use semloc::Locator;
//!
//! let row = Locator::build("table#users")
//!     .find("tr")?
//!     .with_text("Alice")?
//!     .first()?;
//! assert_eq!(
//!     row.text(),
//!     "(.//table[@id = 'users']//tr[contains(normalize-space(.), 'Alice')])[position()=1]"
//! );
//! # Ok::<(), semloc::LocatorError>(())
//! ```

use crate::classify::{Classifier, RawLocator};
use crate::locator::{Locator, LocatorKind};
use crate::result::{LocatorError, LocatorResult};
use crate::xpath::{self, literal};

/// XPath that matches every element below the context node
pub const WILDCARD_XPATH: &str = ".//*";

fn sub_locator(raw: impl Into<RawLocator>) -> Locator {
    Classifier::default().classify_as(raw, Some(LocatorKind::Css))
}

/// Union branches of `xpath`, rejecting any that is already positioned
fn unpositioned_branches<'a>(xpath: &'a str, operation: &'static str) -> LocatorResult<Vec<&'a str>> {
    let branches = xpath::union_branches(xpath);
    if branches.iter().any(|branch| xpath::is_positioned(branch)) {
        return Err(LocatorError::RoundBrackets { operation });
    }
    Ok(branches)
}

/// Sub-locator branches with their leading axis removed, ready to follow `//`
/// or an explicit axis
fn sub_selectors(raw: impl Into<RawLocator>, operation: &'static str) -> LocatorResult<Vec<String>> {
    let xpath = sub_locator(raw).to_xpath()?;
    Ok(unpositioned_branches(&xpath, operation)?
        .into_iter()
        .map(|branch| xpath::strip_axis_prefix(branch).to_string())
        .collect())
}

/// `axis` applied to each branch, as one union
fn along(axis: &str, branches: &[String]) -> String {
    let steps = branches
        .iter()
        .map(|branch| format!("{axis}{branch}"))
        .collect::<Vec<_>>();
    xpath::combine(&steps)
}

impl Locator {
    /// Start a query: strings default to CSS, empty input matches everything.
    #[must_use]
    pub fn build(raw: impl Into<RawLocator>) -> Self {
        let locator = sub_locator(raw);
        if locator.is_null() {
            Self::xpath(WILDCARD_XPATH)
        } else {
            locator
        }
    }

    /// Append `predicate` to every branch of the receiver
    fn with_predicate(&self, operation: &'static str, predicate: &str) -> LocatorResult<Self> {
        let xpath = self.to_xpath()?;
        let filtered = unpositioned_branches(&xpath, operation)?
            .into_iter()
            .map(|branch| format!("{branch}[{predicate}]"))
            .collect::<Vec<_>>();
        Ok(Self::xpath(xpath::combine(&filtered)))
    }

    /// Descendants of the receiver matching `sub`
    pub fn find(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let receiver = self.to_xpath()?;
        let subs = sub_selectors(sub, "find")?;
        let paths = xpath::union_branches(&receiver)
            .into_iter()
            .flat_map(|branch| subs.iter().map(move |sub| format!("{branch}//{sub}")))
            .collect::<Vec<_>>();
        Ok(Self::xpath(xpath::combine(&paths)))
    }

    /// Receiver elements with a direct child matching `sub`
    pub fn with_child(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let subs = sub_selectors(sub, "with_child")?;
        self.with_predicate("with_child", &along("./child::", &subs))
    }

    /// Receiver elements with any descendant matching `sub`
    pub fn with_descendant(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let subs = sub_selectors(sub, "with_descendant")?;
        self.with_predicate("with_descendant", &along("./descendant::", &subs))
    }

    /// Receiver elements whose normalized text contains `text`
    pub fn with_text(&self, text: &str) -> LocatorResult<Self> {
        self.with_predicate(
            "with_text",
            &format!("contains(normalize-space(.), {})", literal(text)),
        )
    }

    /// Receiver elements whose normalized text equals `text`
    pub fn with_text_equals(&self, text: &str) -> LocatorResult<Self> {
        self.with_predicate(
            "with_text_equals",
            &format!("normalize-space(.) = {}", literal(text)),
        )
    }

    /// Receiver elements having every listed attribute value
    pub fn with_attr<I, K, V>(&self, attributes: I) -> LocatorResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let operands = attributes
            .into_iter()
            .map(|(name, value)| format!("@{} = {}", name.as_ref(), literal(value.as_ref())))
            .collect::<Vec<_>>();
        if operands.is_empty() {
            return Err(LocatorError::InvalidRaw(
                "with_attr needs at least one attribute".to_string(),
            ));
        }
        self.with_predicate("with_attr", &operands.join(" and "))
    }

    /// Attribute value starts with `prefix`
    pub fn with_attr_starts_with(&self, name: &str, prefix: &str) -> LocatorResult<Self> {
        self.with_predicate(
            "with_attr_starts_with",
            &format!("starts-with(@{name}, {})", literal(prefix)),
        )
    }

    /// Attribute value ends with `suffix`
    pub fn with_attr_ends_with(&self, name: &str, suffix: &str) -> LocatorResult<Self> {
        let lit = literal(suffix);
        self.with_predicate(
            "with_attr_ends_with",
            &format!("substring(@{name}, string-length(@{name}) - string-length({lit}) + 1) = {lit}"),
        )
    }

    /// Attribute value contains `substring`
    pub fn with_attr_contains(&self, name: &str, substring: &str) -> LocatorResult<Self> {
        self.with_predicate(
            "with_attr_contains",
            &format!("contains(@{name}, {})", literal(substring)),
        )
    }

    /// `class` attribute contains `text`
    pub fn with_class_attr(&self, text: &str) -> LocatorResult<Self> {
        self.with_predicate("with_class_attr", &format!("contains(@class, {})", literal(text)))
    }

    /// The Nth match, 1-based; negative positions count from the end.
    ///
    /// The whole expression is parenthesized, unions included, so the result
    /// can't be nested into another predicate-appending operation.
    ///
    /// # Errors
    ///
    /// `0` is rejected, as is a receiver that is already positioned.
    pub fn at(&self, position: i64) -> LocatorResult<Self> {
        let index = match position {
            0 => return Err(LocatorError::InvalidPosition),
            -1 => "last()".to_string(),
            p if p < 0 => format!("last()-{}", p.unsigned_abs() - 1),
            p => p.to_string(),
        };
        let xpath = self.to_xpath()?;
        unpositioned_branches(&xpath, "at")?;
        Ok(Self::xpath(format!("({xpath})[position()={index}]")))
    }

    /// First match
    pub fn first(&self) -> LocatorResult<Self> {
        self.at(1)
    }

    /// Last match
    pub fn last(&self) -> LocatorResult<Self> {
        self.at(-1)
    }

    /// Receiver elements located inside an ancestor matching `sub`
    pub fn inside(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let subs = sub_selectors(sub, "inside")?;
        self.with_predicate("inside", &along("ancestor::", &subs))
    }

    /// Receiver elements preceded by a sibling matching `sub`
    pub fn after(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let subs = sub_selectors(sub, "after")?;
        self.with_predicate("after", &along("preceding-sibling::", &subs))
    }

    /// Receiver elements followed by a sibling matching `sub`
    pub fn before(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let subs = sub_selectors(sub, "before")?;
        self.with_predicate("before", &along("following-sibling::", &subs))
    }

    /// Union of the receiver and `sub`
    pub fn or(&self, sub: impl Into<RawLocator>) -> LocatorResult<Self> {
        let receiver = self.to_xpath()?;
        let other = sub_locator(sub).to_xpath()?;
        Ok(Self::xpath(xpath::combine(&[receiver, other])))
    }

    /// Attach a display label; matching is unchanged
    #[must_use]
    pub fn as_label(&self, label: impl Into<String>) -> Self {
        Self::from_parts(self.kind(), self.value().clone(), self.is_strict(), Some(label.into()))
    }
}
