//! Semantic resolution chains.
//!
//! Each element class has an ordered list of strategies. A strategy turns
//! the fuzzy text into one query; the resolver tries them in order and stops
//! at the first that matches anything.
//!
//! Every generated XPath is relative to the context node (`.//…` or
//! `./self::…`) so it can be evaluated inside a scoped search. Label and
//! `aria-labelledby` lookups inside predicates are absolute (`//label`): a
//! label outside the scope still names a field inside it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::xpath::{combine, literal};

/// Predicates of a form control a field strategy may return
const FIELD_TEST: &str = "[self::input or self::textarea or self::select]\
    [not(./@type = 'submit' or ./@type = 'image' or ./@type = 'hidden')]";

/// Inputs that behave like buttons
const BUTTON_INPUT: &str = "input[./@type = 'submit' or ./@type = 'image' or ./@type = 'button']";

const CHECKABLE: &str = "input[@type = 'checkbox' or @type = 'radio']";

/// Fuzzy text prepared for interpolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle<'a> {
    raw: &'a str,
    literal: String,
}

impl<'a> Needle<'a> {
    /// Escape `raw` once for every generator in a chain
    #[must_use]
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            literal: literal(raw),
        }
    }

    /// Unescaped text
    #[must_use]
    pub const fn raw(&self) -> &'a str {
        self.raw
    }

    /// XPath string literal
    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }
}

/// One named query generator of a chain
#[derive(Clone, Copy)]
pub struct Strategy {
    /// Name reported in resolution results
    pub name: &'static str,
    generate: fn(&Needle<'_>) -> Locator,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

impl Strategy {
    /// Build the query for `needle`
    #[must_use]
    pub fn generate(&self, needle: &Needle<'_>) -> Locator {
        (self.generate)(needle)
    }
}

/// Element classes with a semantic resolution chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementClass {
    /// Links, buttons and button-like inputs
    Clickable,
    /// Checkboxes and radio buttons
    Checkable,
    /// Text inputs, textareas and selects
    Field,
    /// Options of an already resolved `<select>`
    SelectOption,
}

impl ElementClass {
    /// Strategies in evaluation order
    #[must_use]
    pub const fn chain(self) -> &'static [Strategy] {
        match self {
            Self::Clickable => CLICKABLE,
            Self::Checkable => CHECKABLE_CHAIN,
            Self::Field => FIELD_CHAIN,
            Self::SelectOption => SELECT_OPTION,
        }
    }

    /// Ranked candidate queries for `text`, without searching
    #[must_use]
    pub fn candidates(self, text: &str) -> Vec<(&'static str, Locator)> {
        let needle = Needle::new(text);
        self.chain()
            .iter()
            .map(|strategy| (strategy.name, strategy.generate(&needle)))
            .collect()
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clickable => write!(f, "clickable"),
            Self::Checkable => write!(f, "checkable"),
            Self::Field => write!(f, "field"),
            Self::SelectOption => write!(f, "select option"),
        }
    }
}

/// Literal CSS attempt once every semantic strategy failed
fn raw_css(needle: &Needle<'_>) -> Locator {
    Locator::css(needle.raw())
}

const CLICKABLE: &[Strategy] = &[
    Strategy {
        name: "narrow",
        generate: clickable_narrow,
    },
    Strategy {
        name: "wide",
        generate: clickable_wide,
    },
    Strategy {
        name: "self",
        generate: clickable_self,
    },
    Strategy {
        name: "raw",
        generate: raw_css,
    },
];

const CHECKABLE_CHAIN: &[Strategy] = &[
    Strategy {
        name: "by_text",
        generate: checkable_by_text,
    },
    Strategy {
        name: "by_name",
        generate: checkable_by_name,
    },
    Strategy {
        name: "raw",
        generate: raw_css,
    },
];

const FIELD_CHAIN: &[Strategy] = &[
    Strategy {
        name: "label_equals",
        generate: field_label_equals,
    },
    Strategy {
        name: "label_contains",
        generate: field_label_contains,
    },
    Strategy {
        name: "by_name",
        generate: field_by_name,
    },
    Strategy {
        name: "raw",
        generate: raw_css,
    },
];

const SELECT_OPTION: &[Strategy] = &[
    Strategy {
        name: "by_visible_text",
        generate: option_by_visible_text,
    },
    Strategy {
        name: "by_value",
        generate: option_by_value,
    },
];

fn clickable_narrow(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!(".//a[normalize-space(.) = {l}]"),
        format!(".//button[normalize-space(.) = {l}]"),
        format!(".//a/img[normalize-space(@alt) = {l}]/ancestor::a"),
        format!(".//{BUTTON_INPUT}[normalize-space(@value) = {l}]"),
    ]))
}

fn clickable_wide(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!(
            ".//a[./@href][(contains(normalize-space(string(.)), {l})) or .//img[contains(./@alt, {l})]]"
        ),
        format!(".//{BUTTON_INPUT}[contains(./@value, {l})]"),
        format!(".//input[./@type = 'image'][contains(./@alt, {l})]"),
        format!(".//button[contains(normalize-space(string(.)), {l})]"),
        format!(".//label[contains(normalize-space(string(.)), {l})]"),
        format!(".//{BUTTON_INPUT}[./@name = {l} or ./@title = {l}]"),
        format!(".//button[./@name = {l} or ./@title = {l}]"),
        format!(".//*[@aria-label = {l}]"),
        format!(".//*[@title = {l}]"),
        format!(".//*[@aria-labelledby = //*[@id][normalize-space(string(.)) = {l}]/@id]"),
        format!(".//*[@role = 'button'][normalize-space(.) = {l}]"),
    ]))
}

fn clickable_self(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(format!(
        "./self::*[contains(normalize-space(string(.)), {l}) or contains(normalize-space(@value), {l})]"
    ))
}

fn checkable_by_text(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!(
            ".//{CHECKABLE}[(@id = //label[contains(normalize-space(string(.)), {l})]/@for) or @placeholder = {l}]"
        ),
        format!(".//label[contains(normalize-space(string(.)), {l})]//{CHECKABLE}"),
    ]))
}

fn checkable_by_name(needle: &Needle<'_>) -> Locator {
    Locator::xpath(format!(".//{CHECKABLE}[@name = {}]", needle.literal()))
}

fn field_label_equals(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!(
            ".//*{FIELD_TEST}[(./@name = {l}) or ./@id = //label[@for][normalize-space(string(.)) = {l}]/@for \
             or ./@placeholder = {l}]"
        ),
        format!(".//label[normalize-space(string(.)) = {l}]//*{FIELD_TEST}"),
        format!(
            ".//label[not(@for)][not(.//input or .//textarea or .//select)]\
             [normalize-space(string(.)) = {l}]/following-sibling::*[1]{FIELD_TEST}"
        ),
        format!(".//*{FIELD_TEST}[@aria-label = {l}]"),
        format!(".//*{FIELD_TEST}[@aria-labelledby = //*[@id][normalize-space(string(.)) = {l}]/@id]"),
    ]))
}

fn field_label_contains(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!(
            ".//*{FIELD_TEST}[(./@name = {l}) or ./@id = //label[@for][contains(normalize-space(string(.)), {l})]/@for \
             or contains(./@placeholder, {l})]"
        ),
        format!(".//label[contains(normalize-space(string(.)), {l})]//*{FIELD_TEST}"),
        format!(".//*{FIELD_TEST}[contains(@aria-label, {l})]"),
    ]))
}

fn field_by_name(needle: &Needle<'_>) -> Locator {
    Locator::xpath(format!(
        ".//*[self::input or self::textarea or self::select][@name = {}]",
        needle.literal()
    ))
}

fn option_by_visible_text(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!("./option[normalize-space(string(.)) = {l}]"),
        format!("./optgroup/option[normalize-space(string(.)) = {l}]"),
    ]))
}

fn option_by_value(needle: &Needle<'_>) -> Locator {
    let l = needle.literal();
    Locator::xpath(combine(&[
        format!("./option[@value = {l}]"),
        format!("./optgroup/option[@value = {l}]"),
    ]))
}
