//! Shared fixtures: an `ElementSearch` backend evaluating XPath over XHTML.

#![allow(dead_code)]

use semloc::{css_to_xpath, ElementSearch, LocatorError, LocatorResult, Query};
use sxd_document::dom::{Document, Element};
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

/// Login form with links, buttons and labelled fields
pub const LOGIN_PAGE: &str = include_str!("../fixtures/login.xhtml");

/// Nine `form-*` containers mixed with unrelated markup
pub const FORM_GRID: &str = include_str!("../fixtures/form_grid.xhtml");

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parsed XHTML document
pub struct Page {
    package: Package,
}

impl Page {
    pub fn parse(xhtml: &str) -> Self {
        init_test_tracing();
        let package = sxd_document::parser::parse(xhtml).expect("fixture is well-formed XML");
        Self { package }
    }

    pub fn search(&self) -> PageSearch<'_> {
        PageSearch {
            document: self.package.as_document(),
        }
    }
}

/// Backend over one document.
///
/// CSS queries go through the crate's own converter; selectors it rejects
/// simply match nothing, like a browser's querySelectorAll on garbage.
pub struct PageSearch<'d> {
    document: Document<'d>,
}

impl<'d> PageSearch<'d> {
    /// Evaluate a raw XPath against the document root
    pub fn xpath(&self, expression: &str) -> Vec<Element<'d>> {
        self.evaluate(expression, None).expect("valid xpath")
    }

    fn evaluate(
        &self,
        expression: &str,
        context: Option<&Element<'d>>,
    ) -> LocatorResult<Vec<Element<'d>>> {
        let xpath = Factory::new()
            .build(expression)
            .map_err(|e| LocatorError::search(format!("{expression}: {e}")))?
            .ok_or_else(|| LocatorError::search("empty XPath"))?;
        let node: Node<'d> = match context {
            Some(element) => (*element).into(),
            None => self.document.root().into(),
        };
        let value = xpath
            .evaluate(&Context::new(), node)
            .map_err(|e| LocatorError::search(format!("{expression}: {e}")))?;
        match value {
            Value::Nodeset(nodes) => Ok(nodes
                .document_order()
                .into_iter()
                .filter_map(|node| node.element())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }
}

impl<'d> ElementSearch for PageSearch<'d> {
    type Element = Element<'d>;

    fn search(
        &self,
        query: &Query,
        context: Option<&Element<'d>>,
    ) -> LocatorResult<Vec<Element<'d>>> {
        match query {
            Query::XPath(expression) => self.evaluate(expression, context),
            Query::Css(selector) => match css_to_xpath(selector) {
                Ok(expression) => self.evaluate(&expression, context),
                Err(_) => Ok(Vec::new()),
            },
            Query::Structured { kind, .. } => Err(LocatorError::search(format!(
                "{kind} queries are not supported by the XHTML backend"
            ))),
        }
    }
}

/// `id` attributes of matched elements, in order
pub fn ids(elements: &[Element<'_>]) -> Vec<String> {
    elements
        .iter()
        .map(|element| element.attribute_value("id").unwrap_or_default().to_string())
        .collect()
}
