//! Semantic element resolution.
//!
//! The engine never touches a page. A backend implements [`ElementSearch`];
//! the [`Resolver`] compiles locators, walks the strategy chain of an
//! [`ElementClass`] and hands each query to the backend until one matches.

use std::fmt;

use crate::css::quote_string;
use crate::locator::{Locator, Query};
use crate::result::{LocatorError, LocatorResult};
use crate::strategies::{ElementClass, Needle};

/// Strategy name used for locators that bypass the semantic chain
pub const DIRECT: &str = "direct";

/// Strategy name of the accessibility-id shortcut
pub const ACCESSIBILITY_ID: &str = "accessibility_id";

/// Element lookup provided by an automation backend.
///
/// `context` is `None` for a document-wide search; relative XPath (`.//…`)
/// is then evaluated against the document root.
pub trait ElementSearch {
    /// Backend element handle; equal handles denote the same element
    type Element: Clone + PartialEq;

    /// Every element matching `query`, in document order.
    ///
    /// # Errors
    ///
    /// Backend failures. An empty result is not an error.
    fn search(
        &self,
        query: &Query,
        context: Option<&Self::Element>,
    ) -> LocatorResult<Vec<Self::Element>>;
}

impl<T: ElementSearch + ?Sized> ElementSearch for &T {
    type Element = T::Element;

    fn search(
        &self,
        query: &Query,
        context: Option<&Self::Element>,
    ) -> LocatorResult<Vec<Self::Element>> {
        (**self).search(query, context)
    }
}

/// Where a resolution searches
#[derive(Debug, Clone, Copy)]
pub enum SearchScope<'a, E> {
    /// The whole document
    Document,
    /// Inside every element the locator matches; the null locator means the
    /// whole document
    Within(&'a Locator),
    /// Inside an already resolved element
    Element(&'a E),
}

impl<E> Default for SearchScope<'_, E> {
    fn default() -> Self {
        Self::Document
    }
}

/// One query the resolver tried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Strategy name
    pub strategy: &'static str,
    /// Generated query
    pub query: Locator,
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<E> {
    /// A strategy matched
    Found {
        /// Strategy that matched
        strategy: &'static str,
        /// Query that matched
        query: Locator,
        /// Matches in document order; never empty
        elements: Vec<E>,
    },
    /// Every strategy came back empty
    NotFound {
        /// Display form of the resolved locator
        locator: String,
        /// Queries in the order they were tried
        attempted: Vec<Attempt>,
    },
}

impl<E> Resolution<E> {
    /// Whether a strategy matched
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Matched elements; empty when not found
    #[must_use]
    pub fn elements(&self) -> &[E] {
        match self {
            Self::Found { elements, .. } => elements,
            Self::NotFound { .. } => &[],
        }
    }

    /// Name of the strategy that matched
    #[must_use]
    pub const fn strategy(&self) -> Option<&'static str> {
        match self {
            Self::Found { strategy, .. } => Some(strategy),
            Self::NotFound { .. } => None,
        }
    }

    /// Turn an exhausted chain into [`LocatorError::NotFound`].
    ///
    /// # Errors
    ///
    /// When no strategy matched.
    pub fn into_result(self) -> LocatorResult<Vec<E>> {
        match self {
            Self::Found { elements, .. } => Ok(elements),
            Self::NotFound { locator, attempted } => Err(LocatorError::NotFound {
                locator,
                attempted: attempted
                    .into_iter()
                    .map(|attempt| attempt.strategy.to_string())
                    .collect(),
            }),
        }
    }
}

/// Resolves locators against an [`ElementSearch`] backend
pub struct Resolver<S> {
    search: S,
}

impl<S> fmt::Debug for Resolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl<S: ElementSearch> Resolver<S> {
    /// Wrap a backend
    #[must_use]
    pub const fn new(search: S) -> Self {
        Self { search }
    }

    /// The wrapped backend
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.search
    }

    /// Links, buttons and button-like inputs
    pub fn clickable(
        &self,
        locator: &Locator,
        scope: SearchScope<'_, S::Element>,
    ) -> LocatorResult<Resolution<S::Element>> {
        self.resolve(ElementClass::Clickable, locator, scope)
    }

    /// Checkboxes and radio buttons
    pub fn checkable(
        &self,
        locator: &Locator,
        scope: SearchScope<'_, S::Element>,
    ) -> LocatorResult<Resolution<S::Element>> {
        self.resolve(ElementClass::Checkable, locator, scope)
    }

    /// Form fields
    pub fn field(
        &self,
        locator: &Locator,
        scope: SearchScope<'_, S::Element>,
    ) -> LocatorResult<Resolution<S::Element>> {
        self.resolve(ElementClass::Field, locator, scope)
    }

    /// Options of `select`, by visible text then by value
    pub fn select_option(
        &self,
        select: &S::Element,
        option: &Locator,
    ) -> LocatorResult<Resolution<S::Element>> {
        self.resolve(ElementClass::SelectOption, option, SearchScope::Element(select))
    }

    /// Resolve `locator` as an element of `class`.
    ///
    /// Fuzzy text goes through the class's strategy chain, stopping at the
    /// first strategy with a match. Any other locator is searched once,
    /// as is.
    ///
    /// # Errors
    ///
    /// Compilation failures (the null locator, unconvertible CSS) and
    /// backend failures. Finding nothing is reported as
    /// [`Resolution::NotFound`].
    pub fn resolve(
        &self,
        class: ElementClass,
        locator: &Locator,
        scope: SearchScope<'_, S::Element>,
    ) -> LocatorResult<Resolution<S::Element>> {
        let contexts = self.contexts(scope)?;

        if locator.is_accessibility_id() {
            let name = locator.text().trim_start_matches('~');
            let query = Locator::css(format!("[aria-label={}]", quote_string(name)));
            return self.attempt_all(locator, &contexts, [(ACCESSIBILITY_ID, query)]);
        }
        if !locator.is_fuzzy() || locator.is_strict() {
            return self.attempt_all(locator, &contexts, [(DIRECT, locator.clone())]);
        }

        let needle = Needle::new(locator.text());
        let queries = class
            .chain()
            .iter()
            .map(|strategy| (strategy.name, strategy.generate(&needle)));
        self.attempt_all(locator, &contexts, queries)
    }

    /// Search for a locator once, without any semantic chain.
    ///
    /// # Errors
    ///
    /// Compilation and backend failures.
    pub fn find_all(
        &self,
        locator: &Locator,
        scope: SearchScope<'_, S::Element>,
    ) -> LocatorResult<Vec<S::Element>> {
        let contexts = self.contexts(scope)?;
        self.search_in(&locator.to_executable()?, &contexts)
    }

    fn contexts(
        &self,
        scope: SearchScope<'_, S::Element>,
    ) -> LocatorResult<Vec<Option<S::Element>>> {
        match scope {
            SearchScope::Document => Ok(vec![None]),
            SearchScope::Within(context) if context.is_null() => Ok(vec![None]),
            SearchScope::Within(context) => {
                let query = context.to_executable()?;
                let found = self.search.search(&query, None)?;
                tracing::debug!(context = %context, matches = found.len(), "resolved search context");
                Ok(found.into_iter().map(Some).collect())
            }
            SearchScope::Element(element) => Ok(vec![Some(element.clone())]),
        }
    }

    fn search_in(
        &self,
        query: &Query,
        contexts: &[Option<S::Element>],
    ) -> LocatorResult<Vec<S::Element>> {
        let mut elements: Vec<S::Element> = Vec::new();
        for context in contexts {
            // nested contexts see the same descendants more than once
            for element in self.search.search(query, context.as_ref())? {
                if !elements.contains(&element) {
                    elements.push(element);
                }
            }
        }
        Ok(elements)
    }

    fn attempt_all<I>(
        &self,
        locator: &Locator,
        contexts: &[Option<S::Element>],
        queries: I,
    ) -> LocatorResult<Resolution<S::Element>>
    where
        I: IntoIterator<Item = (&'static str, Locator)>,
    {
        let mut attempted = Vec::new();
        for (strategy, query) in queries {
            let executable = query.to_executable()?;
            let elements = self.search_in(&executable, contexts)?;
            tracing::debug!(
                %locator,
                strategy,
                query = %executable,
                matches = elements.len(),
                "resolution attempt"
            );
            if !elements.is_empty() {
                return Ok(Resolution::Found {
                    strategy,
                    query,
                    elements,
                });
            }
            attempted.push(Attempt { strategy, query });
        }
        tracing::debug!(%locator, attempts = attempted.len(), "locator not found");
        Ok(Resolution::NotFound {
            locator: locator.to_string(),
            attempted,
        })
    }
}
