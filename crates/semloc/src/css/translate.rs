//! Parsed CSS → XPath 1.0 text.

use super::parser::{AttrOp, Combinator, Complex, Compound, Filter, Nth, Pseudo, Relative, SelectorList};
use super::ConversionStrategy;
use crate::result::{LocatorError, LocatorResult};
use crate::xpath::literal;

const FORM_CONTROLS: &str =
    "self::button or self::input or self::select or self::textarea or self::option or self::optgroup";

pub(crate) struct Translator<'a> {
    source: &'a str,
    strategy: ConversionStrategy,
}

impl<'a> Translator<'a> {
    pub(crate) const fn new(source: &'a str, strategy: ConversionStrategy) -> Self {
        Self { source, strategy }
    }

    fn error(&self, reason: impl Into<String>) -> LocatorError {
        LocatorError::invalid_css(self.source, reason)
    }

    pub(crate) fn selector_list(&self, list: &SelectorList) -> LocatorResult<String> {
        let paths = list
            .0
            .iter()
            .map(|complex| Ok(format!(".//{}", self.complex(complex)?)))
            .collect::<LocatorResult<Vec<_>>>()?;
        Ok(paths.join(" | "))
    }

    /// Location path of a complex selector without its leading axis
    fn complex(&self, complex: &Complex) -> LocatorResult<String> {
        let mut path = self.step(&complex.head)?;
        for (combinator, compound) in &complex.tail {
            path.push_str(joint(*combinator));
            path.push_str(&self.step(compound)?);
        }
        Ok(path)
    }

    fn step(&self, compound: &Compound) -> LocatorResult<String> {
        let mut step = compound.element.clone().unwrap_or_else(|| "*".to_string());
        for filter in &compound.filters {
            step.push('[');
            step.push_str(&self.filter(filter, compound)?);
            step.push(']');
        }
        Ok(step)
    }

    /// Boolean condition matching the compound on the context node
    fn compound_condition(&self, compound: &Compound) -> LocatorResult<String> {
        let mut parts = Vec::new();
        if let Some(element) = &compound.element {
            parts.push(format!("self::{element}"));
        }
        for filter in &compound.filters {
            parts.push(self.filter(filter, compound)?);
        }
        Ok(match parts.len() {
            0 => "true()".to_string(),
            1 => parts.remove(0),
            _ => parts
                .iter()
                .map(|part| format!("({part})"))
                .collect::<Vec<_>>()
                .join(" and "),
        })
    }

    fn filter(&self, filter: &Filter, owner: &Compound) -> LocatorResult<String> {
        match filter {
            Filter::Id(id) => Ok(format!("@id = {}", literal(id))),
            Filter::Class(class) => Ok(token_match("@class", class)),
            Filter::Attr { name, matcher } => Ok(attribute(name, matcher.as_ref())),
            Filter::Pseudo(pseudo) => {
                if pseudo.is_extended() && self.strategy == ConversionStrategy::Basic {
                    return Err(self.error("pseudo-class needs the extended conversion"));
                }
                self.pseudo(pseudo, owner)
            }
        }
    }

    fn pseudo(&self, pseudo: &Pseudo, owner: &Compound) -> LocatorResult<String> {
        let condition = match pseudo {
            Pseudo::FirstChild => "not(preceding-sibling::*)".to_string(),
            Pseudo::LastChild => "not(following-sibling::*)".to_string(),
            Pseudo::OnlyChild => {
                "not(preceding-sibling::*) and not(following-sibling::*)".to_string()
            }
            Pseudo::Empty => "not(node())".to_string(),
            Pseudo::Root => "not(parent::*)".to_string(),
            Pseudo::Contains(text) => format!("contains(string(.), {})", literal(text)),
            Pseudo::Not(compounds) => {
                let alternatives = compounds
                    .iter()
                    .map(|c| self.compound_condition(c))
                    .collect::<LocatorResult<Vec<_>>>()?;
                if alternatives.len() == 1 {
                    format!("not({})", alternatives[0])
                } else {
                    let joined = alternatives
                        .iter()
                        .map(|a| format!("({a})"))
                        .collect::<Vec<_>>()
                        .join(" or ");
                    format!("not({joined})")
                }
            }
            Pseudo::NthChild(nth) => nth_condition("count(preceding-sibling::*) + 1", *nth),
            Pseudo::NthLastChild(nth) => nth_condition("count(following-sibling::*) + 1", *nth),
            Pseudo::NthOfType(nth) => {
                let name = self.type_name(owner, ":nth-of-type")?;
                nth_condition(&format!("count(preceding-sibling::{name}) + 1"), *nth)
            }
            Pseudo::NthLastOfType(nth) => {
                let name = self.type_name(owner, ":nth-last-of-type")?;
                nth_condition(&format!("count(following-sibling::{name}) + 1"), *nth)
            }
            Pseudo::FirstOfType => {
                let name = self.type_name(owner, ":first-of-type")?;
                format!("not(preceding-sibling::{name})")
            }
            Pseudo::LastOfType => {
                let name = self.type_name(owner, ":last-of-type")?;
                format!("not(following-sibling::{name})")
            }
            Pseudo::OnlyOfType => {
                let name = self.type_name(owner, ":only-of-type")?;
                format!("not(preceding-sibling::{name}) and not(following-sibling::{name})")
            }
            Pseudo::Has(relatives) => {
                let paths = relatives
                    .iter()
                    .map(|relative| self.relative(relative))
                    .collect::<LocatorResult<Vec<_>>>()?;
                paths.join(" | ")
            }
            Pseudo::Lang(lang) => format!(
                "ancestor-or-self::*[@lang][1][@lang = {} or starts-with(@lang, {})]",
                literal(lang),
                literal(&format!("{lang}-"))
            ),
            Pseudo::Checked => "(self::input and (@type = 'checkbox' or @type = 'radio') and @checked) \
                 or (self::option and @selected)"
                .to_string(),
            Pseudo::Disabled => format!("@disabled and ({FORM_CONTROLS} or self::fieldset)"),
            Pseudo::Enabled => format!("({FORM_CONTROLS}) and not(@disabled)"),
            Pseudo::Required => {
                "@required and (self::input or self::select or self::textarea)".to_string()
            }
        };
        Ok(condition)
    }

    fn relative(&self, relative: &Relative) -> LocatorResult<String> {
        let rest = self.complex(&relative.selector)?;
        Ok(match relative.combinator {
            Combinator::Descendant => format!(".//{rest}"),
            Combinator::Child => format!("./{rest}"),
            Combinator::Adjacent => format!("./following-sibling::*[1]/self::{rest}"),
            Combinator::Sibling => format!("./following-sibling::{rest}"),
        })
    }

    fn type_name<'c>(&self, owner: &'c Compound, pseudo: &str) -> LocatorResult<&'c str> {
        owner
            .element
            .as_deref()
            .ok_or_else(|| self.error(format!("`{pseudo}` needs a type selector in XPath")))
    }
}

const fn joint(combinator: Combinator) -> &'static str {
    match combinator {
        Combinator::Descendant => "//",
        Combinator::Child => "/",
        Combinator::Adjacent => "/following-sibling::*[1]/self::",
        Combinator::Sibling => "/following-sibling::",
    }
}

/// Whitespace-separated token match (`.class`, `[attr~=value]`)
fn token_match(attribute: &str, token: &str) -> String {
    format!(
        "contains(concat(' ', normalize-space({attribute}), ' '), {})",
        literal(&format!(" {token} "))
    )
}

fn attribute(name: &str, matcher: Option<&(AttrOp, String)>) -> String {
    let attr = format!("@{name}");
    let Some((op, value)) = matcher else {
        return attr;
    };
    let lit = literal(value);
    match op {
        AttrOp::Equals => format!("{attr} = {lit}"),
        AttrOp::NotEquals => format!("not({attr} = {lit})"),
        AttrOp::Includes => token_match(&attr, value),
        AttrOp::DashMatch => format!(
            "{attr} = {lit} or starts-with({attr}, {})",
            literal(&format!("{value}-"))
        ),
        AttrOp::Prefix => format!("starts-with({attr}, {lit})"),
        AttrOp::Suffix => format!(
            "substring({attr}, string-length({attr}) - string-length({lit}) + 1) = {lit}"
        ),
        AttrOp::Substring => format!("contains({attr}, {lit})"),
    }
}

/// Condition that `position` is `a*n + b` for some `n >= 0`
fn nth_condition(position: &str, nth: Nth) -> String {
    let Nth { a, b } = nth;
    match a.signum() {
        0 => format!("{position} = {b}"),
        1 if b <= 1 && (b - 1).rem_euclid(a) == 0 => {
            // every position from 1 on that is congruent; no lower bound needed
            if a == 1 {
                "true()".to_string()
            } else {
                format!("({position} - {b}) mod {a} = 0")
            }
        }
        1 => format!("{position} >= {b} and ({position} - {b}) mod {a} = 0"),
        _ => format!("{position} <= {b} and ({b} - ({position})) mod {} = 0", -a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_condition_forms() {
        assert_eq!(nth_condition("p", Nth { a: 0, b: 3 }), "p = 3");
        assert_eq!(nth_condition("p", Nth { a: 1, b: 0 }), "true()");
        assert_eq!(nth_condition("p", Nth { a: 2, b: 1 }), "(p - 1) mod 2 = 0");
        assert_eq!(nth_condition("p", Nth { a: 2, b: 0 }), "p >= 0 and (p - 0) mod 2 = 0");
        assert_eq!(nth_condition("p", Nth { a: 3, b: 2 }), "p >= 2 and (p - 2) mod 3 = 0");
        assert_eq!(nth_condition("p", Nth { a: -1, b: 3 }), "p <= 3 and (3 - (p)) mod 1 = 0");
    }

    #[test]
    fn test_attribute_forms() {
        assert_eq!(attribute("disabled", None), "@disabled");
        assert_eq!(
            attribute("href", Some(&(AttrOp::Suffix, ".pdf".to_string()))),
            "substring(@href, string-length(@href) - string-length('.pdf') + 1) = '.pdf'"
        );
        assert_eq!(
            attribute("lang", Some(&(AttrOp::DashMatch, "en".to_string()))),
            "@lang = 'en' or starts-with(@lang, 'en-')"
        );
    }

    #[test]
    fn test_token_match() {
        assert_eq!(
            token_match("@class", "btn"),
            "contains(concat(' ', normalize-space(@class), ' '), ' btn ')"
        );
    }
}
