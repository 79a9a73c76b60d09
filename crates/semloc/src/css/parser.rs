//! Recursive-descent parser for the CSS selector subset semloc can express
//! in XPath 1.0.

use crate::result::{LocatorError, LocatorResult};

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList(pub Vec<Complex>);

/// Compound selectors joined by combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Complex {
    pub head: Compound,
    pub tail: Vec<(Combinator, Compound)>,
}

/// Relative selector used inside `:has()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relative {
    pub combinator: Combinator,
    pub selector: Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

/// Element name plus filters; `element == None` is the universal selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub element: Option<String>,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Filter {
    Id(String),
    Class(String),
    Attr {
        name: String,
        matcher: Option<(AttrOp, String)>,
    },
    Pseudo(Pseudo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
    NotEquals,
}

/// `an+b` argument of the `:nth-*` family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Nth {
    pub a: i64,
    pub b: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Not(Vec<Compound>),
    Contains(String),
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Has(Vec<Relative>),
    Lang(String),
    Checked,
    Disabled,
    Enabled,
    Required,
}

impl Pseudo {
    /// Pseudo-classes that only the extended conversion understands
    pub(crate) const fn is_extended(&self) -> bool {
        matches!(
            self,
            Self::NthChild(_)
                | Self::NthLastChild(_)
                | Self::NthOfType(_)
                | Self::NthLastOfType(_)
                | Self::FirstOfType
                | Self::LastOfType
                | Self::OnlyOfType
                | Self::Has(_)
                | Self::Lang(_)
                | Self::Checked
                | Self::Disabled
                | Self::Enabled
                | Self::Required
        )
    }
}

/// Parse a full selector list.
pub(crate) fn parse(selector: &str) -> LocatorResult<SelectorList> {
    let mut parser = Parser::new(selector);
    let list = parser.selector_list()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected `{c}`")));
    }
    Ok(list)
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> LocatorError {
        LocatorError::invalid_css(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> LocatorResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    /// Skip whitespace; returns whether any was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector_list(&mut self) -> LocatorResult<SelectorList> {
        let mut selectors = vec![self.complex()?];
        loop {
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
            selectors.push(self.complex()?);
        }
        Ok(SelectorList(selectors))
    }

    fn complex(&mut self) -> LocatorResult<Complex> {
        self.skip_ws();
        let head = self.compound()?;
        let mut tail = Vec::new();
        while let Some(combinator) = self.combinator() {
            tail.push((combinator, self.compound()?));
        }
        Ok(Complex { head, tail })
    }

    /// Read the combinator following a compound, if the selector continues
    fn combinator(&mut self) -> Option<Combinator> {
        let had_ws = self.skip_ws();
        let explicit = match self.peek() {
            Some('>') => Some(Combinator::Child),
            Some('+') => Some(Combinator::Adjacent),
            Some('~') => Some(Combinator::Sibling),
            _ => None,
        };
        if let Some(combinator) = explicit {
            self.pos += 1;
            self.skip_ws();
            return Some(combinator);
        }
        match self.peek() {
            Some(',' | ')') | None => None,
            Some(_) if had_ws => Some(Combinator::Descendant),
            Some(_) => None,
        }
    }

    fn compound(&mut self) -> LocatorResult<Compound> {
        let mut compound = Compound::default();
        let mut seen_any = false;

        if self.eat('*') {
            seen_any = true;
        } else if self.peek().is_some_and(is_ident_start) {
            compound.element = Some(self.ident()?);
            seen_any = true;
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.filters.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    if self.peek() == Some(':') {
                        return Err(self.error("pseudo-elements have no XPath equivalent"));
                    }
                    compound.filters.push(Filter::Pseudo(self.pseudo()?));
                }
                _ => break,
            }
            seen_any = true;
        }

        if seen_any {
            Ok(compound)
        } else {
            Err(match self.peek() {
                Some(c) => self.error(format!("unexpected `{c}`")),
                None => self.error("unexpected end of selector"),
            })
        }
    }

    fn attribute(&mut self) -> LocatorResult<Filter> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();

        let op = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.pos += 1;
                return Ok(Filter::Attr {
                    name,
                    matcher: None,
                });
            }
            (Some('='), _) => {
                self.pos += 1;
                AttrOp::Equals
            }
            (Some(c), Some('=')) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    '!' => AttrOp::NotEquals,
                    other => return Err(self.error(format!("unknown attribute operator `{other}=`"))),
                };
                self.pos += 2;
                op
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some('"' | '\'') => self.string()?,
            _ => self.ident()?,
        };
        self.skip_ws();
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(self.error("attribute selector flags are not supported"));
        }
        self.expect(']')?;
        Ok(Filter::Attr {
            name,
            matcher: Some((op, value)),
        })
    }

    fn pseudo(&mut self) -> LocatorResult<Pseudo> {
        let name = self.ident()?.to_ascii_lowercase();
        let has_args = self.eat('(');

        let pseudo = match (name.as_str(), has_args) {
            ("first-child", false) => Pseudo::FirstChild,
            ("last-child", false) => Pseudo::LastChild,
            ("only-child", false) => Pseudo::OnlyChild,
            ("empty", false) => Pseudo::Empty,
            ("root", false) => Pseudo::Root,
            ("first-of-type", false) => Pseudo::FirstOfType,
            ("last-of-type", false) => Pseudo::LastOfType,
            ("only-of-type", false) => Pseudo::OnlyOfType,
            ("checked", false) => Pseudo::Checked,
            ("disabled", false) => Pseudo::Disabled,
            ("enabled", false) => Pseudo::Enabled,
            ("required", false) => Pseudo::Required,
            ("not", true) => {
                let mut compounds = Vec::new();
                loop {
                    self.skip_ws();
                    compounds.push(self.compound()?);
                    self.skip_ws();
                    if !self.eat(',') {
                        break;
                    }
                }
                Pseudo::Not(compounds)
            }
            ("contains", true) => {
                self.skip_ws();
                let text = match self.peek() {
                    Some('"' | '\'') => self.string()?,
                    _ => self.ident()?,
                };
                Pseudo::Contains(text)
            }
            ("lang", true) => {
                self.skip_ws();
                Pseudo::Lang(self.ident()?)
            }
            ("nth-child", true) => Pseudo::NthChild(self.nth()?),
            ("nth-last-child", true) => Pseudo::NthLastChild(self.nth()?),
            ("nth-of-type", true) => Pseudo::NthOfType(self.nth()?),
            ("nth-last-of-type", true) => Pseudo::NthLastOfType(self.nth()?),
            ("has", true) => {
                let mut relatives = Vec::new();
                loop {
                    self.skip_ws();
                    let combinator = match self.peek() {
                        Some('>') => Combinator::Child,
                        Some('+') => Combinator::Adjacent,
                        Some('~') => Combinator::Sibling,
                        _ => Combinator::Descendant,
                    };
                    if combinator != Combinator::Descendant {
                        self.pos += 1;
                    }
                    relatives.push(Relative {
                        combinator,
                        selector: self.complex()?,
                    });
                    self.skip_ws();
                    if !self.eat(',') {
                        break;
                    }
                }
                Pseudo::Has(relatives)
            }
            (other, _) => return Err(self.error(format!("unsupported pseudo-class `:{other}`"))),
        };

        if has_args {
            self.skip_ws();
            self.expect(')')?;
        }
        Ok(pseudo)
    }

    /// Parse `odd`, `even`, `b`, `an`, `an+b`, `-n+b` up to the closing paren
    fn nth(&mut self) -> LocatorResult<Nth> {
        self.skip_ws();
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c == ')' {
                break;
            }
            self.pos += 1;
            if !c.is_whitespace() {
                raw.push(c.to_ascii_lowercase());
            }
        }

        let nth = match raw.as_str() {
            "odd" => Nth { a: 2, b: 1 },
            "even" => Nth { a: 2, b: 0 },
            _ => match raw.split_once('n') {
                None => Nth {
                    a: 0,
                    b: self.integer(&raw)?,
                },
                Some((a, b)) => {
                    let a = match a {
                        "" | "+" => 1,
                        "-" => -1,
                        digits => self.integer(digits)?,
                    };
                    let b = if b.is_empty() { 0 } else { self.integer(b)? };
                    Nth { a, b }
                }
            },
        };
        Ok(nth)
    }

    fn integer(&self, text: &str) -> LocatorResult<i64> {
        text.trim_start_matches('+')
            .parse()
            .map_err(|_| self.error(format!("invalid nth expression `{text}`")))
    }

    fn ident(&mut self) -> LocatorResult<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected identifier, found `{c}`")),
                None => self.error("expected identifier"),
            });
        }
        Ok(out)
    }

    fn string(&mut self) -> LocatorResult<String> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("dangling escape")),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
