//! XPath text helpers shared by the compiler, the DSL and the strategies.

/// Quote `text` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences inside literals, so text containing both
/// quote characters is split into pieces and glued with `concat()`.
#[must_use]
pub fn literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }

    let mut parts = Vec::new();
    for (i, chunk) in text.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !chunk.is_empty() {
            parts.push(format!("'{chunk}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

/// Union several expressions into one (`a | b | c`).
#[must_use]
pub fn combine<S: AsRef<str>>(expressions: &[S]) -> String {
    expressions
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Whether a bare string looks like an XPath expression.
///
/// Leading `(` are ignored so positioned expressions like `(//a)[2]` count.
#[must_use]
pub fn looks_like_xpath(text: &str) -> bool {
    let trimmed = text.trim_start_matches('(');
    trimmed.starts_with("//") || trimmed.starts_with("./")
}

/// Whether a bare string looks like a CSS selector.
#[must_use]
pub fn looks_like_css(text: &str) -> bool {
    matches!(text.chars().next(), Some('#' | '.' | '['))
}

/// Whether an XPath expression is wrapped for positional indexing: one
/// parenthesized group followed only by predicates, as in `(.//a)[2]`.
///
/// `(.//a)[1]//span` is not positioned; its last step can take predicates.
#[must_use]
pub fn is_positioned(xpath: &str) -> bool {
    let xpath = xpath.trim();
    if !xpath.starts_with('(') || !looks_like_xpath(xpath) {
        return false;
    }
    let Some(close) = group_end(xpath) else {
        return false;
    };
    let mut rest = &xpath[close + 1..];
    if !rest.starts_with('[') {
        return false;
    }
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return false;
        }
        let Some(end) = group_end(rest) else {
            return false;
        };
        rest = &rest[end + 1..];
    }
    true
}

/// Top-level branches of a `|` union, trimmed. Bars inside brackets or
/// string literals don't split.
#[must_use]
pub fn union_branches(xpath: &str) -> Vec<&str> {
    let mut branches = Vec::new();
    let mut scan = Scan::default();
    let mut start = 0;
    for (i, c) in xpath.char_indices() {
        if c == '|' && scan.at_top() {
            branches.push(xpath[start..i].trim());
            start = i + 1;
        } else {
            scan.step(c);
        }
    }
    branches.push(xpath[start..].trim());
    branches
}

/// Byte index of the bracket closing the one that opens `text`
fn group_end(text: &str) -> Option<usize> {
    let mut scan = Scan::default();
    for (i, c) in text.char_indices() {
        scan.step(c);
        if scan.at_top() && matches!(c, ')' | ']') {
            return Some(i);
        }
    }
    None
}

/// Bracket depth and literal state while walking an expression
#[derive(Default)]
struct Scan {
    depth: usize,
    quote: Option<char>,
}

impl Scan {
    fn step(&mut self, c: char) {
        match (self.quote, c) {
            (Some(q), c) if c == q => self.quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => self.quote = Some(c),
            (None, '(' | '[') => self.depth += 1,
            (None, ')' | ']') => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }

    const fn at_top(&self) -> bool {
        self.depth == 0 && self.quote.is_none()
    }
}

/// Strip the leading `.` and `/` characters so the expression can follow an
/// axis (`child::`, `ancestor::`) or a `//` step.
#[must_use]
pub fn strip_axis_prefix(xpath: &str) -> &str {
    xpath.trim_start_matches(['.', '/'])
}
