//! Minimal XML element reader for the legacy UI dialect.
//!
//! Handles what the compiler emits: a prolog, nested elements with quoted
//! attributes, text, comments, CDATA and the predefined entities. No
//! namespaces, no DTD processing.

use crate::error::BuildError;

/// Deepest element nesting accepted, matching serde_json's recursion limit.
pub const MAX_DEPTH: usize = 128;

/// A parsed XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
    pub line: usize,
    pub col: usize,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text content of this element.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of the first child with the given tag.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text)
    }

    /// Depth-first search for the first descendant (or self) with the tag.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Parse a whole document and return its root element.
pub fn parse_document(source: &str) -> Result<Element, BuildError> {
    let mut reader = Reader::new(source);
    reader.skip_misc()?;
    if reader.is_at_end() {
        return Err(BuildError::parse("document has no root element", reader.line, reader.col));
    }
    let root = reader.parse_element()?;
    reader.skip_misc()?;
    if !reader.is_at_end() {
        return Err(BuildError::parse(
            "unexpected content after root element",
            reader.line,
            reader.col,
        ));
    }
    Ok(root)
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    depth: usize,
}

impl Reader {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            depth: 0,
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for ch in s.chars() {
            if self.chars.get(i) != Some(&ch) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> BuildError {
        BuildError::parse(message, self.line, self.col)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consume everything up to and including `terminator`.
    fn skip_until(&mut self, terminator: &str, what: &str) -> Result<String, BuildError> {
        let (line, col) = (self.line, self.col);
        let mut skipped = String::new();
        while !self.is_at_end() {
            if self.starts_with(terminator) {
                self.advance_by(terminator.chars().count());
                return Ok(skipped);
            }
            if let Some(ch) = self.advance() {
                skipped.push(ch);
            }
        }
        Err(BuildError::parse(format!("unclosed {what}"), line, col))
    }

    /// Skip whitespace, comments, processing instructions and doctype.
    fn skip_misc(&mut self) -> Result<(), BuildError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_until("?>", "processing instruction")?;
            } else if self.starts_with("<!--") {
                self.skip_until("-->", "comment")?;
            } else if self.starts_with("<!") {
                self.skip_until(">", "declaration")?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_name(&mut self) -> Result<String, BuildError> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':') {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a name"));
        }
        Ok(name)
    }

    fn parse_element(&mut self) -> Result<Element, BuildError> {
        let (line, col) = (self.line, self.col);
        if self.advance() != Some('<') {
            return Err(BuildError::parse("expected '<'", line, col));
        }
        let name = self.parse_name()?;
        let mut element = Element {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
            line,
            col,
        };

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('/') => {
                    self.advance();
                    if self.advance() != Some('>') {
                        return Err(self.error("expected '>' after '/'"));
                    }
                    return Ok(element);
                }
                Some('>') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    let key = self.parse_name()?;
                    self.skip_whitespace();
                    if self.advance() != Some('=') {
                        return Err(self.error(format!("expected '=' after attribute '{key}'")));
                    }
                    self.skip_whitespace();
                    let value = self.parse_quoted()?;
                    element.attributes.push((key, value));
                }
                None => {
                    return Err(BuildError::parse(
                        format!("unclosed tag <{}>", element.name),
                        line,
                        col,
                    ))
                }
            }
        }

        self.parse_content(&mut element)?;
        Ok(element)
    }

    fn parse_quoted(&mut self) -> Result<String, BuildError> {
        let (line, col) = (self.line, self.col);
        let quote = match self.advance() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(BuildError::parse("expected quoted attribute value", line, col)),
        };
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(BuildError::parse("unclosed attribute value", line, col)),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some('&') => value.push_str(&self.parse_entity()?),
                Some(_) => {
                    if let Some(ch) = self.advance() {
                        value.push(ch);
                    }
                }
            }
        }
    }

    fn parse_content(&mut self, element: &mut Element) -> Result<(), BuildError> {
        loop {
            if self.is_at_end() {
                return Err(BuildError::parse(
                    format!("missing </{}>", element.name),
                    element.line,
                    element.col,
                ));
            }
            if self.starts_with("</") {
                self.advance_by(2);
                let closing = self.parse_name()?;
                if closing != element.name {
                    return Err(self.error(format!(
                        "mismatched closing tag: expected </{}>, found </{closing}>",
                        element.name
                    )));
                }
                self.skip_whitespace();
                if self.advance() != Some('>') {
                    return Err(self.error("expected '>'"));
                }
                return Ok(());
            } else if self.starts_with("<!--") {
                self.skip_until("-->", "comment")?;
            } else if self.starts_with("<![CDATA[") {
                self.advance_by(9);
                let data = self.skip_until("]]>", "CDATA section")?;
                element.text.push_str(&data);
            } else if self.starts_with("<") {
                if self.depth >= MAX_DEPTH {
                    return Err(self.error(format!("elements nested deeper than {MAX_DEPTH}")));
                }
                self.depth += 1;
                let child = self.parse_element();
                self.depth -= 1;
                element.children.push(child?);
            } else if self.peek() == Some('&') {
                let decoded = self.parse_entity()?;
                element.text.push_str(&decoded);
            } else if let Some(ch) = self.advance() {
                element.text.push(ch);
            }
        }
    }

    fn parse_entity(&mut self) -> Result<String, BuildError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // consume '&'
        let mut name = String::new();
        loop {
            match self.advance() {
                Some(';') => break,
                Some(ch) if name.len() < 10 => name.push(ch),
                _ => return Err(BuildError::parse("unterminated entity", line, col)),
            }
        }
        let decoded = match name.as_str() {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = name.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = name.strip_prefix('#') {
                    dec.parse().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32).ok_or_else(|| {
                    BuildError::parse(format!("unknown entity '&{name};'"), line, col)
                })?
            }
        };
        Ok(decoded.to_string())
    }
}
