//! CSS selector parsing.
//! Spec: <https://www.w3.org/TR/selectors-3/>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList,
    SimpleSelector, pseudo::is_pseudo_element,
};
use core::error::Error;
use core::fmt;
use core::mem::take;

/// Why a selector could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorParseError {
    /// A byte that cannot start any selector token.
    UnexpectedCharacter { position: usize, character: char },
    /// An attribute selector, functional pseudo-class or string was left open.
    Unterminated { position: usize },
    /// A `:` or `::` without a name.
    MissingPseudoName { position: usize },
}

impl fmt::Display for SelectorParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter {
                position,
                character,
            } => write!(formatter, "unexpected character {character:?} at {position}"),
            Self::Unterminated { position } => {
                write!(formatter, "unterminated selector component at {position}")
            }
            Self::MissingPseudoName { position } => {
                write!(formatter, "missing pseudo-class name at {position}")
            }
        }
    }
}

impl Error for SelectorParseError {}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
pub enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector token (type, class, id, attribute, universal, pseudo).
    Simple(SimpleSelector),
}

/// Result of reading one token.
type TokResult = Result<Tok, SelectorParseError>;

/// Tokenizer over a selector string.
pub struct SelectorTokenizer {
    /// Underlying owned bytes for the selector.
    input_bytes: Vec<u8>,
    /// Current cursor index into `input_bytes`.
    index: usize,
    /// Whether the previous token was a simple selector, so whitespace can mean "descendant".
    after_simple: bool,
}

/// Bytes that start an explicit combinator.
const fn is_combinator_byte(byte: u8) -> bool {
    matches!(byte, b'>' | b'+' | b'~')
}

/// Bytes allowed inside an identifier (escapes handled separately).
const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

impl SelectorTokenizer {
    /// Construct a tokenizer from input.
    #[inline]
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input_bytes: input.as_bytes().to_vec(),
            index: 0,
            after_simple: false,
        }
    }

    /// Byte at the cursor.
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input_bytes.get(self.index).copied()
    }

    /// Byte after the cursor.
    #[inline]
    fn peek_next(&self) -> Option<u8> {
        self.input_bytes.get(self.index.saturating_add(1)).copied()
    }

    /// Advance the cursor by `count` bytes.
    #[inline]
    fn bump(&mut self, count: usize) {
        self.index = self.index.saturating_add(count);
    }

    /// Return the next selector token, if any.
    pub(crate) fn next_token(&mut self) -> Option<TokResult> {
        let saw_whitespace = self.skip_spaces();
        let current = self.peek()?;
        if saw_whitespace && self.after_simple && !is_combinator_byte(current) && current != b','
        {
            self.after_simple = false;
            return Some(Ok(Tok::DescendantWS));
        }
        let token = match current {
            b'>' => {
                self.bump(1);
                Ok(Tok::Combinator(Combinator::Child))
            }
            b'+' => {
                self.bump(1);
                Ok(Tok::Combinator(Combinator::AdjacentSibling))
            }
            b'~' => {
                self.bump(1);
                Ok(Tok::Combinator(Combinator::GeneralSibling))
            }
            b'*' => {
                self.bump(1);
                Ok(Tok::Simple(SimpleSelector::Universal))
            }
            b'.' => self.consume_class(),
            b'#' => self.consume_id(),
            b'[' => self.consume_attr(),
            b':' => self.consume_pseudo(),
            byte if is_ident_byte(byte) || byte == b'\\' => Ok(self.consume_type()),
            _ => Err(SelectorParseError::UnexpectedCharacter {
                position: self.index,
                character: char::from(current),
            }),
        };
        self.after_simple = matches!(token, Ok(Tok::Simple(_)));
        Some(token)
    }

    /// Consume an identifier consisting of ASCII alphanumerics, '-', '_', non-ASCII and escapes.
    #[inline]
    fn consume_ident(&mut self) -> String {
        let start = self.index;
        while let Some(byte) = self.peek() {
            if byte == b'\\' {
                self.bump(2);
            } else if is_ident_byte(byte) {
                self.bump(1);
            } else {
                break;
            }
        }
        let end = self.index.min(self.input_bytes.len());
        let slice = self.input_bytes.get(start..end).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    /// Parse a type selector identifier into a `SimpleSelector::Type`.
    #[inline]
    fn consume_type(&mut self) -> Tok {
        let ident = self.consume_ident();
        Tok::Simple(SimpleSelector::Type(ident.to_ascii_lowercase()))
    }

    /// Parse a class selector following '.' into `SimpleSelector::Class`.
    #[inline]
    fn consume_class(&mut self) -> TokResult {
        let position = self.index;
        // skip '.'
        self.bump(1);
        let ident = self.consume_ident();
        if ident.is_empty() {
            return Err(SelectorParseError::UnexpectedCharacter {
                position,
                character: '.',
            });
        }
        Ok(Tok::Simple(SimpleSelector::Class(ident)))
    }

    /// Parse an id selector following '#' into `SimpleSelector::IdSelector`.
    #[inline]
    fn consume_id(&mut self) -> TokResult {
        let position = self.index;
        // skip '#'
        self.bump(1);
        let ident = self.consume_ident();
        if ident.is_empty() {
            return Err(SelectorParseError::UnexpectedCharacter {
                position,
                character: '#',
            });
        }
        Ok(Tok::Simple(SimpleSelector::IdSelector(ident)))
    }

    /// Parse `:name`, `:name(arg)`, `::name`, or `:not(arg)`.
    fn consume_pseudo(&mut self) -> TokResult {
        let position = self.index;
        self.bump(1);
        let element = self.peek() == Some(b':');
        if element {
            self.bump(1);
        }
        let name = self.consume_ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(SelectorParseError::MissingPseudoName { position });
        }
        let argument = if self.peek() == Some(b'(') {
            Some(self.consume_parenthesized()?)
        } else {
            None
        };
        let simple = if element {
            SimpleSelector::PseudoElement(name)
        } else if name == "not" {
            SimpleSelector::Negation(argument.unwrap_or_default())
        } else if argument.is_none() && is_pseudo_element(&name) {
            SimpleSelector::PseudoElement(name)
        } else {
            SimpleSelector::PseudoClass(PseudoClass { name, argument })
        };
        Ok(Tok::Simple(simple))
    }

    /// Consume a balanced `( ... )` group, returning the raw text between the parentheses.
    fn consume_parenthesized(&mut self) -> Result<String, SelectorParseError> {
        let position = self.index;
        // skip '('
        self.bump(1);
        let start = self.index;
        let mut depth = 1usize;
        let mut quote: Option<u8> = None;
        while let Some(byte) = self.peek() {
            if let Some(open) = quote {
                if byte == open {
                    quote = None;
                }
            } else {
                match byte {
                    b'"' | b'\'' => quote = Some(byte),
                    b'(' => depth = depth.saturating_add(1),
                    b')' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
                            let out = String::from_utf8_lossy(slice).into_owned();
                            self.bump(1);
                            return Ok(out);
                        }
                    }
                    _ => {}
                }
            }
            self.bump(1);
        }
        Err(SelectorParseError::Unterminated { position })
    }

    /// Parse an attribute selector: `[name]` or `[name<op>value]` (quoted or unquoted).
    fn consume_attr(&mut self) -> TokResult {
        let position = self.index;
        // skip '['
        self.bump(1);
        self.skip_spaces();
        let name = self.consume_ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(SelectorParseError::Unterminated { position });
        }
        self.skip_spaces();
        let operator = match (self.peek(), self.peek_next()) {
            (Some(b']'), _) => AttrOperator::Exists,
            (Some(b'='), _) => AttrOperator::Equals,
            (Some(b'~'), Some(b'=')) => AttrOperator::Includes,
            (Some(b'|'), Some(b'=')) => AttrOperator::DashMatch,
            (Some(b'^'), Some(b'=')) => AttrOperator::Prefix,
            (Some(b'$'), Some(b'=')) => AttrOperator::Suffix,
            (Some(b'*'), Some(b'=')) => AttrOperator::Substring,
            _ => return Err(SelectorParseError::Unterminated { position }),
        };
        let value = if operator == AttrOperator::Exists {
            String::new()
        } else {
            self.bump(operator.as_str().len());
            self.skip_spaces();
            match self.peek() {
                Some(quote @ (b'"' | b'\'')) => {
                    self.bump(1);
                    self.consume_quoted_attr_value(quote, position)?
                }
                _ => self.consume_unquoted_attr_value(),
            }
        };
        self.skip_spaces();
        // Case-sensitivity flag (`i` / `s`) is accepted and ignored.
        if self.peek().is_some_and(|byte| byte.is_ascii_alphabetic()) {
            self.consume_ident();
            self.skip_spaces();
        }
        if self.peek() != Some(b']') {
            return Err(SelectorParseError::Unterminated { position });
        }
        self.bump(1);
        Ok(Tok::Simple(SimpleSelector::Attribute {
            name,
            operator,
            value,
        }))
    }

    /// Consume an unquoted attribute value until whitespace or a closing bracket.
    #[inline]
    fn consume_unquoted_attr_value(&mut self) -> String {
        let start = self.index;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || byte == b']' {
                break;
            }
            self.bump(1);
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    /// Consume a quoted attribute value until the matching quote byte.
    #[inline]
    fn consume_quoted_attr_value(
        &mut self,
        quote: u8,
        position: usize,
    ) -> Result<String, SelectorParseError> {
        let start = self.index;
        while matches!(self.peek(), Some(byte) if byte != quote) {
            self.bump(1);
        }
        if self.peek().is_none() {
            return Err(SelectorParseError::Unterminated { position });
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        let out = String::from_utf8_lossy(slice).into_owned();
        self.bump(1);
        Ok(out)
    }

    /// Skip ASCII whitespace, returning whether any was skipped.
    #[inline]
    fn skip_spaces(&mut self) -> bool {
        let start = self.index;
        while matches!(self.peek(), Some(byte) if byte.is_ascii_whitespace()) {
            self.bump(1);
        }
        self.index != start
    }
}

/// Split a selector list on its top-level commas.
///
/// Commas inside parentheses, brackets or quoted strings do not split.
/// Empty entries are dropped and every entry is trimmed.
pub fn split_selector_list(prelude: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (index, character) in prelude.char_indices() {
        if let Some(open) = quote {
            if character == open {
                quote = None;
            }
            continue;
        }
        match character {
            '"' | '\'' => quote = Some(character),
            '(' | '[' => depth = depth.saturating_add(1),
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                if let Some(part) = prelude.get(start..index) {
                    parts.push(part);
                }
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    if let Some(part) = prelude.get(start..) {
        parts.push(part);
    }
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parse a selector list from CSS text.
/// Spec: Section 3, 4, 5–8, 11
///
/// # Errors
/// Returns the first error of any selector in the list.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorParseError> {
    let mut list = SelectorList::default();
    for part in split_selector_list(input) {
        let sel = parse_complex_selector(part)?;
        if !sel.first.simples.is_empty() || !sel.rest.is_empty() {
            list.selectors.push(sel);
        }
    }
    Ok(list)
}

/// Parse one complex selector.
/// Spec: Section 11 — Combinators; Section 5–8 — simple selectors
///
/// Dangling combinators produce empty compounds rather than errors; use
/// [`ComplexSelector::is_well_formed`] to reject them.
///
/// # Errors
/// Returns an error for characters that cannot start a selector token and for
/// unterminated attribute selectors or functional pseudo-classes.
pub fn parse_complex_selector(input: &str) -> Result<ComplexSelector, SelectorParseError> {
    let mut tokens = SelectorTokenizer::new(input);
    let mut current = CompoundSelector::default();
    let mut first: Option<CompoundSelector> = None;
    let mut rest: Vec<(Combinator, CompoundSelector)> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next_token() {
        let combinator = match token? {
            Tok::Simple(simple) => {
                current.simples.push(simple);
                continue;
            }
            Tok::Combinator(comb) => comb,
            Tok::DescendantWS => Combinator::Descendant,
        };
        let compound = take(&mut current);
        if first.is_none() {
            first = Some(compound);
        } else {
            rest.push((
                pending_combinator.unwrap_or(Combinator::Descendant),
                compound,
            ));
        }
        pending_combinator = Some(combinator);
    }

    if first.is_none() {
        first = Some(current);
    } else {
        rest.push((
            pending_combinator.unwrap_or(Combinator::Descendant),
            current,
        ));
    }

    Ok(ComplexSelector {
        first: first.unwrap_or_default(),
        rest,
    })
}
