//! CSS Syntax Module Level 3 — Parsing and tokenization.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Turns stylesheet text into flat style rules. Each rule remembers the
//! `@media` blocks it was nested in and the line it started on. Declarations
//! that cannot be parsed are kept and flagged instead of being dropped, so the
//! analysis can still report on them.
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
    /// Set when the declaration could not be parsed.
    pub parse_error: Option<String>,
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (typically the selector list).
    pub prelude: String,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
    /// Preludes of the enclosing `@media` blocks, outermost first.
    pub media: Vec<String>,
    /// One-based line the rule starts on.
    pub line: u32,
}

/// A parsed stylesheet consisting of style rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Style rules in source order, `@media` contents flattened in place.
    pub rules: Vec<StyleRule>,
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if let Some(head) = lowered.strip_suffix("important")
        && let Some(bang) = head.trim_end().strip_suffix('!')
        && let Some(prefix) = trimmed.get(..bang.len())
    {
        return (prefix.trim_end().to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Build a flagged declaration from the raw text of an item the body parser rejected.
fn flagged_declaration(raw: &str, reason: &str) -> Declaration {
    let (name, value) = raw
        .split_once(':')
        .map_or((raw, ""), |(name, value)| (name, value));
    let (value, important) = split_important_tail(value);
    Declaration {
        name: name.trim().to_ascii_lowercase(),
        value,
        important,
        parse_error: Some(reason.to_owned()),
    }
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl CssDeclarationParser<'_> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        // Consume until end of the declaration item.
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);
        let (value, important) = split_important_tail(raw);
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value,
            important,
            parse_error: None,
        })
    }
}

impl CssAtRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        _name: CowRcStr<'input>,
        _input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        // Not produced by this parser
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parser for a list of rules. Tracks the `@media` blocks it is nested in.
struct RuleListParser {
    /// Preludes of enclosing `@media` blocks, outermost first.
    media: Vec<String>,
}

impl CssAtRuleParser<'_> for RuleListParser {
    type Prelude = String;
    type AtRule = Vec<StyleRule>;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        if !name.eq_ignore_ascii_case("media") {
            return Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)));
        }
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        Ok(input.slice_from(start).trim().to_owned())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let mut media = self.media.clone();
        media.push(prelude);
        let mut nested = Self { media };
        Ok(parse_rule_list(input, &mut nested))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        // `@media` without a block has no rules to contribute.
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for RuleListParser {
    type Prelude = String; // raw selector/prelude
    type QualifiedRule = Vec<StyleRule>;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let start = input.state();
        while input.next_including_whitespace_and_comments().is_ok() {}
        Ok(input.slice_from(start.position()).trim().to_owned())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let decls = parse_declarations_from_block(input);
        Ok(vec![StyleRule {
            prelude,
            declarations: decls,
            media: self.media.clone(),
            line: state.source_location().line.saturating_add(1),
        }])
    }
}

/// Parse every rule of a rule list (a stylesheet or an `@media` block body).
fn parse_rule_list(input: &mut Parser, parser: &mut RuleListParser) -> Vec<StyleRule> {
    let mut out = Vec::new();
    for item in StyleSheetParser::new(input, parser) {
        match item {
            Ok(rules) => out.extend(rules),
            Err((error, slice)) => {
                log::debug!("Skipping unsupported CSS rule {:?}: {slice}", error.kind);
            }
        }
    }
    out
}

/// Parse declarations from a rule block using `cssparser` body parser.
fn parse_declarations_from_block(block: &mut Parser) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    let mut body = BodyDeclParser;
    for item in CssRuleBodyParser::new(block, &mut body) {
        match item {
            Ok(decl) => out.push(decl),
            Err((error, slice)) => {
                let raw = slice.trim().trim_end_matches(';');
                if raw.is_empty() {
                    continue;
                }
                log::debug!("Flagging invalid declaration {raw:?}: {:?}", error.kind);
                out.push(flagged_declaration(raw, "invalid declaration"));
            }
        }
    }
    out
}

/// Parse a full stylesheet into a `Stylesheet` using cssparser.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = RuleListParser { media: Vec::new() };
    Stylesheet {
        rules: parse_rule_list(&mut parser, &mut top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_tail_is_case_insensitive() {
        assert_eq!(
            split_important_tail("red !IMPORTANT"),
            ("red".to_owned(), true)
        );
        assert_eq!(
            split_important_tail("blue ! important"),
            ("blue".to_owned(), true)
        );
        assert_eq!(split_important_tail(" 1px "), ("1px".to_owned(), false));
    }

    #[test]
    fn flagged_declaration_keeps_name() {
        let decl = flagged_declaration("Color red", "invalid declaration");
        assert_eq!(decl.name, "color red");
        assert!(decl.parse_error.is_some());
        let decl = flagged_declaration("margin: ", "invalid declaration");
        assert_eq!(decl.name, "margin");
        assert_eq!(decl.value, "");
    }
}
