//! Recursive descent CSS parser.
//!
//! Parses stylesheet text into a [`StyleSheet`]. Errors are recovered
//! locally: a bad declaration is skipped up to the next `;` or `}`, a bad
//! selector skips the whole rule, and every skip produces a located
//! diagnostic. Parsing never fails wholesale.

use crate::diag::{Diagnostic, SourceLocation};

use super::model::{
    Combinator, CompoundSelector, Declaration, DeclarationValue, Parity, RuleSet, Selector,
    SelectorComponent, SelectorPart, Structural, StyleSheet,
};
use super::node::StateFlags;
use super::tokenizer::{tokenize, Token};

/// The result of parsing: the accepted rules plus any located warnings.
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub stylesheet: StyleSheet,
    pub diagnostics: Vec<Diagnostic>,
}

/// A positioned token with byte-level span information.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    byte_start: usize,
    byte_end: usize,
}

/// Blank out block comments (`/* ... */`) in place, preserving byte
/// offsets so diagnostics still point into the original source.
fn blank_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = input.as_bytes().to_vec();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        if i + 1 < len && bytes[i] == b'/' && bytes[i + 1] == b'*' {
            let start = i;
            i += 2;
            while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            let end = if i + 1 < len { i + 2 } else { len };
            for b in result.iter_mut().take(end).skip(start) {
                if *b != b'\n' {
                    *b = b' ';
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }

    // Input was valid UTF-8 and only ASCII bytes were replaced.
    String::from_utf8(result).expect("comment blanking preserves utf-8")
}

/// Parse a stylesheet, recovering from local errors.
pub fn parse_css(input: &str) -> ParseOutput {
    let cleaned = blank_comments(input);
    let tokens: Vec<PToken> = tokenize(&cleaned)
        .into_iter()
        .map(|(token, text, span)| PToken {
            token,
            text,
            byte_start: span.start,
            byte_end: span.end,
        })
        .collect();

    let mut parser = Parser {
        source: &cleaned,
        tokens,
        cursor: 0,
        diagnostics: Vec::new(),
    };

    let mut rules = Vec::new();
    while !parser.is_eof() {
        if let Some(rule) = parser.parse_rule() {
            rules.push(rule);
        }
    }

    ParseOutput {
        stylesheet: StyleSheet { rules },
        diagnostics: parser.diagnostics,
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<PToken>,
    cursor: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn current_offset(&self) -> usize {
        self.peek()
            .map(|t| t.byte_start)
            .unwrap_or(self.source.len())
    }

    fn warn_at(&mut self, message: impl Into<String>, offset: usize) {
        let location = SourceLocation::at(self.source, offset);
        self.diagnostics
            .push(Diagnostic::parse_warning(message, location));
    }

    /// Whether the current token starts immediately after the previous one
    /// (no whitespace gap). Used to split compound selectors from
    /// descendant combinators.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        match self.peek() {
            Some(curr) => curr.byte_start == prev.byte_end,
            None => false,
        }
    }

    /// Skip tokens until just past the closing brace of the current rule.
    fn recover_past_rule(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.advance() {
            match tok.token {
                Token::BraceOpen => depth += 1,
                Token::BraceClose => {
                    if depth <= 1 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    /// Skip tokens until just past the next `;`, or stop before `}`.
    fn recover_past_declaration(&mut self) {
        while let Some(tok) = self.peek() {
            match tok.token {
                Token::Semicolon => {
                    self.advance();
                    return;
                }
                Token::BraceClose => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Parse a rule: selectors `{` declarations `}`. Returns `None` and
    /// recovers when the selector list is malformed.
    fn parse_rule(&mut self) -> Option<RuleSet> {
        let rule_offset = self.current_offset();
        let selectors = match self.parse_selector_list() {
            Ok(s) => s,
            Err(message) => {
                self.warn_at(message, rule_offset);
                self.recover_past_rule();
                return None;
            }
        };

        match self.peek() {
            Some(t) if t.token == Token::BraceOpen => {
                self.advance();
            }
            _ => {
                self.warn_at("expected '{' after selector", self.current_offset());
                self.recover_past_rule();
                return None;
            }
        }

        let declarations = self.parse_declarations();

        match self.peek() {
            Some(t) if t.token == Token::BraceClose => {
                self.advance();
            }
            _ => {
                self.warn_at("unclosed rule", self.current_offset());
            }
        }

        Some(RuleSet {
            selectors,
            declarations,
        })
    }

    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, String> {
        let mut selectors = vec![self.parse_selector()?];
        while self.peek().is_some_and(|t| t.token == Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }
        Ok(selectors)
    }

    fn parse_selector(&mut self) -> Result<Selector, String> {
        let mut parts = Vec::new();
        parts.push(SelectorPart::Compound(self.parse_compound_selector()?));

        loop {
            match self.peek() {
                Some(t) if t.token == Token::GreaterThan => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::Child));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                Some(t) if t.token == Token::Plus => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::NextSibling));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                Some(t) if t.token == Token::Tilde => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::SubsequentSibling));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                // A selector-starting token after whitespace is a
                // descendant combinator; if adjacent it would have been
                // consumed by the previous compound.
                Some(t)
                    if matches!(
                        t.token,
                        Token::Ident
                            | Token::Hash
                            | Token::Dot
                            | Token::Star
                            | Token::PseudoClass
                    ) =>
                {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }

        Ok(Selector { parts })
    }

    /// Parse one compound selector, e.g. `button.suggested:hover`.
    /// Adjacency (byte spans) decides where the compound ends.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, String> {
        let mut compound = CompoundSelector::new();
        self.parse_simple_selector(&mut compound)?;
        while self.is_adjacent() {
            match self.peek().map(|t| &t.token) {
                Some(Token::Dot | Token::Hash | Token::PseudoClass) => {
                    self.parse_simple_selector(&mut compound)?;
                }
                _ => break,
            }
        }
        Ok(compound)
    }

    fn parse_simple_selector(&mut self, compound: &mut CompoundSelector) -> Result<(), String> {
        match self.peek().map(|t| t.token.clone()) {
            Some(Token::Ident) => {
                let name = self.advance().expect("peeked").text;
                compound.push(SelectorComponent::Type(name));
            }
            Some(Token::Star) => {
                self.advance();
                compound.push(SelectorComponent::Universal);
            }
            Some(Token::Dot) => {
                self.advance();
                let tok = self.advance().ok_or("expected class name after '.'")?;
                if tok.token != Token::Ident {
                    return Err(format!("expected class name, got '{}'", tok.text));
                }
                compound.push(SelectorComponent::Class(tok.text));
            }
            Some(Token::Hash) => {
                self.advance();
                let tok = self.advance().ok_or("expected id name after '#'")?;
                if tok.token != Token::Ident {
                    return Err(format!("expected id name, got '{}'", tok.text));
                }
                compound.push(SelectorComponent::Id(tok.text));
            }
            Some(Token::PseudoClass) => {
                let tok = self.advance().expect("peeked");
                let name = tok.text[1..].to_string();
                compound.push(self.parse_pseudo_class(&name)?);
            }
            _ => return Err("expected selector".into()),
        }
        Ok(())
    }

    fn parse_pseudo_class(&mut self, name: &str) -> Result<SelectorComponent, String> {
        let state = match name {
            "hover" => Some(StateFlags::HOVER),
            "active" => Some(StateFlags::ACTIVE),
            "focus" | "focused" => Some(StateFlags::FOCUSED),
            "disabled" => Some(StateFlags::DISABLED),
            "insensitive" => Some(StateFlags::INSENSITIVE),
            "backdrop" => Some(StateFlags::BACKDROP),
            "checked" => Some(StateFlags::CHECKED),
            "selected" => Some(StateFlags::SELECTED),
            "drop-active" => Some(StateFlags::DROP_ACTIVE),
            _ => None,
        };
        if let Some(state) = state {
            return Ok(SelectorComponent::State(state));
        }
        match name {
            "first-child" => Ok(SelectorComponent::Structural(Structural::FirstChild)),
            "last-child" => Ok(SelectorComponent::Structural(Structural::LastChild)),
            "nth-child" => {
                // :nth-child(odd|even)
                match self.peek().map(|t| &t.token) {
                    Some(Token::ParenOpen) => {
                        self.advance();
                    }
                    _ => return Err("expected '(' after :nth-child".into()),
                }
                let arg = self.advance().ok_or("expected nth-child argument")?;
                let parity = match (arg.token, arg.text.as_str()) {
                    (Token::Ident, "odd") => Parity::Odd,
                    (Token::Ident, "even") => Parity::Even,
                    (_, other) => {
                        return Err(format!("unsupported nth-child argument '{other}'"))
                    }
                };
                match self.advance() {
                    Some(t) if t.token == Token::ParenClose => {}
                    _ => return Err("expected ')' after nth-child argument".into()),
                }
                Ok(SelectorComponent::Structural(Structural::NthChild(parity)))
            }
            other => Err(format!("unknown pseudo-class ':{other}'")),
        }
    }

    /// Parse declarations until `}`. A malformed declaration is warned
    /// about and skipped; the rest of the block is still parsed. Custom
    /// properties are accepted syntactically but dropped with a warning.
    fn parse_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        loop {
            match self.peek().map(|t| t.token.clone()) {
                None | Some(Token::BraceClose) => break,
                Some(Token::Semicolon) => {
                    self.advance();
                }
                Some(Token::CustomProperty) => {
                    let tok = self.advance().expect("peeked");
                    self.warn_at(
                        format!("custom property '{}' is not supported", tok.text),
                        tok.byte_start,
                    );
                    self.recover_past_declaration();
                }
                Some(Token::Ident) => {
                    let offset = self.current_offset();
                    match self.parse_declaration(offset) {
                        Ok(declaration) => declarations.push(declaration),
                        Err(message) => {
                            self.warn_at(message, offset);
                            self.recover_past_declaration();
                        }
                    }
                }
                Some(_) => {
                    let offset = self.current_offset();
                    self.warn_at("expected property name", offset);
                    self.recover_past_declaration();
                }
            }
        }

        declarations
    }

    fn parse_declaration(&mut self, offset: usize) -> Result<Declaration, String> {
        let property = self.advance().expect("caller checked Ident").text;
        match self.advance() {
            Some(t) if t.token == Token::Colon => {}
            _ => return Err(format!("expected ':' after '{property}'")),
        }

        let mut values = Vec::new();
        let mut important = false;
        loop {
            match self.peek().map(|t| t.token.clone()) {
                None | Some(Token::Semicolon) | Some(Token::BraceClose) => break,
                Some(Token::Important) => {
                    self.advance();
                    important = true;
                }
                Some(Token::Ident) => {
                    let text = self.advance().expect("peeked").text;
                    values.push(DeclarationValue::Ident(text));
                }
                Some(Token::Number) => {
                    let text = self.advance().expect("peeked").text;
                    let number: f64 = text.parse().map_err(|_| "malformed number")?;
                    values.push(DeclarationValue::Number(number));
                }
                Some(Token::Dimension) => {
                    let text = self.advance().expect("peeked").text;
                    let split = text
                        .find(|c: char| c.is_ascii_alphabetic() || c == '%')
                        .expect("dimension has a unit");
                    let number: f64 = text[..split].parse().map_err(|_| "malformed dimension")?;
                    values.push(DeclarationValue::Dimension(number, text[split..].to_string()));
                }
                Some(Token::HexColor) => {
                    let text = self.advance().expect("peeked").text;
                    values.push(DeclarationValue::Color(text[1..].to_string()));
                }
                Some(Token::StringLiteral) | Some(Token::StringLiteralSingle) => {
                    let text = self.advance().expect("peeked").text;
                    values.push(DeclarationValue::String(
                        text[1..text.len() - 1].to_string(),
                    ));
                }
                Some(other) => {
                    return Err(format!("unexpected {other:?} in value of '{property}'"));
                }
            }
        }

        if values.is_empty() {
            return Err(format!("missing value for '{property}'"));
        }

        Ok(Declaration {
            property,
            values,
            important,
            offset,
        })
    }
}
