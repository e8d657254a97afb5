//! logos-based CSS tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `#fff` as HexColor beats `#` as Hash)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Our ordering ensures:
//! - `#ff00aa` matches [`Token::HexColor`], not `Hash` + `Ident`
//! - `12px` matches [`Token::Dimension`], not `Number` + `Ident`
//! - `:hover` matches [`Token::PseudoClass`], not `Colon` + `Ident`
//! - `--accent` matches [`Token::CustomProperty`], not punctuation + `Ident`

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// `!important` flag.
    #[token("!important")]
    Important,

    /// CSS hex color: `#fff`, `#ff00aa`, `#ff00aa80` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Dimension: number with unit suffix like `12px`, `1.5em`, `2rem`,
    /// `50%`, `250ms`, `1s`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?(px|pt|em|rem|%|ms|s)")]
    Dimension,

    /// Custom property name: `--accent-color`.
    #[regex(r"--[a-zA-Z_][a-zA-Z0-9_-]*")]
    CustomProperty,

    /// Pseudo-class: `:hover`, `:focus`, `:first-child`, etc. The
    /// `nth-child` argument list is tokenized separately via parens.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Number: integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: property names, selector names, color names, etc.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,

    /// `+`
    #[token("+")]
    Plus,

    /// `~`
    #[token("~")]
    Tilde,
}

/// Tokenize a CSS string into `(token, text, byte span)` triples.
///
/// Tokens that fail to lex are skipped; the parser reports unknown syntax
/// at the declaration level where it has enough context for a location.
pub fn tokenize(input: &str) -> Vec<(Token, String, std::ops::Range<usize>)> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| {
            result
                .ok()
                .map(|token| (token, input[span.clone()].to_string(), span))
        })
        .collect()
}
