//! Token types for SQL source scanning.

use crate::diag::Span;
use logos::{Lexer, Logos};
use std::fmt;

/// The kind of a lexical token in SQL source.
///
/// Only the distinctions the metadata parser needs are made: comments are
/// separated from every quoted form (so `'-- name: x'` is never a comment)
/// and everything else collapses into [`TokenKind::Text`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// `-- ...` up to (not including) the newline.
    #[regex(r"--[^\n]*")]
    LineComment,

    /// `/* ... */`, not nested.
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// `'...'` with `''` escapes. An unterminated literal runs to end of input.
    #[regex(r"'([^']|'')*'?")]
    StringLiteral,

    /// `E'...'` with backslash escapes as well as `''`.
    #[regex(r"[eE]'([^'\\]|\\(.|\n)|'')*'?")]
    EscapeString,

    /// `$$...$$` or `$tag$...$tag$`. Runs to end of input when unterminated.
    #[regex(r"\$([A-Za-z_][A-Za-z0-9_]*)?\$", dollar_quoted_body)]
    DollarQuoted,

    /// `"..."` with `""` escapes.
    #[regex(r#""([^"]|"")*"?"#)]
    QuotedIdentifier,

    /// A run of anything that cannot start a comment or a quoted token.
    #[regex(r#"[^ \t\r\n\f'"/$-]+"#)]
    Text,

    #[token("-")]
    Minus,

    #[token("/")]
    Slash,

    /// A `$` that does not open a dollar quote, as in `$1`.
    #[token("$")]
    Dollar,
}

/// Extends a dollar-quote opener through its matching closing tag.
fn dollar_quoted_body(lex: &mut Lexer<TokenKind>) {
    let tag = lex.slice();
    let rest = lex.remainder();
    let len = rest.find(tag).map_or(rest.len(), |at| at + tag.len());
    lex.bump(len);
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::StringLiteral => "string literal",
            TokenKind::EscapeString => "escape string",
            TokenKind::DollarQuoted => "dollar-quoted string",
            TokenKind::QuotedIdentifier => "quoted identifier",
            TokenKind::Text => "text",
            TokenKind::Minus => "'-'",
            TokenKind::Slash => "'/'",
            TokenKind::Dollar => "'$'",
        };
        f.write_str(name)
    }
}

/// A token with its location in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Byte range in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the token's text within `source`.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.clone()]
    }
}

/// A `--` comment line: its body (text after the dashes) and span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLine<'s> {
    /// Text after the leading `--`, untrimmed.
    pub body: &'s str,
    /// Start of the comment (the first dash).
    pub start: usize,
    /// End of the comment (exclusive).
    pub end: usize,
}

impl<'s> CommentLine<'s> {
    /// Byte range covering the whole comment including the dashes.
    pub fn span(&self) -> Span {
        self.start..self.end
    }
}
