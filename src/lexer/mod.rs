//! Lexical scanning of SQL source files.
//!
//! The scanner only separates comments and quoted text from everything else,
//! so comment markers inside string literals or block comments never reach
//! the metadata parser. Scanning never fails; bytes logos cannot classify are
//! skipped.

pub mod token;

use token::{CommentLine, Token, TokenKind};
use logos::Logos;

/// Scans `source` into tokens, in source order.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        if let Ok(kind) = result {
            tokens.push(Token::new(kind, lexer.span()));
        }
    }
    tokens
}

/// Returns every `--` comment line in `source`, in source order.
pub fn comment_lines(source: &str) -> Vec<CommentLine<'_>> {
    tokenize(source)
        .into_iter()
        .filter(|token| token.kind == TokenKind::LineComment)
        .map(|token| CommentLine {
            body: &source[token.span.start + 2..token.span.end],
            start: token.span.start,
            end: token.span.end,
        })
        .collect()
}
