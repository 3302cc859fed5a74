//! Recursive-descent parser over the zero-copy lexer.
//!
//! Split by concern:
//! - [`lexer`] — tokens, indentation, string scanning
//! - `expr` — precedence-climbing expression grammar
//! - `stmt` — statement dispatch, suites, definitions
//! - `fstring` — interpolated-string segmentation and re-entrant
//!   expression parsing
//!
//! The parser is fail-fast: the first [`ParseError`] aborts the whole parse.

pub mod lexer;

mod expr;
mod fstring;
mod stmt;

use crate::ast::{Module, Span};
use crate::error::{ParseError, ParseResult};
use lexer::{Lexer, Token, TokenAt};

/// Hard ceiling on expression nesting, so pathological inputs fail with a
/// diagnostic instead of exhausting the stack.
const MAX_EXPR_DEPTH: u32 = 512;

/// Hard ceiling on interpolated-string nesting (f-string inside f-string
/// expression inside …).
const MAX_INTERP_DEPTH: u32 = 32;

/// Parse a complete Python module.
pub fn parse(src: &str) -> ParseResult<Module<'_>> {
    Parser::new(src).parse_module()
}

pub(crate) struct Parser<'src> {
    lex: Lexer<'src>,
    /// Current expression/suite nesting depth, bounded by [`MAX_EXPR_DEPTH`].
    depth: u32,
    /// Interpolated-string nesting depth, bounded by [`MAX_INTERP_DEPTH`].
    interp_depth: u32,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(src: &'src str) -> Self {
        Self {
            lex: Lexer::new(src),
            depth: 0,
            interp_depth: 0,
        }
    }

    /// Parser over an interpolated-string expression fragment.  Spans are
    /// biased by `base` so they reference the enclosing source.
    pub(crate) fn for_interpolation(fragment: &'src str, base: u32, interp_depth: u32) -> Self {
        Self {
            lex: Lexer::for_interpolation(fragment, base),
            depth: 0,
            interp_depth,
        }
    }

    // ── token plumbing ────────────────────────────────────────────────────────

    /// Clone of the next token.  Tokens only hold `Copy` data and borrowed
    /// slices, so cloning is cheap and sidesteps borrow conflicts in match
    /// arms that consume.
    fn peek(&mut self) -> ParseResult<Token<'src>> {
        Ok(self.lex.peek()?.clone())
    }

    fn peek_span(&mut self) -> ParseResult<Span> {
        self.lex.peek_span()
    }

    fn bump(&mut self) -> ParseResult<TokenAt<'src>> {
        self.lex.consume()
    }

    fn eat(&mut self, tok: &Token<'src>) -> ParseResult<bool> {
        self.lex.eat(tok)
    }

    /// Consume the next token, requiring it to equal `expected`.
    /// `what` names the expectation for the error message.
    fn expect(&mut self, expected: &Token<'src>, what: &str) -> ParseResult<Span> {
        let t = self.lex.consume()?;
        if t.token == *expected {
            Ok(t.span)
        } else {
            Err(ParseError::syntax(
                format!("expected {what}, found {}", t.token.describe()),
                t.span,
            ))
        }
    }

    /// Consume an identifier token.
    fn expect_name(&mut self, what: &str) -> ParseResult<(&'src str, Span)> {
        let t = self.lex.consume()?;
        match t.token {
            Token::Name(n) => Ok((n, t.span)),
            other => Err(ParseError::syntax(
                format!("expected {what}, found {}", other.describe()),
                t.span,
            )),
        }
    }

    /// True when the next token terminates a simple statement.
    fn at_stmt_end(&mut self) -> ParseResult<bool> {
        Ok(matches!(
            self.lex.peek()?,
            Token::Newline | Token::Semicolon | Token::Dedent | Token::Eof
        ))
    }

    // ── nesting guard ─────────────────────────────────────────────────────────

    fn enter(&mut self, span: Span) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPR_DEPTH {
            return Err(ParseError::syntax("expression nesting too deep", span));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StmtKind;

    #[test]
    fn test_parse_empty_module() {
        let m = parse("").expect("empty module parses");
        assert!(m.body.is_empty());
    }

    #[test]
    fn test_parse_blank_lines_and_comments() {
        let m = parse("\n\n# just a comment\n\n").expect("blank module parses");
        assert!(m.body.is_empty());
    }

    #[test]
    fn test_parse_simple_module() {
        let m = parse("import os\n\nx = 1\n").expect("module parses");
        assert_eq!(m.body.len(), 2);
        assert!(matches!(m.body[0].kind, StmtKind::Import(_)));
        assert!(matches!(m.body[1].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn test_first_error_aborts() {
        let err = parse("x = (\ny = 1\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lexical);
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let mut src = String::from("x = ");
        for _ in 0..2000 {
            src.push('(');
        }
        src.push('1');
        for _ in 0..2000 {
            src.push(')');
        }
        src.push('\n');
        let err = parse(&src).unwrap_err();
        assert!(err.message.contains("nesting too deep"));
    }
}
