//! Zero-copy Python lexer.
//!
//! Produces [`Token`] variants that borrow `&'src str` slices directly from
//! the source buffer — no heap allocation for identifiers, numbers, or raw
//! string content.
//!
//! Handles:
//! - All keyword tokens
//! - INDENT / DEDENT via an indentation stack
//! - Implicit line continuation inside `(`, `[`, `{`
//! - Explicit line continuation via trailing `\`
//! - All string literal forms: single/triple-quoted, raw, bytes, and the two
//!   interpolating styles (`f`-strings and `t`-strings)
//! - Comments (skipped)
//! - Maximal-munch operator recognition (`**=` before `**` before `*`)
//!
//! Unlike a scanner that degrades gracefully, every malformed input — an
//! unterminated string, a dedent to a never-seen column, an invalid
//! character — is a [`ParseError`] with the offending span.  Tokens are
//! produced lazily, one at a time.

use crate::ast::{Operator, Span};
use crate::error::{ParseError, ParseResult};

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Literals
    Name(&'src str),
    /// Numeric literal, raw source text.
    Number(&'src str),
    /// A non-interpolating string literal.  The `&str` is the *raw source*
    /// slice including delimiters and prefix.
    Str(&'src str),
    /// An f-string — raw source slice, segmented later by the
    /// interpolated-string engine.
    FStr(&'src str),
    /// A t-string — same scanning as [`Token::FStr`], distinct node kind
    /// downstream.
    TStr(&'src str),

    // Structural
    Newline,
    Indent,
    Dedent,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Ellipsis,
    Arrow,
    At,
    Assign, // =
    Walrus, // :=

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    LShift,
    RShift,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    /// `+=`, `-=`, `**=`, … — carries the underlying operator.
    AugAssign(Operator),

    // Keywords
    KwFalse,
    KwNone,
    KwTrue,
    KwAnd,
    KwAs,
    KwAssert,
    KwAsync,
    KwAwait,
    KwBreak,
    KwClass,
    KwContinue,
    KwDef,
    KwDel,
    KwElif,
    KwElse,
    KwExcept,
    KwFinally,
    KwFor,
    KwFrom,
    KwGlobal,
    KwIf,
    KwImport,
    KwIn,
    KwIs,
    KwLambda,
    KwNonlocal,
    KwNot,
    KwOr,
    KwPass,
    KwRaise,
    KwReturn,
    KwTry,
    KwWhile,
    KwWith,
    KwYield,

    Eof,
}

impl Token<'_> {
    /// Short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Name(n) => format!("'{n}'"),
            Token::Number(n) => format!("number '{n}'"),
            Token::Str(_) => "string literal".to_string(),
            Token::FStr(_) => "f-string literal".to_string(),
            Token::TStr(_) => "t-string literal".to_string(),
            Token::Newline => "end of line".to_string(),
            Token::Indent => "indent".to_string(),
            Token::Dedent => "dedent".to_string(),
            Token::Eof => "end of file".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Ellipsis => "'...'".to_string(),
            Token::Arrow => "'->'".to_string(),
            Token::At => "'@'".to_string(),
            Token::Assign => "'='".to_string(),
            Token::Walrus => "':='".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::DoubleStar => "'**'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::DoubleSlash => "'//'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Amp => "'&'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::Tilde => "'~'".to_string(),
            Token::LShift => "'<<'".to_string(),
            Token::RShift => "'>>'".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::AugAssign(_) => "augmented assignment".to_string(),
            Token::KwFalse => "'False'".to_string(),
            Token::KwNone => "'None'".to_string(),
            Token::KwTrue => "'True'".to_string(),
            Token::KwAnd => "'and'".to_string(),
            Token::KwAs => "'as'".to_string(),
            Token::KwAssert => "'assert'".to_string(),
            Token::KwAsync => "'async'".to_string(),
            Token::KwAwait => "'await'".to_string(),
            Token::KwBreak => "'break'".to_string(),
            Token::KwClass => "'class'".to_string(),
            Token::KwContinue => "'continue'".to_string(),
            Token::KwDef => "'def'".to_string(),
            Token::KwDel => "'del'".to_string(),
            Token::KwElif => "'elif'".to_string(),
            Token::KwElse => "'else'".to_string(),
            Token::KwExcept => "'except'".to_string(),
            Token::KwFinally => "'finally'".to_string(),
            Token::KwFor => "'for'".to_string(),
            Token::KwFrom => "'from'".to_string(),
            Token::KwGlobal => "'global'".to_string(),
            Token::KwIf => "'if'".to_string(),
            Token::KwImport => "'import'".to_string(),
            Token::KwIn => "'in'".to_string(),
            Token::KwIs => "'is'".to_string(),
            Token::KwLambda => "'lambda'".to_string(),
            Token::KwNonlocal => "'nonlocal'".to_string(),
            Token::KwNot => "'not'".to_string(),
            Token::KwOr => "'or'".to_string(),
            Token::KwPass => "'pass'".to_string(),
            Token::KwRaise => "'raise'".to_string(),
            Token::KwReturn => "'return'".to_string(),
            Token::KwTry => "'try'".to_string(),
            Token::KwWhile => "'while'".to_string(),
            Token::KwWith => "'with'".to_string(),
            Token::KwYield => "'yield'".to_string(),
        }
    }
}

// ── TokenAt ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TokenAt<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

pub struct Lexer<'src> {
    src: &'src [u8],
    /// The same source as a `&str` — used for safe UTF-8 slicing without `unsafe`.
    src_str: &'src str,
    /// Current byte position within the fragment.
    pos: usize,
    /// Offset bias added to every emitted span.  Zero for a whole-module
    /// parse; nonzero when re-lexing an interpolated-string fragment so its
    /// spans reference the original source.
    base: u32,
    /// Indentation stack of column widths; always starts with [0].
    indent_stack: Vec<usize>,
    /// How many DEDENT tokens remain to be emitted.
    pending_dedents: usize,
    /// Whether the next logical line should trigger indent/dedent analysis.
    at_line_start: bool,
    /// Nesting depth of `()`, `[]`, `{}`.  When above `floor_depth`,
    /// newlines are ignored.
    bracket_depth: i32,
    /// Initial bracket depth.  1 for interpolation fragments, which behave
    /// like the inside of a parenthesised expression.
    floor_depth: i32,
    /// One-token lookahead buffer.
    peeked: Option<TokenAt<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src: src.as_bytes(),
            src_str: src,
            pos: 0,
            base: 0,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: true,
            bracket_depth: 0,
            floor_depth: 0,
            peeked: None,
        }
    }

    /// Lexer over an interpolated-string expression fragment.  `base` is the
    /// byte offset of the fragment within the original source, so spans stay
    /// meaningful.  The fragment is treated as bracket-enclosed: newlines
    /// are soft and no indentation tracking happens.
    pub fn for_interpolation(fragment: &'src str, base: u32) -> Self {
        Self {
            src: fragment.as_bytes(),
            src_str: fragment,
            pos: 0,
            base,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: false,
            bracket_depth: 1,
            floor_depth: 1,
            peeked: None,
        }
    }

    pub fn source_str(&self) -> &'src str {
        self.src_str
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    // ── public interface ──────────────────────────────────────────────────────

    /// Return (but do not consume) the next token.
    pub fn peek(&mut self) -> ParseResult<&Token<'src>> {
        if self.peeked.is_none() {
            let t = self.next_inner()?;
            self.peeked = Some(t);
        }
        Ok(&self
            .peeked
            .as_ref()
            .expect("peeked is always Some after the fill above")
            .token)
    }

    /// Return (but do not consume) the next token's span.
    pub fn peek_span(&mut self) -> ParseResult<Span> {
        if self.peeked.is_none() {
            let t = self.next_inner()?;
            self.peeked = Some(t);
        }
        Ok(self
            .peeked
            .as_ref()
            .expect("peeked is always Some after the fill above")
            .span)
    }

    /// Consume and return the next token with its span.
    pub fn consume(&mut self) -> ParseResult<TokenAt<'src>> {
        match self.peeked.take() {
            Some(t) => Ok(t),
            None => self.next_inner(),
        }
    }

    /// Consume the next token and return just the token (discards span).
    pub fn bump(&mut self) -> ParseResult<Token<'src>> {
        Ok(self.consume()?.token)
    }

    /// Consume the next token only if it matches `expected`.
    /// Returns `true` if it matched and was consumed.
    pub fn eat(&mut self, expected: &Token<'src>) -> ParseResult<bool> {
        if self.peek()? == expected {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ── span helpers ──────────────────────────────────────────────────────────

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base + start as u32, self.base + end as u32)
    }

    fn here(&self) -> Span {
        self.span(self.pos, (self.pos + 1).min(self.src.len()))
    }

    fn at(&self, token: Token<'src>, start: usize) -> TokenAt<'src> {
        TokenAt {
            token,
            span: self.span(start, self.pos),
        }
    }

    // ── internal tokenisation ────────────────────────────────────────────────

    fn next_inner(&mut self) -> ParseResult<TokenAt<'src>> {
        // Emit pending DEDENT tokens before reading more source.
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Ok(self.at(Token::Dedent, self.pos));
        }

        loop {
            // At the start of a logical line (not inside brackets), handle
            // indentation.
            if self.at_line_start && self.bracket_depth == self.floor_depth {
                self.at_line_start = false;
                if let Some(tok) = self.handle_indent()? {
                    return Ok(tok);
                }
                if self.pending_dedents > 0 {
                    self.pending_dedents -= 1;
                    return Ok(self.at(Token::Dedent, self.pos));
                }
            }

            if self.pos >= self.src.len() {
                if self.bracket_depth > self.floor_depth {
                    return Err(ParseError::lexical(
                        "unexpected end of file inside brackets",
                        self.span(self.pos, self.pos),
                    ));
                }
                // Flush remaining DEDENT tokens before EOF.
                if self.indent_stack.len() > 1 {
                    self.pending_dedents = self.indent_stack.len() - 2;
                    self.indent_stack.truncate(1);
                    return Ok(self.at(Token::Dedent, self.pos));
                }
                return Ok(self.at(Token::Eof, self.pos));
            }

            let start = self.pos;
            let b = self.src[self.pos];

            // ── Skip whitespace (not newlines) ────────────────────────────
            if b == b' ' || b == b'\t' || b == b'\r' || b == 0x0c {
                self.pos += 1;
                continue;
            }

            // ── Newline ───────────────────────────────────────────────────
            if b == b'\n' {
                self.pos += 1;
                if self.bracket_depth > self.floor_depth {
                    // Inside brackets: implicit continuation.
                    continue;
                }
                self.at_line_start = true;
                return Ok(self.at(Token::Newline, start));
            }

            // ── Explicit line continuation ────────────────────────────────
            if b == b'\\' {
                self.pos += 1;
                if self.pos < self.src.len() && self.src[self.pos] == b'\r' {
                    self.pos += 1;
                }
                if self.pos < self.src.len() && self.src[self.pos] == b'\n' {
                    self.pos += 1;
                    continue;
                }
                return Err(ParseError::lexical(
                    "unexpected character after line continuation",
                    self.span(start, self.pos),
                ));
            }

            // ── Comment ───────────────────────────────────────────────────
            if b == b'#' {
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            // ── String literals ───────────────────────────────────────────
            if self.is_string_start() {
                return self.lex_string(start);
            }

            // ── Numbers ───────────────────────────────────────────────────
            if b.is_ascii_digit()
                || (b == b'.'
                    && self
                        .src
                        .get(self.pos + 1)
                        .copied()
                        .is_some_and(|c| c.is_ascii_digit()))
            {
                return self.lex_number(start);
            }

            // ── Identifiers and keywords ──────────────────────────────────
            if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 {
                return Ok(self.lex_name(start));
            }

            // ── Operators and punctuation ─────────────────────────────────
            return self.lex_operator(start);
        }
    }

    fn lex_operator(&mut self, start: usize) -> ParseResult<TokenAt<'src>> {
        let b = self.src[self.pos];
        self.pos += 1;
        let next = self.src.get(self.pos).copied();
        let tok = match b {
            b'(' => {
                self.bracket_depth += 1;
                Token::LParen
            }
            b')' => {
                self.bracket_depth = (self.bracket_depth - 1).max(self.floor_depth);
                Token::RParen
            }
            b'[' => {
                self.bracket_depth += 1;
                Token::LBracket
            }
            b']' => {
                self.bracket_depth = (self.bracket_depth - 1).max(self.floor_depth);
                Token::RBracket
            }
            b'{' => {
                self.bracket_depth += 1;
                Token::LBrace
            }
            b'}' => {
                self.bracket_depth = (self.bracket_depth - 1).max(self.floor_depth);
                Token::RBrace
            }
            b',' => Token::Comma,
            b';' => Token::Semicolon,
            b'~' => Token::Tilde,
            b'@' => Token::At,
            b'=' => {
                if next == Some(b'=') {
                    self.pos += 1;
                    Token::EqEq
                } else {
                    Token::Assign
                }
            }
            b'!' => {
                if next == Some(b'=') {
                    self.pos += 1;
                    Token::NotEq
                } else {
                    return Err(ParseError::lexical(
                        "invalid character '!'",
                        self.span(start, self.pos),
                    ));
                }
            }
            b':' => {
                if next == Some(b'=') {
                    self.pos += 1;
                    Token::Walrus
                } else {
                    Token::Colon
                }
            }
            b'.' => {
                if next == Some(b'.') && self.src.get(self.pos + 1) == Some(&b'.') {
                    self.pos += 2;
                    Token::Ellipsis
                } else {
                    Token::Dot
                }
            }
            b'+' => self.eq_or(Token::Plus, Operator::Add),
            b'%' => self.eq_or(Token::Percent, Operator::Mod),
            b'&' => self.eq_or(Token::Amp, Operator::BitAnd),
            b'|' => self.eq_or(Token::Pipe, Operator::BitOr),
            b'^' => self.eq_or(Token::Caret, Operator::BitXor),
            b'-' => {
                if next == Some(b'>') {
                    self.pos += 1;
                    Token::Arrow
                } else {
                    self.eq_or(Token::Minus, Operator::Sub)
                }
            }
            b'*' => {
                if next == Some(b'*') {
                    self.pos += 1;
                    self.eq_or(Token::DoubleStar, Operator::Pow)
                } else {
                    self.eq_or(Token::Star, Operator::Mult)
                }
            }
            b'/' => {
                if next == Some(b'/') {
                    self.pos += 1;
                    self.eq_or(Token::DoubleSlash, Operator::FloorDiv)
                } else {
                    self.eq_or(Token::Slash, Operator::Div)
                }
            }
            b'<' => {
                if next == Some(b'<') {
                    self.pos += 1;
                    self.eq_or(Token::LShift, Operator::LShift)
                } else if next == Some(b'=') {
                    self.pos += 1;
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            b'>' => {
                if next == Some(b'>') {
                    self.pos += 1;
                    self.eq_or(Token::RShift, Operator::RShift)
                } else if next == Some(b'=') {
                    self.pos += 1;
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            other => {
                return Err(ParseError::lexical(
                    format!("invalid character '{}'", other as char),
                    self.span(start, self.pos),
                ));
            }
        };
        Ok(self.at(tok, start))
    }

    /// If the next byte is `=`, consume it and produce `AugAssign(op)`;
    /// otherwise produce `plain`.
    fn eq_or(&mut self, plain: Token<'src>, op: Operator) -> Token<'src> {
        if self.src.get(self.pos) == Some(&b'=') {
            self.pos += 1;
            Token::AugAssign(op)
        } else {
            plain
        }
    }

    // ── Indentation handling ──────────────────────────────────────────────────

    /// Called when `at_line_start` is true.  Scans leading whitespace of the
    /// next non-blank, non-comment line and emits INDENT/DEDENT/nothing.
    fn handle_indent(&mut self) -> ParseResult<Option<TokenAt<'src>>> {
        loop {
            let mut col = 0usize;
            while self.pos < self.src.len() {
                match self.src[self.pos] {
                    b' ' => {
                        col += 1;
                        self.pos += 1;
                    }
                    b'\t' => {
                        // Tab stop at 8.
                        col = (col + 8) & !7;
                        self.pos += 1;
                    }
                    _ => break,
                }
            }

            if self.pos >= self.src.len() {
                // EOF after whitespace-only content.
                return Ok(None);
            }
            let b = self.src[self.pos];
            if b == b'\n' {
                // Blank line — no indent/dedent.
                self.pos += 1;
                continue;
            }
            if b == b'\r' {
                self.pos += 1;
                if self.pos < self.src.len() && self.src[self.pos] == b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if b == b'#' {
                // Comment-only line.
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.pos += 1;
                }
                if self.pos < self.src.len() {
                    self.pos += 1;
                }
                continue;
            }

            // Real content at column `col`.
            let top = *self
                .indent_stack
                .last()
                .expect("indent_stack always holds at least the zero level");

            if col > top {
                self.indent_stack.push(col);
                return Ok(Some(self.at(Token::Indent, self.pos)));
            } else if col < top {
                let mut dedent_count = 0usize;
                while self.indent_stack.len() > 1
                    && *self
                        .indent_stack
                        .last()
                        .expect("indent_stack.len() > 1 guarantees last() is Some")
                        > col
                {
                    self.indent_stack.pop();
                    dedent_count += 1;
                }
                // The dedent must land exactly on a previously-seen level.
                let landed = *self
                    .indent_stack
                    .last()
                    .expect("indent_stack always holds at least the zero level");
                if landed != col {
                    return Err(ParseError::lexical(
                        "unindent does not match any outer indentation level",
                        self.here(),
                    ));
                }
                if dedent_count > 1 {
                    self.pending_dedents = dedent_count - 1;
                }
                return Ok(Some(self.at(Token::Dedent, self.pos)));
            } else {
                return Ok(None);
            }
        }
    }

    // ── Identifier / keyword lexing ───────────────────────────────────────────

    fn lex_name(&mut self, start: usize) -> TokenAt<'src> {
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        // Every byte advanced over is either ASCII or part of a multi-byte
        // UTF-8 character (continuation bytes are all >= 0x80), so
        // `start..pos` is always a valid char boundary slice.
        let s = &self.src_str[start..self.pos];
        let tok = match s {
            "False" => Token::KwFalse,
            "None" => Token::KwNone,
            "True" => Token::KwTrue,
            "and" => Token::KwAnd,
            "as" => Token::KwAs,
            "assert" => Token::KwAssert,
            "async" => Token::KwAsync,
            "await" => Token::KwAwait,
            "break" => Token::KwBreak,
            "class" => Token::KwClass,
            "continue" => Token::KwContinue,
            "def" => Token::KwDef,
            "del" => Token::KwDel,
            "elif" => Token::KwElif,
            "else" => Token::KwElse,
            "except" => Token::KwExcept,
            "finally" => Token::KwFinally,
            "for" => Token::KwFor,
            "from" => Token::KwFrom,
            "global" => Token::KwGlobal,
            "if" => Token::KwIf,
            "import" => Token::KwImport,
            "in" => Token::KwIn,
            "is" => Token::KwIs,
            "lambda" => Token::KwLambda,
            "nonlocal" => Token::KwNonlocal,
            "not" => Token::KwNot,
            "or" => Token::KwOr,
            "pass" => Token::KwPass,
            "raise" => Token::KwRaise,
            "return" => Token::KwReturn,
            "try" => Token::KwTry,
            "while" => Token::KwWhile,
            "with" => Token::KwWith,
            "yield" => Token::KwYield,
            // `match` and `case` are soft keywords and lex as plain names.
            other => Token::Name(other),
        };
        self.at(tok, start)
    }

    // ── Number lexing ─────────────────────────────────────────────────────────

    /// Decimal integer or float: digits, optional fraction, optional
    /// exponent.  Underscore digit separators are accepted.
    fn lex_number(&mut self, start: usize) -> ParseResult<TokenAt<'src>> {
        self.eat_digits();
        if self.src.get(self.pos) == Some(&b'.')
            && self
                .src
                .get(self.pos + 1)
                .copied()
                .is_none_or(|c| c != b'.')
        {
            // A single dot continues the literal; `1..` is `1.` then `.`
            // which the expression parser rejects, while `x[1..]` never
            // reaches here because `..` follows a non-digit.
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.src.get(self.pos), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.src.get(self.pos), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.src.get(self.pos).copied().is_some_and(|c| c.is_ascii_digit()) {
                self.eat_digits();
            } else {
                // Not an exponent after all (e.g. `1e` in `1else` never
                // occurs, but `10e` alone is malformed).
                self.pos = mark;
                return Err(ParseError::lexical(
                    "invalid decimal literal",
                    self.span(start, self.pos + 1),
                ));
            }
        }
        // A letter or underscore glued to the number is malformed (`1abc`).
        if self
            .src
            .get(self.pos)
            .copied()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_' || c >= 0x80)
        {
            return Err(ParseError::lexical(
                "invalid decimal literal",
                self.span(start, self.pos + 1),
            ));
        }
        let text = &self.src_str[start..self.pos];
        Ok(self.at(Token::Number(text), start))
    }

    fn eat_digits(&mut self) {
        while self
            .src
            .get(self.pos)
            .copied()
            .is_some_and(|c| c.is_ascii_digit() || c == b'_')
        {
            self.pos += 1;
        }
    }

    // ── String literal lexing ─────────────────────────────────────────────────

    /// Two-letter string prefixes pair `r` with exactly one of `b`, `f`, `t`
    /// in either order (`rb`, `br`, `Rf`, `tR`, ...).  Anything else, like
    /// `uf` or `bu`, is an identifier followed by a plain string.
    fn is_string_start(&self) -> bool {
        let b = self.src[self.pos];
        match b {
            b'"' | b'\'' => true,
            b'r' | b'R' | b'b' | b'B' | b'u' | b'U' | b'f' | b'F' | b't' | b'T' => {
                let next = self.src.get(self.pos + 1).copied().unwrap_or(0);
                match next {
                    b'"' | b'\'' => true,
                    _ if valid_prefix_pair(b, next) => {
                        let nn = self.src.get(self.pos + 2).copied().unwrap_or(0);
                        nn == b'"' || nn == b'\''
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn lex_string(&mut self, start: usize) -> ParseResult<TokenAt<'src>> {
        let mut is_f = false;
        let mut is_t = false;

        // Consume the prefix letters (at most two).
        let mut prefix_chars = 0;
        while prefix_chars < 2 {
            match self.src.get(self.pos).copied().unwrap_or(0) {
                b'r' | b'R' | b'b' | b'B' | b'u' | b'U' => {
                    self.pos += 1;
                    prefix_chars += 1;
                }
                b'f' | b'F' => {
                    self.pos += 1;
                    prefix_chars += 1;
                    is_f = true;
                }
                b't' | b'T' => {
                    self.pos += 1;
                    prefix_chars += 1;
                    is_t = true;
                }
                _ => break,
            }
        }

        let q = self.src[self.pos];
        let triple =
            self.src.get(self.pos + 1) == Some(&q) && self.src.get(self.pos + 2) == Some(&q);
        let delim_len: usize = if triple { 3 } else { 1 };
        self.pos += delim_len;

        if triple {
            loop {
                if self.pos >= self.src.len() {
                    return Err(ParseError::lexical(
                        "unterminated triple-quoted string literal",
                        self.span(start, self.pos),
                    ));
                }
                let b = self.src[self.pos];
                if b == b'\\' {
                    self.pos = (self.pos + 2).min(self.src.len());
                    continue;
                }
                if b == q
                    && self.src.get(self.pos + 1) == Some(&q)
                    && self.src.get(self.pos + 2) == Some(&q)
                {
                    self.pos += 3;
                    break;
                }
                self.pos += 1;
            }
        } else {
            loop {
                if self.pos >= self.src.len() || self.src[self.pos] == b'\n' {
                    return Err(ParseError::lexical(
                        "unterminated string literal",
                        self.span(start, self.pos),
                    ));
                }
                let b = self.src[self.pos];
                if b == b'\\' {
                    self.pos = (self.pos + 2).min(self.src.len());
                    continue;
                }
                self.pos += 1;
                if b == q {
                    break;
                }
            }
        }

        // Opening prefix/quote and closing quote are ASCII, so this is a
        // valid char-boundary slice.
        let raw = &self.src_str[start..self.pos];
        let tok = if is_f {
            Token::FStr(raw)
        } else if is_t {
            Token::TStr(raw)
        } else {
            Token::Str(raw)
        };
        Ok(self.at(tok, start))
    }
}

// ── String value extraction ───────────────────────────────────────────────────

fn valid_prefix_pair(a: u8, b: u8) -> bool {
    let a = a.to_ascii_lowercase();
    let b = b.to_ascii_lowercase();
    (a == b'r' && matches!(b, b'b' | b'f' | b't'))
        || (b == b'r' && matches!(a, b'b' | b'f' | b't'))
}

/// The pieces of a raw string-literal token slice.
pub struct StrPieces<'a> {
    /// Content between the delimiters.
    pub body: &'a str,
    /// Byte index of `body` within the raw token slice.
    pub body_start: usize,
    /// True when an `r`/`R` prefix suppresses escape decoding.
    pub raw: bool,
    pub triple: bool,
}

/// Split a lexer-validated string token slice into prefix flags and body.
pub fn split_string_literal(raw: &str) -> StrPieces<'_> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    let mut is_raw = false;
    while i < bytes.len() {
        match bytes[i] {
            b'r' | b'R' => {
                is_raw = true;
                i += 1;
            }
            b'b' | b'B' | b'u' | b'U' | b'f' | b'F' | b't' | b'T' => i += 1,
            _ => break,
        }
    }
    let q = bytes[i];
    let triple = bytes.get(i + 1) == Some(&q) && bytes.get(i + 2) == Some(&q);
    let delim = if triple { 3 } else { 1 };
    let start = i + delim;
    let end = raw.len() - delim;
    StrPieces {
        body: &raw[start..end],
        body_start: start,
        raw: is_raw,
        triple,
    }
}

/// Decode the string value from a lexer-validated non-interpolating token
/// slice: strips prefix and delimiters, applies escape sequences unless the
/// literal is raw.
pub fn decode_str_value(raw: &str) -> String {
    let pieces = split_string_literal(raw);
    if pieces.raw {
        return pieces.body.to_string();
    }
    decode_escapes(pieces.body)
}

/// Apply the common escape sequences.  Unknown escapes are kept verbatim,
/// backslash included, the same way CPython treats unrecognised sequences.
pub fn decode_escapes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {} // escaped newline inside a string joins lines
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
