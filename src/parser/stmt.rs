//! Statement grammar: simple statements, compound statements with suites,
//! definitions, and imports.
//!
//! Suites come in two forms: a block (`NEWLINE INDENT stmt+ DEDENT`) or an
//! inline run of simple statements after the `:`.  Compound statements
//! consume their whole shape including nested suites; simple statements are
//! terminated by a newline, `;`, dedent, or end of file.

use crate::ast::{
    ClassDef, ExceptHandler, Expr, ExprKind, FuncDef, ImportAlias, Keyword, Module, Param, Params,
    Span, Stmt, StmtKind, WithItem,
};
use crate::error::{ParseError, ParseResult};

use super::lexer::Token;
use super::Parser;

fn stmts_end(stmts: &[Stmt<'_>], fallback: Span) -> Span {
    stmts.last().map(|s| s.span).unwrap_or(fallback)
}

impl<'src> Parser<'src> {
    pub(super) fn parse_module(&mut self) -> ParseResult<Module<'src>> {
        let mut body = Vec::new();
        loop {
            match self.lex.peek()? {
                Token::Eof => break,
                Token::Newline | Token::Semicolon => {
                    self.bump()?;
                }
                _ => body.push(self.parse_stmt()?),
            }
        }
        let len = self.lex.source_str().len() as u32;
        Ok(Module {
            span: Span::new(0, len),
            body,
        })
    }

    fn parse_stmt(&mut self) -> ParseResult<Stmt<'src>> {
        match self.lex.peek()? {
            Token::KwIf => self.parse_if(),
            Token::KwWhile => self.parse_while(),
            Token::KwFor => self.parse_for(false, None),
            Token::KwTry => self.parse_try(),
            Token::KwWith => self.parse_with(false, None),
            Token::KwDef => self.parse_funcdef(false, Vec::new(), None),
            Token::KwClass => self.parse_classdef(Vec::new(), None),
            Token::KwAsync => self.parse_async_stmt(),
            Token::At => self.parse_decorated(),
            Token::Indent => {
                let span = self.peek_span()?;
                Err(ParseError::syntax("unexpected indent", span))
            }
            _ => {
                let s = self.parse_simple_stmt()?;
                self.end_simple_stmt()?;
                Ok(s)
            }
        }
    }

    fn end_simple_stmt(&mut self) -> ParseResult<()> {
        let t = self.peek()?;
        match t {
            Token::Newline | Token::Semicolon => {
                self.bump()?;
                Ok(())
            }
            Token::Eof | Token::Dedent => Ok(()),
            other => {
                let span = self.peek_span()?;
                Err(ParseError::syntax(
                    format!("expected end of statement, found {}", other.describe()),
                    span,
                ))
            }
        }
    }

    /// `: suite` — either `: NEWLINE INDENT stmt+ DEDENT` or an inline run
    /// of simple statements.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt<'src>>> {
        self.expect(&Token::Colon, "':'")?;
        let mut body = Vec::new();
        if self.eat(&Token::Newline)? {
            self.expect(&Token::Indent, "an indented block")?;
            loop {
                match self.lex.peek()? {
                    Token::Dedent | Token::Eof => break,
                    Token::Newline | Token::Semicolon => {
                        self.bump()?;
                    }
                    _ => body.push(self.parse_stmt()?),
                }
            }
            self.eat(&Token::Dedent)?;
        } else {
            loop {
                if matches!(
                    self.lex.peek()?,
                    Token::KwIf
                        | Token::KwWhile
                        | Token::KwFor
                        | Token::KwTry
                        | Token::KwWith
                        | Token::KwDef
                        | Token::KwClass
                        | Token::KwAsync
                        | Token::At
                ) {
                    let span = self.peek_span()?;
                    return Err(ParseError::syntax(
                        "compound statements are not allowed on the same line as ':'",
                        span,
                    ));
                }
                body.push(self.parse_simple_stmt()?);
                let t = self.peek()?;
                match t {
                    Token::Semicolon => {
                        self.bump()?;
                        if matches!(
                            self.lex.peek()?,
                            Token::Newline | Token::Eof | Token::Dedent
                        ) {
                            self.eat(&Token::Newline)?;
                            break;
                        }
                    }
                    Token::Newline => {
                        self.bump()?;
                        break;
                    }
                    Token::Eof | Token::Dedent => break,
                    other => {
                        let span = self.peek_span()?;
                        return Err(ParseError::syntax(
                            format!("expected end of statement, found {}", other.describe()),
                            span,
                        ));
                    }
                }
            }
        }
        if body.is_empty() {
            let span = self.peek_span()?;
            return Err(ParseError::syntax(
                "expected at least one statement in block",
                span,
            ));
        }
        Ok(body)
    }

    // ── compound statements ───────────────────────────────────────────────────

    fn parse_if(&mut self) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span; // 'if' / 'elif'
        let test = self.parse_expression()?;
        let body = self.parse_block()?;
        let orelse = match self.lex.peek()? {
            // An elif chain nests as a single If statement in orelse.
            Token::KwElif => vec![self.parse_if()?],
            Token::KwElse => {
                self.bump()?;
                self.parse_block()?
            }
            _ => Vec::new(),
        };
        let end = stmts_end(&orelse, stmts_end(&body, kw));
        Ok(Stmt {
            span: kw.to(end),
            kind: StmtKind::If { test, body, orelse },
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span;
        let test = self.parse_expression()?;
        let body = self.parse_block()?;
        let orelse = if self.eat(&Token::KwElse)? {
            self.parse_block()?
        } else {
            Vec::new()
        };
        let end = stmts_end(&orelse, stmts_end(&body, kw));
        Ok(Stmt {
            span: kw.to(end),
            kind: StmtKind::While { test, body, orelse },
        })
    }

    fn parse_for(&mut self, is_async: bool, start: Option<Span>) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span; // 'for'
        let start = start.unwrap_or(kw);
        let target = self.parse_target_list()?;
        self.expect(&Token::KwIn, "'in'")?;
        let iter = self.parse_testlist()?;
        let body = self.parse_block()?;
        let orelse = if self.eat(&Token::KwElse)? {
            self.parse_block()?
        } else {
            Vec::new()
        };
        let end = stmts_end(&orelse, stmts_end(&body, kw));
        Ok(Stmt {
            span: start.to(end),
            kind: StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            },
        })
    }

    fn parse_with(&mut self, is_async: bool, start: Option<Span>) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span; // 'with'
        let start = start.unwrap_or(kw);
        let mut items = vec![self.parse_with_item()?];
        while self.eat(&Token::Comma)? {
            items.push(self.parse_with_item()?);
        }
        let body = self.parse_block()?;
        let end = stmts_end(&body, kw);
        Ok(Stmt {
            span: start.to(end),
            kind: StmtKind::With {
                items,
                body,
                is_async,
            },
        })
    }

    fn parse_with_item(&mut self) -> ParseResult<WithItem<'src>> {
        let context = self.parse_expression()?;
        let target = if self.eat(&Token::KwAs)? {
            Some(self.parse_target()?)
        } else {
            None
        };
        Ok(WithItem { context, target })
    }

    fn parse_try(&mut self) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span;
        let body = self.parse_block()?;
        let mut handlers = Vec::new();
        while matches!(self.lex.peek()?, Token::KwExcept) {
            let h_kw = self.bump()?.span;
            let type_expr = if matches!(self.lex.peek()?, Token::Colon) {
                None
            } else {
                Some(self.parse_expression()?)
            };
            let name = if self.eat(&Token::KwAs)? {
                Some(self.expect_name("a name after 'as'")?.0)
            } else {
                None
            };
            let hbody = self.parse_block()?;
            let h_end = stmts_end(&hbody, h_kw);
            handlers.push(ExceptHandler {
                span: h_kw.to(h_end),
                type_expr,
                name,
                body: hbody,
            });
        }
        let orelse = if matches!(self.lex.peek()?, Token::KwElse) {
            let else_span = self.peek_span()?;
            if handlers.is_empty() {
                return Err(ParseError::syntax(
                    "'else' clause requires at least one 'except' clause",
                    else_span,
                ));
            }
            self.bump()?;
            self.parse_block()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat(&Token::KwFinally)? {
            self.parse_block()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            let span = self.peek_span()?;
            return Err(ParseError::syntax(
                "expected 'except' or 'finally' clause",
                span,
            ));
        }
        let end = stmts_end(
            &finalbody,
            stmts_end(
                &orelse,
                handlers
                    .last()
                    .map(|h| h.span)
                    .unwrap_or(stmts_end(&body, kw)),
            ),
        );
        Ok(Stmt {
            span: kw.to(end),
            kind: StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
        })
    }

    fn parse_funcdef(
        &mut self,
        is_async: bool,
        decorators: Vec<Expr<'src>>,
        start: Option<Span>,
    ) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span; // 'def'
        let start = start.unwrap_or(kw);
        let (name, _) = self.expect_name("a function name")?;
        self.expect(&Token::LParen, "'(' after function name")?;
        let params = self.parse_def_params()?;
        let returns = if self.eat(&Token::Arrow)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        let end = stmts_end(&body, kw);
        Ok(Stmt {
            span: start.to(end),
            kind: StmtKind::FunctionDef(Box::new(FuncDef {
                name,
                is_async,
                params,
                returns,
                decorators,
                body,
            })),
        })
    }

    /// Parenthesised `def` parameter list; consumes the closing `)`.
    fn parse_def_params(&mut self) -> ParseResult<Params<'src>> {
        let mut params = Params::default();
        let mut after_star = false;
        loop {
            match self.peek()? {
                Token::RParen => break,
                Token::Star => {
                    let star = self.bump()?.span;
                    if after_star {
                        return Err(ParseError::syntax(
                            "duplicate '*' in parameter list",
                            star,
                        ));
                    }
                    after_star = true;
                    if matches!(self.lex.peek()?, Token::Name(_)) {
                        params.vararg = Some(self.parse_param()?);
                    }
                }
                Token::DoubleStar => {
                    self.bump()?;
                    params.kwarg = Some(self.parse_param()?);
                }
                Token::Slash => {
                    let slash = self.bump()?.span;
                    if params.posonly.is_empty() && !params.args.is_empty() && !after_star {
                        params.posonly = std::mem::take(&mut params.args);
                    } else {
                        return Err(ParseError::syntax(
                            "unexpected '/' in parameter list",
                            slash,
                        ));
                    }
                }
                Token::Name(_) => {
                    let p = self.parse_param()?;
                    if after_star {
                        params.kwonly.push(p);
                    } else {
                        params.args.push(p);
                    }
                }
                other => {
                    let span = self.peek_span()?;
                    return Err(ParseError::syntax(
                        format!("unexpected {} in parameter list", other.describe()),
                        span,
                    ));
                }
            }
            if !self.eat(&Token::Comma)? {
                break;
            }
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(params)
    }

    /// `name (: annotation)? (= default)?`
    fn parse_param(&mut self) -> ParseResult<Param<'src>> {
        let (name, span) = self.expect_name("a parameter name")?;
        let annotation = if self.eat(&Token::Colon)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let default = if self.eat(&Token::Assign)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Param {
            name,
            span,
            annotation,
            default,
        })
    }

    fn parse_classdef(
        &mut self,
        decorators: Vec<Expr<'src>>,
        start: Option<Span>,
    ) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span; // 'class'
        let start = start.unwrap_or(kw);
        let (name, _) = self.expect_name("a class name")?;
        let mut bases = Vec::new();
        let mut keywords = Vec::new();
        if self.eat(&Token::LParen)? {
            loop {
                match self.peek()? {
                    Token::RParen => break,
                    Token::DoubleStar => {
                        self.bump()?;
                        let value = self.parse_expression()?;
                        keywords.push(Keyword { arg: None, value });
                    }
                    Token::Star => {
                        let star = self.bump()?.span;
                        let inner = self.parse_expression()?;
                        let span = star.to(inner.span);
                        bases.push(Expr {
                            span,
                            kind: ExprKind::Starred(Box::new(inner)),
                        });
                    }
                    _ => {
                        let e = self.parse_expression()?;
                        let mut kw_name = None;
                        if let ExprKind::Name(n) = &e.kind {
                            if matches!(self.lex.peek()?, Token::Assign) {
                                kw_name = Some(*n);
                            }
                        }
                        if let Some(n) = kw_name {
                            self.bump()?; // '='
                            let value = self.parse_expression()?;
                            keywords.push(Keyword {
                                arg: Some(n),
                                value,
                            });
                        } else {
                            bases.push(e);
                        }
                    }
                }
                if !self.eat(&Token::Comma)? {
                    break;
                }
            }
            self.expect(&Token::RParen, "')'")?;
        }
        let body = self.parse_block()?;
        let end = stmts_end(&body, kw);
        Ok(Stmt {
            span: start.to(end),
            kind: StmtKind::ClassDef(Box::new(ClassDef {
                name,
                bases,
                keywords,
                decorators,
                body,
            })),
        })
    }

    fn parse_decorated(&mut self) -> ParseResult<Stmt<'src>> {
        let first_at = self.peek_span()?;
        let mut decorators = Vec::new();
        while self.eat(&Token::At)? {
            decorators.push(self.parse_expression()?);
            self.expect(&Token::Newline, "a newline after decorator")?;
        }
        match self.peek()? {
            Token::KwDef => self.parse_funcdef(false, decorators, Some(first_at)),
            Token::KwClass => self.parse_classdef(decorators, Some(first_at)),
            Token::KwAsync => {
                self.bump()?;
                match self.peek()? {
                    Token::KwDef => self.parse_funcdef(true, decorators, Some(first_at)),
                    other => {
                        let span = self.peek_span()?;
                        Err(ParseError::syntax(
                            format!("expected 'def' after 'async', found {}", other.describe()),
                            span,
                        ))
                    }
                }
            }
            other => {
                let span = self.peek_span()?;
                Err(ParseError::syntax(
                    format!(
                        "expected a function or class definition after decorators, found {}",
                        other.describe()
                    ),
                    span,
                ))
            }
        }
    }

    fn parse_async_stmt(&mut self) -> ParseResult<Stmt<'src>> {
        let a = self.bump()?.span; // 'async'
        match self.peek()? {
            Token::KwDef => self.parse_funcdef(true, Vec::new(), Some(a)),
            Token::KwFor => self.parse_for(true, Some(a)),
            Token::KwWith => self.parse_with(true, Some(a)),
            other => {
                let span = self.peek_span()?;
                Err(ParseError::syntax(
                    format!(
                        "expected 'def', 'for', or 'with' after 'async', found {}",
                        other.describe()
                    ),
                    span,
                ))
            }
        }
    }

    // ── simple statements ─────────────────────────────────────────────────────

    fn parse_simple_stmt(&mut self) -> ParseResult<Stmt<'src>> {
        match self.lex.peek()? {
            Token::KwImport => self.parse_import(),
            Token::KwFrom => self.parse_from_import(),
            Token::KwReturn => {
                let kw = self.bump()?.span;
                let value = if self.at_stmt_end()? {
                    None
                } else {
                    Some(self.parse_testlist()?)
                };
                let end = value.as_ref().map(|v| v.span).unwrap_or(kw);
                Ok(Stmt {
                    span: kw.to(end),
                    kind: StmtKind::Return(value),
                })
            }
            Token::KwRaise => {
                let kw = self.bump()?.span;
                if self.at_stmt_end()? {
                    return Ok(Stmt {
                        span: kw,
                        kind: StmtKind::Raise {
                            exc: None,
                            cause: None,
                        },
                    });
                }
                let exc = self.parse_expression()?;
                let cause = if self.eat(&Token::KwFrom)? {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                let end = cause.as_ref().map(|c| c.span).unwrap_or(exc.span);
                Ok(Stmt {
                    span: kw.to(end),
                    kind: StmtKind::Raise {
                        exc: Some(exc),
                        cause,
                    },
                })
            }
            Token::KwAssert => {
                let kw = self.bump()?.span;
                let test = self.parse_expression()?;
                let msg = if self.eat(&Token::Comma)? {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                let end = msg.as_ref().map(|m| m.span).unwrap_or(test.span);
                Ok(Stmt {
                    span: kw.to(end),
                    kind: StmtKind::Assert { test, msg },
                })
            }
            Token::KwDel => {
                let kw = self.bump()?.span;
                let mut targets = vec![self.parse_target()?];
                while self.eat(&Token::Comma)? {
                    if self.at_stmt_end()? {
                        break;
                    }
                    targets.push(self.parse_target()?);
                }
                let end = targets
                    .last()
                    .map(|t| t.span)
                    .expect("del always has at least one target");
                Ok(Stmt {
                    span: kw.to(end),
                    kind: StmtKind::Delete(targets),
                })
            }
            Token::KwGlobal => {
                let kw = self.bump()?.span;
                let (names, end) = self.parse_name_list()?;
                Ok(Stmt {
                    span: kw.to(end),
                    kind: StmtKind::Global(names),
                })
            }
            Token::KwNonlocal => {
                let kw = self.bump()?.span;
                let (names, end) = self.parse_name_list()?;
                Ok(Stmt {
                    span: kw.to(end),
                    kind: StmtKind::Nonlocal(names),
                })
            }
            Token::KwPass => {
                let kw = self.bump()?.span;
                Ok(Stmt {
                    span: kw,
                    kind: StmtKind::Pass,
                })
            }
            Token::KwBreak => {
                let kw = self.bump()?.span;
                Ok(Stmt {
                    span: kw,
                    kind: StmtKind::Break,
                })
            }
            Token::KwContinue => {
                let kw = self.bump()?.span;
                Ok(Stmt {
                    span: kw,
                    kind: StmtKind::Continue,
                })
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_name_list(&mut self) -> ParseResult<(Vec<&'src str>, Span)> {
        let (first, mut end) = self.expect_name("a name")?;
        let mut names = vec![first];
        while self.eat(&Token::Comma)? {
            let (n, s) = self.expect_name("a name")?;
            names.push(n);
            end = s;
        }
        Ok((names, end))
    }

    /// Expression statement, or one of the assignment forms.
    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt<'src>> {
        let first = self.parse_testlist()?;
        match self.peek()? {
            Token::Assign => {
                let mut targets = Vec::new();
                let mut current = first;
                loop {
                    self.validate_target(&current)?;
                    targets.push(current);
                    self.bump()?; // '='
                    let v = if matches!(self.lex.peek()?, Token::KwYield) {
                        self.parse_yield()?
                    } else {
                        self.parse_testlist()?
                    };
                    if matches!(self.lex.peek()?, Token::Assign) {
                        current = v;
                    } else {
                        let span = targets[0].span.to(v.span);
                        return Ok(Stmt {
                            span,
                            kind: StmtKind::Assign { targets, value: v },
                        });
                    }
                }
            }
            Token::AugAssign(op) => {
                if !matches!(
                    first.kind,
                    ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
                ) {
                    return Err(ParseError::syntax(
                        "invalid augmented assignment target",
                        first.span,
                    ));
                }
                self.bump()?;
                let value = if matches!(self.lex.peek()?, Token::KwYield) {
                    self.parse_yield()?
                } else {
                    self.parse_testlist()?
                };
                let span = first.span.to(value.span);
                Ok(Stmt {
                    span,
                    kind: StmtKind::AugAssign {
                        target: first,
                        op,
                        value,
                    },
                })
            }
            Token::Colon => {
                if !matches!(
                    first.kind,
                    ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
                ) {
                    return Err(ParseError::syntax(
                        "invalid annotated assignment target",
                        first.span,
                    ));
                }
                self.bump()?;
                let annotation = self.parse_expression()?;
                let value = if self.eat(&Token::Assign)? {
                    Some(if matches!(self.lex.peek()?, Token::KwYield) {
                        self.parse_yield()?
                    } else {
                        self.parse_testlist()?
                    })
                } else {
                    None
                };
                let end = value.as_ref().map(|v| v.span).unwrap_or(annotation.span);
                let span = first.span.to(end);
                Ok(Stmt {
                    span,
                    kind: StmtKind::AnnAssign {
                        target: first,
                        annotation,
                        value,
                    },
                })
            }
            _ => Ok(Stmt {
                span: first.span,
                kind: StmtKind::Expr(first),
            }),
        }
    }

    // ── imports ───────────────────────────────────────────────────────────────

    fn parse_import(&mut self) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span;
        let mut names = vec![self.parse_import_alias()?];
        while self.eat(&Token::Comma)? {
            names.push(self.parse_import_alias()?);
        }
        let end = names
            .last()
            .map(|a| a.span)
            .expect("import always has at least one alias");
        Ok(Stmt {
            span: kw.to(end),
            kind: StmtKind::Import(names),
        })
    }

    fn parse_import_alias(&mut self) -> ParseResult<ImportAlias<'src>> {
        let (name, span) = self.parse_dotted_name()?;
        let (asname, end) = if self.eat(&Token::KwAs)? {
            let (n, s) = self.expect_name("a name after 'as'")?;
            (Some(n), s)
        } else {
            (None, span)
        };
        Ok(ImportAlias {
            name,
            asname,
            span: span.to(end),
        })
    }

    /// `a.b.c` — returned as a single source slice.
    fn parse_dotted_name(&mut self) -> ParseResult<(&'src str, Span)> {
        let (_, start) = self.expect_name("a module name")?;
        let mut end = start;
        while matches!(self.lex.peek()?, Token::Dot) {
            self.bump()?;
            let (_, s) = self.expect_name("a name after '.'")?;
            end = s;
        }
        let src = self.lex.source_str();
        let base = self.lex.base();
        let slice = &src[(start.start - base) as usize..(end.end - base) as usize];
        Ok((slice, start.to(end)))
    }

    fn parse_from_import(&mut self) -> ParseResult<Stmt<'src>> {
        let kw = self.bump()?.span; // 'from'
        let mut level = 0u32;
        loop {
            match self.lex.peek()? {
                Token::Dot => {
                    self.bump()?;
                    level += 1;
                }
                // `...` lexes as a single ellipsis token: three dots.
                Token::Ellipsis => {
                    self.bump()?;
                    level += 3;
                }
                _ => break,
            }
        }
        let module = if matches!(self.lex.peek()?, Token::KwImport) {
            if level == 0 {
                let span = self.peek_span()?;
                return Err(ParseError::syntax(
                    "expected a module name after 'from'",
                    span,
                ));
            }
            None
        } else {
            Some(self.parse_dotted_name()?.0)
        };
        self.expect(&Token::KwImport, "'import'")?;
        let mut names = Vec::new();
        let mut wildcard = false;
        let end;
        match self.peek()? {
            Token::Star => {
                end = self.bump()?.span;
                wildcard = true;
            }
            Token::LParen => {
                self.bump()?;
                loop {
                    if matches!(self.lex.peek()?, Token::RParen) {
                        break;
                    }
                    names.push(self.parse_from_alias()?);
                    if !self.eat(&Token::Comma)? {
                        break;
                    }
                }
                end = self.expect(&Token::RParen, "')'")?;
                if names.is_empty() {
                    return Err(ParseError::syntax("expected at least one import name", end));
                }
            }
            _ => {
                names.push(self.parse_from_alias()?);
                while self.eat(&Token::Comma)? {
                    names.push(self.parse_from_alias()?);
                }
                end = names
                    .last()
                    .map(|a| a.span)
                    .expect("at least one name was just parsed");
            }
        }
        Ok(Stmt {
            span: kw.to(end),
            kind: StmtKind::ImportFrom {
                module,
                names,
                level,
                wildcard,
            },
        })
    }

    fn parse_from_alias(&mut self) -> ParseResult<ImportAlias<'src>> {
        let (name, span) = self.expect_name("an import name")?;
        let (asname, end) = if self.eat(&Token::KwAs)? {
            let (n, s) = self.expect_name("a name after 'as'")?;
            (Some(n), s)
        } else {
            (None, span)
        };
        Ok(ImportAlias {
            name,
            asname,
            span: span.to(end),
        })
    }
}
