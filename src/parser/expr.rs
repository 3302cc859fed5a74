//! Expression grammar: precedence climbing from `lambda`/ternary down to
//! atoms, with postfix call/subscript/attribute chains.
//!
//! Precedence, loosest to tightest:
//! `lambda` / `yield` → ternary → `or` → `and` → `not` → comparison →
//! `|` → `^` → `&` → `<<`/`>>` → `+`/`-` → `*`/`/`/`//`/`%` → unary →
//! `**` (right-assoc) → `await` → postfix → atom.
//!
//! One deliberate restriction: a comparison holds exactly one relational
//! operator.  A second one (`a < b < c`) raises an unsupported-construct
//! error rather than desugaring.

use crate::ast::{
    BoolOperator, CmpOperator, Comprehension, Expr, ExprKind, Keyword, Operator, Param, Params,
    Span, UnaryOperator,
};
use crate::error::{ParseError, ParseResult};

use super::lexer::{decode_str_value, Token};
use super::{fstring, Parser};

/// Span of the last clause of a comprehension chain.
fn comp_end(gens: &[Comprehension<'_>]) -> Span {
    let last = gens
        .last()
        .expect("comprehension always has at least one 'for' clause");
    last.ifs.last().map(|e| e.span).unwrap_or(last.iter.span)
}

fn bin<'src>(left: Expr<'src>, op: Operator, right: Expr<'src>) -> Expr<'src> {
    let span = left.span.to(right.span);
    Expr {
        span,
        kind: ExprKind::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
    }
}

fn unary<'src>(op_span: Span, op: UnaryOperator, operand: Expr<'src>) -> Expr<'src> {
    let span = op_span.to(operand.span);
    Expr {
        span,
        kind: ExprKind::UnaryOp {
            op,
            operand: Box::new(operand),
        },
    }
}

/// Whether `tok` can begin an expression.  Used to decide between a bare
/// `yield` / trailing comma and a following operand.
fn starts_expression(tok: &Token<'_>) -> bool {
    matches!(
        tok,
        Token::Name(_)
            | Token::Number(_)
            | Token::Str(_)
            | Token::FStr(_)
            | Token::TStr(_)
            | Token::KwTrue
            | Token::KwFalse
            | Token::KwNone
            | Token::Ellipsis
            | Token::LParen
            | Token::LBracket
            | Token::LBrace
            | Token::Plus
            | Token::Minus
            | Token::Tilde
            | Token::Star
            | Token::KwNot
            | Token::KwLambda
            | Token::KwAwait
            | Token::KwYield
    )
}

fn starts_target(tok: &Token<'_>) -> bool {
    matches!(
        tok,
        Token::Name(_) | Token::LParen | Token::LBracket | Token::Star
    )
}

impl<'src> Parser<'src> {
    /// Full expression: `lambda`, `yield`, or a conditional expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expr<'src>> {
        let span = self.peek_span()?;
        self.enter(span)?;
        let result = match self.lex.peek()? {
            Token::KwLambda => self.parse_lambda(),
            Token::KwYield => self.parse_yield(),
            _ => self.parse_ternary(),
        };
        self.leave();
        result
    }

    /// Expression list with optional tuple building: `a`, `a, b`, `a,`.
    pub(super) fn parse_testlist(&mut self) -> ParseResult<Expr<'src>> {
        let first = self.parse_star_or_expr()?;
        if !matches!(self.lex.peek()?, Token::Comma) {
            return Ok(first);
        }
        let mut end = first.span;
        let mut elts = vec![first];
        while self.eat(&Token::Comma)? {
            if !starts_expression(self.lex.peek()?) {
                break;
            }
            let e = self.parse_star_or_expr()?;
            end = e.span;
            elts.push(e);
        }
        let span = elts[0].span.to(end);
        Ok(Expr {
            span,
            kind: ExprKind::Tuple(elts),
        })
    }

    /// Element of a display, call, or assignment list: `*expr` or a plain
    /// expression.
    fn parse_star_or_expr(&mut self) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::Star) {
            let star = self.bump()?.span;
            let inner = self.parse_or_test()?;
            let span = star.to(inner.span);
            return Ok(Expr {
                span,
                kind: ExprKind::Starred(Box::new(inner)),
            });
        }
        self.parse_expression()
    }

    /// Entry point for interpolated-string expression fragments: a testlist
    /// that must consume the whole fragment.
    pub(super) fn parse_interp_expression(&mut self) -> ParseResult<Expr<'src>> {
        let e = self.parse_testlist()?;
        let t = self.lex.consume()?;
        if t.token != Token::Eof {
            return Err(ParseError::syntax(
                format!(
                    "unexpected {} in interpolated expression",
                    t.token.describe()
                ),
                t.span,
            ));
        }
        Ok(e)
    }

    // ── conditional / boolean levels ──────────────────────────────────────────

    fn parse_ternary(&mut self) -> ParseResult<Expr<'src>> {
        let body = self.parse_or_test()?;
        if !self.eat(&Token::KwIf)? {
            return Ok(body);
        }
        let test = self.parse_or_test()?;
        self.expect(&Token::KwElse, "'else' in conditional expression")?;
        // Right-nesting: `a if p else b if q else c` groups to the right.
        let orelse = self.parse_expression()?;
        let span = body.span.to(orelse.span);
        Ok(Expr {
            span,
            kind: ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
        })
    }

    /// `or`-level expression.  Also the grammar level used for comprehension
    /// iterables and filters, where a bare ternary would be ambiguous.
    pub(super) fn parse_or_test(&mut self) -> ParseResult<Expr<'src>> {
        let first = self.parse_and_test()?;
        if !matches!(self.lex.peek()?, Token::KwOr) {
            return Ok(first);
        }
        // Flat value list: `a or b or c` is one node with three values.
        let mut values = vec![first];
        while self.eat(&Token::KwOr)? {
            values.push(self.parse_and_test()?);
        }
        let span = values[0].span.to(values[values.len() - 1].span);
        Ok(Expr {
            span,
            kind: ExprKind::BoolOp {
                op: BoolOperator::Or,
                values,
            },
        })
    }

    fn parse_and_test(&mut self) -> ParseResult<Expr<'src>> {
        let first = self.parse_not_test()?;
        if !matches!(self.lex.peek()?, Token::KwAnd) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Token::KwAnd)? {
            values.push(self.parse_not_test()?);
        }
        let span = values[0].span.to(values[values.len() - 1].span);
        Ok(Expr {
            span,
            kind: ExprKind::BoolOp {
                op: BoolOperator::And,
                values,
            },
        })
    }

    fn parse_not_test(&mut self) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::KwNot) {
            let not_span = self.bump()?.span;
            self.enter(not_span)?;
            let operand = self.parse_not_test();
            self.leave();
            return Ok(unary(not_span, UnaryOperator::Not, operand?));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr<'src>> {
        let left = self.parse_bitor()?;
        let Some(op) = self.try_cmp_op()? else {
            return Ok(left);
        };
        let right = self.parse_bitor()?;
        if self.cmp_op_follows()? {
            let span = self.peek_span()?;
            return Err(ParseError::unsupported(
                "chained comparisons are not supported; split into explicit 'and' clauses",
                span,
            ));
        }
        let span = left.span.to(right.span);
        Ok(Expr {
            span,
            kind: ExprKind::Compare {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        })
    }

    /// Consume a comparison operator if one follows, handling the two-word
    /// forms `is not` and `not in`.
    fn try_cmp_op(&mut self) -> ParseResult<Option<CmpOperator>> {
        let op = match self.lex.peek()? {
            Token::Lt => CmpOperator::Lt,
            Token::Gt => CmpOperator::Gt,
            Token::Le => CmpOperator::LtE,
            Token::Ge => CmpOperator::GtE,
            Token::EqEq => CmpOperator::Eq,
            Token::NotEq => CmpOperator::NotEq,
            Token::KwIn => CmpOperator::In,
            Token::KwIs => {
                self.bump()?;
                return Ok(Some(if self.eat(&Token::KwNot)? {
                    CmpOperator::IsNot
                } else {
                    CmpOperator::Is
                }));
            }
            Token::KwNot => {
                // After a complete operand, `not` can only begin `not in`.
                self.bump()?;
                self.expect(&Token::KwIn, "'in' after 'not'")?;
                return Ok(Some(CmpOperator::NotIn));
            }
            _ => return Ok(None),
        };
        self.bump()?;
        Ok(Some(op))
    }

    fn cmp_op_follows(&mut self) -> ParseResult<bool> {
        Ok(matches!(
            self.lex.peek()?,
            Token::Lt
                | Token::Gt
                | Token::Le
                | Token::Ge
                | Token::EqEq
                | Token::NotEq
                | Token::KwIn
                | Token::KwIs
                | Token::KwNot
        ))
    }

    // ── binary operator ladder ────────────────────────────────────────────────

    fn parse_bitor(&mut self) -> ParseResult<Expr<'src>> {
        let mut left = self.parse_bitxor()?;
        while self.eat(&Token::Pipe)? {
            let right = self.parse_bitxor()?;
            left = bin(left, Operator::BitOr, right);
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> ParseResult<Expr<'src>> {
        let mut left = self.parse_bitand()?;
        while self.eat(&Token::Caret)? {
            let right = self.parse_bitand()?;
            left = bin(left, Operator::BitXor, right);
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> ParseResult<Expr<'src>> {
        let mut left = self.parse_shift()?;
        while self.eat(&Token::Amp)? {
            let right = self.parse_shift()?;
            left = bin(left, Operator::BitAnd, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> ParseResult<Expr<'src>> {
        let mut left = self.parse_arith()?;
        loop {
            let op = match self.lex.peek()? {
                Token::LShift => Operator::LShift,
                Token::RShift => Operator::RShift,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_arith()?;
            left = bin(left, op, right);
        }
        Ok(left)
    }

    fn parse_arith(&mut self) -> ParseResult<Expr<'src>> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.lex.peek()? {
                Token::Plus => Operator::Add,
                Token::Minus => Operator::Sub,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_term()?;
            left = bin(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expr<'src>> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.lex.peek()? {
                Token::Star => Operator::Mult,
                Token::Slash => Operator::Div,
                Token::DoubleSlash => Operator::FloorDiv,
                Token::Percent => Operator::Mod,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_factor()?;
            left = bin(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr<'src>> {
        let op = match self.lex.peek()? {
            Token::Plus => UnaryOperator::UAdd,
            Token::Minus => UnaryOperator::USub,
            Token::Tilde => UnaryOperator::Invert,
            _ => return self.parse_power(),
        };
        let op_span = self.bump()?.span;
        self.enter(op_span)?;
        let operand = self.parse_factor();
        self.leave();
        Ok(unary(op_span, op, operand?))
    }

    fn parse_power(&mut self) -> ParseResult<Expr<'src>> {
        let left = self.parse_await_expr()?;
        if matches!(self.lex.peek()?, Token::DoubleStar) {
            let op_span = self.bump()?.span;
            self.enter(op_span)?;
            // Right-associative: the exponent re-enters at unary level, so
            // `2 ** 3 ** 2` is `2 ** (3 ** 2)` and `2 ** -3` parses.
            let right = self.parse_factor();
            self.leave();
            return Ok(bin(left, Operator::Pow, right?));
        }
        Ok(left)
    }

    fn parse_await_expr(&mut self) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::KwAwait) {
            let kw_span = self.bump()?.span;
            self.enter(kw_span)?;
            let operand = self.parse_await_expr();
            self.leave();
            let operand = operand?;
            let span = kw_span.to(operand.span);
            return Ok(Expr {
                span,
                kind: ExprKind::Await(Box::new(operand)),
            });
        }
        self.parse_postfix()
    }

    // ── postfix chains ────────────────────────────────────────────────────────

    fn parse_postfix(&mut self) -> ParseResult<Expr<'src>> {
        let mut e = self.parse_atom()?;
        loop {
            match self.lex.peek()? {
                Token::LParen => e = self.parse_call(e)?,
                Token::LBracket => e = self.parse_subscript(e)?,
                Token::Dot => {
                    self.bump()?;
                    let (attr, attr_span) = self.expect_name("an attribute name after '.'")?;
                    let span = e.span.to(attr_span);
                    e = Expr {
                        span,
                        kind: ExprKind::Attribute {
                            value: Box::new(e),
                            attr,
                        },
                    };
                }
                _ => break,
            }
        }
        Ok(e)
    }

    fn parse_call(&mut self, func: Expr<'src>) -> ParseResult<Expr<'src>> {
        self.bump()?; // '('
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        let mut first = true;
        loop {
            match self.lex.peek()? {
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
                    args.push(Expr {
                        span,
                        kind: ExprKind::Starred(Box::new(inner)),
                    });
                }
                _ => {
                    let e = self.parse_expression()?;
                    let mut keyword_name = None;
                    if let ExprKind::Name(n) = &e.kind {
                        if matches!(self.lex.peek()?, Token::Assign) {
                            keyword_name = Some(*n);
                        }
                    }
                    if let Some(name) = keyword_name {
                        self.bump()?; // '='
                        let value = self.parse_expression()?;
                        keywords.push(Keyword {
                            arg: Some(name),
                            value,
                        });
                    } else if first && matches!(self.lex.peek()?, Token::KwFor) {
                        // Sole generator-expression argument: f(x for x in xs).
                        let generators = self.parse_comp_clauses()?;
                        let span = e.span.to(comp_end(&generators));
                        args.push(Expr {
                            span,
                            kind: ExprKind::GeneratorExp {
                                elt: Box::new(e),
                                generators,
                            },
                        });
                    } else {
                        args.push(e);
                    }
                }
            }
            first = false;
            if !self.eat(&Token::Comma)? {
                break;
            }
        }
        let rparen = self.expect(&Token::RParen, "')'")?;
        let span = func.span.to(rparen);
        Ok(Expr {
            span,
            kind: ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
            },
        })
    }

    fn parse_subscript(&mut self, value: Expr<'src>) -> ParseResult<Expr<'src>> {
        self.bump()?; // '['
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            if matches!(self.lex.peek()?, Token::RBracket) {
                break;
            }
            items.push(self.parse_slice_item()?);
            if self.eat(&Token::Comma)? {
                saw_comma = true;
            } else {
                break;
            }
        }
        let rbracket = self.expect(&Token::RBracket, "']'")?;
        if items.is_empty() {
            return Err(ParseError::syntax("subscript cannot be empty", rbracket));
        }
        let index = if items.len() == 1 && !saw_comma {
            items.pop().expect("len() == 1 guarantees an element")
        } else {
            let span = items[0].span.to(items[items.len() - 1].span);
            Expr {
                span,
                kind: ExprKind::Tuple(items),
            }
        };
        let span = value.span.to(rbracket);
        Ok(Expr {
            span,
            kind: ExprKind::Subscript {
                value: Box::new(value),
                index: Box::new(index),
            },
        })
    }

    /// One subscript argument: a plain expression, or a slice when a
    /// top-level `:` appears (`a[1:5:2]`, `a[::2]`, `a[:]`).
    fn parse_slice_item(&mut self) -> ParseResult<Expr<'src>> {
        let start = self.peek_span()?;
        let lower = if matches!(self.lex.peek()?, Token::Colon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        if !matches!(self.lex.peek()?, Token::Colon) {
            return Ok(lower.expect("a non-slice item always holds an expression"));
        }
        let mut end = self.bump()?.span; // ':'
        let upper = if matches!(
            self.lex.peek()?,
            Token::Colon | Token::Comma | Token::RBracket
        ) {
            None
        } else {
            let e = self.parse_expression()?;
            end = e.span;
            Some(e)
        };
        let step = if matches!(self.lex.peek()?, Token::Colon) {
            end = self.bump()?.span;
            if matches!(self.lex.peek()?, Token::Comma | Token::RBracket) {
                None
            } else {
                let e = self.parse_expression()?;
                end = e.span;
                Some(e)
            }
        } else {
            None
        };
        Ok(Expr {
            span: Span::new(start.start, end.end),
            kind: ExprKind::Slice {
                lower: lower.map(Box::new),
                upper: upper.map(Box::new),
                step: step.map(Box::new),
            },
        })
    }

    // ── comprehensions ────────────────────────────────────────────────────────

    /// One or more `for target in iter (if cond)*` clauses.  The caller has
    /// already seen `for` at the lookahead.
    fn parse_comp_clauses(&mut self) -> ParseResult<Vec<Comprehension<'src>>> {
        let mut generators = Vec::new();
        while self.eat(&Token::KwFor)? {
            let target = self.parse_target_list()?;
            self.expect(&Token::KwIn, "'in' in comprehension")?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while self.eat(&Token::KwIf)? {
                ifs.push(self.parse_or_test()?);
            }
            generators.push(Comprehension { target, iter, ifs });
        }
        Ok(generators)
    }

    // ── assignment targets ────────────────────────────────────────────────────

    /// A single binding target: name, attribute, subscript, starred target,
    /// or a parenthesised/bracketed nesting of those.
    pub(super) fn parse_target(&mut self) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::Star) {
            let star = self.bump()?.span;
            let inner = self.parse_target()?;
            let span = star.to(inner.span);
            return Ok(Expr {
                span,
                kind: ExprKind::Starred(Box::new(inner)),
            });
        }
        let e = self.parse_postfix()?;
        self.validate_target(&e)?;
        Ok(e)
    }

    /// Comma-separated target list, e.g. the left side of a `for` statement.
    pub(super) fn parse_target_list(&mut self) -> ParseResult<Expr<'src>> {
        let first = self.parse_target()?;
        if !matches!(self.lex.peek()?, Token::Comma) {
            return Ok(first);
        }
        let mut end = first.span;
        let mut elts = vec![first];
        while self.eat(&Token::Comma)? {
            if !starts_target(self.lex.peek()?) {
                break;
            }
            let t = self.parse_target()?;
            end = t.span;
            elts.push(t);
        }
        let span = elts[0].span.to(end);
        Ok(Expr {
            span,
            kind: ExprKind::Tuple(elts),
        })
    }

    /// Reject expressions that cannot be bound: literals, calls, operators.
    pub(super) fn validate_target(&self, e: &Expr<'src>) -> ParseResult<()> {
        match &e.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
            ExprKind::Starred(inner) => self.validate_target(inner),
            ExprKind::Tuple(elts) | ExprKind::List(elts) => {
                for el in elts {
                    self.validate_target(el)?;
                }
                Ok(())
            }
            _ => Err(ParseError::syntax("invalid assignment target", e.span)),
        }
    }

    // ── lambda / yield ────────────────────────────────────────────────────────

    fn parse_lambda(&mut self) -> ParseResult<Expr<'src>> {
        let kw_span = self.bump()?.span; // 'lambda'
        let params = self.parse_lambda_params()?;
        self.expect(&Token::Colon, "':' after lambda parameters")?;
        let body = self.parse_expression()?;
        let span = kw_span.to(body.span);
        Ok(Expr {
            span,
            kind: ExprKind::Lambda {
                params: Box::new(params),
                body: Box::new(body),
            },
        })
    }

    /// Unparenthesised parameter list, annotations not allowed.
    fn parse_lambda_params(&mut self) -> ParseResult<Params<'src>> {
        let mut params = Params::default();
        let mut after_star = false;
        loop {
            match self.lex.peek()? {
                Token::Colon => break,
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
                        let (name, span) = self.expect_name("a parameter name")?;
                        params.vararg = Some(Param {
                            name,
                            span,
                            annotation: None,
                            default: None,
                        });
                    }
                }
                Token::DoubleStar => {
                    self.bump()?;
                    let (name, span) = self.expect_name("a parameter name after '**'")?;
                    params.kwarg = Some(Param {
                        name,
                        span,
                        annotation: None,
                        default: None,
                    });
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
                    let (name, span) = self.expect_name("a parameter name")?;
                    let default = if self.eat(&Token::Assign)? {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    let p = Param {
                        name,
                        span,
                        annotation: None,
                        default,
                    };
                    if after_star {
                        params.kwonly.push(p);
                    } else {
                        params.args.push(p);
                    }
                }
                other => {
                    let message = format!("unexpected {} in lambda parameters", other.describe());
                    let span = self.peek_span()?;
                    return Err(ParseError::syntax(message, span));
                }
            }
            if !self.eat(&Token::Comma)? {
                break;
            }
        }
        Ok(params)
    }

    pub(super) fn parse_yield(&mut self) -> ParseResult<Expr<'src>> {
        let kw_span = self.bump()?.span; // 'yield'
        if self.eat(&Token::KwFrom)? {
            let v = self.parse_expression()?;
            let span = kw_span.to(v.span);
            return Ok(Expr {
                span,
                kind: ExprKind::YieldFrom(Box::new(v)),
            });
        }
        if !starts_expression(self.lex.peek()?) {
            return Ok(Expr {
                span: kw_span,
                kind: ExprKind::Yield(None),
            });
        }
        let v = self.parse_testlist()?;
        let span = kw_span.to(v.span);
        Ok(Expr {
            span,
            kind: ExprKind::Yield(Some(Box::new(v))),
        })
    }

    // ── atoms ─────────────────────────────────────────────────────────────────

    fn parse_atom(&mut self) -> ParseResult<Expr<'src>> {
        let t = self.bump()?;
        match t.token {
            Token::Name(n) => {
                if matches!(self.lex.peek()?, Token::Walrus) {
                    self.bump()?;
                    let value = self.parse_expression()?;
                    let span = t.span.to(value.span);
                    return Ok(Expr {
                        span,
                        kind: ExprKind::Named {
                            target: n,
                            value: Box::new(value),
                        },
                    });
                }
                Ok(Expr {
                    span: t.span,
                    kind: ExprKind::Name(n),
                })
            }
            Token::Number(n) => Ok(Expr {
                span: t.span,
                kind: ExprKind::Number(n),
            }),
            Token::Str(raw) => {
                let mut value = decode_str_value(raw);
                let mut span = t.span;
                // Adjacent plain string literals concatenate.
                while matches!(self.lex.peek()?, Token::Str(_)) {
                    let next = self.bump()?;
                    if let Token::Str(raw) = next.token {
                        value.push_str(&decode_str_value(raw));
                        span = span.to(next.span);
                    }
                }
                Ok(Expr {
                    span,
                    kind: ExprKind::Str(value),
                })
            }
            Token::FStr(raw) => {
                fstring::parse_interpolated(raw, t.span, fstring::Style::F, self.interp_depth)
            }
            Token::TStr(raw) => {
                fstring::parse_interpolated(raw, t.span, fstring::Style::T, self.interp_depth)
            }
            Token::KwTrue => Ok(Expr {
                span: t.span,
                kind: ExprKind::Bool(true),
            }),
            Token::KwFalse => Ok(Expr {
                span: t.span,
                kind: ExprKind::Bool(false),
            }),
            Token::KwNone => Ok(Expr {
                span: t.span,
                kind: ExprKind::None,
            }),
            Token::Ellipsis => Ok(Expr {
                span: t.span,
                kind: ExprKind::Ellipsis,
            }),
            Token::LParen => self.parse_paren_atom(t.span),
            Token::LBracket => self.parse_bracket_atom(t.span),
            Token::LBrace => self.parse_brace_atom(t.span),
            other => Err(ParseError::syntax(
                format!("expected an expression, found {}", other.describe()),
                t.span,
            )),
        }
    }

    /// After `(`: empty tuple, parenthesised yield, generator expression,
    /// tuple display, or plain grouping.
    fn parse_paren_atom(&mut self, open: Span) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::RParen) {
            let close = self.bump()?.span;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::Tuple(Vec::new()),
            });
        }
        if matches!(self.lex.peek()?, Token::KwYield) {
            let e = self.parse_yield()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(e);
        }
        let first = self.parse_star_or_expr()?;
        if matches!(self.lex.peek()?, Token::KwFor) {
            let generators = self.parse_comp_clauses()?;
            let close = self.expect(&Token::RParen, "')'")?;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::GeneratorExp {
                    elt: Box::new(first),
                    generators,
                },
            });
        }
        if matches!(self.lex.peek()?, Token::Comma) {
            let mut elts = vec![first];
            while self.eat(&Token::Comma)? {
                if matches!(self.lex.peek()?, Token::RParen) {
                    break;
                }
                elts.push(self.parse_star_or_expr()?);
            }
            let close = self.expect(&Token::RParen, "')'")?;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::Tuple(elts),
            });
        }
        self.expect(&Token::RParen, "')'")?;
        // Plain grouping: the inner node is returned unchanged.
        Ok(first)
    }

    /// After `[`: list display or list comprehension.
    fn parse_bracket_atom(&mut self, open: Span) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::RBracket) {
            let close = self.bump()?.span;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::List(Vec::new()),
            });
        }
        let first = self.parse_star_or_expr()?;
        if matches!(self.lex.peek()?, Token::KwFor) {
            let generators = self.parse_comp_clauses()?;
            let close = self.expect(&Token::RBracket, "']'")?;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::ListComp {
                    elt: Box::new(first),
                    generators,
                },
            });
        }
        let mut elts = vec![first];
        while self.eat(&Token::Comma)? {
            if matches!(self.lex.peek()?, Token::RBracket) {
                break;
            }
            elts.push(self.parse_star_or_expr()?);
        }
        let close = self.expect(&Token::RBracket, "']'")?;
        Ok(Expr {
            span: open.to(close),
            kind: ExprKind::List(elts),
        })
    }

    /// After `{`: dict display, set display, or the comprehension forms.
    fn parse_brace_atom(&mut self, open: Span) -> ParseResult<Expr<'src>> {
        if matches!(self.lex.peek()?, Token::RBrace) {
            let close = self.bump()?.span;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::Dict {
                    keys: Vec::new(),
                    values: Vec::new(),
                },
            });
        }
        if matches!(self.lex.peek()?, Token::DoubleStar) {
            // `{**base, ...}` — unambiguously a dict.
            let mut keys = Vec::new();
            let mut values = Vec::new();
            self.parse_dict_entry(&mut keys, &mut values)?;
            while self.eat(&Token::Comma)? {
                if matches!(self.lex.peek()?, Token::RBrace) {
                    break;
                }
                self.parse_dict_entry(&mut keys, &mut values)?;
            }
            let close = self.expect(&Token::RBrace, "'}'")?;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::Dict { keys, values },
            });
        }
        let first = self.parse_star_or_expr()?;
        if self.eat(&Token::Colon)? {
            let value = self.parse_expression()?;
            if matches!(self.lex.peek()?, Token::KwFor) {
                let generators = self.parse_comp_clauses()?;
                let close = self.expect(&Token::RBrace, "'}'")?;
                return Ok(Expr {
                    span: open.to(close),
                    kind: ExprKind::DictComp {
                        key: Box::new(first),
                        value: Box::new(value),
                        generators,
                    },
                });
            }
            let mut keys = vec![Some(first)];
            let mut values = vec![value];
            while self.eat(&Token::Comma)? {
                if matches!(self.lex.peek()?, Token::RBrace) {
                    break;
                }
                self.parse_dict_entry(&mut keys, &mut values)?;
            }
            let close = self.expect(&Token::RBrace, "'}'")?;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::Dict { keys, values },
            });
        }
        if matches!(self.lex.peek()?, Token::KwFor) {
            let generators = self.parse_comp_clauses()?;
            let close = self.expect(&Token::RBrace, "'}'")?;
            return Ok(Expr {
                span: open.to(close),
                kind: ExprKind::SetComp {
                    elt: Box::new(first),
                    generators,
                },
            });
        }
        let mut elts = vec![first];
        while self.eat(&Token::Comma)? {
            if matches!(self.lex.peek()?, Token::RBrace) {
                break;
            }
            elts.push(self.parse_star_or_expr()?);
        }
        let close = self.expect(&Token::RBrace, "'}'")?;
        Ok(Expr {
            span: open.to(close),
            kind: ExprKind::Set(elts),
        })
    }

    fn parse_dict_entry(
        &mut self,
        keys: &mut Vec<Option<Expr<'src>>>,
        values: &mut Vec<Expr<'src>>,
    ) -> ParseResult<()> {
        if self.eat(&Token::DoubleStar)? {
            let v = self.parse_or_test()?;
            keys.push(None);
            values.push(v);
        } else {
            let k = self.parse_expression()?;
            self.expect(&Token::Colon, "':' in dict display")?;
            let v = self.parse_expression()?;
            keys.push(Some(k));
            values.push(v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(src: &str) -> Expr<'_> {
        let mut p = Parser::new(src);
        let e = p.parse_expression().expect("expression parses");
        e
    }

    fn expr_err(src: &str) -> ParseError {
        let mut p = Parser::new(src);
        p.parse_expression().expect_err("expected parse failure")
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        // a or b and c  →  Or[a, And[b, c]]
        let e = expr("a or b and c");
        let ExprKind::BoolOp { op, values } = e.kind else {
            panic!("expected BoolOp, got {:?}", e.kind);
        };
        assert_eq!(op, BoolOperator::Or);
        assert_eq!(values.len(), 2);
        assert!(matches!(
            values[1].kind,
            ExprKind::BoolOp {
                op: BoolOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn test_bool_op_values_are_flat() {
        let e = expr("a or b or c");
        let ExprKind::BoolOp { values, .. } = e.kind else {
            panic!("expected BoolOp");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_power_is_right_associative() {
        // 2 ** 3 ** 2  →  2 ** (3 ** 2)
        let e = expr("2 ** 3 ** 2");
        let ExprKind::BinOp { left, op, right } = e.kind else {
            panic!("expected BinOp");
        };
        assert_eq!(op, Operator::Pow);
        assert!(matches!(left.kind, ExprKind::Number("2")));
        assert!(matches!(
            right.kind,
            ExprKind::BinOp {
                op: Operator::Pow,
                ..
            }
        ));
    }

    #[test]
    fn test_union_pipe_is_left_associative() {
        // int | str | float  →  (int | str) | float
        let e = expr("int | str | float");
        let ExprKind::BinOp { left, op, right } = e.kind else {
            panic!("expected BinOp");
        };
        assert_eq!(op, Operator::BitOr);
        assert!(matches!(right.kind, ExprKind::Name("float")));
        assert!(matches!(
            left.kind,
            ExprKind::BinOp {
                op: Operator::BitOr,
                ..
            }
        ));
    }

    #[test]
    fn test_explicit_grouping_changes_shape() {
        // int | (str | float) groups to the right.
        let e = expr("int | (str | float)");
        let ExprKind::BinOp { left, right, .. } = e.kind else {
            panic!("expected BinOp");
        };
        assert!(matches!(left.kind, ExprKind::Name("int")));
        assert!(matches!(right.kind, ExprKind::BinOp { .. }));
    }

    #[test]
    fn test_single_comparison() {
        let e = expr("a < b");
        assert!(matches!(
            e.kind,
            ExprKind::Compare {
                op: CmpOperator::Lt,
                ..
            }
        ));
    }

    #[test]
    fn test_is_not_and_not_in() {
        assert!(matches!(
            expr("x is not None").kind,
            ExprKind::Compare {
                op: CmpOperator::IsNot,
                ..
            }
        ));
        assert!(matches!(
            expr("x not in xs").kind,
            ExprKind::Compare {
                op: CmpOperator::NotIn,
                ..
            }
        ));
    }

    #[test]
    fn test_chained_comparison_is_unsupported() {
        let e = expr_err("a < b < c");
        assert_eq!(e.kind, crate::error::ErrorKind::Unsupported);
        assert!(e.message.contains("chained comparisons"));
    }

    #[test]
    fn test_ternary_right_nesting() {
        let e = expr("a if p else b if q else c");
        let ExprKind::IfExp { orelse, .. } = e.kind else {
            panic!("expected IfExp");
        };
        assert!(matches!(orelse.kind, ExprKind::IfExp { .. }));
    }

    #[test]
    fn test_ternary_requires_else() {
        let e = expr_err("a if p");
        assert_eq!(e.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn test_call_args_and_keywords() {
        let e = expr("f(1, x, key=2, *rest, **extra)");
        let ExprKind::Call {
            args, keywords, ..
        } = e.kind
        else {
            panic!("expected Call");
        };
        assert_eq!(args.len(), 3); // 1, x, *rest
        assert!(matches!(args[2].kind, ExprKind::Starred(_)));
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].arg, Some("key"));
        assert_eq!(keywords[1].arg, None);
    }

    #[test]
    fn test_attribute_chain() {
        let e = expr("a.b.c");
        let ExprKind::Attribute { value, attr } = e.kind else {
            panic!("expected Attribute");
        };
        assert_eq!(attr, "c");
        assert!(matches!(value.kind, ExprKind::Attribute { .. }));
    }

    #[test]
    fn test_slice_full_form() {
        let e = expr("arr[1:5:2]");
        let ExprKind::Subscript { index, .. } = e.kind else {
            panic!("expected Subscript");
        };
        let ExprKind::Slice { lower, upper, step } = index.kind else {
            panic!("expected Slice, got {:?}", index.kind);
        };
        assert!(lower.is_some() && upper.is_some() && step.is_some());
    }

    #[test]
    fn test_slice_open_ended() {
        let e = expr("arr[:]");
        let ExprKind::Subscript { index, .. } = e.kind else {
            panic!("expected Subscript");
        };
        let ExprKind::Slice { lower, upper, step } = index.kind else {
            panic!("expected Slice");
        };
        assert!(lower.is_none() && upper.is_none() && step.is_none());
    }

    #[test]
    fn test_generic_subscript_is_tuple() {
        // dict[str, int]  →  Subscript with a Tuple index, not a Slice.
        let e = expr("dict[str, int]");
        let ExprKind::Subscript { index, .. } = e.kind else {
            panic!("expected Subscript");
        };
        let ExprKind::Tuple(elts) = index.kind else {
            panic!("expected Tuple index, got {:?}", index.kind);
        };
        assert_eq!(elts.len(), 2);
    }

    #[test]
    fn test_mixed_slice_and_expr_subscript() {
        let e = expr("m[1:2, 3]");
        let ExprKind::Subscript { index, .. } = e.kind else {
            panic!("expected Subscript");
        };
        let ExprKind::Tuple(elts) = index.kind else {
            panic!("expected Tuple index");
        };
        assert!(matches!(elts[0].kind, ExprKind::Slice { .. }));
        assert!(matches!(elts[1].kind, ExprKind::Number("3")));
    }

    #[test]
    fn test_chained_subscripts() {
        let e = expr("arr[1:3][0:1]");
        let ExprKind::Subscript { value, .. } = e.kind else {
            panic!("expected Subscript");
        };
        assert!(matches!(value.kind, ExprKind::Subscript { .. }));
    }

    #[test]
    fn test_adjacent_string_concatenation() {
        let e = expr("'a' \"b\" 'c'");
        assert!(matches!(e.kind, ExprKind::Str(ref s) if s == "abc"));
    }

    #[test]
    fn test_list_comprehension() {
        let e = expr("[x * 2 for x in xs if x > 0]");
        let ExprKind::ListComp { generators, .. } = e.kind else {
            panic!("expected ListComp");
        };
        assert_eq!(generators.len(), 1);
        assert_eq!(generators[0].ifs.len(), 1);
    }

    #[test]
    fn test_dict_comprehension() {
        let e = expr("{k: v for k, v in items}");
        let ExprKind::DictComp { generators, .. } = e.kind else {
            panic!("expected DictComp");
        };
        assert!(matches!(generators[0].target.kind, ExprKind::Tuple(_)));
    }

    #[test]
    fn test_set_and_dict_displays() {
        assert!(matches!(expr("{1, 2}").kind, ExprKind::Set(_)));
        let ExprKind::Dict { keys, .. } = expr("{'a': 1, **extra}").kind else {
            panic!("expected Dict");
        };
        assert_eq!(keys.len(), 2);
        assert!(keys[0].is_some());
        assert!(keys[1].is_none());
    }

    #[test]
    fn test_empty_displays() {
        assert!(matches!(expr("()").kind, ExprKind::Tuple(ref v) if v.is_empty()));
        assert!(matches!(expr("[]").kind, ExprKind::List(ref v) if v.is_empty()));
        assert!(matches!(expr("{}").kind, ExprKind::Dict { ref keys, .. } if keys.is_empty()));
    }

    #[test]
    fn test_lambda_with_defaults() {
        let e = expr("lambda x, y=1: x + y");
        let ExprKind::Lambda { params, .. } = e.kind else {
            panic!("expected Lambda");
        };
        assert_eq!(params.args.len(), 2);
        assert!(params.args[1].default.is_some());
    }

    #[test]
    fn test_walrus() {
        let e = expr("(n := compute())");
        let ExprKind::Named { target, .. } = e.kind else {
            panic!("expected Named, got {:?}", e.kind);
        };
        assert_eq!(target, "n");
    }

    #[test]
    fn test_await_under_power() {
        let e = expr("await f() ** 2");
        let ExprKind::BinOp { left, op, .. } = e.kind else {
            panic!("expected BinOp");
        };
        assert_eq!(op, Operator::Pow);
        assert!(matches!(left.kind, ExprKind::Await(_)));
    }

    #[test]
    fn test_generator_as_sole_call_argument() {
        let e = expr("sum(x for x in xs)");
        let ExprKind::Call { args, .. } = e.kind else {
            panic!("expected Call");
        };
        assert_eq!(args.len(), 1);
        assert!(matches!(args[0].kind, ExprKind::GeneratorExp { .. }));
    }

    #[test]
    fn test_invalid_target_rejected() {
        let mut p = Parser::new("f() ");
        let e = p.parse_target().expect_err("call is not a target");
        assert!(e.message.contains("assignment target"));
    }

    #[test]
    fn test_unary_precedence_with_power() {
        // -2 ** 2  →  -(2 ** 2)
        let e = expr("-2 ** 2");
        let ExprKind::UnaryOp { op, operand } = e.kind else {
            panic!("expected UnaryOp");
        };
        assert_eq!(op, UnaryOperator::USub);
        assert!(matches!(
            operand.kind,
            ExprKind::BinOp {
                op: Operator::Pow,
                ..
            }
        ));
    }

    #[test]
    fn test_deep_unary_chain_is_bounded() {
        let mut src = "-".repeat(5000);
        src.push('1');
        let e = expr_err(&src);
        assert!(e.message.contains("nesting too deep"));
    }

    #[test]
    fn test_deep_not_chain_is_bounded() {
        let mut src = "not ".repeat(5000);
        src.push('x');
        let e = expr_err(&src);
        assert!(e.message.contains("nesting too deep"));
    }

    #[test]
    fn test_deep_power_chain_is_bounded() {
        let mut src = "2**".repeat(5000);
        src.push('2');
        let e = expr_err(&src);
        assert!(e.message.contains("nesting too deep"));
    }
}
