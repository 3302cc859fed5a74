//! Interpolated-string segmentation: f-strings and t-strings.
//!
//! The lexer hands over the raw literal untouched.  This module splits the
//! body into literal text and `{expr[!conv][:spec]}` chunks, then re-enters
//! the expression parser on each embedded fragment with a span bias so every
//! node still points into the original source.
//!
//! Format specs are themselves part sequences and may contain further
//! interpolations (`f"{v:{width}}"`), recursively.  Nesting is bounded by
//! [`super::MAX_INTERP_DEPTH`].

use crate::ast::{Expr, ExprKind, InterpPart, Span};
use crate::error::{ParseError, ParseResult};

use super::lexer::split_string_literal;
use super::{Parser, MAX_INTERP_DEPTH};

/// Which interpolating literal style produced the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Style {
    F,
    T,
}

/// Parse a raw f-/t-string token slice into an expression node.
/// `span` is the token's span; `parent_depth` counts enclosing interpolated
/// strings.
pub(super) fn parse_interpolated<'src>(
    raw: &'src str,
    span: Span,
    style: Style,
    parent_depth: u32,
) -> ParseResult<Expr<'src>> {
    let depth = parent_depth + 1;
    if depth > MAX_INTERP_DEPTH {
        return Err(ParseError::syntax(
            "interpolated string nesting too deep",
            span,
        ));
    }
    let pieces = split_string_literal(raw);
    let base = span.start + pieces.body_start as u32;
    let parts = parse_parts(pieces.body, base, pieces.raw, depth)?;
    let kind = match style {
        Style::F => ExprKind::FString(parts),
        Style::T => ExprKind::TString(parts),
    };
    Ok(Expr { span, kind })
}

/// Boundaries of one `{...}` chunk within a string body.
struct Chunk {
    expr_start: usize,
    expr_end: usize,
    conv: Option<char>,
    /// Format-spec byte range (after the `:`), when present.
    spec: Option<(usize, usize)>,
    /// Index of the closing `}`.
    close: usize,
}

fn parse_parts<'src>(
    body: &'src str,
    base: u32,
    raw: bool,
    depth: u32,
) -> ParseResult<Vec<InterpPart<'src>>> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                text.push('{');
                i += 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                text.push('}');
                i += 2;
            }
            b'}' => {
                return Err(ParseError::syntax(
                    "single '}' is not allowed in an interpolated string",
                    Span::new(base + i as u32, base + i as u32 + 1),
                ));
            }
            b'{' => {
                if !text.is_empty() {
                    parts.push(InterpPart::Literal(std::mem::take(&mut text)));
                }
                let chunk = scan_interpolation(body, i, base)?;
                let expr_text = &body[chunk.expr_start..chunk.expr_end];
                if expr_text.trim().is_empty() {
                    return Err(ParseError::syntax(
                        "empty expression in interpolated string",
                        Span::new(base + i as u32, base + chunk.close as u32 + 1),
                    ));
                }
                let mut sub =
                    Parser::for_interpolation(expr_text, base + chunk.expr_start as u32, depth);
                let value = sub.parse_interp_expression()?;
                let format_spec = match chunk.spec {
                    Some((s, e)) => {
                        if depth + 1 > MAX_INTERP_DEPTH {
                            return Err(ParseError::syntax(
                                "interpolated string nesting too deep",
                                Span::new(base + s as u32, base + e as u32),
                            ));
                        }
                        Some(parse_parts(&body[s..e], base + s as u32, raw, depth + 1)?)
                    }
                    None => None,
                };
                parts.push(InterpPart::Interpolation {
                    value,
                    conversion: chunk.conv,
                    format_spec,
                });
                i = chunk.close + 1;
            }
            b'\\' if !raw => {
                i += 1;
                if i >= bytes.len() {
                    text.push('\\');
                    break;
                }
                let c = body[i..]
                    .chars()
                    .next()
                    .expect("index is on a char boundary");
                match c {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '0' => text.push('\0'),
                    '\\' => text.push('\\'),
                    '\'' => text.push('\''),
                    '"' => text.push('"'),
                    '\n' => {}
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                }
                i += c.len_utf8();
            }
            _ => {
                let c = body[i..]
                    .chars()
                    .next()
                    .expect("index is on a char boundary");
                text.push(c);
                i += c.len_utf8();
            }
        }
    }
    if !text.is_empty() {
        parts.push(InterpPart::Literal(text));
    }
    Ok(parts)
}

/// Find the extent of a `{...}` chunk starting at the `{` at `open`.
///
/// Tracks bracket depth and string literals inside the expression so that
/// `:` and `}` within them are not mistaken for the spec separator or the
/// chunk terminator.  A top-level `!conv` tag (not `!=`) ends the
/// expression; a top-level `:` starts the format spec.
fn scan_interpolation(body: &str, open: usize, base: u32) -> ParseResult<Chunk> {
    let bytes = body.as_bytes();
    let unterminated = || {
        ParseError::syntax(
            "expected '}' in interpolated string",
            Span::new(base + open as u32, base + bytes.len() as u32),
        )
    };

    let expr_start = open + 1;
    let mut j = expr_start;
    let mut depth = 0i32;
    let mut in_str: Option<(u8, bool)> = None;
    let mut conv: Option<char> = None;
    let mut conv_pos: Option<usize> = None;
    let mut colon_pos: Option<usize> = None;
    let close;
    loop {
        if j >= bytes.len() {
            return Err(unterminated());
        }
        let b = bytes[j];
        if let Some((q, triple)) = in_str {
            if b == b'\\' {
                j = (j + 2).min(bytes.len());
                continue;
            }
            if b == q {
                if triple {
                    if bytes.get(j + 1) == Some(&q) && bytes.get(j + 2) == Some(&q) {
                        in_str = None;
                        j += 3;
                        continue;
                    }
                } else {
                    in_str = None;
                }
            }
            j += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => {
                let triple = bytes.get(j + 1) == Some(&b) && bytes.get(j + 2) == Some(&b);
                in_str = Some((b, triple));
                j += if triple { 3 } else { 1 };
            }
            b'(' | b'[' | b'{' => {
                depth += 1;
                j += 1;
            }
            b')' | b']' => {
                depth -= 1;
                j += 1;
            }
            b'}' => {
                if depth == 0 {
                    close = j;
                    break;
                }
                depth -= 1;
                j += 1;
            }
            b':' if depth == 0 => {
                colon_pos = Some(j);
                // The rest is the format spec; braces in it nest (for
                // interpolations inside the spec).
                let mut k = j + 1;
                let mut sdepth = 0i32;
                loop {
                    if k >= bytes.len() {
                        return Err(unterminated());
                    }
                    match bytes[k] {
                        b'{' => {
                            sdepth += 1;
                            k += 1;
                        }
                        b'}' => {
                            if sdepth == 0 {
                                break;
                            }
                            sdepth -= 1;
                            k += 1;
                        }
                        _ => k += 1,
                    }
                }
                close = k;
                break;
            }
            b'!' if depth == 0 && bytes.get(j + 1) != Some(&b'=') && conv.is_none() => {
                let c = bytes.get(j + 1).copied();
                let after = bytes.get(j + 2).copied();
                if after.is_none() {
                    return Err(unterminated());
                }
                if matches!(c, Some(b's') | Some(b'r') | Some(b'a'))
                    && matches!(after, Some(b'}') | Some(b':'))
                {
                    conv = Some(c.expect("matched Some above") as char);
                    conv_pos = Some(j);
                    j += 2;
                } else {
                    return Err(ParseError::syntax(
                        "invalid conversion specifier; expected 's', 'r', or 'a'",
                        Span::new(base + j as u32, base + (j + 2).min(bytes.len()) as u32),
                    ));
                }
            }
            _ => j += 1,
        }
    }
    let expr_end = conv_pos.or(colon_pos).unwrap_or(close);
    Ok(Chunk {
        expr_start,
        expr_end,
        conv,
        spec: colon_pos.map(|c| (c + 1, close)),
        close,
    })
}
