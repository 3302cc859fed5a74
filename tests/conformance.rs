//! Whole-module tree-shape tests: parse realistic snippets through the public
//! API and assert on the resulting node structure.

use larch::ast::{CmpOperator, ExprKind, InterpPart, StmtKind};
use larch::{ErrorKind, parse};

fn parse_one(src: &str) -> larch::ast::Module<'_> {
    parse(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
}

// ── indentation ──────────────────────────────────────────────────────────────

#[test]
fn test_deeply_nested_blocks() {
    let src = "\
if a:
    if b:
        if c:
            x = 1
        y = 2
    z = 3
w = 4
";
    let module = parse_one(src);
    assert_eq!(module.body.len(), 2);
    let StmtKind::If { body, .. } = &module.body[0].kind else {
        panic!("expected If");
    };
    assert_eq!(body.len(), 2);
    let StmtKind::If { body: inner, .. } = &body[0].kind else {
        panic!("expected nested If");
    };
    assert_eq!(inner.len(), 2);
}

#[test]
fn test_blank_and_comment_lines_do_not_dedent() {
    let src = "\
def f():
    x = 1

    # a comment at a different column
    y = 2
    return x + y
";
    let module = parse_one(src);
    let StmtKind::FunctionDef(def) = &module.body[0].kind else {
        panic!("expected FunctionDef");
    };
    assert_eq!(def.body.len(), 3);
}

#[test]
fn test_dedent_to_unknown_width_is_lexical() {
    let src = "\
if a:
        x = 1
    y = 2
";
    let err = parse(src).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
    assert!(err.message.contains("unindent"));
}

// ── control flow shapes ──────────────────────────────────────────────────────

#[test]
fn test_elif_chain_nests_in_orelse() {
    let src = "\
if a:
    x = 1
elif b:
    x = 2
elif c:
    x = 3
else:
    x = 4
";
    let module = parse_one(src);
    let StmtKind::If { orelse, .. } = &module.body[0].kind else {
        panic!("expected If");
    };
    assert_eq!(orelse.len(), 1, "elif must nest as a single If");
    let StmtKind::If { orelse: second, .. } = &orelse[0].kind else {
        panic!("expected nested If for elif");
    };
    let StmtKind::If { orelse: last, .. } = &second[0].kind else {
        panic!("expected second nested If");
    };
    assert_eq!(last.len(), 1, "final else body");
    assert!(matches!(last[0].kind, StmtKind::Assign { .. }));
}

#[test]
fn test_loop_else_populated_vs_empty() {
    let with_else = parse_one("for i in xs:\n    pass\nelse:\n    done()\n");
    let StmtKind::For { orelse, .. } = &with_else.body[0].kind else {
        panic!("expected For");
    };
    assert_eq!(orelse.len(), 1);

    let without = parse_one("for i in xs:\n    pass\n");
    let StmtKind::For { orelse, .. } = &without.body[0].kind else {
        panic!("expected For");
    };
    assert!(orelse.is_empty());
}

#[test]
fn test_try_full_shape() {
    let src = "\
try:
    risky()
except ValueError as exc:
    handle(exc)
except Exception:
    fallback()
else:
    celebrate()
finally:
    cleanup()
";
    let module = parse_one(src);
    let StmtKind::Try {
        body,
        handlers,
        orelse,
        finalbody,
    } = &module.body[0].kind
    else {
        panic!("expected Try");
    };
    assert_eq!(body.len(), 1);
    assert_eq!(handlers.len(), 2);
    assert_eq!(handlers[0].name, Some("exc"));
    assert!(handlers[0].type_expr.is_some());
    assert!(handlers[1].name.is_none());
    assert_eq!(orelse.len(), 1);
    assert_eq!(finalbody.len(), 1);
}

// ── soft keywords ────────────────────────────────────────────────────────────

#[test]
fn test_match_and_case_are_plain_names() {
    let module = parse_one("match = 1\ncase = match + 1\nprint(match, case)\n");
    assert_eq!(module.body.len(), 3);
    let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
        panic!("expected Assign");
    };
    assert_eq!(targets[0].kind, ExprKind::Name("match"));
}

// ── interpolated strings ─────────────────────────────────────────────────────

#[test]
fn test_fstring_conversion_and_spec() {
    let module = parse_one("msg = f\"value={v!r:>{width}.2f} end\"\n");
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected Assign");
    };
    let ExprKind::FString(parts) = &value.kind else {
        panic!("expected FString");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], InterpPart::Literal("value=".to_string()));
    let InterpPart::Interpolation {
        value: inner,
        conversion,
        format_spec,
    } = &parts[1]
    else {
        panic!("expected interpolation");
    };
    assert_eq!(inner.kind, ExprKind::Name("v"));
    assert_eq!(*conversion, Some('r'));
    let spec = format_spec.as_ref().expect("format spec present");
    // ">", nested {width} interpolation, ".2f"
    assert_eq!(spec.len(), 3);
    assert!(matches!(&spec[1], InterpPart::Interpolation { value, .. }
        if value.kind == ExprKind::Name("width")));
    assert_eq!(parts[2], InterpPart::Literal(" end".to_string()));
}

#[test]
fn test_tstring_is_distinct_from_fstring() {
    let module = parse_one("a = t\"hi {name}\"\nb = f\"hi {name}\"\n");
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected Assign");
    };
    assert!(matches!(value.kind, ExprKind::TString(_)));
    let StmtKind::Assign { value, .. } = &module.body[1].kind else {
        panic!("expected Assign");
    };
    assert!(matches!(value.kind, ExprKind::FString(_)));
}

#[test]
fn test_fstring_interpolation_spans_point_into_source() {
    let src = "x = f\"ab{total}cd\"\n";
    let module = parse_one(src);
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected Assign");
    };
    let ExprKind::FString(parts) = &value.kind else {
        panic!("expected FString");
    };
    let InterpPart::Interpolation { value: inner, .. } = &parts[1] else {
        panic!("expected interpolation");
    };
    let start = inner.span.start as usize;
    let end = inner.span.end as usize;
    assert_eq!(&src[start..end], "total");
}

// ── decorators and definitions ───────────────────────────────────────────────

#[test]
fn test_decorator_source_order() {
    let src = "\
@first
@second(arg)
def f():
    pass
";
    let module = parse_one(src);
    let StmtKind::FunctionDef(def) = &module.body[0].kind else {
        panic!("expected FunctionDef");
    };
    assert_eq!(def.decorators.len(), 2);
    assert_eq!(def.decorators[0].kind, ExprKind::Name("first"));
    assert!(matches!(def.decorators[1].kind, ExprKind::Call { .. }));
}

#[test]
fn test_full_parameter_groups() {
    let src = "def f(a, b, /, c, d=1, *rest, e, f=2, **extra):\n    pass\n";
    let module = parse_one(src);
    let StmtKind::FunctionDef(def) = &module.body[0].kind else {
        panic!("expected FunctionDef");
    };
    let p = &def.params;
    assert_eq!(p.posonly.len(), 2);
    assert_eq!(p.args.len(), 2);
    assert_eq!(p.vararg.as_ref().unwrap().name, "rest");
    assert_eq!(p.kwonly.len(), 2);
    assert_eq!(p.kwarg.as_ref().unwrap().name, "extra");
    assert!(p.args[1].default.is_some());
    assert!(p.kwonly[0].default.is_none());
}

#[test]
fn test_class_with_bases_and_keywords() {
    let src = "class C(Base, Mixin, metaclass=Meta):\n    pass\n";
    let module = parse_one(src);
    let StmtKind::ClassDef(def) = &module.body[0].kind else {
        panic!("expected ClassDef");
    };
    assert_eq!(def.name, "C");
    assert_eq!(def.bases.len(), 2);
    assert_eq!(def.keywords.len(), 1);
    assert_eq!(def.keywords[0].arg, Some("metaclass"));
}

// ── malformed inputs ─────────────────────────────────────────────────────────

#[test]
fn test_error_kinds_by_category() {
    let cases: &[(&str, ErrorKind)] = &[
        ("x = 'open\n", ErrorKind::Lexical),
        ("x = (1\n", ErrorKind::Lexical),
        ("if a:\n      x = 1\n   y = 2\n", ErrorKind::Lexical),
        ("def f(:\n    pass\n", ErrorKind::Syntax),
        ("x = = 1\n", ErrorKind::Syntax),
        ("if x:\npass\n", ErrorKind::Syntax),
        ("a < b < c\n", ErrorKind::Unsupported),
    ];
    for (src, expected) in cases {
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, *expected, "for input {src:?}: {}", err.message);
    }
}

#[test]
fn test_comparison_single_relation_shape() {
    let module = parse_one("flag = total >= limit\n");
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected Assign");
    };
    let ExprKind::Compare { left, op, right } = &value.kind else {
        panic!("expected Compare");
    };
    assert_eq!(left.kind, ExprKind::Name("total"));
    assert_eq!(*op, CmpOperator::GtE);
    assert_eq!(right.kind, ExprKind::Name("limit"));
}

// ── realistic module ─────────────────────────────────────────────────────────

#[test]
fn test_realistic_module_shape() {
    let src = r#"
"""Module docstring."""

import json
from dataclasses import dataclass, field


@dataclass
class Record:
    key: str
    tags: list = field(default_factory=list)

    def render(self) -> str:
        return f"{self.key}: {', '.join(self.tags)}"


def load_all(path):
    with open(path) as fh:
        raw = json.load(fh)
    records = [Record(key=item["key"], tags=item.get("tags", [])) for item in raw]
    return {r.key: r for r in records}
"#;
    let module = parse_one(src);
    assert_eq!(module.body.len(), 5);
    assert!(matches!(&module.body[0].kind, StmtKind::Expr(e)
        if matches!(e.kind, ExprKind::Str(_))));
    assert!(matches!(module.body[1].kind, StmtKind::Import(_)));
    let StmtKind::ImportFrom { module: m, names, .. } = &module.body[2].kind else {
        panic!("expected ImportFrom");
    };
    assert_eq!(*m, Some("dataclasses"));
    assert_eq!(names.len(), 2);
    assert!(matches!(module.body[3].kind, StmtKind::ClassDef(_)));
    let StmtKind::FunctionDef(def) = &module.body[4].kind else {
        panic!("expected FunctionDef");
    };
    assert_eq!(def.name, "load_all");
    assert_eq!(def.body.len(), 3);
    let StmtKind::Return(Some(ret)) = &def.body[2].kind else {
        panic!("expected Return with value");
    };
    assert!(matches!(ret.kind, ExprKind::DictComp { .. }));
}
