//! Syntax tree types for the larch Python parser.
//!
//! Design goals:
//! - Zero-copy: identifiers and number literals borrow `&'src str` slices
//!   from the source buffer — no heap allocation for names.
//! - Closed tagged variants: one enum per node category ([`StmtKind`],
//!   [`ExprKind`]), inspected with exhaustive `match` rather than subtype
//!   polymorphism.
//! - Every node carries a [`Span`] of byte offsets into the source; line and
//!   column are derived on demand (see [`crate::location`]).
//!
//! The tree is built once per parse and is immutable afterwards.  The root
//! [`Module`] owns every node exactly once; there are no back-references.

use std::fmt;

// ── Spans ─────────────────────────────────────────────────────────────────────

/// Byte offset into the source file (0-indexed).
/// Using `u32` keeps nodes small; files >4 GB are not realistic.
pub type Offset = u32;

/// Half-open byte range `[start, end)` of a token or node in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Offset,
    pub end: Offset,
}

impl Span {
    pub fn new(start: Offset, end: Offset) -> Self {
        Self { start, end }
    }

    /// Span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ── Operator tags ─────────────────────────────────────────────────────────────

/// Binary arithmetic / bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

/// `and` / `or`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

/// Comparison operators.  Exactly one per [`ExprKind::Compare`] node —
/// chained comparisons are not part of the supported grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    UAdd,
    USub,
    Invert,
}

// ── Expressions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'src> {
    pub span: Span,
    pub kind: ExprKind<'src>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<'src> {
    /// Identifier reference.
    Name(&'src str),
    /// Numeric literal, kept as raw source text — the parser is purely
    /// syntactic and never folds values.
    Number(&'src str),
    /// String constant with escapes decoded.  Adjacent literals are already
    /// concatenated by the parser.
    Str(String),
    Bool(bool),
    None,
    Ellipsis,

    /// An f-string: alternating text and interpolation parts.
    FString(Vec<InterpPart<'src>>),
    /// A t-string — same segmenting as [`ExprKind::FString`], distinct node
    /// kind so downstream consumers can tell the styles apart.
    TString(Vec<InterpPart<'src>>),

    Tuple(Vec<Expr<'src>>),
    List(Vec<Expr<'src>>),
    Set(Vec<Expr<'src>>),
    /// `keys[i]` is `None` for a `**mapping` unpacking entry.
    Dict {
        keys: Vec<Option<Expr<'src>>>,
        values: Vec<Expr<'src>>,
    },

    BinOp {
        left: Box<Expr<'src>>,
        op: Operator,
        right: Box<Expr<'src>>,
    },
    /// Flat value list, matching CPython's `ast.BoolOp`: `a or b or c` is
    /// one node with three values.
    BoolOp {
        op: BoolOperator,
        values: Vec<Expr<'src>>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr<'src>>,
    },
    /// Single-relation comparison.
    Compare {
        left: Box<Expr<'src>>,
        op: CmpOperator,
        right: Box<Expr<'src>>,
    },

    Call {
        func: Box<Expr<'src>>,
        args: Vec<Expr<'src>>,
        keywords: Vec<Keyword<'src>>,
    },
    Attribute {
        value: Box<Expr<'src>>,
        attr: &'src str,
    },
    /// `value[index]` — `index` is a [`ExprKind::Slice`], a
    /// [`ExprKind::Tuple`] of arguments (generic subscript), or a plain
    /// expression.
    Subscript {
        value: Box<Expr<'src>>,
        index: Box<Expr<'src>>,
    },
    /// `start? : stop? : step?` — only ever appears inside a subscript.
    Slice {
        lower: Option<Box<Expr<'src>>>,
        upper: Option<Box<Expr<'src>>>,
        step: Option<Box<Expr<'src>>>,
    },

    /// `*expr` in a call, display, or assignment target.
    Starred(Box<Expr<'src>>),

    Lambda {
        params: Box<Params<'src>>,
        body: Box<Expr<'src>>,
    },
    /// Conditional expression `body if test else orelse`.
    IfExp {
        test: Box<Expr<'src>>,
        body: Box<Expr<'src>>,
        orelse: Box<Expr<'src>>,
    },
    /// Walrus: `target := value`.
    Named {
        target: &'src str,
        value: Box<Expr<'src>>,
    },
    Await(Box<Expr<'src>>),
    Yield(Option<Box<Expr<'src>>>),
    YieldFrom(Box<Expr<'src>>),

    ListComp {
        elt: Box<Expr<'src>>,
        generators: Vec<Comprehension<'src>>,
    },
    SetComp {
        elt: Box<Expr<'src>>,
        generators: Vec<Comprehension<'src>>,
    },
    DictComp {
        key: Box<Expr<'src>>,
        value: Box<Expr<'src>>,
        generators: Vec<Comprehension<'src>>,
    },
    GeneratorExp {
        elt: Box<Expr<'src>>,
        generators: Vec<Comprehension<'src>>,
    },
}

/// One `for target in iter (if cond)*` clause of a comprehension.  The first
/// clause is the outermost iteration; each subsequent clause nests inside
/// the previous one.  All `if` conditions are conjunctive filters in source
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension<'src> {
    pub target: Expr<'src>,
    pub iter: Expr<'src>,
    pub ifs: Vec<Expr<'src>>,
}

/// A keyword argument in a call: `name=value`, or `**mapping` when `arg`
/// is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword<'src> {
    pub arg: Option<&'src str>,
    pub value: Expr<'src>,
}

// ── Interpolated-string parts ─────────────────────────────────────────────────

/// One segment of an interpolating string literal.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpPart<'src> {
    /// A run of literal text, escapes decoded, `{{`/`}}` collapsed.
    Literal(String),
    /// An embedded `{expr[!conv][:spec]}` chunk.
    Interpolation {
        value: Expr<'src>,
        /// `s`, `r`, or `a` when a `!conv` tag was written.
        conversion: Option<char>,
        /// Format spec, itself a part sequence (nested interpolations are
        /// allowed to arbitrary depth).
        format_spec: Option<Vec<InterpPart<'src>>>,
    },
}

// ── Parameters ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Param<'src> {
    pub name: &'src str,
    pub span: Span,
    /// Annotation expression; never present on lambda parameters.
    pub annotation: Option<Expr<'src>>,
    pub default: Option<Expr<'src>>,
}

/// A full parameter list for `def` / `lambda`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params<'src> {
    /// Parameters before a `/` marker.
    pub posonly: Vec<Param<'src>>,
    pub args: Vec<Param<'src>>,
    /// `*args`, if present.
    pub vararg: Option<Param<'src>>,
    /// Parameters after `*` / `*args`.
    pub kwonly: Vec<Param<'src>>,
    /// `**kwargs`, if present.
    pub kwarg: Option<Param<'src>>,
}

impl<'src> Params<'src> {
    /// True when no parameter of any kind was written.
    pub fn is_empty(&self) -> bool {
        self.posonly.is_empty()
            && self.args.is_empty()
            && self.vararg.is_none()
            && self.kwonly.is_empty()
            && self.kwarg.is_none()
    }
}

// ── Imports ───────────────────────────────────────────────────────────────────

/// One name inside an import statement.
///
/// For `import os.path`: `name = "os.path"`, `asname = None`.
/// For `from x import y as z`: `name = "y"`, `asname = Some("z")`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAlias<'src> {
    pub name: &'src str,
    pub asname: Option<&'src str>,
    pub span: Span,
}

// ── Compound-statement helpers ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler<'src> {
    pub span: Span,
    /// Exception type expression; `None` for a bare `except:`.
    pub type_expr: Option<Expr<'src>>,
    /// `as name` binding, if written.
    pub name: Option<&'src str>,
    pub body: Vec<Stmt<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithItem<'src> {
    pub context: Expr<'src>,
    /// `as target` part, if present.
    pub target: Option<Expr<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef<'src> {
    pub name: &'src str,
    pub is_async: bool,
    pub params: Params<'src>,
    /// `-> ReturnType` annotation, if present.
    pub returns: Option<Expr<'src>>,
    /// Decorator expressions in source order (`@d1` before `@d2`).
    pub decorators: Vec<Expr<'src>>,
    pub body: Vec<Stmt<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef<'src> {
    pub name: &'src str,
    pub bases: Vec<Expr<'src>>,
    /// Keyword arguments in the class header, e.g. `metaclass=Meta`.
    pub keywords: Vec<Keyword<'src>>,
    pub decorators: Vec<Expr<'src>>,
    pub body: Vec<Stmt<'src>>,
}

// ── Statements ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt<'src> {
    pub span: Span,
    pub kind: StmtKind<'src>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind<'src> {
    FunctionDef(Box<FuncDef<'src>>),
    ClassDef(Box<ClassDef<'src>>),

    /// `import a, b.c, d as e`
    Import(Vec<ImportAlias<'src>>),
    /// `from .pkg import x, y as z` / `from mod import *`
    ImportFrom {
        /// Dotted module path; `None` for bare `from . import …`.
        module: Option<&'src str>,
        names: Vec<ImportAlias<'src>>,
        /// Number of leading dots (relative import level, 0 = absolute).
        level: u32,
        /// True for `import *` — `names` is empty in that case.
        wildcard: bool,
    },

    /// `a = b = expr`.  Targets are validated Name / Attribute / Subscript /
    /// Tuple / List / Starred expressions.
    Assign {
        targets: Vec<Expr<'src>>,
        value: Expr<'src>,
    },
    /// `target: annotation (= value)?`
    AnnAssign {
        target: Expr<'src>,
        annotation: Expr<'src>,
        value: Option<Expr<'src>>,
    },
    /// `target OP= value`
    AugAssign {
        target: Expr<'src>,
        op: Operator,
        value: Expr<'src>,
    },

    If {
        test: Expr<'src>,
        body: Vec<Stmt<'src>>,
        /// `elif` chains nest as a single `If` statement in here.
        orelse: Vec<Stmt<'src>>,
    },
    While {
        test: Expr<'src>,
        body: Vec<Stmt<'src>>,
        /// Loop-attached `else` clause; empty when not written.
        orelse: Vec<Stmt<'src>>,
    },
    For {
        target: Expr<'src>,
        iter: Expr<'src>,
        body: Vec<Stmt<'src>>,
        orelse: Vec<Stmt<'src>>,
        is_async: bool,
    },
    Try {
        body: Vec<Stmt<'src>>,
        /// Except clauses in source order.
        handlers: Vec<ExceptHandler<'src>>,
        orelse: Vec<Stmt<'src>>,
        finalbody: Vec<Stmt<'src>>,
    },
    With {
        items: Vec<WithItem<'src>>,
        body: Vec<Stmt<'src>>,
        is_async: bool,
    },

    Return(Option<Expr<'src>>),
    Raise {
        exc: Option<Expr<'src>>,
        cause: Option<Expr<'src>>,
    },
    Assert {
        test: Expr<'src>,
        msg: Option<Expr<'src>>,
    },
    Delete(Vec<Expr<'src>>),
    Global(Vec<&'src str>),
    Nonlocal(Vec<&'src str>),
    /// Bare expression statement (call, docstring, …).
    Expr(Expr<'src>),
    Pass,
    Break,
    Continue,
}

// ── Module root ───────────────────────────────────────────────────────────────

/// The root node: an ordered sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Module<'src> {
    pub span: Span,
    pub body: Vec<Stmt<'src>>,
}
