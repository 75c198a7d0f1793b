//! Syntax tree produced by the parser.
//!
//! Nodes are immutable once built and carry the byte span of the source
//! text they cover. Children are owned exclusively by their parent.

use crate::token::Span;

/// Root node; the shape depends on the parse mode.
#[derive(Debug, PartialEq, Clone)]
pub enum Mod {
    Module { body: Vec<Stmt>, span: Span },
    Interactive { body: Vec<Stmt>, span: Span },
    Expression { body: Box<Expr>, span: Span },
}

impl Mod {
    pub fn span(&self) -> Span {
        match self {
            Mod::Module { span, .. }
            | Mod::Interactive { span, .. }
            | Mod::Expression { span, .. } => *span,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtKind {
    FunctionDef {
        name: String,
        params: Parameters<Expr>,
        body: Vec<Stmt>,
        decorators: Vec<Expr>,
        returns: Option<Box<Expr>>,
        is_async: bool,
    },
    ClassDef {
        name: String,
        bases: Vec<Expr>,
        keywords: Vec<Keyword<Expr>>,
        body: Vec<Stmt>,
        decorators: Vec<Expr>,
    },
    Assign {
        targets: Vec<Expr>,
        value: Box<Expr>,
    },
    AugAssign {
        target: Box<Expr>,
        op: BinOp,
        value: Box<Expr>,
    },
    AnnAssign {
        target: Box<Expr>,
        annotation: Box<Expr>,
        value: Option<Box<Expr>>,
    },
    TypeAlias {
        name: String,
        value: Box<Expr>,
    },
    Return(Option<Box<Expr>>),
    Delete(Vec<Expr>),
    Assert {
        test: Box<Expr>,
        message: Option<Box<Expr>>,
    },
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Import(Vec<Alias>),
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: usize,
    },
    If {
        test: Box<Expr>,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Box<Expr>,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Box<Expr>,
        iter: Box<Expr>,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
    },
    With {
        items: Vec<WithItem<Expr>>,
        body: Vec<Stmt>,
        is_async: bool,
    },
    Raise {
        exc: Option<Box<Expr>>,
        cause: Option<Box<Expr>>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler<Expr, Stmt>>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    Expr(Box<Expr>),
    Pass,
    Break,
    Continue,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprKind {
    Name(String),
    Constant(Constant),
    FString(Vec<FStringElement<Expr>>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    Dict {
        /// `None` key marks a `**mapping` unpacking entry.
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },
    Starred(Box<Expr>),
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    Lambda {
        params: Box<Parameters<Expr>>,
        body: Box<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension<Expr>>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension<Expr>>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension<Expr>>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension<Expr>>,
    },
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword<Expr>>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    NamedExpr {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

/// Literal constant value. Numbers keep their raw text: the front end
/// does not commit to a machine representation (ints are unbounded).
#[derive(Debug, PartialEq, Clone)]
pub enum Constant {
    None,
    Bool(bool),
    Ellipsis,
    Str(String),
    Bytes(Vec<u8>),
    Number { kind: NumberKind, text: String },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NumberKind {
    Int,
    Float,
    Imaginary,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    MatMult,
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

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
    Invert,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CmpOp {
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

/// `!s` / `!r` / `!a` conversion applied to an f-string field.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Conversion {
    Str,
    Repr,
    Ascii,
}

/// One piece of a formatted string: a literal run or a replacement
/// field with its optional conversion and (recursive) format spec.
#[derive(Debug, PartialEq, Clone)]
pub enum FStringElement<E> {
    Literal(String),
    Field {
        value: E,
        conversion: Option<Conversion>,
        spec: Option<Vec<FStringElement<E>>>,
    },
}

/// Full parameter list of a function or lambda.
#[derive(Debug, PartialEq, Clone)]
pub struct Parameters<E> {
    pub posonly: Vec<Param<E>>,
    pub args: Vec<Param<E>>,
    pub vararg: Option<Param<E>>,
    pub kwonly: Vec<Param<E>>,
    pub kwarg: Option<Param<E>>,
}

// Not derived: the derive would demand `E: Default`.
impl<E> Default for Parameters<E> {
    fn default() -> Self {
        Self {
            posonly: Vec::new(),
            args: Vec::new(),
            vararg: None,
            kwonly: Vec::new(),
            kwarg: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Param<E> {
    pub name: String,
    pub annotation: Option<E>,
    pub default: Option<E>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Comprehension<E> {
    pub target: E,
    pub iter: E,
    pub ifs: Vec<E>,
    pub is_async: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ExceptHandler<E, S> {
    pub kind: Option<E>,
    pub name: Option<String>,
    pub body: Vec<S>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WithItem<E> {
    pub context: E,
    pub target: Option<E>,
}

/// Call keyword argument; a `None` name is a `**mapping` unpacking.
#[derive(Debug, PartialEq, Clone)]
pub struct Keyword<E> {
    pub name: Option<String>,
    pub value: E,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
    pub span: Span,
}
