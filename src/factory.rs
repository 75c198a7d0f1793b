//! Pluggable tree construction.
//!
//! The grammar never builds nodes directly: every construct goes through
//! an [`AstFactory`], so the same rule code can either materialize the
//! production tree ([`TreeBuilder`]) or merely validate syntax without
//! allocating ([`SyntaxChecker`]).

use crate::ast::{
    Alias, BinOp, BoolOp, CmpOp, Comprehension, Constant, ExceptHandler, Expr, ExprKind,
    FStringElement, Keyword, Mod, Parameters, Stmt, StmtKind, UnaryOp, WithItem,
};
use crate::token::Span;

/// One creation method per grammar construct. Implementations perform
/// construction only: no parsing, no validation beyond node shape, and
/// no observable side effects (rules may be retried after backtracking).
pub trait AstFactory {
    type Expr;
    type Stmt;
    type Mod;

    // Roots.
    fn module(&mut self, body: Vec<Self::Stmt>, span: Span) -> Self::Mod;
    fn interactive(&mut self, body: Vec<Self::Stmt>, span: Span) -> Self::Mod;
    fn expression(&mut self, body: Self::Expr, span: Span) -> Self::Mod;

    // Expressions.
    fn name(&mut self, id: &str, span: Span) -> Self::Expr;
    fn constant(&mut self, value: Constant, span: Span) -> Self::Expr;
    fn fstring(&mut self, parts: Vec<FStringElement<Self::Expr>>, span: Span) -> Self::Expr;
    fn tuple(&mut self, elts: Vec<Self::Expr>, span: Span) -> Self::Expr;
    fn list(&mut self, elts: Vec<Self::Expr>, span: Span) -> Self::Expr;
    fn set(&mut self, elts: Vec<Self::Expr>, span: Span) -> Self::Expr;
    fn dict(
        &mut self,
        keys: Vec<Option<Self::Expr>>,
        values: Vec<Self::Expr>,
        span: Span,
    ) -> Self::Expr;
    fn starred(&mut self, value: Self::Expr, span: Span) -> Self::Expr;
    fn unary_op(&mut self, op: UnaryOp, operand: Self::Expr, span: Span) -> Self::Expr;
    fn binary_op(
        &mut self,
        left: Self::Expr,
        op: BinOp,
        right: Self::Expr,
        span: Span,
    ) -> Self::Expr;
    fn bool_op(&mut self, op: BoolOp, values: Vec<Self::Expr>, span: Span) -> Self::Expr;
    fn compare(
        &mut self,
        left: Self::Expr,
        rest: Vec<(CmpOp, Self::Expr)>,
        span: Span,
    ) -> Self::Expr;
    fn lambda(&mut self, params: Parameters<Self::Expr>, body: Self::Expr, span: Span)
    -> Self::Expr;
    fn if_expr(
        &mut self,
        test: Self::Expr,
        body: Self::Expr,
        orelse: Self::Expr,
        span: Span,
    ) -> Self::Expr;
    fn list_comp(
        &mut self,
        elt: Self::Expr,
        generators: Vec<Comprehension<Self::Expr>>,
        span: Span,
    ) -> Self::Expr;
    fn set_comp(
        &mut self,
        elt: Self::Expr,
        generators: Vec<Comprehension<Self::Expr>>,
        span: Span,
    ) -> Self::Expr;
    fn dict_comp(
        &mut self,
        key: Self::Expr,
        value: Self::Expr,
        generators: Vec<Comprehension<Self::Expr>>,
        span: Span,
    ) -> Self::Expr;
    fn generator_exp(
        &mut self,
        elt: Self::Expr,
        generators: Vec<Comprehension<Self::Expr>>,
        span: Span,
    ) -> Self::Expr;
    fn await_expr(&mut self, value: Self::Expr, span: Span) -> Self::Expr;
    fn yield_expr(&mut self, value: Option<Self::Expr>, span: Span) -> Self::Expr;
    fn yield_from(&mut self, value: Self::Expr, span: Span) -> Self::Expr;
    fn call(
        &mut self,
        func: Self::Expr,
        args: Vec<Self::Expr>,
        keywords: Vec<Keyword<Self::Expr>>,
        span: Span,
    ) -> Self::Expr;
    fn attribute(&mut self, value: Self::Expr, attr: &str, span: Span) -> Self::Expr;
    fn subscript(&mut self, value: Self::Expr, index: Self::Expr, span: Span) -> Self::Expr;
    fn slice(
        &mut self,
        lower: Option<Self::Expr>,
        upper: Option<Self::Expr>,
        step: Option<Self::Expr>,
        span: Span,
    ) -> Self::Expr;
    fn named_expr(&mut self, target: Self::Expr, value: Self::Expr, span: Span) -> Self::Expr;

    // Statements.
    fn expr_stmt(&mut self, value: Self::Expr, span: Span) -> Self::Stmt;
    fn assign(&mut self, targets: Vec<Self::Expr>, value: Self::Expr, span: Span) -> Self::Stmt;
    fn aug_assign(
        &mut self,
        target: Self::Expr,
        op: BinOp,
        value: Self::Expr,
        span: Span,
    ) -> Self::Stmt;
    fn ann_assign(
        &mut self,
        target: Self::Expr,
        annotation: Self::Expr,
        value: Option<Self::Expr>,
        span: Span,
    ) -> Self::Stmt;
    fn type_alias(&mut self, name: &str, value: Self::Expr, span: Span) -> Self::Stmt;
    fn return_stmt(&mut self, value: Option<Self::Expr>, span: Span) -> Self::Stmt;
    fn delete(&mut self, targets: Vec<Self::Expr>, span: Span) -> Self::Stmt;
    fn assert_stmt(
        &mut self,
        test: Self::Expr,
        message: Option<Self::Expr>,
        span: Span,
    ) -> Self::Stmt;
    fn global_stmt(&mut self, names: Vec<String>, span: Span) -> Self::Stmt;
    fn nonlocal_stmt(&mut self, names: Vec<String>, span: Span) -> Self::Stmt;
    fn import(&mut self, names: Vec<Alias>, span: Span) -> Self::Stmt;
    fn import_from(
        &mut self,
        module: Option<String>,
        names: Vec<Alias>,
        level: usize,
        span: Span,
    ) -> Self::Stmt;
    fn if_stmt(
        &mut self,
        test: Self::Expr,
        body: Vec<Self::Stmt>,
        orelse: Vec<Self::Stmt>,
        span: Span,
    ) -> Self::Stmt;
    fn while_stmt(
        &mut self,
        test: Self::Expr,
        body: Vec<Self::Stmt>,
        orelse: Vec<Self::Stmt>,
        span: Span,
    ) -> Self::Stmt;
    fn for_stmt(
        &mut self,
        target: Self::Expr,
        iter: Self::Expr,
        body: Vec<Self::Stmt>,
        orelse: Vec<Self::Stmt>,
        is_async: bool,
        span: Span,
    ) -> Self::Stmt;
    fn with_stmt(
        &mut self,
        items: Vec<WithItem<Self::Expr>>,
        body: Vec<Self::Stmt>,
        is_async: bool,
        span: Span,
    ) -> Self::Stmt;
    fn raise_stmt(
        &mut self,
        exc: Option<Self::Expr>,
        cause: Option<Self::Expr>,
        span: Span,
    ) -> Self::Stmt;
    fn try_stmt(
        &mut self,
        body: Vec<Self::Stmt>,
        handlers: Vec<ExceptHandler<Self::Expr, Self::Stmt>>,
        orelse: Vec<Self::Stmt>,
        finalbody: Vec<Self::Stmt>,
        span: Span,
    ) -> Self::Stmt;
    fn function_def(
        &mut self,
        name: &str,
        params: Parameters<Self::Expr>,
        body: Vec<Self::Stmt>,
        returns: Option<Self::Expr>,
        is_async: bool,
        span: Span,
    ) -> Self::Stmt;
    fn class_def(
        &mut self,
        name: &str,
        bases: Vec<Self::Expr>,
        keywords: Vec<Keyword<Self::Expr>>,
        body: Vec<Self::Stmt>,
        span: Span,
    ) -> Self::Stmt;
    /// Post-hoc decoration of an already-built function or class
    /// definition; the only sanctioned mutation of a finished node.
    fn decorate(&mut self, stmt: Self::Stmt, decorators: Vec<Self::Expr>, span: Span)
    -> Self::Stmt;
    fn pass_stmt(&mut self, span: Span) -> Self::Stmt;
    fn break_stmt(&mut self, span: Span) -> Self::Stmt;
    fn continue_stmt(&mut self, span: Span) -> Self::Stmt;
}

/// Materializing factory: builds the production [`crate::ast`] tree.
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl AstFactory for TreeBuilder {
    type Expr = Expr;
    type Stmt = Stmt;
    type Mod = Mod;

    fn module(&mut self, body: Vec<Stmt>, span: Span) -> Mod {
        Mod::Module { body, span }
    }

    fn interactive(&mut self, body: Vec<Stmt>, span: Span) -> Mod {
        Mod::Interactive { body, span }
    }

    fn expression(&mut self, body: Expr, span: Span) -> Mod {
        Mod::Expression {
            body: Box::new(body),
            span,
        }
    }

    fn name(&mut self, id: &str, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Name(id.to_string()),
            span,
        }
    }

    fn constant(&mut self, value: Constant, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Constant(value),
            span,
        }
    }

    fn fstring(&mut self, parts: Vec<FStringElement<Expr>>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::FString(parts),
            span,
        }
    }

    fn tuple(&mut self, elts: Vec<Expr>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Tuple(elts),
            span,
        }
    }

    fn list(&mut self, elts: Vec<Expr>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::List(elts),
            span,
        }
    }

    fn set(&mut self, elts: Vec<Expr>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Set(elts),
            span,
        }
    }

    fn dict(&mut self, keys: Vec<Option<Expr>>, values: Vec<Expr>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Dict { keys, values },
            span,
        }
    }

    fn starred(&mut self, value: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Starred(Box::new(value)),
            span,
        }
    }

    fn unary_op(&mut self, op: UnaryOp, operand: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            span,
        }
    }

    fn binary_op(&mut self, left: Expr, op: BinOp, right: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        }
    }

    fn bool_op(&mut self, op: BoolOp, values: Vec<Expr>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::BoolOp { op, values },
            span,
        }
    }

    fn compare(&mut self, left: Expr, rest: Vec<(CmpOp, Expr)>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Compare {
                left: Box::new(left),
                rest,
            },
            span,
        }
    }

    fn lambda(&mut self, params: Parameters<Expr>, body: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Lambda {
                params: Box::new(params),
                body: Box::new(body),
            },
            span,
        }
    }

    fn if_expr(&mut self, test: Expr, body: Expr, orelse: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            span,
        }
    }

    fn list_comp(&mut self, elt: Expr, generators: Vec<Comprehension<Expr>>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::ListComp {
                elt: Box::new(elt),
                generators,
            },
            span,
        }
    }

    fn set_comp(&mut self, elt: Expr, generators: Vec<Comprehension<Expr>>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::SetComp {
                elt: Box::new(elt),
                generators,
            },
            span,
        }
    }

    fn dict_comp(
        &mut self,
        key: Expr,
        value: Expr,
        generators: Vec<Comprehension<Expr>>,
        span: Span,
    ) -> Expr {
        Expr {
            kind: ExprKind::DictComp {
                key: Box::new(key),
                value: Box::new(value),
                generators,
            },
            span,
        }
    }

    fn generator_exp(
        &mut self,
        elt: Expr,
        generators: Vec<Comprehension<Expr>>,
        span: Span,
    ) -> Expr {
        Expr {
            kind: ExprKind::GeneratorExp {
                elt: Box::new(elt),
                generators,
            },
            span,
        }
    }

    fn await_expr(&mut self, value: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Await(Box::new(value)),
            span,
        }
    }

    fn yield_expr(&mut self, value: Option<Expr>, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Yield(value.map(Box::new)),
            span,
        }
    }

    fn yield_from(&mut self, value: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::YieldFrom(Box::new(value)),
            span,
        }
    }

    fn call(
        &mut self,
        func: Expr,
        args: Vec<Expr>,
        keywords: Vec<Keyword<Expr>>,
        span: Span,
    ) -> Expr {
        Expr {
            kind: ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
            },
            span,
        }
    }

    fn attribute(&mut self, value: Expr, attr: &str, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Attribute {
                value: Box::new(value),
                attr: attr.to_string(),
            },
            span,
        }
    }

    fn subscript(&mut self, value: Expr, index: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::Subscript {
                value: Box::new(value),
                index: Box::new(index),
            },
            span,
        }
    }

    fn slice(
        &mut self,
        lower: Option<Expr>,
        upper: Option<Expr>,
        step: Option<Expr>,
        span: Span,
    ) -> Expr {
        Expr {
            kind: ExprKind::Slice {
                lower: lower.map(Box::new),
                upper: upper.map(Box::new),
                step: step.map(Box::new),
            },
            span,
        }
    }

    fn named_expr(&mut self, target: Expr, value: Expr, span: Span) -> Expr {
        Expr {
            kind: ExprKind::NamedExpr {
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        }
    }

    fn expr_stmt(&mut self, value: Expr, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Expr(Box::new(value)),
            span,
        }
    }

    fn assign(&mut self, targets: Vec<Expr>, value: Expr, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Assign {
                targets,
                value: Box::new(value),
            },
            span,
        }
    }

    fn aug_assign(&mut self, target: Expr, op: BinOp, value: Expr, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::AugAssign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            },
            span,
        }
    }

    fn ann_assign(
        &mut self,
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::AnnAssign {
                target: Box::new(target),
                annotation: Box::new(annotation),
                value: value.map(Box::new),
            },
            span,
        }
    }

    fn type_alias(&mut self, name: &str, value: Expr, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::TypeAlias {
                name: name.to_string(),
                value: Box::new(value),
            },
            span,
        }
    }

    fn return_stmt(&mut self, value: Option<Expr>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Return(value.map(Box::new)),
            span,
        }
    }

    fn delete(&mut self, targets: Vec<Expr>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Delete(targets),
            span,
        }
    }

    fn assert_stmt(&mut self, test: Expr, message: Option<Expr>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Assert {
                test: Box::new(test),
                message: message.map(Box::new),
            },
            span,
        }
    }

    fn global_stmt(&mut self, names: Vec<String>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Global(names),
            span,
        }
    }

    fn nonlocal_stmt(&mut self, names: Vec<String>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Nonlocal(names),
            span,
        }
    }

    fn import(&mut self, names: Vec<Alias>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Import(names),
            span,
        }
    }

    fn import_from(
        &mut self,
        module: Option<String>,
        names: Vec<Alias>,
        level: usize,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::ImportFrom {
                module,
                names,
                level,
            },
            span,
        }
    }

    fn if_stmt(&mut self, test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::If {
                test: Box::new(test),
                body,
                orelse,
            },
            span,
        }
    }

    fn while_stmt(&mut self, test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::While {
                test: Box::new(test),
                body,
                orelse,
            },
            span,
        }
    }

    fn for_stmt(
        &mut self,
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::For {
                target: Box::new(target),
                iter: Box::new(iter),
                body,
                orelse,
                is_async,
            },
            span,
        }
    }

    fn with_stmt(
        &mut self,
        items: Vec<WithItem<Expr>>,
        body: Vec<Stmt>,
        is_async: bool,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::With {
                items,
                body,
                is_async,
            },
            span,
        }
    }

    fn raise_stmt(&mut self, exc: Option<Expr>, cause: Option<Expr>, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Raise {
                exc: exc.map(Box::new),
                cause: cause.map(Box::new),
            },
            span,
        }
    }

    fn try_stmt(
        &mut self,
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler<Expr, Stmt>>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            span,
        }
    }

    fn function_def(
        &mut self,
        name: &str,
        params: Parameters<Expr>,
        body: Vec<Stmt>,
        returns: Option<Expr>,
        is_async: bool,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::FunctionDef {
                name: name.to_string(),
                params,
                body,
                decorators: Vec::new(),
                returns: returns.map(Box::new),
                is_async,
            },
            span,
        }
    }

    fn class_def(
        &mut self,
        name: &str,
        bases: Vec<Expr>,
        keywords: Vec<Keyword<Expr>>,
        body: Vec<Stmt>,
        span: Span,
    ) -> Stmt {
        Stmt {
            kind: StmtKind::ClassDef {
                name: name.to_string(),
                bases,
                keywords,
                body,
                decorators: Vec::new(),
            },
            span,
        }
    }

    fn decorate(&mut self, stmt: Stmt, decorator_list: Vec<Expr>, span: Span) -> Stmt {
        let kind = match stmt.kind {
            StmtKind::FunctionDef {
                name,
                params,
                body,
                returns,
                is_async,
                ..
            } => StmtKind::FunctionDef {
                name,
                params,
                body,
                decorators: decorator_list,
                returns,
                is_async,
            },
            StmtKind::ClassDef {
                name,
                bases,
                keywords,
                body,
                ..
            } => StmtKind::ClassDef {
                name,
                bases,
                keywords,
                body,
                decorators: decorator_list,
            },
            // The grammar only decorates definitions.
            other => other,
        };
        Stmt { kind, span }
    }

    fn pass_stmt(&mut self, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Pass,
            span,
        }
    }

    fn break_stmt(&mut self, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Break,
            span,
        }
    }

    fn continue_stmt(&mut self, span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Continue,
            span,
        }
    }
}

/// Validation-only factory: every node is `()`, so a full grammar pass
/// costs no tree allocation. Used by the fast syntax-check path.
#[derive(Debug, Default)]
pub struct SyntaxChecker;

impl AstFactory for SyntaxChecker {
    type Expr = ();
    type Stmt = ();
    type Mod = ();

    fn module(&mut self, _body: Vec<()>, _span: Span) {}
    fn interactive(&mut self, _body: Vec<()>, _span: Span) {}
    fn expression(&mut self, _body: (), _span: Span) {}
    fn name(&mut self, _id: &str, _span: Span) {}
    fn constant(&mut self, _value: Constant, _span: Span) {}
    fn fstring(&mut self, _parts: Vec<FStringElement<()>>, _span: Span) {}
    fn tuple(&mut self, _elts: Vec<()>, _span: Span) {}
    fn list(&mut self, _elts: Vec<()>, _span: Span) {}
    fn set(&mut self, _elts: Vec<()>, _span: Span) {}
    fn dict(&mut self, _keys: Vec<Option<()>>, _values: Vec<()>, _span: Span) {}
    fn starred(&mut self, _value: (), _span: Span) {}
    fn unary_op(&mut self, _op: UnaryOp, _operand: (), _span: Span) {}
    fn binary_op(&mut self, _left: (), _op: BinOp, _right: (), _span: Span) {}
    fn bool_op(&mut self, _op: BoolOp, _values: Vec<()>, _span: Span) {}
    fn compare(&mut self, _left: (), _rest: Vec<(CmpOp, ())>, _span: Span) {}
    fn lambda(&mut self, _params: Parameters<()>, _body: (), _span: Span) {}
    fn if_expr(&mut self, _test: (), _body: (), _orelse: (), _span: Span) {}
    fn list_comp(&mut self, _elt: (), _generators: Vec<Comprehension<()>>, _span: Span) {}
    fn set_comp(&mut self, _elt: (), _generators: Vec<Comprehension<()>>, _span: Span) {}
    fn dict_comp(&mut self, _key: (), _value: (), _gens: Vec<Comprehension<()>>, _span: Span) {}
    fn generator_exp(&mut self, _elt: (), _generators: Vec<Comprehension<()>>, _span: Span) {}
    fn await_expr(&mut self, _value: (), _span: Span) {}
    fn yield_expr(&mut self, _value: Option<()>, _span: Span) {}
    fn yield_from(&mut self, _value: (), _span: Span) {}
    fn call(&mut self, _func: (), _args: Vec<()>, _keywords: Vec<Keyword<()>>, _span: Span) {}
    fn attribute(&mut self, _value: (), _attr: &str, _span: Span) {}
    fn subscript(&mut self, _value: (), _index: (), _span: Span) {}
    fn slice(&mut self, _lo: Option<()>, _up: Option<()>, _step: Option<()>, _span: Span) {}
    fn named_expr(&mut self, _target: (), _value: (), _span: Span) {}
    fn expr_stmt(&mut self, _value: (), _span: Span) {}
    fn assign(&mut self, _targets: Vec<()>, _value: (), _span: Span) {}
    fn aug_assign(&mut self, _target: (), _op: BinOp, _value: (), _span: Span) {}
    fn ann_assign(&mut self, _target: (), _ann: (), _value: Option<()>, _span: Span) {}
    fn type_alias(&mut self, _name: &str, _value: (), _span: Span) {}
    fn return_stmt(&mut self, _value: Option<()>, _span: Span) {}
    fn delete(&mut self, _targets: Vec<()>, _span: Span) {}
    fn assert_stmt(&mut self, _test: (), _message: Option<()>, _span: Span) {}
    fn global_stmt(&mut self, _names: Vec<String>, _span: Span) {}
    fn nonlocal_stmt(&mut self, _names: Vec<String>, _span: Span) {}
    fn import(&mut self, _names: Vec<Alias>, _span: Span) {}
    fn import_from(&mut self, _m: Option<String>, _n: Vec<Alias>, _l: usize, _span: Span) {}
    fn if_stmt(&mut self, _test: (), _body: Vec<()>, _orelse: Vec<()>, _span: Span) {}
    fn while_stmt(&mut self, _test: (), _body: Vec<()>, _orelse: Vec<()>, _span: Span) {}
    fn for_stmt(&mut self, _t: (), _i: (), _b: Vec<()>, _o: Vec<()>, _a: bool, _span: Span) {}
    fn with_stmt(&mut self, _items: Vec<WithItem<()>>, _body: Vec<()>, _a: bool, _span: Span) {}
    fn raise_stmt(&mut self, _exc: Option<()>, _cause: Option<()>, _span: Span) {}
    fn try_stmt(
        &mut self,
        _body: Vec<()>,
        _handlers: Vec<ExceptHandler<(), ()>>,
        _orelse: Vec<()>,
        _finalbody: Vec<()>,
        _span: Span,
    ) {
    }
    fn function_def(
        &mut self,
        _name: &str,
        _params: Parameters<()>,
        _body: Vec<()>,
        _returns: Option<()>,
        _is_async: bool,
        _span: Span,
    ) {
    }
    fn class_def(
        &mut self,
        _name: &str,
        _bases: Vec<()>,
        _keywords: Vec<Keyword<()>>,
        _body: Vec<()>,
        _span: Span,
    ) {
    }
    fn decorate(&mut self, _stmt: (), _decorators: Vec<()>, _span: Span) {}
    fn pass_stmt(&mut self, _span: Span) {}
    fn break_stmt(&mut self, _span: Span) {}
    fn continue_stmt(&mut self, _span: Span) {}
}
