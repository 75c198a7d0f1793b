//! Backtracking recursive-descent parser.
//!
//! Every grammar rule follows the same contract: it returns
//! `Ok(Some(node))` on a match, `Ok(None)` after restoring the cursor to
//! where it started (ordered choice moves on to the next alternative),
//! and `Err` only for fatal conditions — a lexical error token reached,
//! the depth guard tripped, or a malformed f-string field. Statements
//! commit on their leading keyword, so failures past that point surface
//! as diagnostics instead of silent backtracking.

use crate::ast::BinOp;
use crate::cursor::TokenStream;
use crate::error::{ParseResult, SyntaxError};
use crate::factory::AstFactory;
use crate::token::{Span, Token, TokenKind};
use crate::tokenizer::Tokenizer;

mod expr;

pub const DEFAULT_MAX_DEPTH: usize = 200;

/// What shape of input the parser accepts, and therefore what root node
/// the factory produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// A whole source file.
    Module,
    /// A single statement, as typed at a prompt.
    Interactive,
    /// A standalone expression.
    Eval,
    /// The expression of one f-string replacement field.
    FStringField,
}

/// Deepest point a failed expectation reached; the top-level error is
/// reported there rather than at the last backtrack.
struct Failure {
    pos: usize,
    expected: String,
    found: String,
    span: Span,
}

pub struct Parser<'a, F: AstFactory> {
    tokens: TokenStream<'a>,
    factory: F,
    depth: usize,
    max_depth: usize,
    furthest: Option<Failure>,
}

impl<'a, F: AstFactory> Parser<'a, F> {
    pub fn new(source: &'a str, factory: F) -> Self {
        Self {
            tokens: TokenStream::new(Tokenizer::new(source)),
            factory,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            furthest: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(mut self, mode: ParseMode) -> ParseResult<F::Mod> {
        match mode {
            ParseMode::Module => self.file_input(),
            ParseMode::Interactive => self.interactive_input(),
            ParseMode::Eval => self.eval_input(),
            ParseMode::FStringField => self.field_input(),
        }
    }

    // Entry points.

    fn file_input(&mut self) -> ParseResult<F::Mod> {
        let start = self.peek_token()?.span;
        let mut body = Vec::new();
        loop {
            if self.eat(&TokenKind::Newline)?.is_some() {
                continue;
            }
            if self.at(&TokenKind::EndMarker)? {
                break;
            }
            match self.statement()? {
                Some(mut stmts) => body.append(&mut stmts),
                None => return Err(self.syntax_error()?),
            }
        }
        let span = start.to(self.end_span(start));
        Ok(self.factory.module(body, span))
    }

    fn interactive_input(&mut self) -> ParseResult<F::Mod> {
        let start = self.peek_token()?.span;
        let mut body = Vec::new();
        while self.eat(&TokenKind::Newline)?.is_some() {}
        if !self.at(&TokenKind::EndMarker)? {
            match self.statement()? {
                Some(mut stmts) => body.append(&mut stmts),
                None => return Err(self.syntax_error()?),
            }
        }
        while self.eat(&TokenKind::Newline)?.is_some() {}
        self.require(&TokenKind::EndMarker)?;
        let span = start.to(self.end_span(start));
        Ok(self.factory.interactive(body, span))
    }

    fn eval_input(&mut self) -> ParseResult<F::Mod> {
        let start = self.peek_token()?.span;
        let value = self.require_star_expressions()?;
        while self.eat(&TokenKind::Newline)?.is_some() {}
        self.require(&TokenKind::EndMarker)?;
        let span = start.to(self.end_span(start));
        Ok(self.factory.expression(value, span))
    }

    fn field_input(&mut self) -> ParseResult<F::Mod> {
        let start = self.peek_token()?.span;
        let value = match self.yield_or_star_expressions()? {
            Some(value) => value,
            None => return Err(self.syntax_error()?),
        };
        while self.eat(&TokenKind::Newline)?.is_some() {}
        self.require(&TokenKind::EndMarker)?;
        let span = start.to(self.end_span(start));
        Ok(self.factory.expression(value, span))
    }

    // Statements.

    fn statement(&mut self) -> ParseResult<Option<Vec<F::Stmt>>> {
        if let Some(stmt) = self.compound_stmt()? {
            return Ok(Some(vec![stmt]));
        }
        self.simple_stmts()
    }

    /// One logical line of `;`-separated simple statements.
    fn simple_stmts(&mut self) -> ParseResult<Option<Vec<F::Stmt>>> {
        let mark = self.tokens.mark();
        let first = match self.simple_stmt()? {
            Some(stmt) => stmt,
            None => return self.fail(mark),
        };
        let mut stmts = vec![first];
        while self.eat(&TokenKind::Semicolon)?.is_some() {
            match self.simple_stmt()? {
                Some(stmt) => stmts.push(stmt),
                None => break,
            }
        }
        self.require(&TokenKind::Newline)?;
        Ok(Some(stmts))
    }

    fn simple_stmt(&mut self) -> ParseResult<Option<F::Stmt>> {
        let token = self.peek_token()?;
        let span = token.span;
        match token.kind {
            TokenKind::Pass => {
                self.bump();
                Ok(Some(self.factory.pass_stmt(span)))
            }
            TokenKind::Break => {
                self.bump();
                Ok(Some(self.factory.break_stmt(span)))
            }
            TokenKind::Continue => {
                self.bump();
                Ok(Some(self.factory.continue_stmt(span)))
            }
            TokenKind::Return => self.return_stmt().map(Some),
            TokenKind::Raise => self.raise_stmt().map(Some),
            TokenKind::Del => self.del_stmt().map(Some),
            TokenKind::Assert => self.assert_stmt().map(Some),
            TokenKind::Global => self.global_stmt(true).map(Some),
            TokenKind::Nonlocal => self.global_stmt(false).map(Some),
            TokenKind::Import => self.import_stmt().map(Some),
            TokenKind::From => self.import_from_stmt().map(Some),
            TokenKind::Name("type") => self.type_alias_or_expr(),
            _ => self.expression_stmt(),
        }
    }

    fn return_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let value = self.star_expressions()?;
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.return_stmt(value, span))
    }

    fn raise_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let exc = self.expression()?;
        let cause = if exc.is_some() && self.eat(&TokenKind::From)?.is_some() {
            Some(self.require_expression()?)
        } else {
            None
        };
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.raise_stmt(exc, cause, span))
    }

    fn del_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let mut targets = Vec::new();
        loop {
            match self.target_primary()? {
                Some(target) => targets.push(target),
                None => {
                    if targets.is_empty() {
                        return Err(self.syntax_error()?);
                    }
                    break;
                }
            }
            if self.eat(&TokenKind::Comma)?.is_none() {
                break;
            }
        }
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.delete(targets, span))
    }

    fn assert_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let test = self.require_expression()?;
        let message = if self.eat(&TokenKind::Comma)?.is_some() {
            Some(self.require_expression()?)
        } else {
            None
        };
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.assert_stmt(test, message, span))
    }

    fn global_stmt(&mut self, global: bool) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let mut names = vec![self.require_name()?.0.to_string()];
        while self.eat(&TokenKind::Comma)?.is_some() {
            names.push(self.require_name()?.0.to_string());
        }
        let span = kw.to(self.end_span(kw));
        Ok(if global {
            self.factory.global_stmt(names, span)
        } else {
            self.factory.nonlocal_stmt(names, span)
        })
    }

    fn import_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let mut names = Vec::new();
        loop {
            names.push(self.dotted_as_name()?);
            if self.eat(&TokenKind::Comma)?.is_none() {
                break;
            }
        }
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.import(names, span))
    }

    fn import_from_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let mut level = 0usize;
        loop {
            if self.eat(&TokenKind::Dot)?.is_some() {
                level += 1;
            } else if self.eat(&TokenKind::Ellipsis)?.is_some() {
                // Three dots lex as one token.
                level += 3;
            } else {
                break;
            }
        }
        let module = if level > 0 && self.at(&TokenKind::Import)? {
            None
        } else {
            Some(self.dotted_name()?.0)
        };
        self.require(&TokenKind::Import)?;

        let names = if let Some(star) = self.eat(&TokenKind::Star)? {
            vec![crate::ast::Alias {
                name: "*".to_string(),
                asname: None,
                span: star,
            }]
        } else if self.eat(&TokenKind::LParen)?.is_some() {
            let mut names = vec![self.import_as_name()?];
            while self.eat(&TokenKind::Comma)?.is_some() {
                if self.at(&TokenKind::RParen)? {
                    break;
                }
                names.push(self.import_as_name()?);
            }
            self.require(&TokenKind::RParen)?;
            names
        } else {
            let mut names = vec![self.import_as_name()?];
            while self.eat(&TokenKind::Comma)?.is_some() {
                names.push(self.import_as_name()?);
            }
            names
        };
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.import_from(module, names, level, span))
    }

    fn import_as_name(&mut self) -> ParseResult<crate::ast::Alias> {
        let (name, name_span) = self.require_name()?;
        let asname = if self.eat(&TokenKind::As)?.is_some() {
            Some(self.require_name()?.0.to_string())
        } else {
            None
        };
        let span = name_span.to(self.end_span(name_span));
        Ok(crate::ast::Alias {
            name: name.to_string(),
            asname,
            span,
        })
    }

    fn dotted_as_name(&mut self) -> ParseResult<crate::ast::Alias> {
        let (name, name_span) = self.dotted_name()?;
        let asname = if self.eat(&TokenKind::As)?.is_some() {
            Some(self.require_name()?.0.to_string())
        } else {
            None
        };
        let span = name_span.to(self.end_span(name_span));
        Ok(crate::ast::Alias {
            name,
            asname,
            span,
        })
    }

    fn dotted_name(&mut self) -> ParseResult<(String, Span)> {
        let (first, first_span) = self.require_name()?;
        let mut name = first.to_string();
        let mut span = first_span;
        while self.at(&TokenKind::Dot)? {
            // A dot only extends the path when a name follows; `import
            // a.b` versus `from a import b`.
            if !matches!(self.tokens.peek_ahead(1).kind, TokenKind::Name(_)) {
                break;
            }
            self.bump();
            let (part, part_span) = self.require_name()?;
            name.push('.');
            name.push_str(part);
            span = span.to(part_span);
        }
        Ok((name, span))
    }

    /// `type name = value`, applied only when the full soft-keyword
    /// shape is ahead; otherwise `type` is an ordinary name.
    fn type_alias_or_expr(&mut self) -> ParseResult<Option<F::Stmt>> {
        let looks_like_alias = matches!(self.tokens.peek_ahead(1).kind, TokenKind::Name(_))
            && self.tokens.peek_ahead(2).kind == TokenKind::Equal;
        if !looks_like_alias {
            return self.expression_stmt();
        }
        let kw = self.bump().span;
        let (name, _) = self.require_name()?;
        self.require(&TokenKind::Equal)?;
        let value = self.require_expression()?;
        let span = kw.to(self.end_span(kw));
        Ok(Some(self.factory.type_alias(name, value, span)))
    }

    /// Expression statement or any flavor of assignment; the most
    /// specific alternatives are tried first.
    fn expression_stmt(&mut self) -> ParseResult<Option<F::Stmt>> {
        let mark = self.tokens.mark();
        let start = self.peek_token()?.span;

        if let Some(stmt) = self.ann_assign(start)? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.aug_assign(start)? {
            return Ok(Some(stmt));
        }

        let mut targets = Vec::new();
        loop {
            let target_mark = self.tokens.mark();
            match self.star_targets()? {
                Some(target) => {
                    if self.eat(&TokenKind::Equal)?.is_some() {
                        targets.push(target);
                        continue;
                    }
                    self.tokens.reset(target_mark);
                    break;
                }
                None => break,
            }
        }
        if !targets.is_empty() {
            let value = match self.yield_or_star_expressions()? {
                Some(value) => value,
                None => return Err(self.syntax_error()?),
            };
            let span = start.to(self.end_span(start));
            return Ok(Some(self.factory.assign(targets, value, span)));
        }

        match self.yield_or_star_expressions()? {
            Some(value) => {
                let span = start.to(self.end_span(start));
                Ok(Some(self.factory.expr_stmt(value, span)))
            }
            None => self.fail(mark),
        }
    }

    fn ann_assign(&mut self, start: Span) -> ParseResult<Option<F::Stmt>> {
        let mark = self.tokens.mark();
        let target = match self.single_target()? {
            Some(target) => target,
            None => return self.fail(mark),
        };
        if self.eat(&TokenKind::Colon)?.is_none() {
            return self.fail(mark);
        }
        let annotation = self.require_expression()?;
        let value = if self.eat(&TokenKind::Equal)?.is_some() {
            match self.yield_or_star_expressions()? {
                Some(value) => Some(value),
                None => return Err(self.syntax_error()?),
            }
        } else {
            None
        };
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.ann_assign(target, annotation, value, span)))
    }

    fn aug_assign(&mut self, start: Span) -> ParseResult<Option<F::Stmt>> {
        let mark = self.tokens.mark();
        let target = match self.single_target()? {
            Some(target) => target,
            None => return self.fail(mark),
        };
        let op = match self.peek_token()?.kind {
            TokenKind::PlusEqual => BinOp::Add,
            TokenKind::MinusEqual => BinOp::Sub,
            TokenKind::StarEqual => BinOp::Mult,
            TokenKind::AtEqual => BinOp::MatMult,
            TokenKind::SlashEqual => BinOp::Div,
            TokenKind::DoubleSlashEqual => BinOp::FloorDiv,
            TokenKind::PercentEqual => BinOp::Mod,
            TokenKind::DoubleStarEqual => BinOp::Pow,
            TokenKind::LeftShiftEqual => BinOp::LShift,
            TokenKind::RightShiftEqual => BinOp::RShift,
            TokenKind::AmperEqual => BinOp::BitAnd,
            TokenKind::VBarEqual => BinOp::BitOr,
            TokenKind::CaretEqual => BinOp::BitXor,
            _ => return self.fail(mark),
        };
        self.bump();
        let value = match self.yield_or_star_expressions()? {
            Some(value) => value,
            None => return Err(self.syntax_error()?),
        };
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.aug_assign(target, op, value, span)))
    }

    // Compound statements.

    fn compound_stmt(&mut self) -> ParseResult<Option<F::Stmt>> {
        let token = self.peek_token()?;
        Ok(Some(match token.kind {
            TokenKind::If => self.if_stmt()?,
            TokenKind::While => self.while_stmt()?,
            TokenKind::For => self.for_stmt(None)?,
            TokenKind::Try => self.try_stmt()?,
            TokenKind::With => self.with_stmt(None)?,
            TokenKind::Def => self.function_def(None)?,
            TokenKind::Class => self.class_def()?,
            TokenKind::At => self.decorated()?,
            TokenKind::Async => self.async_stmt()?,
            _ => return Ok(None),
        }))
    }

    fn if_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        self.if_tail(kw)
    }

    /// Condition, block, and `elif`/`else` continuation; `elif` recurses
    /// so each arm becomes a nested `if` in the alternative branch.
    fn if_tail(&mut self, kw: Span) -> ParseResult<F::Stmt> {
        let test = self.require_namedexpr()?;
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;
        let orelse = if self.at(&TokenKind::Elif)? {
            let elif_kw = self.bump().span;
            vec![self.if_tail(elif_kw)?]
        } else if self.eat(&TokenKind::Else)?.is_some() {
            self.require(&TokenKind::Colon)?;
            self.block()?
        } else {
            Vec::new()
        };
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.if_stmt(test, body, orelse, span))
    }

    fn while_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let test = self.require_namedexpr()?;
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;
        let orelse = if self.eat(&TokenKind::Else)?.is_some() {
            self.require(&TokenKind::Colon)?;
            self.block()?
        } else {
            Vec::new()
        };
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.while_stmt(test, body, orelse, span))
    }

    fn for_stmt(&mut self, async_kw: Option<Span>) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let start = async_kw.unwrap_or(kw);
        let target = match self.star_targets()? {
            Some(target) => target,
            None => return Err(self.syntax_error()?),
        };
        self.require(&TokenKind::In)?;
        let iter = self.require_star_expressions()?;
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;
        let orelse = if self.eat(&TokenKind::Else)?.is_some() {
            self.require(&TokenKind::Colon)?;
            self.block()?
        } else {
            Vec::new()
        };
        let span = start.to(self.end_span(start));
        Ok(self
            .factory
            .for_stmt(target, iter, body, orelse, async_kw.is_some(), span))
    }

    fn with_stmt(&mut self, async_kw: Option<Span>) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let start = async_kw.unwrap_or(kw);
        let mut items = Vec::new();
        loop {
            let context = self.require_expression()?;
            let target = if self.eat(&TokenKind::As)?.is_some() {
                match self.star_target()? {
                    Some(target) => Some(target),
                    None => return Err(self.syntax_error()?),
                }
            } else {
                None
            };
            items.push(crate::ast::WithItem { context, target });
            if self.eat(&TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;
        let span = start.to(self.end_span(start));
        Ok(self.factory.with_stmt(items, body, async_kw.is_some(), span))
    }

    fn try_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;

        if !self.at(&TokenKind::Except)? && !self.at(&TokenKind::Finally)? {
            let token = self.peek_token()?;
            return Err(SyntaxError::new(
                "expected 'except' or 'finally' block",
                token.span,
            ));
        }

        let mut handlers = Vec::new();
        let mut saw_bare = false;
        while self.at(&TokenKind::Except)? {
            let handler_kw = self.bump().span;
            if saw_bare {
                return Err(SyntaxError::new(
                    "default 'except:' must be last",
                    handler_kw,
                ));
            }
            let kind = if self.at(&TokenKind::Colon)? {
                saw_bare = true;
                None
            } else {
                Some(self.require_expression()?)
            };
            let name = if self.eat(&TokenKind::As)?.is_some() {
                Some(self.require_name()?.0.to_string())
            } else {
                None
            };
            self.require(&TokenKind::Colon)?;
            let handler_body = self.block()?;
            let handler_span = handler_kw.to(self.end_span(handler_kw));
            handlers.push(crate::ast::ExceptHandler {
                kind,
                name,
                body: handler_body,
                span: handler_span,
            });
        }
        let orelse = if self.eat(&TokenKind::Else)?.is_some() {
            self.require(&TokenKind::Colon)?;
            self.block()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat(&TokenKind::Finally)?.is_some() {
            self.require(&TokenKind::Colon)?;
            self.block()?
        } else {
            Vec::new()
        };
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.try_stmt(body, handlers, orelse, finalbody, span))
    }

    fn function_def(&mut self, async_kw: Option<Span>) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let start = async_kw.unwrap_or(kw);
        let (name, _) = self.require_name()?;
        self.require(&TokenKind::LParen)?;
        let params = self.parameters(true)?;
        self.require(&TokenKind::RParen)?;
        let returns = if self.eat(&TokenKind::Arrow)?.is_some() {
            Some(self.require_expression()?)
        } else {
            None
        };
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;
        let span = start.to(self.end_span(start));
        Ok(self
            .factory
            .function_def(name, params, body, returns, async_kw.is_some(), span))
    }

    fn class_def(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let (name, _) = self.require_name()?;
        let (bases, keywords) = if let Some(open) = self.eat(&TokenKind::LParen)? {
            let (bases, keywords, _) = self.call_arguments(open)?;
            (bases, keywords)
        } else {
            (Vec::new(), Vec::new())
        };
        self.require(&TokenKind::Colon)?;
        let body = self.block()?;
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.class_def(name, bases, keywords, body, span))
    }

    fn decorated(&mut self) -> ParseResult<F::Stmt> {
        let start = self.peek_token()?.span;
        let mut decorators = Vec::new();
        while self.eat(&TokenKind::At)?.is_some() {
            decorators.push(self.require_namedexpr()?);
            self.require(&TokenKind::Newline)?;
        }
        let token = self.peek_token()?;
        let stmt = match token.kind {
            TokenKind::Def => self.function_def(None)?,
            TokenKind::Class => self.class_def()?,
            TokenKind::Async => self.async_stmt()?,
            _ => {
                self.note("'def' or 'class'", &token);
                return Err(self.syntax_error()?);
            }
        };
        let span = start.to(self.end_span(start));
        Ok(self.factory.decorate(stmt, decorators, span))
    }

    fn async_stmt(&mut self) -> ParseResult<F::Stmt> {
        let kw = self.bump().span;
        let token = self.peek_token()?;
        match token.kind {
            TokenKind::Def => self.function_def(Some(kw)),
            TokenKind::For => self.for_stmt(Some(kw)),
            TokenKind::With => self.with_stmt(Some(kw)),
            _ => {
                self.note("'def', 'for' or 'with'", &token);
                Err(self.syntax_error()?)
            }
        }
    }

    /// Indented suite after a `:`, or simple statements on the same
    /// line.
    fn block(&mut self) -> ParseResult<Vec<F::Stmt>> {
        if self.eat(&TokenKind::Newline)?.is_some() {
            let indent_token = self.peek_token()?;
            if self.eat(&TokenKind::Indent)?.is_none() {
                return Err(SyntaxError::indentation(
                    "expected an indented block",
                    indent_token.span,
                ));
            }
            let mut body = Vec::new();
            while self.eat(&TokenKind::Dedent)?.is_none() {
                match self.statement()? {
                    Some(mut stmts) => body.append(&mut stmts),
                    None => return Err(self.syntax_error()?),
                }
            }
            return Ok(body);
        }
        match self.simple_stmts()? {
            Some(stmts) => Ok(stmts),
            None => Err(self.syntax_error()?),
        }
    }

    // Token-level helpers.

    /// Current token, with lexical error tokens converted into fatal
    /// diagnostics at the point the parser reaches them.
    fn peek_token(&mut self) -> ParseResult<Token<'a>> {
        let token = self.tokens.peek().clone();
        if let TokenKind::Error(message) = &token.kind {
            return Err(lexical_error(message.clone(), token.span));
        }
        Ok(token)
    }

    fn bump(&mut self) -> Token<'a> {
        self.tokens.advance().clone()
    }

    fn at(&mut self, kind: &TokenKind<'a>) -> ParseResult<bool> {
        Ok(self.peek_token()?.kind == *kind)
    }

    fn eat(&mut self, kind: &TokenKind<'a>) -> ParseResult<Option<Span>> {
        let token = self.peek_token()?;
        if token.kind == *kind {
            self.bump();
            return Ok(Some(token.span));
        }
        Ok(None)
    }

    /// Like `eat`, but a miss is recorded for the furthest-failure
    /// diagnostic.
    fn expect(&mut self, kind: &TokenKind<'a>) -> ParseResult<Option<Span>> {
        let token = self.peek_token()?;
        if token.kind == *kind {
            self.bump();
            return Ok(Some(token.span));
        }
        self.note(kind.describe(), &token);
        Ok(None)
    }

    fn require(&mut self, kind: &TokenKind<'a>) -> ParseResult<Span> {
        match self.expect(kind)? {
            Some(span) => Ok(span),
            None => Err(self.syntax_error()?),
        }
    }

    fn expect_name(&mut self) -> ParseResult<Option<(&'a str, Span)>> {
        let token = self.peek_token()?;
        if let TokenKind::Name(name) = token.kind {
            self.bump();
            return Ok(Some((name, token.span)));
        }
        self.note("a name", &token);
        Ok(None)
    }

    fn require_name(&mut self) -> ParseResult<(&'a str, Span)> {
        match self.expect_name()? {
            Some(name) => Ok(name),
            None => Err(self.syntax_error()?),
        }
    }

    fn note(&mut self, expected: impl Into<String>, token: &Token<'a>) {
        let pos = self.tokens.mark();
        if self.furthest.as_ref().is_none_or(|f| pos >= f.pos) {
            self.furthest = Some(Failure {
                pos,
                expected: expected.into(),
                found: token.kind.describe(),
                span: token.span,
            });
        }
    }

    /// Builds the diagnostic for a fatal failure, preferring the
    /// furthest recorded expectation over the current position.
    fn syntax_error(&mut self) -> ParseResult<SyntaxError> {
        let current = self.peek_token()?;
        Ok(match self.furthest.take() {
            Some(failure) if failure.pos >= self.tokens.mark() => SyntaxError::new(
                format!("expected {}, found {}", failure.expected, failure.found),
                failure.span,
            ),
            _ => SyntaxError::new("invalid syntax", current.span),
        })
    }

    fn fail<T>(&mut self, mark: usize) -> ParseResult<Option<T>> {
        self.tokens.reset(mark);
        Ok(None)
    }

    /// Span of the last meaningful token consumed so far; `fallback`
    /// covers the empty case.
    fn end_span(&self, fallback: Span) -> Span {
        self.tokens
            .last_meaningful_before(self.tokens.mark())
            .map(|t| t.span)
            .unwrap_or(fallback)
    }

    fn descend<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            let span = self.tokens.peek().span;
            return Err(SyntaxError::new("too deeply nested", span));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

/// Classifies a tokenizer error message into the matching error kind.
fn lexical_error(message: String, span: Span) -> SyntaxError {
    if message == "inconsistent use of tabs and spaces in indentation" {
        SyntaxError::tab(message, span)
    } else if message == "unindent does not match any outer indentation level" {
        SyntaxError::indentation(message, span)
    } else {
        SyntaxError::new(message, span)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::ast::{Mod, Stmt, StmtKind};
    use crate::error::SyntaxErrorKind;
    use crate::factory::TreeBuilder;

    fn module_body(source: &str) -> Vec<Stmt> {
        match Parser::new(source, TreeBuilder)
            .parse(ParseMode::Module)
            .unwrap()
        {
            Mod::Module { body, .. } => body,
            other => panic!("expected a module, got {other:?}"),
        }
    }

    fn parse_error(source: &str) -> SyntaxError {
        Parser::new(source, TreeBuilder)
            .parse(ParseMode::Module)
            .unwrap_err()
    }

    #[test]
    fn chained_assignment_collects_all_targets() {
        let body = module_body("a = b = 1\n");
        match &body[0].kind {
            StmtKind::Assign { targets, .. } => assert_eq!(targets.len(), 2),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn augmented_assignment_maps_operator() {
        let body = module_body("x //= 2\n");
        match &body[0].kind {
            StmtKind::AugAssign { op, .. } => assert_eq!(*op, crate::ast::BinOp::FloorDiv),
            other => panic!("expected augmented assignment, got {other:?}"),
        }
    }

    #[test]
    fn annotated_assignment_keeps_optional_value() {
        let body = module_body("x: int = 5\ny: str\n");
        assert!(matches!(
            body[0].kind,
            StmtKind::AnnAssign { value: Some(_), .. }
        ));
        assert!(matches!(body[1].kind, StmtKind::AnnAssign { value: None, .. }));
    }

    #[test]
    fn type_is_a_soft_keyword() {
        let body = module_body("type Vector = list\n");
        assert!(matches!(body[0].kind, StmtKind::TypeAlias { .. }));

        // Without the full alias shape, `type` is an ordinary name.
        let body = module_body("type = 3\ntype(x)\n");
        assert!(matches!(body[0].kind, StmtKind::Assign { .. }));
        assert!(matches!(body[1].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn elif_chain_nests_in_the_else_branch() {
        let source = indoc! {"
            if a:
                pass
            elif b:
                pass
            else:
                pass
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::If { orelse, .. } => {
                assert_eq!(orelse.len(), 1);
                match &orelse[0].kind {
                    StmtKind::If { orelse, .. } => assert_eq!(orelse.len(), 1),
                    other => panic!("expected nested if, got {other:?}"),
                }
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn full_parameter_list_is_partitioned() {
        let source = "def f(a, b=1, /, c=2, *args, d, e=3, **kw): pass\n";
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::FunctionDef { params, .. } => {
                assert_eq!(params.posonly.len(), 2);
                assert_eq!(params.args.len(), 1);
                assert_eq!(params.vararg.as_ref().unwrap().name, "args");
                assert_eq!(params.kwonly.len(), 2);
                assert_eq!(params.kwarg.as_ref().unwrap().name, "kw");
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn decorators_attach_to_the_definition() {
        let source = indoc! {"
            @first
            @second.wrap(arg)
            def f():
                pass
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::FunctionDef { decorators, .. } => assert_eq!(decorators.len(), 2),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn async_constructs_set_the_flag() {
        let source = indoc! {"
            async def f():
                async with lock:
                    async for item in items:
                        await handle(item)
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::FunctionDef { is_async, body, .. } => {
                assert!(*is_async);
                assert!(matches!(
                    body[0].kind,
                    StmtKind::With { is_async: true, .. }
                ));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn relative_import_counts_dots() {
        let body = module_body("from ...pkg.sub import a as b, c\n");
        match &body[0].kind {
            StmtKind::ImportFrom {
                module,
                names,
                level,
            } => {
                assert_eq!(*level, 3);
                assert_eq!(module.as_deref(), Some("pkg.sub"));
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].asname.as_deref(), Some("b"));
            }
            other => panic!("expected import-from, got {other:?}"),
        }

        let body = module_body("from . import sibling\n");
        match &body[0].kind {
            StmtKind::ImportFrom { module, level, .. } => {
                assert_eq!(*level, 1);
                assert!(module.is_none());
            }
            other => panic!("expected import-from, got {other:?}"),
        }
    }

    #[test]
    fn try_orders_handlers_and_final_blocks() {
        let source = indoc! {"
            try:
                pass
            except ValueError as exc:
                pass
            except:
                pass
            else:
                pass
            finally:
                pass
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::Try {
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                assert_eq!(handlers.len(), 2);
                assert_eq!(handlers[0].name.as_deref(), Some("exc"));
                assert!(handlers[1].kind.is_none());
                assert_eq!(orelse.len(), 1);
                assert_eq!(finalbody.len(), 1);
            }
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn bare_except_must_come_last() {
        let source = indoc! {"
            try:
                pass
            except:
                pass
            except ValueError:
                pass
        "};
        let err = parse_error(source);
        assert_eq!(err.message, "default 'except:' must be last");
    }

    #[test]
    fn try_without_handler_or_finally_is_rejected() {
        let source = indoc! {"
            try:
                pass
            pass
        "};
        let err = parse_error(source);
        assert_eq!(err.message, "expected 'except' or 'finally' block");
    }

    #[test]
    fn missing_colon_reports_the_furthest_expectation() {
        let err = parse_error("if condition\n    pass\n");
        assert_eq!(err.message, "expected ':', found end of line");
        assert_eq!(err.span.start_line, 1);
    }

    #[test]
    fn missing_indent_is_an_indentation_error() {
        let err = parse_error("def f():\npass\n");
        assert_eq!(err.kind, SyntaxErrorKind::Indentation);
        assert_eq!(err.message, "expected an indented block");
    }

    #[test]
    fn inconsistent_dedent_surfaces_from_the_tokenizer() {
        let source = indoc! {"
            if flag:
                first = 1
              second = 2
        "};
        let err = parse_error(source);
        assert_eq!(err.kind, SyntaxErrorKind::Indentation);
        assert_eq!(
            err.message,
            "unindent does not match any outer indentation level"
        );
    }

    #[test]
    fn depth_guard_reports_too_deeply_nested() {
        let mut source = String::from("x = ");
        for _ in 0..32 {
            source.push('(');
        }
        source.push('1');
        for _ in 0..32 {
            source.push(')');
        }
        source.push('\n');
        let err = Parser::new(&source, TreeBuilder)
            .with_max_depth(10)
            .parse(ParseMode::Module)
            .unwrap_err();
        assert_eq!(err.message, "too deeply nested");

        // The same input is fine under the default limit.
        assert!(
            Parser::new(&source, TreeBuilder)
                .parse(ParseMode::Module)
                .is_ok()
        );
    }

    #[test]
    fn semicolons_split_simple_statements() {
        let body = module_body("a = 1; b = 2; c = 3\n");
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn eval_mode_requires_a_lone_expression() {
        let parsed = Parser::new("1 + 2\n", TreeBuilder)
            .parse(ParseMode::Eval)
            .unwrap();
        assert!(matches!(parsed, Mod::Expression { .. }));

        let err = Parser::new("x = 1\n", TreeBuilder)
            .parse(ParseMode::Eval)
            .unwrap_err();
        assert_eq!(err.message, "expected end of input, found '='");
    }

    #[test]
    fn interactive_mode_takes_one_statement() {
        let parsed = Parser::new("total = 1\n", TreeBuilder)
            .parse(ParseMode::Interactive)
            .unwrap();
        match parsed {
            Mod::Interactive { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("expected interactive root, got {other:?}"),
        }
    }

    #[test]
    fn interactive_mode_rejects_trailing_statements() {
        let err = Parser::new("a = 1\nb = 2\n", TreeBuilder)
            .parse(ParseMode::Interactive)
            .unwrap_err();
        assert_eq!(err.message, "expected end of input, found 'b'");
    }

    #[test]
    fn carriage_return_line_endings_parse() {
        let body = module_body("if flag:\r\n    x = 1\r\ny = 2\r\n");
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0].kind, StmtKind::If { .. }));
        assert!(matches!(body[1].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn unpacking_targets_parse_in_for_and_assignment() {
        let source = indoc! {"
            first, *rest = values
            for i, (j, k) in pairs:
                pass
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::Assign { targets, .. } => {
                assert!(matches!(targets[0].kind, crate::ast::ExprKind::Tuple(_)));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        match &body[1].kind {
            StmtKind::For { target, .. } => {
                assert!(matches!(target.kind, crate::ast::ExprKind::Tuple(_)));
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn yield_forms_in_a_function_body() {
        let source = indoc! {"
            def gen():
                yield 1
                yield from rest
                received = yield
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::FunctionDef { body, .. } => {
                assert_eq!(body.len(), 3);
                assert!(matches!(body[2].kind, StmtKind::Assign { .. }));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn global_and_nonlocal_collect_names() {
        let source = indoc! {"
            def f():
                global a, b
                nonlocal c
        "};
        let body = module_body(source);
        match &body[0].kind {
            StmtKind::FunctionDef { body, .. } => {
                match &body[0].kind {
                    StmtKind::Global(names) => assert_eq!(names, &["a", "b"]),
                    other => panic!("expected global, got {other:?}"),
                }
                assert!(matches!(body[1].kind, StmtKind::Nonlocal(_)));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }
}
