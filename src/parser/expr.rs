//! Expression rules: the precedence chain, displays, comprehensions,
//! call arguments, parameter lists, assignment targets, and the bridge
//! into the f-string sub-parser.

use std::collections::HashSet;

use crate::ast::{
    BinOp, BoolOp, CmpOp, Comprehension, Constant, FStringElement, Keyword, NumberKind, Param,
    Parameters, UnaryOp,
};
use crate::cursor::TokenStream;
use crate::error::{ParseResult, SyntaxError};
use crate::factory::AstFactory;
use crate::fstring::{self, FStringPart, FieldExpr};
use crate::strings;
use crate::token::{Span, StringLiteral, TokenKind};
use crate::tokenizer::{BasePosition, Tokenizer};

use super::Parser;

/// What an already-parsed primary chain may stand for on the left side
/// of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetShape {
    /// A bare name with no trailers.
    Name,
    /// A chain ending in an attribute access or subscript.
    Chained,
    /// Anything else; not assignable.
    Other,
}

impl<'a, F: AstFactory> Parser<'a, F> {
    // Expression lists.

    /// `expr (',' expr)* [',']`, with `*` unpacking elements; a comma
    /// makes it a tuple.
    pub(super) fn star_expressions(&mut self) -> ParseResult<Option<F::Expr>> {
        let mark = self.tokens.mark();
        let start = self.peek_token()?.span;
        let first_starred = self.at(&TokenKind::Star)?;
        let first = match self.star_expression()? {
            Some(expr) => expr,
            None => return self.fail(mark),
        };
        if !self.at(&TokenKind::Comma)? {
            // Unpacking is only meaningful as part of a tuple.
            if first_starred {
                return Err(SyntaxError::new("can't use starred expression here", start));
            }
            return Ok(Some(first));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma)?.is_some() {
            match self.star_expression()? {
                Some(expr) => elts.push(expr),
                None => break,
            }
        }
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.tuple(elts, span)))
    }

    pub(super) fn require_star_expressions(&mut self) -> ParseResult<F::Expr> {
        match self.star_expressions()? {
            Some(expr) => Ok(expr),
            None => Err(self.syntax_error()?),
        }
    }

    fn star_expression(&mut self) -> ParseResult<Option<F::Expr>> {
        let token = self.peek_token()?;
        if token.kind == TokenKind::Star {
            self.bump();
            let value = match self.bitwise_or()? {
                Some(expr) => expr,
                None => return Err(self.syntax_error()?),
            };
            let span = token.span.to(self.end_span(token.span));
            return Ok(Some(self.factory.starred(value, span)));
        }
        self.expression()
    }

    pub(super) fn yield_or_star_expressions(&mut self) -> ParseResult<Option<F::Expr>> {
        if self.at(&TokenKind::Yield)? {
            return self.yield_expr().map(Some);
        }
        self.star_expressions()
    }

    /// `NAME ':=' expr` or a plain expression.
    pub(super) fn namedexpr(&mut self) -> ParseResult<Option<F::Expr>> {
        let token = self.peek_token()?;
        if let TokenKind::Name(name) = token.kind {
            if self.tokens.peek_ahead(1).kind == TokenKind::ColonEqual {
                self.bump();
                self.bump();
                let value = self.require_expression()?;
                let target = self.factory.name(name, token.span);
                let span = token.span.to(self.end_span(token.span));
                return Ok(Some(self.factory.named_expr(target, value, span)));
            }
        }
        self.expression()
    }

    pub(super) fn require_namedexpr(&mut self) -> ParseResult<F::Expr> {
        match self.namedexpr()? {
            Some(expr) => Ok(expr),
            None => Err(self.syntax_error()?),
        }
    }

    // The precedence chain.

    pub(super) fn expression(&mut self) -> ParseResult<Option<F::Expr>> {
        self.descend(|p| {
            if p.at(&TokenKind::Lambda)? {
                return p.lambdef().map(Some);
            }
            let start = p.peek_token()?.span;
            let body = match p.disjunction()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            if p.eat(&TokenKind::If)?.is_none() {
                return Ok(Some(body));
            }
            let test = match p.disjunction()? {
                Some(expr) => expr,
                None => return Err(p.syntax_error()?),
            };
            p.require(&TokenKind::Else)?;
            let orelse = p.require_expression()?;
            let span = start.to(p.end_span(start));
            Ok(Some(p.factory.if_expr(test, body, orelse, span)))
        })
    }

    pub(super) fn require_expression(&mut self) -> ParseResult<F::Expr> {
        match self.expression()? {
            Some(expr) => Ok(expr),
            None => Err(self.syntax_error()?),
        }
    }

    fn lambdef(&mut self) -> ParseResult<F::Expr> {
        let kw = self.bump().span;
        let params = self.parameters(false)?;
        self.require(&TokenKind::Colon)?;
        let body = self.require_expression()?;
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.lambda(params, body, span))
    }

    fn disjunction(&mut self) -> ParseResult<Option<F::Expr>> {
        let start = self.peek_token()?.span;
        let first = match self.conjunction()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        if !self.at(&TokenKind::Or)? {
            return Ok(Some(first));
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::Or)?.is_some() {
            match self.conjunction()? {
                Some(expr) => values.push(expr),
                None => return Err(self.syntax_error()?),
            }
        }
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.bool_op(BoolOp::Or, values, span)))
    }

    fn conjunction(&mut self) -> ParseResult<Option<F::Expr>> {
        let start = self.peek_token()?.span;
        let first = match self.inversion()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        if !self.at(&TokenKind::And)? {
            return Ok(Some(first));
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::And)?.is_some() {
            match self.inversion()? {
                Some(expr) => values.push(expr),
                None => return Err(self.syntax_error()?),
            }
        }
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.bool_op(BoolOp::And, values, span)))
    }

    fn inversion(&mut self) -> ParseResult<Option<F::Expr>> {
        let token = self.peek_token()?;
        if token.kind == TokenKind::Not {
            self.bump();
            let operand = match self.inversion()? {
                Some(expr) => expr,
                None => return Err(self.syntax_error()?),
            };
            let span = token.span.to(self.end_span(token.span));
            return Ok(Some(self.factory.unary_op(UnaryOp::Not, operand, span)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult<Option<F::Expr>> {
        let start = self.peek_token()?.span;
        let left = match self.bitwise_or()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        let mut rest = Vec::new();
        while let Some(op) = self.comp_op()? {
            let right = match self.bitwise_or()? {
                Some(expr) => expr,
                None => return Err(self.syntax_error()?),
            };
            rest.push((op, right));
        }
        if rest.is_empty() {
            return Ok(Some(left));
        }
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.compare(left, rest, span)))
    }

    fn comp_op(&mut self) -> ParseResult<Option<CmpOp>> {
        let token = self.peek_token()?;
        let op = match token.kind {
            TokenKind::EqEqual => CmpOp::Eq,
            TokenKind::NotEqual => CmpOp::NotEq,
            TokenKind::Less => CmpOp::Lt,
            TokenKind::LessEqual => CmpOp::LtE,
            TokenKind::Greater => CmpOp::Gt,
            TokenKind::GreaterEqual => CmpOp::GtE,
            TokenKind::In => CmpOp::In,
            TokenKind::Not => {
                if self.tokens.peek_ahead(1).kind != TokenKind::In {
                    return Ok(None);
                }
                self.bump();
                self.bump();
                return Ok(Some(CmpOp::NotIn));
            }
            TokenKind::Is => {
                self.bump();
                if self.eat(&TokenKind::Not)?.is_some() {
                    return Ok(Some(CmpOp::IsNot));
                }
                return Ok(Some(CmpOp::Is));
            }
            _ => return Ok(None),
        };
        self.bump();
        Ok(Some(op))
    }

    fn binary_level(
        &mut self,
        ops: &[(TokenKind<'a>, BinOp)],
        next: fn(&mut Self) -> ParseResult<Option<F::Expr>>,
    ) -> ParseResult<Option<F::Expr>> {
        let start = self.peek_token()?.span;
        let mut left = match next(self)? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        'chain: loop {
            let token = self.peek_token()?;
            for (kind, op) in ops {
                if token.kind == *kind {
                    self.bump();
                    let right = match next(self)? {
                        Some(expr) => expr,
                        None => return Err(self.syntax_error()?),
                    };
                    let span = start.to(self.end_span(start));
                    left = self.factory.binary_op(left, *op, right, span);
                    continue 'chain;
                }
            }
            return Ok(Some(left));
        }
    }

    fn bitwise_or(&mut self) -> ParseResult<Option<F::Expr>> {
        self.binary_level(&[(TokenKind::VBar, BinOp::BitOr)], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> ParseResult<Option<F::Expr>> {
        self.binary_level(&[(TokenKind::Caret, BinOp::BitXor)], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> ParseResult<Option<F::Expr>> {
        self.binary_level(&[(TokenKind::Amper, BinOp::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> ParseResult<Option<F::Expr>> {
        self.binary_level(
            &[
                (TokenKind::LeftShift, BinOp::LShift),
                (TokenKind::RightShift, BinOp::RShift),
            ],
            Self::sum,
        )
    }

    fn sum(&mut self) -> ParseResult<Option<F::Expr>> {
        self.binary_level(
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Option<F::Expr>> {
        self.binary_level(
            &[
                (TokenKind::Star, BinOp::Mult),
                (TokenKind::Slash, BinOp::Div),
                (TokenKind::DoubleSlash, BinOp::FloorDiv),
                (TokenKind::Percent, BinOp::Mod),
                (TokenKind::At, BinOp::MatMult),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseResult<Option<F::Expr>> {
        self.descend(|p| {
            let token = p.peek_token()?;
            let op = match token.kind {
                TokenKind::Plus => UnaryOp::Plus,
                TokenKind::Minus => UnaryOp::Minus,
                TokenKind::Tilde => UnaryOp::Invert,
                _ => return p.power(),
            };
            p.bump();
            let operand = match p.factor()? {
                Some(expr) => expr,
                None => return Err(p.syntax_error()?),
            };
            let span = token.span.to(p.end_span(token.span));
            Ok(Some(p.factory.unary_op(op, operand, span)))
        })
    }

    fn power(&mut self) -> ParseResult<Option<F::Expr>> {
        let start = self.peek_token()?.span;
        let base = match self.await_primary()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        if self.eat(&TokenKind::DoubleStar)?.is_none() {
            return Ok(Some(base));
        }
        // Right-associative; the exponent may itself carry a sign.
        let exponent = match self.factor()? {
            Some(expr) => expr,
            None => return Err(self.syntax_error()?),
        };
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.binary_op(base, BinOp::Pow, exponent, span)))
    }

    fn await_primary(&mut self) -> ParseResult<Option<F::Expr>> {
        let token = self.peek_token()?;
        if token.kind == TokenKind::Await {
            self.bump();
            let value = match self.primary()? {
                Some(expr) => expr,
                None => return Err(self.syntax_error()?),
            };
            let span = token.span.to(self.end_span(token.span));
            return Ok(Some(self.factory.await_expr(value, span)));
        }
        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Option<F::Expr>> {
        Ok(self.primary_with_shape()?.map(|(expr, _)| expr))
    }

    /// Atom followed by any number of `.attr`, `(...)` and `[...]`
    /// trailers, iteratively left-associated.
    fn primary_with_shape(&mut self) -> ParseResult<Option<(F::Expr, TargetShape)>> {
        let start = self.peek_token()?.span;
        let first_is_name = matches!(self.peek_token()?.kind, TokenKind::Name(_));
        let mut expr = match self.atom()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        let mut shape = if first_is_name {
            TargetShape::Name
        } else {
            TargetShape::Other
        };
        loop {
            let token = self.peek_token()?;
            match token.kind {
                TokenKind::Dot => {
                    self.bump();
                    let (attr, attr_span) = self.require_name()?;
                    let span = start.to(attr_span);
                    expr = self.factory.attribute(expr, attr, span);
                    shape = TargetShape::Chained;
                }
                TokenKind::LParen => {
                    let open = self.bump().span;
                    let (args, keywords, close) = self.call_arguments(open)?;
                    let span = start.to(close);
                    expr = self.factory.call(expr, args, keywords, span);
                    shape = TargetShape::Other;
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.slices()?;
                    let close = self.require(&TokenKind::RBracket)?;
                    let span = start.to(close);
                    expr = self.factory.subscript(expr, index, span);
                    shape = TargetShape::Chained;
                }
                _ => break,
            }
        }
        Ok(Some((expr, shape)))
    }

    // Subscripts.

    fn slices(&mut self) -> ParseResult<F::Expr> {
        let start = self.peek_token()?.span;
        let first = self.slice_item()?;
        if !self.at(&TokenKind::Comma)? {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma)?.is_some() {
            if self.at(&TokenKind::RBracket)? {
                break;
            }
            elts.push(self.slice_item()?);
        }
        let span = start.to(self.end_span(start));
        Ok(self.factory.tuple(elts, span))
    }

    fn slice_item(&mut self) -> ParseResult<F::Expr> {
        let start = self.peek_token()?.span;
        let lower = if self.at(&TokenKind::Colon)? {
            None
        } else {
            self.namedexpr()?
        };
        if self.eat(&TokenKind::Colon)?.is_none() {
            return match lower {
                Some(expr) => Ok(expr),
                None => Err(self.syntax_error()?),
            };
        }
        let upper = if self.at_slice_boundary()? {
            None
        } else {
            Some(self.require_expression()?)
        };
        let step = if self.eat(&TokenKind::Colon)?.is_some() {
            if self.at_slice_boundary()? {
                None
            } else {
                Some(self.require_expression()?)
            }
        } else {
            None
        };
        let span = start.to(self.end_span(start));
        Ok(self.factory.slice(lower, upper, step, span))
    }

    fn at_slice_boundary(&mut self) -> ParseResult<bool> {
        Ok(matches!(
            self.peek_token()?.kind,
            TokenKind::Colon | TokenKind::Comma | TokenKind::RBracket
        ))
    }

    // Atoms.

    fn atom(&mut self) -> ParseResult<Option<F::Expr>> {
        let token = self.peek_token()?;
        let span = token.span;
        match token.kind {
            TokenKind::Name(name) => {
                self.bump();
                Ok(Some(self.factory.name(name, span)))
            }
            TokenKind::Number(text) => {
                self.bump();
                let value = Constant::Number {
                    kind: number_kind(text),
                    text: text.to_string(),
                };
                Ok(Some(self.factory.constant(value, span)))
            }
            TokenKind::Str(_) => self.strings().map(Some),
            TokenKind::True => {
                self.bump();
                Ok(Some(self.factory.constant(Constant::Bool(true), span)))
            }
            TokenKind::False => {
                self.bump();
                Ok(Some(self.factory.constant(Constant::Bool(false), span)))
            }
            TokenKind::None => {
                self.bump();
                Ok(Some(self.factory.constant(Constant::None, span)))
            }
            TokenKind::Ellipsis => {
                self.bump();
                Ok(Some(self.factory.constant(Constant::Ellipsis, span)))
            }
            TokenKind::LParen => self.group_or_tuple(span).map(Some),
            TokenKind::LBracket => self.list_display(span).map(Some),
            TokenKind::LBrace => self.dict_or_set(span).map(Some),
            _ => {
                self.note("an expression", &token);
                Ok(None)
            }
        }
    }

    /// Tuple/set/generator element: `*expr` or an assignment expression.
    fn star_element(&mut self) -> ParseResult<Option<F::Expr>> {
        let token = self.peek_token()?;
        if token.kind == TokenKind::Star {
            self.bump();
            let value = match self.bitwise_or()? {
                Some(expr) => expr,
                None => return Err(self.syntax_error()?),
            };
            let span = token.span.to(self.end_span(token.span));
            return Ok(Some(self.factory.starred(value, span)));
        }
        self.namedexpr()
    }

    fn require_star_element(&mut self) -> ParseResult<F::Expr> {
        match self.star_element()? {
            Some(expr) => Ok(expr),
            None => Err(self.syntax_error()?),
        }
    }

    fn group_or_tuple(&mut self, open: Span) -> ParseResult<F::Expr> {
        self.bump();
        if let Some(close) = self.eat(&TokenKind::RParen)? {
            return Ok(self.factory.tuple(Vec::new(), open.to(close)));
        }
        if self.at(&TokenKind::Yield)? {
            let value = self.yield_expr()?;
            self.require(&TokenKind::RParen)?;
            return Ok(value);
        }
        let first = self.require_star_element()?;
        if self.at_comp_for()? {
            let generators = self.comp_clauses()?;
            let close = self.require(&TokenKind::RParen)?;
            return Ok(self.factory.generator_exp(first, generators, open.to(close)));
        }
        if !self.at(&TokenKind::Comma)? {
            self.require(&TokenKind::RParen)?;
            // Plain grouping; the node keeps its inner span.
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma)?.is_some() {
            if self.at(&TokenKind::RParen)? {
                break;
            }
            elts.push(self.require_star_element()?);
        }
        let close = self.require(&TokenKind::RParen)?;
        Ok(self.factory.tuple(elts, open.to(close)))
    }

    fn list_display(&mut self, open: Span) -> ParseResult<F::Expr> {
        self.bump();
        if let Some(close) = self.eat(&TokenKind::RBracket)? {
            return Ok(self.factory.list(Vec::new(), open.to(close)));
        }
        let first = self.require_star_element()?;
        if self.at_comp_for()? {
            let generators = self.comp_clauses()?;
            let close = self.require(&TokenKind::RBracket)?;
            return Ok(self.factory.list_comp(first, generators, open.to(close)));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma)?.is_some() {
            if self.at(&TokenKind::RBracket)? {
                break;
            }
            elts.push(self.require_star_element()?);
        }
        let close = self.require(&TokenKind::RBracket)?;
        Ok(self.factory.list(elts, open.to(close)))
    }

    fn dict_or_set(&mut self, open: Span) -> ParseResult<F::Expr> {
        self.bump();
        if let Some(close) = self.eat(&TokenKind::RBrace)? {
            return Ok(self.factory.dict(Vec::new(), Vec::new(), open.to(close)));
        }
        if self.at(&TokenKind::DoubleStar)? {
            return self.dict_display(open, None);
        }
        if !self.at(&TokenKind::Star)? {
            let mark = self.tokens.mark();
            if let Some(key) = self.namedexpr()? {
                if self.eat(&TokenKind::Colon)?.is_some() {
                    let value = self.require_expression()?;
                    if self.at_comp_for()? {
                        let generators = self.comp_clauses()?;
                        let close = self.require(&TokenKind::RBrace)?;
                        return Ok(self
                            .factory
                            .dict_comp(key, value, generators, open.to(close)));
                    }
                    return self.dict_display(open, Some((key, value)));
                }
                self.tokens.reset(mark);
            }
        }
        // Set display or comprehension.
        let first = self.require_star_element()?;
        if self.at_comp_for()? {
            let generators = self.comp_clauses()?;
            let close = self.require(&TokenKind::RBrace)?;
            return Ok(self.factory.set_comp(first, generators, open.to(close)));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma)?.is_some() {
            if self.at(&TokenKind::RBrace)? {
                break;
            }
            elts.push(self.require_star_element()?);
        }
        let close = self.require(&TokenKind::RBrace)?;
        Ok(self.factory.set(elts, open.to(close)))
    }

    fn dict_display(
        &mut self,
        open: Span,
        first: Option<(F::Expr, F::Expr)>,
    ) -> ParseResult<F::Expr> {
        let mut keys: Vec<Option<F::Expr>> = Vec::new();
        let mut values = Vec::new();
        let mut more = true;
        if let Some((key, value)) = first {
            keys.push(Some(key));
            values.push(value);
            more = self.eat(&TokenKind::Comma)?.is_some();
        }
        while more {
            if self.at(&TokenKind::RBrace)? {
                break;
            }
            if self.eat(&TokenKind::DoubleStar)?.is_some() {
                // `**mapping` unpacking entry.
                let value = match self.bitwise_or()? {
                    Some(expr) => expr,
                    None => return Err(self.syntax_error()?),
                };
                keys.push(None);
                values.push(value);
            } else {
                let key = self.require_expression()?;
                self.require(&TokenKind::Colon)?;
                let value = self.require_expression()?;
                keys.push(Some(key));
                values.push(value);
            }
            more = self.eat(&TokenKind::Comma)?.is_some();
        }
        let close = self.require(&TokenKind::RBrace)?;
        Ok(self.factory.dict(keys, values, open.to(close)))
    }

    // Comprehensions.

    pub(super) fn at_comp_for(&mut self) -> ParseResult<bool> {
        if self.at(&TokenKind::For)? {
            return Ok(true);
        }
        Ok(self.peek_token()?.kind == TokenKind::Async
            && self.tokens.peek_ahead(1).kind == TokenKind::For)
    }

    fn comp_clauses(&mut self) -> ParseResult<Vec<Comprehension<F::Expr>>> {
        let mut clauses = Vec::new();
        loop {
            let is_async = if self.at(&TokenKind::Async)? {
                self.bump();
                true
            } else {
                false
            };
            self.require(&TokenKind::For)?;
            let target = match self.star_targets()? {
                Some(target) => target,
                None => return Err(self.syntax_error()?),
            };
            self.require(&TokenKind::In)?;
            let iter = match self.disjunction()? {
                Some(expr) => expr,
                None => return Err(self.syntax_error()?),
            };
            let mut ifs = Vec::new();
            while self.eat(&TokenKind::If)?.is_some() {
                match self.disjunction()? {
                    Some(expr) => ifs.push(expr),
                    None => return Err(self.syntax_error()?),
                }
            }
            clauses.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
            if !self.at_comp_for()? {
                break;
            }
        }
        Ok(clauses)
    }

    // Yield.

    fn yield_expr(&mut self) -> ParseResult<F::Expr> {
        let kw = self.bump().span;
        if self.eat(&TokenKind::From)?.is_some() {
            let value = self.require_expression()?;
            let span = kw.to(self.end_span(kw));
            return Ok(self.factory.yield_from(value, span));
        }
        let value = self.star_expressions()?;
        let span = kw.to(self.end_span(kw));
        Ok(self.factory.yield_expr(value, span))
    }

    // Call arguments.

    pub(super) fn call_arguments(
        &mut self,
        open: Span,
    ) -> ParseResult<(Vec<F::Expr>, Vec<Keyword<F::Expr>>, Span)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword<F::Expr>> = Vec::new();
        if let Some(close) = self.eat(&TokenKind::RParen)? {
            return Ok((args, keywords, close));
        }

        // A bare generator may be the sole argument.
        let mark = self.tokens.mark();
        let probe_start = self.peek_token()?.span;
        if let Some(elt) = self.namedexpr()? {
            if self.at_comp_for()? {
                let generators = self.comp_clauses()?;
                if let Some(close) = self.eat(&TokenKind::RParen)? {
                    let genexp = self.factory.generator_exp(elt, generators, open.to(close));
                    return Ok((vec![genexp], keywords, close));
                }
                return Err(SyntaxError::new(
                    "Generator expression must be parenthesized",
                    probe_start,
                ));
            }
        }
        self.tokens.reset(mark);

        let mut saw_kw_unpack = false;
        loop {
            if self.at(&TokenKind::RParen)? {
                break;
            }
            let token = self.peek_token()?;
            match token.kind {
                TokenKind::Star => {
                    self.bump();
                    if saw_kw_unpack {
                        return Err(SyntaxError::new(
                            "iterable argument unpacking follows keyword argument unpacking",
                            token.span,
                        ));
                    }
                    let value = self.require_expression()?;
                    let span = token.span.to(self.end_span(token.span));
                    args.push(self.factory.starred(value, span));
                }
                TokenKind::DoubleStar => {
                    self.bump();
                    let value = self.require_expression()?;
                    let span = token.span.to(self.end_span(token.span));
                    keywords.push(Keyword {
                        name: None,
                        value,
                        span,
                    });
                    saw_kw_unpack = true;
                }
                TokenKind::Name(name)
                    if self.tokens.peek_ahead(1).kind == TokenKind::Equal =>
                {
                    self.bump();
                    self.bump();
                    let value = self.require_expression()?;
                    let span = token.span.to(self.end_span(token.span));
                    keywords.push(Keyword {
                        name: Some(name.to_string()),
                        value,
                        span,
                    });
                }
                _ => {
                    let value = match self.namedexpr()? {
                        Some(value) => value,
                        None => return Err(self.syntax_error()?),
                    };
                    if self.at_comp_for()? {
                        return Err(SyntaxError::new(
                            "Generator expression must be parenthesized",
                            token.span,
                        ));
                    }
                    if saw_kw_unpack {
                        return Err(SyntaxError::new(
                            "positional argument follows keyword argument unpacking",
                            token.span,
                        ));
                    }
                    if !keywords.is_empty() {
                        return Err(SyntaxError::new(
                            "positional argument follows keyword argument",
                            token.span,
                        ));
                    }
                    args.push(value);
                }
            }
            if self.eat(&TokenKind::Comma)?.is_none() {
                break;
            }
        }
        let close = self.require(&TokenKind::RParen)?;
        Ok((args, keywords, close))
    }

    // Parameter lists.

    /// Shared by `def` headers and lambdas; annotations are only legal
    /// in the former.
    pub(super) fn parameters(
        &mut self,
        allow_annotations: bool,
    ) -> ParseResult<Parameters<F::Expr>> {
        let mut params: Parameters<F::Expr> = Parameters::default();
        let mut seen_names: HashSet<&'a str> = HashSet::new();
        let mut seen_default = false;
        let mut seen_star = false;
        let mut bare_star = false;
        loop {
            let token = self.peek_token()?;
            if params.kwarg.is_some()
                && matches!(
                    token.kind,
                    TokenKind::Name(_)
                        | TokenKind::Star
                        | TokenKind::DoubleStar
                        | TokenKind::Slash
                )
            {
                return Err(SyntaxError::new(
                    "arguments cannot follow var-keyword argument",
                    token.span,
                ));
            }
            match token.kind {
                TokenKind::Slash => {
                    self.bump();
                    if params.args.is_empty() {
                        return Err(SyntaxError::new(
                            "at least one argument must precede /",
                            token.span,
                        ));
                    }
                    if !params.posonly.is_empty() {
                        return Err(SyntaxError::new("/ may appear only once", token.span));
                    }
                    if seen_star {
                        return Err(SyntaxError::new("/ must be ahead of *", token.span));
                    }
                    params.posonly = std::mem::take(&mut params.args);
                }
                TokenKind::Star => {
                    self.bump();
                    if seen_star {
                        return Err(SyntaxError::new("* may appear only once", token.span));
                    }
                    seen_star = true;
                    if matches!(self.peek_token()?.kind, TokenKind::Name(_)) {
                        params.vararg =
                            Some(self.param(allow_annotations, false, &mut seen_names)?);
                    } else {
                        bare_star = true;
                    }
                }
                TokenKind::DoubleStar => {
                    self.bump();
                    params.kwarg = Some(self.param(allow_annotations, false, &mut seen_names)?);
                }
                TokenKind::Name(_) => {
                    let param = self.param(allow_annotations, true, &mut seen_names)?;
                    if param.default.is_some() {
                        seen_default = true;
                    } else if seen_default && !seen_star {
                        return Err(SyntaxError::new(
                            "parameter without a default follows parameter with a default",
                            token.span,
                        ));
                    }
                    if seen_star {
                        params.kwonly.push(param);
                    } else {
                        params.args.push(param);
                    }
                }
                _ => break,
            }
            if self.eat(&TokenKind::Comma)?.is_none() {
                break;
            }
        }
        if bare_star && params.kwonly.is_empty() {
            let token = self.peek_token()?;
            return Err(SyntaxError::new(
                "named arguments must follow bare *",
                token.span,
            ));
        }
        Ok(params)
    }

    fn param(
        &mut self,
        allow_annotations: bool,
        allow_default: bool,
        seen: &mut HashSet<&'a str>,
    ) -> ParseResult<Param<F::Expr>> {
        let (name, name_span) = self.require_name()?;
        if !seen.insert(name) {
            return Err(SyntaxError::new(
                format!("duplicate argument '{name}' in function definition"),
                name_span,
            ));
        }
        let annotation = if allow_annotations && self.eat(&TokenKind::Colon)?.is_some() {
            Some(self.require_expression()?)
        } else {
            None
        };
        let default = if allow_default && self.eat(&TokenKind::Equal)?.is_some() {
            Some(self.require_expression()?)
        } else {
            None
        };
        let span = name_span.to(self.end_span(name_span));
        Ok(Param {
            name: name.to_string(),
            annotation,
            default,
            span,
        })
    }

    // Assignment targets. These are dedicated rules rather than
    // introspection of parsed expressions, because the factory's nodes
    // are opaque to the grammar.

    pub(super) fn star_targets(&mut self) -> ParseResult<Option<F::Expr>> {
        let mark = self.tokens.mark();
        let start = self.peek_token()?.span;
        let first = match self.star_target()? {
            Some(target) => target,
            None => return self.fail(mark),
        };
        if !self.at(&TokenKind::Comma)? {
            return Ok(Some(first));
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma)?.is_some() {
            match self.star_target()? {
                Some(target) => elts.push(target),
                None => break,
            }
        }
        let span = start.to(self.end_span(start));
        Ok(Some(self.factory.tuple(elts, span)))
    }

    pub(super) fn star_target(&mut self) -> ParseResult<Option<F::Expr>> {
        let mark = self.tokens.mark();
        let token = self.peek_token()?;
        if token.kind == TokenKind::Star {
            self.bump();
            let inner = match self.star_target()? {
                Some(target) => target,
                None => return self.fail(mark),
            };
            let span = token.span.to(self.end_span(token.span));
            return Ok(Some(self.factory.starred(inner, span)));
        }
        self.target_primary()
    }

    /// A name, an attribute/subscript chain, or a parenthesized or
    /// bracketed target list.
    pub(super) fn target_primary(&mut self) -> ParseResult<Option<F::Expr>> {
        let mark = self.tokens.mark();
        match self.primary_with_shape()? {
            Some((expr, TargetShape::Name | TargetShape::Chained)) => return Ok(Some(expr)),
            _ => self.tokens.reset(mark),
        }
        let token = self.peek_token()?;
        match token.kind {
            TokenKind::LParen => {
                self.bump();
                if let Some(close) = self.eat(&TokenKind::RParen)? {
                    return Ok(Some(self.factory.tuple(Vec::new(), token.span.to(close))));
                }
                let inner = match self.star_targets()? {
                    Some(target) => target,
                    None => return self.fail(mark),
                };
                if self.eat(&TokenKind::RParen)?.is_none() {
                    return self.fail(mark);
                }
                Ok(Some(inner))
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elts = Vec::new();
                if self.eat(&TokenKind::RBracket)?.is_none() {
                    loop {
                        match self.star_target()? {
                            Some(target) => elts.push(target),
                            None => break,
                        }
                        if self.eat(&TokenKind::Comma)?.is_none() {
                            break;
                        }
                    }
                    if self.eat(&TokenKind::RBracket)?.is_none() {
                        return self.fail(mark);
                    }
                }
                let span = token.span.to(self.end_span(token.span));
                Ok(Some(self.factory.list(elts, span)))
            }
            _ => self.fail(mark),
        }
    }

    /// Single assignable target of an augmented or annotated
    /// assignment.
    pub(super) fn single_target(&mut self) -> ParseResult<Option<F::Expr>> {
        let mark = self.tokens.mark();
        match self.primary_with_shape()? {
            Some((expr, TargetShape::Name | TargetShape::Chained)) => return Ok(Some(expr)),
            _ => self.tokens.reset(mark),
        }
        if self.at(&TokenKind::LParen)? {
            self.bump();
            let inner = match self.single_target()? {
                Some(target) => target,
                None => return self.fail(mark),
            };
            if self.eat(&TokenKind::RParen)?.is_none() {
                return self.fail(mark);
            }
            return Ok(Some(inner));
        }
        self.fail(mark)
    }

    // String constants and f-strings.

    /// One or more adjacent string tokens, concatenated into a single
    /// constant or f-string node.
    fn strings(&mut self) -> ParseResult<F::Expr> {
        let mut literals: Vec<(StringLiteral<'a>, Span)> = Vec::new();
        loop {
            let token = self.peek_token()?;
            if let TokenKind::Str(literal) = token.kind {
                self.bump();
                literals.push((literal, token.span));
            } else {
                break;
            }
        }
        let span = literals[0].1.to(literals[literals.len() - 1].1);

        if literals.iter().any(|(l, _)| l.prefix.bytes) {
            if literals.iter().any(|(l, _)| !l.prefix.bytes) {
                return Err(SyntaxError::new(
                    "cannot mix bytes and nonbytes literals",
                    span,
                ));
            }
            let mut data = Vec::new();
            for (literal, token_span) in literals {
                data.extend(strings::decode_bytes(
                    literal.body,
                    literal.prefix.raw,
                    token_span,
                )?);
            }
            return Ok(self.factory.constant(Constant::Bytes(data), span));
        }

        if literals.iter().any(|(l, _)| l.prefix.fstring) {
            let mut parts = Vec::new();
            for (literal, token_span) in literals {
                if literal.prefix.fstring {
                    for part in fstring::scan(&literal, token_span)? {
                        parts.push(self.convert_part(part)?);
                    }
                } else {
                    let text =
                        strings::decode_str(literal.body, literal.prefix.raw, token_span)?;
                    if !text.is_empty() {
                        parts.push(FStringElement::Literal(text));
                    }
                }
            }
            return Ok(self.factory.fstring(parts, span));
        }

        let mut text = String::new();
        for (literal, token_span) in literals {
            text.push_str(&strings::decode_str(
                literal.body,
                literal.prefix.raw,
                token_span,
            )?);
        }
        Ok(self.factory.constant(Constant::Str(text), span))
    }

    fn convert_part(
        &mut self,
        part: FStringPart<'a>,
    ) -> ParseResult<FStringElement<F::Expr>> {
        match part {
            FStringPart::Literal(text) => Ok(FStringElement::Literal(text)),
            FStringPart::Field {
                expr,
                conversion,
                spec,
            } => {
                let value = self.parse_field_expr(expr)?;
                let spec = match spec {
                    None => None,
                    Some(raw_parts) => {
                        let mut converted = Vec::with_capacity(raw_parts.len());
                        for raw in raw_parts {
                            converted.push(self.convert_part(raw)?);
                        }
                        Some(converted)
                    }
                };
                Ok(FStringElement::Field {
                    value,
                    conversion,
                    spec,
                })
            }
        }
    }

    /// Runs the full expression grammar over a replacement field's raw
    /// text. The token stream is swapped out for a biased one so every
    /// span and error lands in original-source coordinates; the depth
    /// counter carries across, bounding nested f-strings as well.
    fn parse_field_expr(&mut self, field: FieldExpr<'a>) -> ParseResult<F::Expr> {
        let tokenizer = Tokenizer::with_base(
            field.text,
            BasePosition {
                offset: field.offset,
                line: field.line,
                column: field.column,
            },
        )
        .spanning_lines();
        let outer_tokens = std::mem::replace(&mut self.tokens, TokenStream::new(tokenizer));
        let outer_furthest = self.furthest.take();
        let result = self.field_expr_body();
        self.tokens = outer_tokens;
        self.furthest = outer_furthest;
        result
    }

    fn field_expr_body(&mut self) -> ParseResult<F::Expr> {
        let value = match self.yield_or_star_expressions()? {
            Some(value) => value,
            None => return Err(self.syntax_error()?),
        };
        self.require(&TokenKind::Newline)?;
        self.require(&TokenKind::EndMarker)?;
        Ok(value)
    }
}

/// Splits number tokens into the three constant categories without
/// committing to a machine representation.
fn number_kind(text: &str) -> NumberKind {
    let bytes = text.as_bytes();
    if matches!(bytes.last(), Some(b'j') | Some(b'J')) {
        return NumberKind::Imaginary;
    }
    if bytes.len() > 1
        && bytes[0] == b'0'
        && matches!(bytes[1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
    {
        return NumberKind::Int;
    }
    if text.contains(['.', 'e', 'E']) {
        return NumberKind::Float;
    }
    NumberKind::Int
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::ast::{
        BinOp, CmpOp, Constant, Conversion, Expr, ExprKind, FStringElement, Mod, NumberKind,
        StmtKind, UnaryOp,
    };
    use crate::error::SyntaxError;
    use crate::factory::TreeBuilder;
    use crate::parser::{ParseMode, Parser};

    fn parse_expr(source: &str) -> Expr {
        let mut body = match Parser::new(source, TreeBuilder)
            .parse(ParseMode::Module)
            .unwrap()
        {
            Mod::Module { body, .. } => body,
            other => panic!("expected a module, got {other:?}"),
        };
        match body.remove(0).kind {
            StmtKind::Expr(value) => *value,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    fn parse_error(source: &str) -> SyntaxError {
        Parser::new(source, TreeBuilder)
            .parse(ParseMode::Module)
            .unwrap_err()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match parse_expr("1 + 2 * 3\n").kind {
            ExprKind::BinOp { op, right, .. } => {
                assert_eq!(op, BinOp::Add);
                assert!(matches!(
                    right.kind,
                    ExprKind::BinOp {
                        op: BinOp::Mult,
                        ..
                    }
                ));
            }
            other => panic!("expected addition, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative_and_outbinds_unary_minus() {
        match parse_expr("2 ** 3 ** 4\n").kind {
            ExprKind::BinOp { op, right, .. } => {
                assert_eq!(op, BinOp::Pow);
                assert!(matches!(right.kind, ExprKind::BinOp { op: BinOp::Pow, .. }));
            }
            other => panic!("expected power, got {other:?}"),
        }
        match parse_expr("-2 ** 2\n").kind {
            ExprKind::UnaryOp { op, operand } => {
                assert_eq!(op, UnaryOp::Minus);
                assert!(matches!(operand.kind, ExprKind::BinOp { op: BinOp::Pow, .. }));
            }
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn comparisons_chain_into_one_node() {
        match parse_expr("a < b <= c != d\n").kind {
            ExprKind::Compare { rest, .. } => {
                let ops: Vec<CmpOp> = rest.iter().map(|(op, _)| *op).collect();
                assert_eq!(ops, vec![CmpOp::Lt, CmpOp::LtE, CmpOp::NotEq]);
            }
            other => panic!("expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn two_token_comparison_operators() {
        match parse_expr("a is not b\n").kind {
            ExprKind::Compare { rest, .. } => assert_eq!(rest[0].0, CmpOp::IsNot),
            other => panic!("expected comparison, got {other:?}"),
        }
        match parse_expr("a not in b\n").kind {
            ExprKind::Compare { rest, .. } => assert_eq!(rest[0].0, CmpOp::NotIn),
            other => panic!("expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn boolean_operators_collect_operands() {
        match parse_expr("a and b and c or d\n").kind {
            ExprKind::BoolOp { values, .. } => {
                assert_eq!(values.len(), 2);
                assert!(matches!(values[0].kind, ExprKind::BoolOp { values: ref v, .. } if v.len() == 3));
            }
            other => panic!("expected boolean op, got {other:?}"),
        }
    }

    #[test]
    fn call_arguments_split_positional_and_keyword() {
        match parse_expr("f(1, *extra, key=2, **rest)\n").kind {
            ExprKind::Call { args, keywords, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(args[1].kind, ExprKind::Starred(_)));
                assert_eq!(keywords.len(), 2);
                assert_eq!(keywords[0].name.as_deref(), Some("key"));
                assert!(keywords[1].name.is_none());
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn bare_generator_as_sole_call_argument() {
        match parse_expr("sum(x * x for x in xs)\n").kind {
            ExprKind::Call { args, .. } => {
                assert_eq!(args.len(), 1);
                assert!(matches!(args[0].kind, ExprKind::GeneratorExp { .. }));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn unparenthesized_generator_with_other_arguments_is_rejected() {
        let err = parse_error("f(x for x in xs, 1)\n");
        assert_eq!(err.message, "Generator expression must be parenthesized");
    }

    #[test]
    fn positional_after_keyword_is_rejected() {
        let err = parse_error("f(key=1, 2)\n");
        assert_eq!(err.message, "positional argument follows keyword argument");
    }

    #[test]
    fn slices_and_slice_tuples() {
        match parse_expr("m[1:2, ::3]\n").kind {
            ExprKind::Subscript { index, .. } => match index.kind {
                ExprKind::Tuple(elts) => {
                    assert!(matches!(
                        elts[0].kind,
                        ExprKind::Slice {
                            lower: Some(_),
                            upper: Some(_),
                            step: None
                        }
                    ));
                    assert!(matches!(
                        elts[1].kind,
                        ExprKind::Slice {
                            lower: None,
                            upper: None,
                            step: Some(_)
                        }
                    ));
                }
                other => panic!("expected slice tuple, got {other:?}"),
            },
            other => panic!("expected subscript, got {other:?}"),
        }
        assert!(matches!(
            parse_expr("m[key]\n").kind,
            ExprKind::Subscript { .. }
        ));
    }

    #[test]
    fn dict_and_set_displays_disambiguate() {
        match parse_expr("{1: 2, **rest}\n").kind {
            ExprKind::Dict { keys, values } => {
                assert_eq!(values.len(), 2);
                assert!(keys[0].is_some());
                assert!(keys[1].is_none());
            }
            other => panic!("expected dict, got {other:?}"),
        }
        assert!(matches!(parse_expr("{1, 2}\n").kind, ExprKind::Set(_)));
        assert!(matches!(parse_expr("{}\n").kind, ExprKind::Dict { .. }));
        assert!(matches!(
            parse_expr("{k: v for k, v in pairs}\n").kind,
            ExprKind::DictComp { .. }
        ));
        assert!(matches!(
            parse_expr("{x for x in xs}\n").kind,
            ExprKind::SetComp { .. }
        ));
    }

    #[test]
    fn grouping_and_tuple_displays() {
        assert!(matches!(
            parse_expr("(1 + 2)\n").kind,
            ExprKind::BinOp { .. }
        ));
        assert!(matches!(parse_expr("()\n").kind, ExprKind::Tuple(ref e) if e.is_empty()));
        assert!(matches!(parse_expr("(1,)\n").kind, ExprKind::Tuple(ref e) if e.len() == 1));
        assert!(matches!(parse_expr("1, 2, 3\n").kind, ExprKind::Tuple(ref e) if e.len() == 3));
    }

    #[test]
    fn comprehension_clauses_stack() {
        match parse_expr("[x + y for x in xs if x for y in ys]\n").kind {
            ExprKind::ListComp { generators, .. } => {
                assert_eq!(generators.len(), 2);
                assert_eq!(generators[0].ifs.len(), 1);
                assert!(!generators[0].is_async);
            }
            other => panic!("expected list comprehension, got {other:?}"),
        }
    }

    #[test]
    fn conditional_expression_and_walrus() {
        assert!(matches!(
            parse_expr("a if flag else b\n").kind,
            ExprKind::IfExp { .. }
        ));
        assert!(matches!(
            parse_expr("(n := 10)\n").kind,
            ExprKind::NamedExpr { .. }
        ));
    }

    #[test]
    fn lambda_parameters_share_the_def_grammar() {
        match parse_expr("lambda x, *rest, key=1: x\n").kind {
            ExprKind::Lambda { params, .. } => {
                assert_eq!(params.args.len(), 1);
                assert!(params.vararg.is_some());
                assert_eq!(params.kwonly.len(), 1);
            }
            other => panic!("expected lambda, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let err = parse_error("def f(a, a): pass\n");
        assert_eq!(err.message, "duplicate argument 'a' in function definition");
    }

    #[test]
    fn parameter_ordering_rules() {
        assert_eq!(
            parse_error("def f(/, a): pass\n").message,
            "at least one argument must precede /"
        );
        assert_eq!(
            parse_error("def f(a=1, b): pass\n").message,
            "parameter without a default follows parameter with a default"
        );
        assert_eq!(
            parse_error("def f(a, *): pass\n").message,
            "named arguments must follow bare *"
        );
        assert_eq!(
            parse_error("def f(**kw, a): pass\n").message,
            "arguments cannot follow var-keyword argument"
        );
    }

    #[test]
    fn number_tokens_classify_by_shape() {
        let kinds = ["7", "0xFF", "1_000", "1.5", "1e10", "2j", "0b101"]
            .map(|text| match parse_expr(&format!("{text}\n")).kind {
                ExprKind::Constant(Constant::Number { kind, .. }) => kind,
                other => panic!("expected a number, got {other:?}"),
            });
        assert_eq!(
            kinds,
            [
                NumberKind::Int,
                NumberKind::Int,
                NumberKind::Int,
                NumberKind::Float,
                NumberKind::Float,
                NumberKind::Imaginary,
                NumberKind::Int,
            ]
        );
    }

    #[test]
    fn adjacent_string_literals_concatenate() {
        match parse_expr("'one' \"two\" 'three'\n").kind {
            ExprKind::Constant(Constant::Str(text)) => assert_eq!(text, "onetwothree"),
            other => panic!("expected a string constant, got {other:?}"),
        }
        match parse_expr("b'a' b'\\x00'\n").kind {
            ExprKind::Constant(Constant::Bytes(data)) => assert_eq!(data, vec![b'a', 0x00]),
            other => panic!("expected a bytes constant, got {other:?}"),
        }
    }

    #[test]
    fn mixing_bytes_and_text_literals_is_rejected() {
        let err = parse_error("'a' b'b'\n");
        assert_eq!(err.message, "cannot mix bytes and nonbytes literals");
    }

    #[test]
    fn fstring_fields_parse_with_conversion_and_spec() {
        match parse_expr("f'{value!r:>{width}}'\n").kind {
            ExprKind::FString(parts) => match &parts[0] {
                FStringElement::Field {
                    value,
                    conversion,
                    spec,
                } => {
                    assert!(matches!(value.kind, ExprKind::Name(ref n) if n == "value"));
                    assert_eq!(*conversion, Some(Conversion::Repr));
                    let spec = spec.as_ref().unwrap();
                    assert!(matches!(spec[0], FStringElement::Literal(ref s) if s == ">"));
                    assert!(matches!(spec[1], FStringElement::Field { .. }));
                }
                other => panic!("expected a field, got {other:?}"),
            },
            other => panic!("expected an f-string, got {other:?}"),
        }
    }

    #[test]
    fn fstring_concatenates_with_plain_strings() {
        match parse_expr("'pre ' f'{x}' ' post'\n").kind {
            ExprKind::FString(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(parts[0], FStringElement::Literal(ref s) if s == "pre "));
                assert!(matches!(parts[1], FStringElement::Field { .. }));
                assert!(matches!(parts[2], FStringElement::Literal(ref s) if s == " post"));
            }
            other => panic!("expected an f-string, got {other:?}"),
        }
    }

    #[test]
    fn fstring_field_errors_use_source_coordinates() {
        let err = parse_error("pad = f'{1 +}'\n");
        assert_eq!(err.message, "expected an expression, found end of line");
        assert_eq!(err.span.start_line, 1);
        assert!(err.span.start_column > 9);
    }

    #[test]
    fn fstring_fields_span_lines_in_triple_quoted_literals() {
        match parse_expr("f'''{1 +\n2}'''\n").kind {
            ExprKind::FString(parts) => match &parts[0] {
                FStringElement::Field { value, .. } => {
                    assert!(matches!(
                        value.kind,
                        ExprKind::BinOp {
                            op: BinOp::Add,
                            ..
                        }
                    ));
                }
                other => panic!("expected a field, got {other:?}"),
            },
            other => panic!("expected an f-string, got {other:?}"),
        }
    }

    #[test]
    fn bare_starred_expression_is_not_a_value() {
        let err = parse_error("x = *a\n");
        assert_eq!(err.message, "can't use starred expression here");
        let err = parse_error("return *a\n");
        assert_eq!(err.message, "can't use starred expression here");
        // As part of a tuple it unpacks.
        assert!(matches!(
            parse_expr("*a, *b\n").kind,
            ExprKind::Tuple(ref elts) if elts.len() == 2
        ));
        let mut body = match Parser::new("x = *a,\n", TreeBuilder)
            .parse(ParseMode::Module)
            .unwrap()
        {
            Mod::Module { body, .. } => body,
            other => panic!("expected a module, got {other:?}"),
        };
        assert!(matches!(body.remove(0).kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn fstring_colon_opens_the_spec_not_a_walrus() {
        match parse_expr("f'{x:=1}'\n").kind {
            ExprKind::FString(parts) => match &parts[0] {
                FStringElement::Field { value, spec, .. } => {
                    assert!(matches!(value.kind, ExprKind::Name(_)));
                    let spec = spec.as_ref().unwrap();
                    assert!(matches!(spec[0], FStringElement::Literal(ref s) if s == "=1"));
                }
                other => panic!("expected a field, got {other:?}"),
            },
            other => panic!("expected an f-string, got {other:?}"),
        }
    }

    #[test]
    fn await_and_yield_inside_defs() {
        let source = indoc! {"
            async def f():
                return await g() + 1
        "};
        assert!(
            Parser::new(source, TreeBuilder)
                .parse(ParseMode::Module)
                .is_ok()
        );
    }

    #[test]
    fn parenthesized_targets_assign_through() {
        let source = "(a, b), [c, d] = pairs\n";
        let mut body = match Parser::new(source, TreeBuilder)
            .parse(ParseMode::Module)
            .unwrap()
        {
            Mod::Module { body, .. } => body,
            other => panic!("expected a module, got {other:?}"),
        };
        match body.remove(0).kind {
            StmtKind::Assign { targets, .. } => match &targets[0].kind {
                ExprKind::Tuple(elts) => {
                    assert!(matches!(elts[0].kind, ExprKind::Tuple(_)));
                    assert!(matches!(elts[1].kind, ExprKind::List(_)));
                }
                other => panic!("expected a tuple target, got {other:?}"),
            },
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn attribute_and_subscript_chains_left_associate() {
        match parse_expr("obj.attr[0].method(1)\n").kind {
            ExprKind::Call { func, .. } => match func.kind {
                ExprKind::Attribute { value, attr } => {
                    assert_eq!(attr, "method");
                    assert!(matches!(value.kind, ExprKind::Subscript { .. }));
                }
                other => panic!("expected attribute, got {other:?}"),
            },
            other => panic!("expected call, got {other:?}"),
        }
    }
}
