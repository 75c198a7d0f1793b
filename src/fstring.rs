//! Format-string scanner.
//!
//! Splits the interior of an f-string literal into ordered literal runs
//! and replacement fields. Fields keep their raw expression text plus
//! its absolute source position; the parser feeds that text back through
//! the expression grammar with a biased tokenizer, so errors inside a
//! field point at the original source.

use crate::ast::Conversion;
use crate::error::{ParseResult, SyntaxError};
use crate::strings;
use crate::token::{Span, StringLiteral};

/// Maximum depth of format-spec nesting: a field may carry a spec with
/// fields of its own, but those fields' specs may not nest further.
const MAX_SPEC_NESTING: usize = 2;

/// Raw expression text of one replacement field, positioned in the
/// original source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldExpr<'a> {
    pub text: &'a str,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart<'a> {
    Literal(String),
    Field {
        expr: FieldExpr<'a>,
        conversion: Option<Conversion>,
        spec: Option<Vec<FStringPart<'a>>>,
    },
}

/// Scans a complete f-string literal body into parts. `token_span` is
/// the span of the string token, used to locate the body's first column.
pub fn scan<'a>(
    literal: &StringLiteral<'a>,
    token_span: Span,
) -> ParseResult<Vec<FStringPart<'a>>> {
    // Prefix and opening quotes sit on one line, so the body column is a
    // plain offset from the token start.
    let column = token_span.start_column + (literal.body_start - token_span.start);
    let mut scanner = Scanner {
        body: literal.body,
        raw: literal.prefix.raw,
        pos: 0,
        line: literal.body_line,
        column,
        base_offset: literal.body_start,
    };
    scanner.parse_parts(0, false)
}

struct Scanner<'a> {
    body: &'a str,
    raw: bool,
    pos: usize,
    line: usize,
    column: usize,
    base_offset: usize,
}

impl<'a> Scanner<'a> {
    fn parse_parts(&mut self, level: usize, in_spec: bool) -> ParseResult<Vec<FStringPart<'a>>> {
        let mut parts = Vec::new();
        let mut run = String::new();
        let mut run_start = self.here();
        loop {
            match self.peek() {
                None => {
                    if in_spec {
                        return Err(self.error("f-string: expecting '}'"));
                    }
                    self.flush(&mut parts, &mut run, run_start)?;
                    return Ok(parts);
                }
                Some('{') => {
                    if self.peek_at(1) == Some('{') {
                        self.bump();
                        self.bump();
                        run.push('{');
                        continue;
                    }
                    self.flush(&mut parts, &mut run, run_start)?;
                    self.bump();
                    let (debug_text, field) = self.parse_field(level)?;
                    if let Some(text) = debug_text {
                        parts.push(FStringPart::Literal(text));
                    }
                    parts.push(field);
                    run_start = self.here();
                }
                Some('}') => {
                    if in_spec {
                        self.flush(&mut parts, &mut run, run_start)?;
                        return Ok(parts);
                    }
                    if self.peek_at(1) == Some('}') {
                        self.bump();
                        self.bump();
                        run.push('}');
                        continue;
                    }
                    return Err(self.error("f-string: single '}' is not allowed"));
                }
                Some(c) => {
                    self.bump();
                    run.push(c);
                }
            }
        }
    }

    /// Scans one replacement field, the opening `{` already consumed.
    /// Returns the verbatim `expr=` text when the debug suffix is used.
    fn parse_field(
        &mut self,
        level: usize,
    ) -> ParseResult<(Option<String>, FStringPart<'a>)> {
        if level >= MAX_SPEC_NESTING {
            return Err(self.error("f-string: expressions nested too deeply"));
        }

        let expr_start = self.pos;
        let expr_line = self.line;
        let expr_column = self.column;
        let mut brackets: Vec<char> = Vec::new();
        let mut debug = false;
        loop {
            match self.peek() {
                None => return Err(self.error("f-string: expecting '}'")),
                Some('\\') => {
                    return Err(
                        self.error("f-string expression part cannot include a backslash")
                    );
                }
                Some('#') => {
                    return Err(self.error("f-string expression part cannot include '#'"));
                }
                Some('\'') | Some('"') => self.skip_string()?,
                Some(c @ ('(' | '[' | '{')) => {
                    brackets.push(c);
                    self.bump();
                }
                Some('}') if brackets.is_empty() => break,
                Some(':') if brackets.is_empty() => break,
                Some('!') if self.peek_at(1) != Some('=') => {
                    if brackets.is_empty() {
                        break;
                    }
                    self.bump();
                }
                Some('=')
                    if brackets.is_empty() && self.peek_at(1) != Some('=') =>
                {
                    debug = true;
                    break;
                }
                // Comparison operators must not read as terminators.
                Some('!' | '<' | '>' | '=') if self.peek_at(1) == Some('=') => {
                    self.bump();
                    self.bump();
                }
                Some(c @ (')' | ']' | '}')) => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match brackets.pop() {
                        None => return Err(self.error(format!("f-string: unmatched '{c}'"))),
                        Some(open) if open != expected => {
                            return Err(self.error(format!(
                                "f-string: closing parenthesis '{c}' does not match \
                                 opening parenthesis '{open}'"
                            )));
                        }
                        Some(_) => {}
                    }
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }

        let expr_text = &self.body[expr_start..self.pos];
        if expr_text.trim().is_empty() {
            return Err(self.error("f-string: empty expression not allowed"));
        }
        let expr = FieldExpr {
            text: expr_text,
            offset: self.base_offset + expr_start,
            line: expr_line,
            column: expr_column,
        };

        let mut debug_text = None;
        if debug {
            self.bump();
            while matches!(self.peek(), Some(' ') | Some('\t')) {
                self.bump();
            }
            debug_text = Some(self.body[expr_start..self.pos].to_string());
        }

        let mut conversion = None;
        if self.peek() == Some('!') {
            self.bump();
            conversion = Some(match self.peek() {
                Some('s') => Conversion::Str,
                Some('r') => Conversion::Repr,
                Some('a') => Conversion::Ascii,
                _ => {
                    return Err(self.error(
                        "f-string: invalid conversion character: expected 's', 'r', or 'a'",
                    ));
                }
            });
            self.bump();
        }

        let mut spec = None;
        if self.peek() == Some(':') {
            self.bump();
            spec = Some(self.parse_parts(level + 1, true)?);
        }

        if self.peek() != Some('}') {
            return Err(self.error("f-string: expecting '}'"));
        }
        self.bump();

        if debug && conversion.is_none() && spec.is_none() {
            conversion = Some(Conversion::Repr);
        }

        Ok((
            debug_text,
            FStringPart::Field {
                expr,
                conversion,
                spec,
            },
        ))
    }

    /// Skips over a string literal nested inside a field expression.
    fn skip_string(&mut self) -> ParseResult<()> {
        let quote = match self.bump() {
            Some(c) => c,
            None => return Err(self.error("f-string: unterminated string")),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }
        loop {
            match self.peek() {
                None => return Err(self.error("f-string: unterminated string")),
                Some('\n') if !triple => {
                    return Err(self.error("f-string: unterminated string"));
                }
                Some('\\') => {
                    return Err(
                        self.error("f-string expression part cannot include a backslash")
                    );
                }
                Some(c) if c == quote => {
                    self.bump();
                    if !triple {
                        return Ok(());
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn flush(
        &self,
        parts: &mut Vec<FStringPart<'a>>,
        run: &mut String,
        run_span: Span,
    ) -> ParseResult<()> {
        if run.is_empty() {
            return Ok(());
        }
        let decoded = strings::decode_str(run, self.raw, run_span)?;
        parts.push(FStringPart::Literal(decoded));
        run.clear();
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.body[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.body[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Span {
        let offset = self.base_offset + self.pos;
        Span::new(offset, offset, self.line, self.column, self.line, self.column)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.here())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use crate::tokenizer::tokenize;

    fn scan_source(source: &str) -> ParseResult<Vec<FStringPart<'_>>> {
        let tokens = tokenize(source);
        let token = tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Str(_)))
            .expect("string token");
        match &token.kind {
            TokenKind::Str(literal) => scan(literal, token.span),
            _ => unreachable!(),
        }
    }

    fn scan_err(source: &str) -> String {
        scan_source(source).unwrap_err().message
    }

    #[test]
    fn empty_fstring_has_no_parts() {
        assert_eq!(scan_source("f''\n").unwrap(), vec![]);
    }

    #[test]
    fn doubled_braces_are_literals() {
        assert_eq!(
            scan_source("f'{{}}'\n").unwrap(),
            vec![FStringPart::Literal("{}".to_string())]
        );
    }

    #[test]
    fn simple_field() {
        let parts = scan_source("f'{name}'\n").unwrap();
        match &parts[..] {
            [FStringPart::Field {
                expr,
                conversion: None,
                spec: None,
            }] => {
                assert_eq!(expr.text, "name");
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[test]
    fn field_position_maps_to_source() {
        let source = "greeting = f'hi {name}'\n";
        let parts = scan_source(source).unwrap();
        match &parts[..] {
            [FStringPart::Literal(text), FStringPart::Field { expr, .. }] => {
                assert_eq!(text, "hi ");
                assert_eq!(&source[expr.offset..expr.offset + expr.text.len()], "name");
                assert_eq!(expr.line, 1);
                assert_eq!(expr.column, 17);
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[test]
    fn conversion_characters() {
        let parts = scan_source("f'{name!r}'\n").unwrap();
        match &parts[..] {
            [FStringPart::Field { conversion, .. }] => {
                assert_eq!(*conversion, Some(Conversion::Repr));
            }
            other => panic!("unexpected parts: {other:?}"),
        }
        assert_eq!(
            scan_err("f'{name!q}'\n"),
            "f-string: invalid conversion character: expected 's', 'r', or 'a'"
        );
    }

    #[test]
    fn nested_format_spec() {
        let parts = scan_source("f'result: {value:{width}.{precision}}'\n").unwrap();
        match &parts[..] {
            [FStringPart::Literal(text), FStringPart::Field { expr, spec, .. }] => {
                assert_eq!(text, "result: ");
                assert_eq!(expr.text, "value");
                let spec = spec.as_ref().expect("format spec");
                assert_eq!(spec.len(), 3);
                assert!(matches!(&spec[0], FStringPart::Field { expr, .. } if expr.text == "width"));
                assert!(matches!(&spec[1], FStringPart::Literal(dot) if dot == "."));
                assert!(
                    matches!(&spec[2], FStringPart::Field { expr, .. } if expr.text == "precision")
                );
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[test]
    fn spec_nesting_is_bounded() {
        assert_eq!(
            scan_err("f'{a:{b:{c}}}'\n"),
            "f-string: expressions nested too deeply"
        );
    }

    #[test]
    fn empty_expression_rejected() {
        assert_eq!(scan_err("f'{}'\n"), "f-string: empty expression not allowed");
        assert_eq!(scan_err("f'{ }'\n"), "f-string: empty expression not allowed");
    }

    #[test]
    fn single_close_brace_rejected() {
        assert_eq!(scan_err("f'}'\n"), "f-string: single '}' is not allowed");
    }

    #[test]
    fn comparison_operators_stay_in_expression() {
        let parts = scan_source("f'{a != b}'\n").unwrap();
        match &parts[..] {
            [FStringPart::Field { expr, conversion, .. }] => {
                assert_eq!(expr.text, "a != b");
                assert_eq!(*conversion, None);
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[test]
    fn debug_suffix_keeps_verbatim_text() {
        let parts = scan_source("f'{x=}'\n").unwrap();
        match &parts[..] {
            [FStringPart::Literal(text), FStringPart::Field { expr, conversion, .. }] => {
                assert_eq!(text, "x=");
                assert_eq!(expr.text, "x");
                assert_eq!(*conversion, Some(Conversion::Repr));
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[test]
    fn backslash_and_comment_rejected_in_fields() {
        assert_eq!(
            scan_err("f'{a\\n}'\n"),
            "f-string expression part cannot include a backslash"
        );
        assert_eq!(
            scan_err("f'{a # b}'\n"),
            "f-string expression part cannot include '#'"
        );
    }

    #[test]
    fn nested_strings_are_skipped() {
        let parts = scan_source("f'{d[\"key\"]}'\n").unwrap();
        match &parts[..] {
            [FStringPart::Field { expr, .. }] => {
                assert_eq!(expr.text, "d[\"key\"]");
            }
            other => panic!("unexpected parts: {other:?}"),
        }
    }

    #[test]
    fn missing_close_brace() {
        assert_eq!(scan_err("f'{a'\n"), "f-string: expecting '}'");
    }

    #[test]
    fn mismatched_brackets_in_field() {
        assert_eq!(scan_err("f'{a)}'\n"), "f-string: unmatched ')'");
        assert_eq!(
            scan_err("f'{(a]}'\n"),
            "f-string: closing parenthesis ']' does not match opening parenthesis '('"
        );
    }
}
