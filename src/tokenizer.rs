//! Hand-written tokenizer for Python-compatible source.
//!
//! Produces one token per `next_token` call, including a terminal
//! `EndMarker` that repeats forever once reached. Lexical problems never
//! abort the scan: they are returned as `TokenKind::Error` tokens
//! carrying the diagnostic message, and the parser turns them into
//! syntax errors when it reaches the offending position.

use crate::token::{Span, StringLiteral, StringPrefix, Token, TokenKind};

/// Tab advances the indentation column to the next multiple of this.
const TAB_SIZE: usize = 8;
/// Secondary indentation width where a tab counts as a single column;
/// both widths must agree with the indentation stack or the mix of tabs
/// and spaces is ambiguous and rejected.
const ALT_TAB_SIZE: usize = 1;

const MAX_PAREN_NESTING: usize = 200;

/// Starting position of a tokenizer operating on a sub-span of a larger
/// buffer; spans are reported in the outer buffer's coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePosition {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy)]
struct IndentLevel {
    column: usize,
    alt_column: usize,
}

pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    base: BasePosition,
    indents: Vec<IndentLevel>,
    pending_dedents: usize,
    at_line_start: bool,
    /// Tokens were emitted on the current logical line; controls the
    /// implicit NEWLINE synthesized at end of input.
    line_has_tokens: bool,
    /// Newlines are plain whitespace, as inside brackets; set for
    /// f-string replacement fields, which may span lines in
    /// triple-quoted literals.
    newline_is_space: bool,
    paren_stack: Vec<(char, usize, usize)>,
    done: bool,
    drained: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_base(
            src,
            BasePosition {
                offset: 0,
                line: 1,
                column: 0,
            },
        )
    }

    /// Tokenizer over a slice of a larger buffer (used for f-string
    /// replacement fields); all spans are biased by `base`.
    pub fn with_base(src: &'a str, base: BasePosition) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 0,
            base,
            indents: vec![IndentLevel {
                column: 0,
                alt_column: 0,
            }],
            pending_dedents: 0,
            at_line_start: true,
            line_has_tokens: false,
            newline_is_space: false,
            paren_stack: Vec::new(),
            done: false,
            drained: false,
        }
    }

    /// Disables newline and indentation significance for the whole
    /// input, the way an enclosing bracket would.
    pub fn spanning_lines(mut self) -> Self {
        self.newline_is_space = true;
        self.at_line_start = false;
        self
    }

    pub fn next_token(&mut self) -> Token<'a> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            let span = self.zero_width_span();
            return Token::new(TokenKind::Dedent, span);
        }
        if self.done {
            return self.finish();
        }

        loop {
            if self.at_line_start && self.paren_stack.is_empty() {
                if let Some(token) = self.handle_line_start() {
                    return token;
                }
                if self.done {
                    return self.finish();
                }
            }

            self.skip_spaces();
            if self.peek() == Some('#') {
                while let Some(c) = self.peek() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    self.bump();
                }
            }

            let start = self.position();
            let c = match self.peek() {
                Some(c) => c,
                None => {
                    self.done = true;
                    if !self.paren_stack.is_empty() {
                        return self.error_at(start, "unexpected EOF while parsing");
                    }
                    if self.line_has_tokens {
                        // Implicit newline at end of input.
                        self.line_has_tokens = false;
                        return Token::new(TokenKind::Newline, self.zero_width_span());
                    }
                    return self.finish();
                }
            };

            match c {
                '\n' | '\r' => {
                    self.eat_newline();
                    if !self.paren_stack.is_empty() || self.newline_is_space {
                        // Newlines inside brackets are plain whitespace.
                        continue;
                    }
                    self.at_line_start = true;
                    if !self.line_has_tokens {
                        // Blank line: nothing to report.
                        continue;
                    }
                    self.line_has_tokens = false;
                    return self.token_from(start, TokenKind::Newline);
                }
                '\\' => {
                    self.bump();
                    if self.eat_newline() {
                        continue;
                    }
                    return self.error_at(
                        start,
                        "unexpected character after line continuation character",
                    );
                }
                '\'' | '"' => {
                    self.line_has_tokens = true;
                    return self.read_string(start, StringPrefix::default());
                }
                c if c.is_ascii_digit() => {
                    self.line_has_tokens = true;
                    return self.read_number(start);
                }
                '.' => {
                    self.line_has_tokens = true;
                    if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                        return self.read_number(start);
                    }
                    self.bump();
                    if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                        self.bump();
                        self.bump();
                        return self.token_from(start, TokenKind::Ellipsis);
                    }
                    return self.token_from(start, TokenKind::Dot);
                }
                c if is_identifier_start(c) => {
                    self.line_has_tokens = true;
                    return self.read_name_or_prefixed_string(start);
                }
                _ => {
                    self.line_has_tokens = true;
                    return self.read_operator(start, c);
                }
            }
        }
    }

    /// Terminal state: drain outstanding DEDENTs, then repeat EndMarker.
    fn finish(&mut self) -> Token<'a> {
        if !self.drained {
            self.drained = true;
            self.pending_dedents += self.indents.len() - 1;
            self.indents.truncate(1);
        }
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Token::new(TokenKind::Dedent, self.zero_width_span());
        }
        Token::new(TokenKind::EndMarker, self.zero_width_span())
    }

    /// Measures indentation at a logical line start and emits
    /// INDENT/queues DEDENTs. Returns a token when one is due.
    fn handle_line_start(&mut self) -> Option<Token<'a>> {
        loop {
            self.at_line_start = false;
            let mut column = 0usize;
            let mut alt_column = 0usize;
            // Indentation split over a backslash continuation keeps the
            // width measured before the first backslash.
            let mut continuation_column: Option<usize> = None;
            loop {
                match self.peek() {
                    Some(' ') => {
                        self.bump();
                        column += 1;
                        alt_column += 1;
                    }
                    Some('\t') => {
                        self.bump();
                        column = (column / TAB_SIZE + 1) * TAB_SIZE;
                        alt_column = (alt_column / ALT_TAB_SIZE + 1) * ALT_TAB_SIZE;
                    }
                    Some('\x0c') => {
                        self.bump();
                        column = 0;
                        alt_column = 0;
                    }
                    Some('\\') if matches!(self.peek_at(1), Some('\n') | Some('\r')) => {
                        continuation_column = continuation_column.or(Some(column));
                        self.bump();
                        self.eat_newline();
                    }
                    _ => break,
                }
            }

            match self.peek() {
                Some('#') => {
                    // Comment-only line: consume and restart.
                    while let Some(c) = self.peek() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.bump();
                    }
                    if self.eat_newline() {
                        continue;
                    }
                    self.done = true;
                    return None;
                }
                Some('\n') | Some('\r') => {
                    self.eat_newline();
                    continue;
                }
                None => {
                    self.done = true;
                    return None;
                }
                Some(_) => {
                    if let Some(col) = continuation_column {
                        column = col;
                        alt_column = col;
                    }
                    return self.apply_indentation(column, alt_column);
                }
            }
        }
    }

    fn apply_indentation(&mut self, column: usize, alt_column: usize) -> Option<Token<'a>> {
        let top = *self.indents.last().unwrap_or(&IndentLevel {
            column: 0,
            alt_column: 0,
        });
        if column == top.column {
            if alt_column != top.alt_column {
                return Some(self.tab_error());
            }
            None
        } else if column > top.column {
            if alt_column <= top.alt_column {
                return Some(self.tab_error());
            }
            self.indents.push(IndentLevel { column, alt_column });
            Some(Token::new(TokenKind::Indent, self.zero_width_span()))
        } else {
            while self.indents.len() > 1 && column < self.indents[self.indents.len() - 1].column {
                self.indents.pop();
                self.pending_dedents += 1;
            }
            let new_top = self.indents[self.indents.len() - 1];
            if column != new_top.column {
                self.done = true;
                let start = self.position();
                let span = self.span_from(start);
                return Some(Token::new(
                    TokenKind::Error(
                        "unindent does not match any outer indentation level".to_string(),
                    ),
                    span,
                ));
            }
            if alt_column != new_top.alt_column {
                return Some(self.tab_error());
            }
            self.pending_dedents -= 1;
            Some(Token::new(TokenKind::Dedent, self.zero_width_span()))
        }
    }

    fn tab_error(&mut self) -> Token<'a> {
        self.done = true;
        let span = self.zero_width_span();
        Token::new(
            TokenKind::Error("inconsistent use of tabs and spaces in indentation".to_string()),
            span,
        )
    }

    fn read_name_or_prefixed_string(&mut self, start: Position) -> Token<'a> {
        // String prefix letters directly followed by a quote open a
        // string literal, in any legal combination of r/b/f/u.
        let mut saw_b = false;
        let mut saw_r = false;
        let mut saw_u = false;
        let mut saw_f = false;
        let mut lookahead = 0usize;
        loop {
            let c = match self.peek_at(lookahead) {
                Some(c) => c,
                None => break,
            };
            let accepted = match c {
                'b' | 'B' if !(saw_b || saw_u || saw_f) => {
                    saw_b = true;
                    true
                }
                'u' | 'U' if !(saw_b || saw_u || saw_r || saw_f) => {
                    saw_u = true;
                    true
                }
                'r' | 'R' if !(saw_r || saw_u) => {
                    saw_r = true;
                    true
                }
                'f' | 'F' if !(saw_f || saw_b || saw_u) => {
                    saw_f = true;
                    true
                }
                _ => false,
            };
            if !accepted {
                break;
            }
            lookahead += 1;
            if matches!(self.peek_at(lookahead), Some('\'') | Some('"')) {
                for _ in 0..lookahead {
                    self.bump();
                }
                let prefix = StringPrefix {
                    raw: saw_r,
                    bytes: saw_b,
                    fstring: saw_f,
                };
                return self.read_string(start, prefix);
            }
        }

        while let Some(c) = self.peek() {
            if is_identifier_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.src[start.pos..self.pos];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Name(text));
        self.token_from(start, kind)
    }

    fn read_string(&mut self, start: Position, prefix: StringPrefix) -> Token<'a> {
        let quote = match self.bump() {
            Some(c) => c,
            None => return self.error_at(start, "unterminated string literal"),
        };
        let start_line = self.external_line();
        let mut triple = false;
        if self.peek() == Some(quote) {
            if self.peek_at(1) == Some(quote) {
                triple = true;
                self.bump();
                self.bump();
            } else {
                // Empty string.
                self.bump();
                return self.string_token(start, prefix, triple, start_line);
            }
        }

        loop {
            match self.peek() {
                None => {
                    let message = if triple {
                        format!(
                            "unterminated triple-quoted string literal (detected at line {})",
                            start_line
                        )
                    } else {
                        format!(
                            "unterminated string literal (detected at line {})",
                            start_line
                        )
                    };
                    return self.error_at(start, message);
                }
                Some('\n' | '\r') if !triple => {
                    let message = format!(
                        "unterminated string literal (detected at line {})",
                        start_line
                    );
                    return self.error_at(start, message);
                }
                Some('\\') => {
                    self.bump();
                    if !self.eat_newline() {
                        self.bump();
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    if !triple {
                        return self.string_token(start, prefix, triple, start_line);
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        return self.string_token(start, prefix, triple, start_line);
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn string_token(
        &mut self,
        start: Position,
        prefix: StringPrefix,
        triple: bool,
        start_line: usize,
    ) -> Token<'a> {
        let quote_len = if triple { 3 } else { 1 };
        // The prefix letters sit between `start.pos` and the first quote.
        let mut body_start = start.pos;
        while let Some(c) = self.src[body_start..].chars().next() {
            if c == '\'' || c == '"' {
                break;
            }
            body_start += c.len_utf8();
        }
        let body_start = body_start + quote_len;
        let body_end = self.pos - quote_len;
        let literal = StringLiteral {
            prefix,
            body: &self.src[body_start..body_end],
            body_start: body_start + self.base.offset,
            body_line: start_line,
        };
        self.token_from(start, TokenKind::Str(literal))
    }

    fn read_number(&mut self, start: Position) -> Token<'a> {
        match self.scan_number() {
            Ok(()) => {
                let text = &self.src[start.pos..self.pos];
                self.token_from(start, TokenKind::Number(text))
            }
            Err(message) => self.error_at(start, message),
        }
    }

    fn scan_number(&mut self) -> Result<(), String> {
        if self.peek() == Some('0')
            && matches!(
                self.peek_at(1),
                Some('x') | Some('X') | Some('o') | Some('O') | Some('b') | Some('B')
            )
        {
            let base_char = self.peek_at(1).unwrap_or('x');
            self.bump();
            self.bump();
            return match base_char {
                'x' | 'X' => self.scan_radix_digits(16),
                'o' | 'O' => self.scan_radix_digits(8),
                _ => self.scan_radix_digits(2),
            };
        }

        if self.peek() == Some('.') {
            self.bump();
            return self.scan_fraction();
        }

        if self.peek() == Some('0') {
            // Zeros (possibly grouped with underscores); nonzero digits
            // after them are only legal if this turns out to be a float
            // or imaginary literal.
            loop {
                if self.peek() == Some('_') {
                    self.bump();
                    if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return Err("invalid decimal literal".to_string());
                    }
                }
                if self.peek() != Some('0') {
                    break;
                }
                self.bump();
            }
            let mut nonzero = false;
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                nonzero = true;
                self.decimal_tail()?;
            }
            match self.peek() {
                Some('.') => {
                    self.bump();
                    return self.scan_fraction();
                }
                Some('e') | Some('E') => return self.scan_exponent(),
                Some('j') | Some('J') => return self.scan_imaginary(),
                _ => {}
            }
            if nonzero {
                return Err("leading zeros in decimal integer literals are not permitted; \
                     use an 0o prefix for octal integers"
                    .to_string());
            }
            return self.verify_end_of_number("decimal");
        }

        self.decimal_tail()?;
        match self.peek() {
            Some('.') => {
                self.bump();
                self.scan_fraction()
            }
            Some('e') | Some('E') => self.scan_exponent(),
            Some('j') | Some('J') => self.scan_imaginary(),
            _ => self.verify_end_of_number("decimal"),
        }
    }

    /// Digits of one decimal group, with single underscores allowed only
    /// between digits.
    fn decimal_tail(&mut self) -> Result<(), String> {
        loop {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if self.peek() != Some('_') {
                return Ok(());
            }
            self.bump();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err("invalid decimal literal".to_string());
            }
        }
    }

    fn scan_radix_digits(&mut self, radix: u32) -> Result<(), String> {
        let kind = match radix {
            16 => "hexadecimal",
            8 => "octal",
            _ => "binary",
        };
        loop {
            if self.peek() == Some('_') {
                self.bump();
            }
            match self.peek() {
                Some(c) if c.is_digit(radix) => {}
                Some(c) if radix < 10 && c.is_ascii_digit() => {
                    return Err(format!("invalid digit '{c}' in {kind} literal"));
                }
                _ => return Err(format!("invalid {kind} literal")),
            }
            while self.peek().is_some_and(|c| c.is_digit(radix)) {
                self.bump();
            }
            if self.peek() != Some('_') {
                break;
            }
        }
        if radix < 10 && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let c = self.peek().unwrap_or('0');
            return Err(format!("invalid digit '{c}' in {kind} literal"));
        }
        self.verify_end_of_number(kind)
    }

    fn scan_fraction(&mut self) -> Result<(), String> {
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.decimal_tail()?;
        }
        match self.peek() {
            Some('e') | Some('E') => self.scan_exponent(),
            Some('j') | Some('J') => self.scan_imaginary(),
            _ => self.verify_end_of_number("decimal"),
        }
    }

    fn scan_exponent(&mut self) -> Result<(), String> {
        // The exponent marker only belongs to the number if digits (or a
        // signed digit run) follow; `1e` is an invalid literal.
        self.bump();
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.bump();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err("invalid decimal literal".to_string());
            }
        } else if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err("invalid decimal literal".to_string());
        }
        self.decimal_tail()?;
        match self.peek() {
            Some('j') | Some('J') => self.scan_imaginary(),
            _ => self.verify_end_of_number("decimal"),
        }
    }

    fn scan_imaginary(&mut self) -> Result<(), String> {
        self.bump();
        self.verify_end_of_number("decimal")
    }

    fn verify_end_of_number(&mut self, kind: &str) -> Result<(), String> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() || is_identifier_start(c) || c == '_' => {
                Err(format!("invalid {kind} literal"))
            }
            _ => Ok(()),
        }
    }

    fn read_operator(&mut self, start: Position, c: char) -> Token<'a> {
        self.bump();
        let c2 = self.peek();
        let kind = match (c, c2) {
            ('*', Some('*')) => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::DoubleStarEqual
                } else {
                    TokenKind::DoubleStar
                }
            }
            ('/', Some('/')) => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::DoubleSlashEqual
                } else {
                    TokenKind::DoubleSlash
                }
            }
            ('<', Some('<')) => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::LeftShiftEqual
                } else {
                    TokenKind::LeftShift
                }
            }
            ('>', Some('>')) => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::RightShiftEqual
                } else {
                    TokenKind::RightShift
                }
            }
            ('=', Some('=')) => {
                self.bump();
                TokenKind::EqEqual
            }
            ('!', Some('=')) => {
                self.bump();
                TokenKind::NotEqual
            }
            ('<', Some('=')) => {
                self.bump();
                TokenKind::LessEqual
            }
            ('>', Some('=')) => {
                self.bump();
                TokenKind::GreaterEqual
            }
            ('+', Some('=')) => {
                self.bump();
                TokenKind::PlusEqual
            }
            ('-', Some('=')) => {
                self.bump();
                TokenKind::MinusEqual
            }
            ('-', Some('>')) => {
                self.bump();
                TokenKind::Arrow
            }
            ('*', Some('=')) => {
                self.bump();
                TokenKind::StarEqual
            }
            ('/', Some('=')) => {
                self.bump();
                TokenKind::SlashEqual
            }
            ('%', Some('=')) => {
                self.bump();
                TokenKind::PercentEqual
            }
            ('&', Some('=')) => {
                self.bump();
                TokenKind::AmperEqual
            }
            ('|', Some('=')) => {
                self.bump();
                TokenKind::VBarEqual
            }
            ('^', Some('=')) => {
                self.bump();
                TokenKind::CaretEqual
            }
            ('@', Some('=')) => {
                self.bump();
                TokenKind::AtEqual
            }
            (':', Some('=')) => {
                self.bump();
                TokenKind::ColonEqual
            }
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,
            ('@', _) => TokenKind::At,
            ('&', _) => TokenKind::Amper,
            ('|', _) => TokenKind::VBar,
            ('^', _) => TokenKind::Caret,
            ('~', _) => TokenKind::Tilde,
            ('<', _) => TokenKind::Less,
            ('>', _) => TokenKind::Greater,
            ('=', _) => TokenKind::Equal,
            (':', _) => TokenKind::Colon,
            (',', _) => TokenKind::Comma,
            (';', _) => TokenKind::Semicolon,
            ('(', _) | ('[', _) | ('{', _) => {
                if self.paren_stack.len() >= MAX_PAREN_NESTING {
                    return self.error_at(start, "too many nested parentheses");
                }
                self.paren_stack.push((c, start.line, start.column));
                match c {
                    '(' => TokenKind::LParen,
                    '[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                }
            }
            (')', _) | (']', _) | ('}', _) => {
                match self.paren_stack.pop() {
                    None => {
                        return self.error_at(start, format!("unmatched '{c}'"));
                    }
                    Some((open, _, _)) => {
                        let expected = match c {
                            ')' => '(',
                            ']' => '[',
                            _ => '{',
                        };
                        if open != expected {
                            return self.error_at(
                                start,
                                format!(
                                    "closing parenthesis '{c}' does not match \
                                     opening parenthesis '{open}'"
                                ),
                            );
                        }
                    }
                }
                match c {
                    ')' => TokenKind::RParen,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                }
            }
            _ => {
                return self.error_at(
                    start,
                    format!("invalid character '{c}' (U+{:04X})", c as u32),
                );
            }
        };
        self.token_from(start, kind)
    }

    // Low-level scanning helpers.

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        // A lone '\r' ends a line; in "\r\n" the '\n' is the one
        // counted.
        if c == '\n' || (c == '\r' && self.peek() != Some('\n')) {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes one line ending: `\n`, `\r\n`, or a lone `\r`.
    fn eat_newline(&mut self) -> bool {
        match self.peek() {
            Some('\n') => {
                self.bump();
                true
            }
            Some('\r') => {
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
                true
            }
            _ => false,
        }
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\x0c')) {
            self.bump();
        }
    }

    fn position(&self) -> Position {
        Position {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn external_line(&self) -> usize {
        self.base.line + self.line - 1
    }

    fn external_column(&self, line: usize, column: usize) -> usize {
        if line == 1 {
            self.base.column + column
        } else {
            column
        }
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(
            start.pos + self.base.offset,
            self.pos + self.base.offset,
            self.base.line + start.line - 1,
            self.external_column(start.line, start.column),
            self.base.line + self.line - 1,
            self.external_column(self.line, self.column),
        )
    }

    fn zero_width_span(&self) -> Span {
        let here = self.position();
        self.span_from(here)
    }

    fn token_from(&self, start: Position, kind: TokenKind<'a>) -> Token<'a> {
        Token::new(kind, self.span_from(start))
    }

    fn error_at(&mut self, start: Position, message: impl Into<String>) -> Token<'a> {
        self.done = true;
        Token::new(TokenKind::Error(message.into()), self.span_from(start))
    }
}

#[derive(Debug, Clone, Copy)]
struct Position {
    pos: usize,
    line: usize,
    column: usize,
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Tokenizes the entire input, ending with the EndMarker. Never fails:
/// lexical errors appear in the stream as `TokenKind::Error`.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokenizer = Tokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let is_end = matches!(token.kind, TokenKind::EndMarker | TokenKind::Error(_));
        tokens.push(token);
        if is_end {
            break;
        }
    }
    if matches!(
        tokens.last().map(|t| &t.kind),
        Some(TokenKind::Error(_))
    ) {
        // Keep the stream well terminated even after an error.
        loop {
            let token = tokenizer.next_token();
            let is_end = matches!(token.kind, TokenKind::EndMarker);
            tokens.push(token);
            if is_end {
                break;
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn first_error(input: &str) -> String {
        for token in tokenize(input) {
            if let TokenKind::Error(message) = token.kind {
                return message;
            }
        }
        panic!("expected an error token for {input:?}");
    }

    #[test]
    fn tokenizes_simple_program() {
        let input = indoc! {"
            def fn():
                n = 4 + 4
                print(n)
            fn()
        "};
        let expected = vec![
            TokenKind::Def,
            TokenKind::Name("fn"),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Name("n"),
            TokenKind::Equal,
            TokenKind::Number("4"),
            TokenKind::Plus,
            TokenKind::Number("4"),
            TokenKind::Newline,
            TokenKind::Name("print"),
            TokenKind::LParen,
            TokenKind::Name("n"),
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Name("fn"),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::EndMarker,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn token_spans_slice_back_to_source() {
        let input = "total = width * 2\n";
        for token in tokenize(input) {
            match token.kind {
                TokenKind::Name(text) | TokenKind::Number(text) => {
                    assert_eq!(&input[token.span.start..token.span.end], text);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn indents_and_dedents_balance() {
        let inputs = [
            "if a:\n    if b:\n        x = 1\n",
            "if a:\n    x = 1\n",
            "while a:\n  b\n  if c:\n      d\ne\n",
            "if a:\n    x = 1",
            "def f():\n    return 1\n# trailing comment\n",
        ];
        for input in inputs {
            let tokens = tokenize(input);
            let indents = tokens
                .iter()
                .filter(|t| matches!(t.kind, TokenKind::Indent))
                .count();
            let dedents = tokens
                .iter()
                .filter(|t| matches!(t.kind, TokenKind::Dedent))
                .count();
            assert_eq!(indents, dedents, "unbalanced for {input:?}");
        }
    }

    #[test]
    fn brackets_suppress_newlines() {
        let input = "items = [\n    1,\n    2,\n]\n";
        let newline_count = kinds(input)
            .iter()
            .filter(|k| matches!(k, TokenKind::Newline))
            .count();
        assert_eq!(newline_count, 1);
        assert!(!kinds(input).iter().any(|k| matches!(k, TokenKind::Indent)));
    }

    #[test]
    fn line_continuation_joins_lines() {
        let input = "x = 1 + \\\n    2\n";
        let expected = vec![
            TokenKind::Name("x"),
            TokenKind::Equal,
            TokenKind::Number("1"),
            TokenKind::Plus,
            TokenKind::Number("2"),
            TokenKind::Newline,
            TokenKind::EndMarker,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn carriage_return_line_endings_tokenize_like_lf() {
        let crlf = "if a:\r\n    x = 1\r\n\r\n# note\r\ny = 2\r\n";
        let lf = "if a:\n    x = 1\n\n# note\ny = 2\n";
        assert_eq!(kinds(crlf), kinds(lf));
        // A lone '\r' is a line ending too.
        assert_eq!(kinds("x = 1\ry = 2\r"), kinds("x = 1\ny = 2\n"));
        assert_eq!(
            kinds("x = 1 + \\\r\n    2\r\n"),
            kinds("x = 1 + \\\n    2\n")
        );
        let second = tokenize("x = 1\r\ny = 2\r\n")
            .into_iter()
            .find(|t| t.kind == TokenKind::Name("y"))
            .unwrap();
        assert_eq!(second.span.start_line, 2);
    }

    #[test]
    fn open_bracket_at_end_of_input_is_an_error() {
        assert_eq!(first_error("f(1,\n"), "unexpected EOF while parsing");
        assert_eq!(first_error("items = [1, 2"), "unexpected EOF while parsing");
    }

    #[test]
    fn rejects_bad_dedent() {
        let input = "if a:\n        x = 1\n    y = 2\n";
        assert_eq!(
            first_error(input),
            "unindent does not match any outer indentation level"
        );
    }

    #[test]
    fn tab_and_space_indentation_must_agree() {
        // A tab expands to column 8 but alt-column 1; swapping spaces
        // for tabs between sibling lines is ambiguous and rejected.
        let input = "if a:\n\tx = 1\n        y = 2\n";
        assert_eq!(
            first_error(input),
            "inconsistent use of tabs and spaces in indentation"
        );
        // Consistent tab-only indentation is fine.
        let ok = "if a:\n\tx = 1\n\ty = 2\n";
        assert!(!tokenize(ok)
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Error(_))));
    }

    #[test]
    fn numeric_literal_rejection_set() {
        for bad in ["0_", "0x_", "4_______2", "1_.4", "1.4_j", "09", "1__0"] {
            let input = format!("n = {bad}\n");
            let has_error = tokenize(&input)
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Error(_)));
            assert!(has_error, "expected error token for {bad}");
        }
    }

    #[test]
    fn numeric_literal_acceptance_set() {
        for good in [
            "1_000", "0x1_00", "0o777", "0b1_01", "3.14", "10.", ".5", "1e10", "1E-5", "2j",
            "3.5J", "0", "0_0", "1_0.5_2e1_0",
        ] {
            let input = format!("n = {good}\n");
            let tokens = tokenize(&input);
            assert!(
                !tokens.iter().any(|t| matches!(t.kind, TokenKind::Error(_))),
                "unexpected error for {good}: {tokens:?}"
            );
            assert!(
                tokens
                    .iter()
                    .any(|t| matches!(t.kind, TokenKind::Number(text) if text == good)),
                "number text mismatch for {good}"
            );
        }
    }

    #[test]
    fn leading_zero_message() {
        assert_eq!(
            first_error("n = 09\n"),
            "leading zeros in decimal integer literals are not permitted; \
             use an 0o prefix for octal integers"
        );
    }

    #[test]
    fn string_prefixes() {
        let tokens = tokenize("x = rb'ab' + f'{n}' + 'plain'\n");
        let strings: Vec<_> = tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Str(lit) => Some(*lit),
                _ => None,
            })
            .collect();
        assert_eq!(strings.len(), 3);
        assert!(strings[0].prefix.raw && strings[0].prefix.bytes);
        assert_eq!(strings[0].body, "ab");
        assert!(strings[1].prefix.fstring);
        assert_eq!(strings[1].body, "{n}");
        assert_eq!(strings[2].prefix, StringPrefix::default());
        assert_eq!(strings[2].body, "plain");
    }

    #[test]
    fn triple_quoted_string_spans_lines() {
        let input = "s = '''line one\nline two'''\n";
        let tokens = tokenize(input);
        let body = tokens
            .iter()
            .find_map(|t| match &t.kind {
                TokenKind::Str(lit) => Some(lit.body),
                _ => None,
            })
            .expect("string token");
        assert_eq!(body, "line one\nline two");
    }

    #[test]
    fn unterminated_string_reports_start_line() {
        assert_eq!(
            first_error("x = 'oops\n"),
            "unterminated string literal (detected at line 1)"
        );
        assert_eq!(
            first_error("\n\ny = '''oops\n"),
            "unterminated triple-quoted string literal (detected at line 3)"
        );
    }

    #[test]
    fn unmatched_brackets() {
        assert_eq!(first_error("x = )\n"), "unmatched ')'");
        assert_eq!(
            first_error("x = (1]\n"),
            "closing parenthesis ']' does not match opening parenthesis '('"
        );
    }

    #[test]
    fn end_marker_repeats() {
        let mut tokenizer = Tokenizer::new("x\n");
        let mut saw_end = 0;
        for _ in 0..8 {
            if matches!(tokenizer.next_token().kind, TokenKind::EndMarker) {
                saw_end += 1;
            }
        }
        assert!(saw_end >= 5);
    }

    #[test]
    fn implicit_newline_at_eof() {
        let tokens = kinds("x = 1");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Name("x"),
                TokenKind::Equal,
                TokenKind::Number("1"),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn walrus_and_three_char_operators() {
        let input = "x <<= 1 if (y := 2) else z ** 3 // 4\n";
        let tokens = kinds(input);
        assert!(tokens.contains(&TokenKind::LeftShiftEqual));
        assert!(tokens.contains(&TokenKind::ColonEqual));
        assert!(tokens.contains(&TokenKind::DoubleStar));
        assert!(tokens.contains(&TokenKind::DoubleSlash));
    }

    #[test]
    fn base_position_biases_spans() {
        let outer = "prefix f'{value}'";
        let field = &outer[10..15]; // "value"
        let mut tokenizer = Tokenizer::with_base(
            field,
            BasePosition {
                offset: 10,
                line: 1,
                column: 10,
            },
        );
        let token = tokenizer.next_token();
        assert_eq!(token.kind, TokenKind::Name("value"));
        assert_eq!(token.span.start, 10);
        assert_eq!(token.span.end, 15);
        assert_eq!(&outer[token.span.start..token.span.end], "value");
    }
}
