//! Mark/reset cursor over the token stream.
//!
//! Tokens are lexed lazily and memoized in an append-only buffer, so
//! backtracking re-traverses memory instead of re-running the tokenizer.
//! `mark` and `reset` are a plain index copy, which is what makes
//! unlimited-lookahead PEG parsing tractable.

use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;

pub struct TokenStream<'a> {
    tokenizer: Tokenizer<'a>,
    buffer: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokenizer: Tokenizer<'a>) -> Self {
        Self {
            tokenizer,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Current position; pass it back to `reset` to rewind.
    pub fn mark(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, mark: usize) {
        debug_assert!(mark <= self.buffer.len());
        self.pos = mark;
    }

    /// Token at the current position, without consuming it.
    pub fn peek(&mut self) -> &Token<'a> {
        self.fill(self.pos);
        &self.buffer[self.pos]
    }

    /// Token `n` positions ahead of the current one.
    pub fn peek_ahead(&mut self, n: usize) -> &Token<'a> {
        self.fill(self.pos + n);
        &self.buffer[self.pos + n]
    }

    /// Consumes and returns the token at the current position. The
    /// EndMarker repeats forever, so the position past it stays valid.
    pub fn advance(&mut self) -> &Token<'a> {
        self.fill(self.pos);
        let token = &self.buffer[self.pos];
        self.pos += 1;
        token
    }

    /// Last token before `mark` that is not structural
    /// (NEWLINE/INDENT/DEDENT/EndMarker), used for end-of-construct
    /// spans.
    pub fn last_meaningful_before(&self, mark: usize) -> Option<&Token<'a>> {
        self.buffer[..mark.min(self.buffer.len())]
            .iter()
            .rev()
            .find(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Newline
                        | TokenKind::Indent
                        | TokenKind::Dedent
                        | TokenKind::EndMarker
                )
            })
    }

    fn fill(&mut self, index: usize) {
        while self.buffer.len() <= index {
            let token = self.tokenizer.next_token();
            self.buffer.push(token);
        }
    }
}
