//! Source-to-AST front end for a Python-compatible language.
//!
//! The pipeline is a hand-written tokenizer feeding a backtracking
//! recursive-descent parser through a memoizing mark/reset cursor. Node
//! construction is pluggable: [`factory::TreeBuilder`] materializes the
//! [`ast`] tree, [`factory::SyntaxChecker`] validates without
//! allocating.

pub mod ast;
pub mod cursor;
pub mod error;
pub mod factory;
pub mod fixtures;
pub mod fstring;
pub mod parser;
pub mod strings;
pub mod token;
pub mod tokenizer;

#[cfg(test)]
mod harness;

pub use error::{ParseResult, SyntaxError, SyntaxErrorKind};
pub use factory::{AstFactory, SyntaxChecker, TreeBuilder};
pub use parser::{ParseMode, Parser};

/// Parses `source` into a materialized tree.
pub fn parse(source: &str, mode: ParseMode) -> ParseResult<ast::Mod> {
    Parser::new(source, TreeBuilder).parse(mode)
}

/// Validates `source` without building any nodes.
pub fn check_syntax(source: &str, mode: ParseMode) -> ParseResult<()> {
    Parser::new(source, SyntaxChecker).parse(mode)
}
