use thiserror::Error;

use crate::token::Span;

/// Classification carried alongside the message so callers can map the
/// failure onto the right exception type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    Syntax,
    Indentation,
    Tab,
}

impl SyntaxErrorKind {
    fn label(self) -> &'static str {
        match self {
            SyntaxErrorKind::Syntax => "SyntaxError",
            SyntaxErrorKind::Indentation => "IndentationError",
            SyntaxErrorKind::Tab => "TabError",
        }
    }
}

/// A fatal parse failure. Carries enough span information to underline
/// the offending text in the original source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message} (line {}, column {})", kind.label(), span.start_line, span.start_column)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::Syntax,
            message: message.into(),
            span,
        }
    }

    pub fn indentation(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::Indentation,
            message: message.into(),
            span,
        }
    }

    pub fn tab(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::Tab,
            message: message.into(),
            span,
        }
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;
