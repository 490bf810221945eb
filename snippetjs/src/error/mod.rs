//! Error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, SnippetError>;

/// Every way a tokenize, build or interpret call can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnippetError {
    #[error("LexError at {span}: {message}")]
    Lex { message: String, span: Span },

    #[error("ParseError at {span}: {message}")]
    Parse { message: String, span: Span },

    /// Array index outside `[0, length)`, or a value that cannot leave the heap
    #[error("RangeError at {span}: {message}")]
    Range { message: String, span: Span },

    /// Unbound name, unknown callee or bad entry point
    #[error("ReferenceError at {span}: {message}")]
    Reference { message: String, span: Span },

    /// Metered budget overrun; aborts the whole call
    #[error("ResourceExhausted: {message}")]
    ResourceExhausted { message: String },

    /// Failure reported by an injected token executor or contract caller
    #[error("CollaboratorError: {message}")]
    Collaborator { message: String },
}

impl SnippetError {
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            message: message.into(),
            span,
        }
    }

    pub fn out_of_range(index: &str, len: usize, span: Span) -> Self {
        Self::Range {
            message: format!("out of range: index {index} for length {len}"),
            span,
        }
    }

    pub fn range(message: impl Into<String>, span: Span) -> Self {
        Self::Range {
            message: message.into(),
            span,
        }
    }

    pub fn undefined_identifier(name: &str, span: Span) -> Self {
        Self::Reference {
            message: format!("undefined identifier: {name}"),
            span,
        }
    }

    pub fn reference(message: impl Into<String>, span: Span) -> Self {
        Self::Reference {
            message: message.into(),
            span,
        }
    }

    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            message: message.into(),
        }
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { span, .. }
            | Self::Parse { span, .. }
            | Self::Range { span, .. }
            | Self::Reference { span, .. } => Some(*span),
            Self::ResourceExhausted { .. } | Self::Collaborator { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. }
            | Self::Parse { message, .. }
            | Self::Range { message, .. }
            | Self::Reference { message, .. }
            | Self::ResourceExhausted { message }
            | Self::Collaborator { message } => message,
        }
    }

    /// Short kind label used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lex { .. } => "LexError",
            Self::Parse { .. } => "ParseError",
            Self::Range { .. } => "RangeError",
            Self::Reference { .. } => "ReferenceError",
            Self::ResourceExhausted { .. } => "ResourceExhausted",
            Self::Collaborator { .. } => "CollaboratorError",
        }
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &SnippetError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = error.kind();
    let report = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(kind)
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind}: {}", error.message()))
            .finish()
    };

    if let Err(e) = report.eprint((filename, Source::from(source))) {
        log::warn!("failed to render diagnostic: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = SnippetError::lex("unknown char", Span::new(3, 4));
        assert_eq!(err.to_string(), "LexError at 3..4: unknown char");
    }

    #[test]
    fn test_out_of_range_message() {
        let err = SnippetError::out_of_range("-1", 1, Span::new(0, 6));
        assert!(err.message().starts_with("out of range"));
        assert_eq!(err.kind(), "RangeError");
    }

    #[test]
    fn test_spanless_errors() {
        let err = SnippetError::exhausted("resource budget exhausted");
        assert_eq!(err.span(), None);
        assert_eq!(err.to_string(), "ResourceExhausted: resource budget exhausted");
    }
}
