use miette::Diagnostic;
use thiserror::Error;

use crate::ast::Span;

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(code(petrel::parse::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Invalid number literal '{literal}': {reason}")]
    #[diagnostic(code(petrel::parse::number))]
    InvalidNumber {
        literal: String,
        reason: String,
        #[label("not a valid number")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Duplicate constant '{name}'")]
    #[diagnostic(code(petrel::parse::duplicate_constant))]
    DuplicateConstant {
        name: String,
        #[label("redeclared here")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Missing required section: {section}")]
    #[diagnostic(code(petrel::parse::missing_section))]
    MissingSection { section: String },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Span, source: &str, filename: &str) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span: (span.start, span.end - span.start).into(),
            src: miette::NamedSource::new(filename, source.to_owned()),
        }
    }
}
