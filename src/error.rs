//! Error types for request parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The request is not valid JSON or does not match the request schema
    #[error("invalid request at line {line}, column {column}: {message}")]
    Json {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("malformed value for '{key}': '{value}' ({reason})")]
    MalformedValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    pub fn malformed(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ParseError::MalformedValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Byte range in `source` the error points at, if it can be located
    pub fn span(&self, source: &str) -> Option<Span> {
        match self {
            ParseError::Json { line, column, .. } => {
                let line_start: usize = source
                    .split_inclusive('\n')
                    .take(line.saturating_sub(1))
                    .map(str::len)
                    .sum();
                let offset = (line_start + column.saturating_sub(1)).min(source.len());
                Some(offset..(offset + 1).min(source.len()).max(offset))
            }
            ParseError::MalformedValue { key, value, .. } => {
                let key_at = source.find(&format!("\"{key}\""))?;
                let quoted = format!("\"{value}\"");
                let value_at = source[key_at..].find(&quoted)? + key_at;
                Some(value_at..value_at + quoted.len())
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span(source).unwrap_or(0..0);
        let message = self.to_string();
        let label = match self {
            ParseError::Json { message, .. } => message.clone(),
            ParseError::MalformedValue { reason, .. } => reason.clone(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        // serde_json appends its own position; keep the bare message
        let message = match message.rfind(" at line ") {
            Some(cut) => message[..cut].to_string(),
            None => message,
        };
        ParseError::Json {
            message,
            line: err.line(),
            column: err.column(),
        }
    }
}
