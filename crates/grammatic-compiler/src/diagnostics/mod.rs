//! Compiler diagnostics infrastructure.
//!
//! This module provides types for collecting and rendering diagnostic
//! messages. It is the crate's only notion of "logging": errors, warnings,
//! and verbose-mode dumps all travel through one `Diagnostics` collection,
//! distinguished by `Severity` rather than by channel.

mod message;
mod printer;


use grammatic_core::Span;

pub use message::Severity;
pub use printer::DiagnosticsPrinter;

use message::{DiagnosticMessage, RelatedInfo};

/// Collection of diagnostic messages from parsing and analysis.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

/// Builder for constructing a diagnostic message.
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn error(&mut self, msg: impl Into<String>, span: impl Into<Option<Span>>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(Severity::Error, span.into(), msg),
        }
    }

    pub fn warning(&mut self, msg: impl Into<String>, span: impl Into<Option<Span>>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(Severity::Warning, span.into(), msg),
        }
    }

    pub fn info(&mut self, msg: impl Into<String>, span: impl Into<Option<Span>>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(Severity::Info, span.into(), msg),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn printer<'a>(&'a self, source: &'a str) -> DiagnosticsPrinter<'a, 'a> {
        DiagnosticsPrinter::new(&self.messages, source)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn related_to(mut self, msg: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        self.message.related.push(RelatedInfo::new(span.into(), msg));
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
