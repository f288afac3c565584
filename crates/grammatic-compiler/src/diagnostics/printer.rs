//! Builder-pattern printer for rendering diagnostics against grammar source.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::message::{DiagnosticMessage, Severity};

/// Builder for rendering a batch of diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    messages: &'d [DiagnosticMessage],
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub(crate) fn new(messages: &'d [DiagnosticMessage], source: &'s str) -> Self {
        Self {
            messages,
            source: Some(source),
            path: None,
            colored: false,
        }
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        if self.messages.is_empty() {
            return Ok(());
        }

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.messages.iter().enumerate() {
            let level = severity_to_level(diag.severity);

            let mut snippet = Snippet::source(source).line_start(1);
            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            if let Some(span) = diag.span {
                let range = adjust_range(span.byte_range(), source.len());
                snippet = snippet.annotation(
                    AnnotationKind::Primary
                        .span(range)
                        .label(&diag.message),
                );
                for related in &diag.related {
                    if let Some(related_span) = related.span {
                        snippet = snippet.annotation(
                            AnnotationKind::Context
                                .span(adjust_range(related_span.byte_range(), source.len()))
                                .label(&related.message),
                        );
                    }
                }
            }

            let title_group = level.primary_title(&diag.message).element(snippet);
            let report: Vec<Group> = vec![title_group];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.messages.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{diag}")?;
        }
        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
        Severity::Info => Level::NOTE,
    }
}

fn adjust_range(range: std::ops::Range<usize>, limit: usize) -> std::ops::Range<usize> {
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }
    range
}
