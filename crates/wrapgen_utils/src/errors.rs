use ariadne::{Color, Label, Report, ReportKind, Source};
use wrapgen_span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// A located message about a definitions script.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: DiagnosticSeverity,
    source_id: String,
    span: Span,
    message: String,
    label: Option<String>,
    help: Option<String>,
}

impl Diagnostic {
    pub fn new<S: Into<String>>(
        severity: DiagnosticSeverity,
        source_id: S,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            source_id: source_id.into(),
            span,
            message: message.into(),
            label: None,
            help: None,
        }
    }

    pub fn error(source_id: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, source_id, span, message)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn report_kind(&self) -> ReportKind<'_> {
        match self.severity {
            DiagnosticSeverity::Error => ReportKind::Error,
            DiagnosticSeverity::Warning => ReportKind::Warning,
            DiagnosticSeverity::Info => ReportKind::Advice,
        }
    }
}

/// Render diagnostics for `source` to stderr.
pub fn emit_diagnostics(diagnostics: &[Diagnostic], source: &str) {
    for diagnostic in diagnostics {
        let color = match diagnostic.severity {
            DiagnosticSeverity::Error => Color::Red,
            DiagnosticSeverity::Warning => Color::Yellow,
            DiagnosticSeverity::Info => Color::Blue,
        };

        let span: std::ops::Range<usize> = diagnostic.span().into();
        let mut label = Label::new((diagnostic.source_id().to_string(), span.clone()))
            .with_color(color);
        if let Some(text) = diagnostic.label() {
            label = label.with_message(text);
        }

        let mut report = Report::build(
            diagnostic.report_kind(),
            diagnostic.source_id().to_string(),
            span.start,
        )
        .with_message(diagnostic.message())
        .with_label(label);

        if let Some(help) = diagnostic.help() {
            report = report.with_note(help);
        } else if diagnostic.severity == DiagnosticSeverity::Error {
            report = report.with_note(
                "The definitions cache may be hand-edited or truncated; re-run `wrapgen extract`.",
            );
        }

        let _ = report
            .finish()
            .eprint((diagnostic.source_id().to_string(), Source::from(source)));
    }
}
