use std::fmt;

use tracing::debug;

/// Non-fatal problems found in the input. Processing always continues; the
/// offending element is skipped or degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityWarning {
    /// Object-like macro with no initializer; skipped.
    MacroWithoutValue { name: String, header: String },
    /// Macro whose name starts with `__`; skipped.
    ReservedName { name: String, header: String },
    /// A parameter lacks a declared name; the whole member is dropped.
    UnnamedParameter {
        function: String,
        position: usize,
        header: String,
    },
    /// A parameter name repeats within one overload under the rejecting
    /// policy; the member is dropped.
    DuplicateParameter {
        function: String,
        parameter: String,
        header: String,
    },
    /// A type fragment produced no base type.
    EmptyType { context: String, raw: String },
    /// A base type matches nothing known; marshalled as a primitive.
    UnknownType {
        context: String,
        type_name: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacroWithoutValue { name, header } => {
                write!(f, "{header}: macro `{name}` has no value, skipped")
            }
            Self::ReservedName { name, header } => {
                write!(f, "{header}: reserved name `{name}`, skipped")
            }
            Self::UnnamedParameter {
                function,
                position,
                header,
            } => write!(
                f,
                "{header}: parameter {position} of `{function}` has no name, member dropped"
            ),
            Self::DuplicateParameter {
                function,
                parameter,
                header,
            } => write!(
                f,
                "{header}: parameter `{parameter}` repeats in `{function}`, member dropped"
            ),
            Self::EmptyType { context, raw } => {
                write!(f, "{context}: could not parse type `{raw}`")
            }
            Self::UnknownType {
                context,
                type_name,
                suggestion,
            } => {
                write!(f, "{context}: unknown type `{type_name}` treated as primitive")?;
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean `{suggestion}`?)")?;
                }
                Ok(())
            }
        }
    }
}

/// Accumulates warnings for callers that want to report them.
#[derive(Debug, Clone, Default)]
pub struct WarningLog {
    warnings: Vec<DataQualityWarning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. It is only logged at `debug`; callers decide whether
    /// to list the collected warnings or just count them.
    pub fn push(&mut self, warning: DataQualityWarning) {
        debug!("{warning}");
        self.warnings.push(warning);
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataQualityWarning> {
        self.warnings.iter()
    }

    pub fn into_vec(self) -> Vec<DataQualityWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use wrapgen_utils::logger::default_filter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(verbosity: u8) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(default_filter(verbosity))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut log = WarningLog::new();
        tracing::subscriber::with_default(subscriber, || {
            log.push(DataQualityWarning::MacroWithoutValue {
                name: "MATH_EXPORT".to_string(),
                header: "math.h".to_string(),
            });
        });
        assert_eq!(log.len(), 1);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn warnings_are_silent_by_default() {
        assert_eq!(logged_at(0), "");
        assert_eq!(logged_at(1), "");
    }

    #[test]
    fn warnings_are_logged_when_very_verbose() {
        let output = logged_at(2);
        assert!(output.contains("math.h: macro `MATH_EXPORT` has no value"), "{output}");
    }

    #[test]
    fn unknown_type_mentions_suggestion() {
        let warning = DataQualityWarning::UnknownType {
            context: "draw.h: Fill".to_string(),
            type_name: "Shpe".to_string(),
            suggestion: Some("Shape".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "draw.h: Fill: unknown type `Shpe` treated as primitive (did you mean `Shape`?)"
        );
    }
}
