use super::error_code::ErrorCode;
use azfunc_compiler::parse_util::ParseSourceSpan;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic attributed to one function.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub category: DiagnosticCategory,
    pub message: String,
    pub span: Option<ParseSourceSpan>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, span: Option<ParseSourceSpan>, message: impl Into<String>) -> Self {
        make_diagnostic(code, span, message.into(), DiagnosticCategory::Error)
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn format(&self) -> String {
        let location = self
            .span
            .as_ref()
            .map(|span| format!("{}: ", span.start))
            .unwrap_or_default();
        format!("{} {}: {}{}", self.category, self.code, location, self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// An error that aborts generation of the function it was raised for.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct FatalDiagnosticError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Option<ParseSourceSpan>,
}

impl FatalDiagnosticError {
    pub fn new(code: ErrorCode, span: Option<ParseSourceSpan>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        make_diagnostic(
            self.code,
            self.span.clone(),
            self.message.clone(),
            DiagnosticCategory::Error,
        )
    }
}

impl From<FatalDiagnosticError> for Diagnostic {
    fn from(err: FatalDiagnosticError) -> Self {
        make_diagnostic(err.code, err.span, err.message, DiagnosticCategory::Error)
    }
}

pub fn make_diagnostic(
    code: ErrorCode,
    span: Option<ParseSourceSpan>,
    message: String,
    category: DiagnosticCategory,
) -> Diagnostic {
    Diagnostic {
        code,
        category,
        message,
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_with_location() {
        let diag = Diagnostic::error(
            ErrorCode::UnsupportedParameterType,
            Some(ParseSourceSpan::point("main.bal", 3, 9)),
            "unsupported type",
        );
        assert_eq!(diag.format(), "error AZF1002: main.bal:3:9: unsupported type");
    }

    #[test]
    fn should_format_without_location() {
        let err = FatalDiagnosticError::new(ErrorCode::MissingRequiredKey, None, "missing `path`");
        assert_eq!(err.to_string(), "AZF1005: missing `path`");
        assert_eq!(err.to_diagnostic().format(), "error AZF1005: missing `path`");
    }
}
