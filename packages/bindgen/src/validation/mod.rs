//! Validation
//!
//! A pass over a whole declaration, independent of handler dispatch. It
//! checks the structural rules no single handler can see: trigger count,
//! HTTP pairing, context uniqueness and the function marker. It also names
//! the offending element of tuple-typed values, which dispatch rejects only
//! as a whole.
//!
//! Parameter and return checks that dispatch performs (accepted types,
//! annotation placement, unknown kinds) are left to dispatch.

use crate::declaration::{
    DeclarationPart, DeclaredType, FunctionDeclaration, ParameterRole, FUNCTION_MARKER,
};
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::handlers::IMPLICIT_RETURN_KIND;
use crate::schema::{self, BindingRole, SchemaEntry};
use azfunc_compiler::parse_util::ParseSourceSpan;

const HTTP_TRIGGER_KIND: &str = "httpTrigger";

/// A validation finding and the part of the declaration it is about.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub part: DeclarationPart,
    pub diagnostic: Diagnostic,
}

/// Validates `decl`, returning every finding.
pub fn validate_function(decl: &FunctionDeclaration) -> Vec<Diagnostic> {
    validate_parts(decl)
        .into_iter()
        .map(|finding| finding.diagnostic)
        .collect()
}

/// Validates `decl`, attributing each finding to a part of the declaration.
pub fn validate_parts(decl: &FunctionDeclaration) -> Vec<Finding> {
    let mut findings = Findings::default();

    if let Some(marker) = &decl.marker {
        if marker.kind != FUNCTION_MARKER {
            findings.push(
                DeclarationPart::Function,
                ErrorCode::MisplacedBinding,
                marker.span.clone().or_else(|| decl.span.clone()),
                format!(
                    "`{}` cannot mark function `{}`; use `{}`",
                    marker.kind, decl.name, FUNCTION_MARKER
                ),
            );
        }
    }

    let mut triggers: Vec<(&str, DeclarationPart, Option<ParseSourceSpan>)> = Vec::new();
    let mut http_outputs: Vec<(DeclarationPart, Option<ParseSourceSpan>)> = Vec::new();
    let mut contexts = 0usize;
    // A kind dispatch cannot resolve may or may not be a trigger.
    let mut unresolved = false;

    for (index, param) in decl.params.iter().enumerate() {
        let part = DeclarationPart::Parameter(index);
        let span = param
            .span
            .clone()
            .or_else(|| param.annotation.as_ref().and_then(|a| a.span.clone()));

        let Some(annotation) = &param.annotation else {
            if param.role == ParameterRole::Context {
                contexts += 1;
                if contexts > 1 {
                    findings.push(
                        part,
                        ErrorCode::DuplicateContextParameter,
                        span,
                        format!(
                            "parameter `{}` is a second context parameter of `{}`",
                            param.name, decl.name
                        ),
                    );
                }
            }
            continue;
        };

        let Some(entry) = schema::lookup(&annotation.kind) else {
            unresolved = true;
            continue;
        };
        if entry.is_trigger() {
            triggers.push((entry.kind, part, span.clone()));
        }
        if entry.kind == IMPLICIT_RETURN_KIND {
            http_outputs.push((part, span.clone()));
        }
        findings.check_elements(part, entry, &param.declared_type, &param.name, &span);
    }

    if let Some(ret) = &decl.return_spec {
        let span = ret
            .span
            .clone()
            .or_else(|| ret.annotation.as_ref().and_then(|a| a.span.clone()));
        let kind = match &ret.annotation {
            Some(annotation) => Some(annotation.kind.as_str()),
            None if ret.declared_type.is_nil() => None,
            None => Some(IMPLICIT_RETURN_KIND),
        };
        let entry = kind
            .and_then(schema::lookup)
            .filter(|entry| entry.role == BindingRole::Output);
        if let Some(entry) = entry {
            if entry.kind == IMPLICIT_RETURN_KIND {
                http_outputs.push((DeclarationPart::Return, span.clone()));
            }
            findings.check_elements(
                DeclarationPart::Return,
                entry,
                &ret.declared_type,
                "return",
                &span,
            );
        }
    }

    match triggers.as_slice() {
        [] if !unresolved => findings.push(
            DeclarationPart::Function,
            ErrorCode::MissingTrigger,
            decl.span.clone(),
            format!("function `{}` has no trigger binding", decl.name),
        ),
        [] | [_] => {}
        [(first, _, _), rest @ ..] => {
            for (kind, part, span) in rest {
                findings.push(
                    *part,
                    ErrorCode::MultipleTriggers,
                    span.clone(),
                    format!(
                        "function `{}` already has trigger `{}`; `{}` is a second trigger",
                        decl.name, first, kind
                    ),
                );
            }
        }
    }

    let has_http_trigger = triggers.iter().any(|(kind, _, _)| *kind == HTTP_TRIGGER_KIND);
    if !has_http_trigger {
        for (part, span) in http_outputs {
            findings.push(
                part,
                ErrorCode::HttpOutputWithoutHttpTrigger,
                span,
                format!(
                    "`{}` in function `{}` requires an `{}` trigger",
                    IMPLICIT_RETURN_KIND, decl.name, HTTP_TRIGGER_KIND
                ),
            );
        }
    }

    tracing::trace!(function = %decl.name, findings = findings.0.len(), "validated");
    findings.0
}

#[derive(Default)]
struct Findings(Vec<Finding>);

impl Findings {
    fn push(
        &mut self,
        part: DeclarationPart,
        code: ErrorCode,
        span: Option<ParseSourceSpan>,
        message: String,
    ) {
        self.0.push(Finding {
            part,
            diagnostic: Diagnostic::error(code, span, message),
        });
    }

    /// Descends into a tuple, or an array of tuples, and checks each element.
    /// Other shapes are checked by dispatch.
    fn check_elements(
        &mut self,
        part: DeclarationPart,
        entry: &SchemaEntry,
        ty: &DeclaredType,
        path: &str,
        span: &Option<ParseSourceSpan>,
    ) {
        match ty {
            DeclaredType::Tuple(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    self.check_type(part, entry, element, &format!("{}[{}]", path, i), span);
                }
            }
            DeclaredType::Array(element) if matches!(element.as_ref(), DeclaredType::Tuple(_)) => {
                self.check_elements(part, entry, element, &format!("{}[]", path), span);
            }
            _ => {}
        }
    }

    fn check_type(
        &mut self,
        part: DeclarationPart,
        entry: &SchemaEntry,
        ty: &DeclaredType,
        path: &str,
        span: &Option<ParseSourceSpan>,
    ) {
        match ty {
            DeclaredType::Tuple(_) => self.check_elements(part, entry, ty, path, span),
            DeclaredType::Array(element)
                if !entry.accepts(ty) && matches!(element.as_ref(), DeclaredType::Tuple(_)) =>
            {
                self.check_elements(part, entry, ty, path, span)
            }
            _ if !entry.accepts(ty) => self.push(
                part,
                ErrorCode::IncompatibleBindingType,
                span.clone(),
                format!(
                    "`{}` of type `{}` does not fit `{}` (expected one of: {})",
                    path,
                    ty,
                    entry.kind,
                    entry.accepted_types()
                ),
            ),
            _ => {}
        }
    }
}
