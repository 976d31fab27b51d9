//! Handler Dispatcher
//!
//! Maps every parameter and return value of a function to exactly one
//! handler. Parameters dispatch on the role recorded for their annotation's
//! kind in the schema registry; unannotated parameters dispatch on their
//! structural role. New binding kinds are registered in the registry only.

pub mod parameter;
pub mod return_handler;
pub mod runtime;

pub use parameter::ParameterHandler;
pub use return_handler::{ReturnHandler, IMPLICIT_RETURN_KIND};

use crate::annotations;
use crate::declaration::{ParameterRole, ParameterSpec, ReturnSpec, FUNCTION_MARKER};
use crate::diagnostics::{ErrorCode, FatalDiagnosticError};
use crate::schema::BindingRole;

/// Selects the handler for `param`.
pub fn resolve_parameter(param: &ParameterSpec) -> Result<ParameterHandler<'_>, FatalDiagnosticError> {
    let Some(raw) = &param.annotation else {
        return match param.role {
            ParameterRole::Context => Ok(ParameterHandler::Context { param }),
            ParameterRole::Normal => Err(FatalDiagnosticError::new(
                ErrorCode::MissingBindingAnnotation,
                param.span.clone(),
                format!("parameter `{}` has no binding annotation", param.name),
            )),
        };
    };

    if raw.kind == FUNCTION_MARKER {
        return Err(FatalDiagnosticError::new(
            ErrorCode::UnknownBindingKind,
            raw.span.clone().or_else(|| param.span.clone()),
            format!(
                "`{}` marks a function and cannot bind parameter `{}`",
                FUNCTION_MARKER, param.name
            ),
        ));
    }

    let annotation = annotations::resolve_annotation(raw)?;
    let handler = match annotation.entry.role {
        BindingRole::Trigger => ParameterHandler::Trigger { param, annotation },
        BindingRole::Input => ParameterHandler::Input { param, annotation },
        BindingRole::Output => ParameterHandler::Output { param, annotation },
        BindingRole::Metadata => ParameterHandler::Metadata { param, annotation },
    };
    tracing::debug!(param = %param.name, handler = handler.label(), "resolved parameter handler");
    Ok(handler)
}

/// Selects the handler for the return value, if it needs one.
pub fn resolve_return(spec: &ReturnSpec) -> Result<Option<ReturnHandler<'_>>, FatalDiagnosticError> {
    let handler = ReturnHandler::resolve(spec)?;
    if let Some(handler) = &handler {
        tracing::debug!(
            kind = handler.annotation().kind(),
            implicit = handler.is_implicit(),
            "resolved return handler"
        );
    }
    Ok(handler)
}
