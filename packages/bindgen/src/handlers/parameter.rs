//! Parameter Handlers
//!
//! One variant per structural kind of parameter. Every variant follows the
//! same protocol: `invocation_process` yields the initializer of the
//! parameter's synthetic variable, `post_invocation_process` runs after the
//! user body and `generate_binding` yields the descriptor fragment, if any.

use super::runtime;
use crate::annotations::ResolvedAnnotation;
use crate::declaration::{DeclaredType, ParameterSpec};
use crate::diagnostics::{ErrorCode, FatalDiagnosticError};
use crate::transform::context::GenerationContext;
use crate::transform::descriptor::DescriptorFragment;
use azfunc_compiler::output::output_ast::{self as o, Expression};
use azfunc_compiler::parse_util::ParseSourceSpan;

const HTTP_TRIGGER_KIND: &str = "httpTrigger";

// ============================================================================
// ParameterHandler
// ============================================================================

/// The handler bound to one parameter.
#[derive(Debug, Clone)]
pub enum ParameterHandler<'d> {
    /// Reads the triggering payload.
    Trigger {
        param: &'d ParameterSpec,
        annotation: ResolvedAnnotation,
    },
    /// Reads an input binding.
    Input {
        param: &'d ParameterSpec,
        annotation: ResolvedAnnotation,
    },
    /// Captures a value the user writes and publishes it after the call.
    Output {
        param: &'d ParameterSpec,
        annotation: ResolvedAnnotation,
    },
    /// Receives the invocation context object.
    Context { param: &'d ParameterSpec },
    /// Reads one value of the trigger metadata.
    Metadata {
        param: &'d ParameterSpec,
        annotation: ResolvedAnnotation,
    },
}

impl<'d> ParameterHandler<'d> {
    pub fn param(&self) -> &'d ParameterSpec {
        match self {
            ParameterHandler::Trigger { param, .. }
            | ParameterHandler::Input { param, .. }
            | ParameterHandler::Output { param, .. }
            | ParameterHandler::Context { param }
            | ParameterHandler::Metadata { param, .. } => param,
        }
    }

    pub fn annotation(&self) -> Option<&ResolvedAnnotation> {
        match self {
            ParameterHandler::Trigger { annotation, .. }
            | ParameterHandler::Input { annotation, .. }
            | ParameterHandler::Output { annotation, .. }
            | ParameterHandler::Metadata { annotation, .. } => Some(annotation),
            ParameterHandler::Context { .. } => None,
        }
    }

    /// Short variant label, for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterHandler::Trigger { .. } => "trigger",
            ParameterHandler::Input { .. } => "input",
            ParameterHandler::Output { .. } => "output",
            ParameterHandler::Context { .. } => "context",
            ParameterHandler::Metadata { .. } => "metadata",
        }
    }

    /// The name under which the runtime exchanges this parameter's value.
    pub fn binding_name(&self) -> &str {
        match self {
            ParameterHandler::Metadata { param, annotation } => {
                annotation.get_str("name").unwrap_or(&param.name)
            }
            _ => &self.param().name,
        }
    }

    /// Expression initializing the parameter's synthetic variable.
    ///
    /// Fails with `UnsupportedParameterType` when the declared type is not
    /// accepted by the binding kind.
    pub fn invocation_process(
        &self,
        ctx: &GenerationContext<'_>,
    ) -> Result<Box<Expression>, FatalDiagnosticError> {
        match self {
            ParameterHandler::Trigger { param, annotation }
            | ParameterHandler::Input { param, annotation } => {
                let ty = self.checked_type(annotation)?;
                // HTTP triggers bound to a plain string or json read the body.
                let http_body = annotation.kind() == HTTP_TRIGGER_KIND;
                let accessor =
                    runtime::input_accessor(ty, http_body, annotation.entry.named_type)
                        .ok_or_else(|| unsupported_type(param, annotation))?;
                let mut args = vec![*ctx.handle(), *o::literal(param.name.as_str())];
                if accessor == runtime::GET_RECORD_FROM_INPUT_DATA {
                    args.push(*type_descriptor(ty));
                }
                Ok(ctx.runtime_call(accessor, args))
            }
            ParameterHandler::Output { annotation, .. } => {
                self.checked_type(annotation)?;
                Ok(ctx.runtime_call(runtime::NEW_OUTPUT_BINDING, vec![]))
            }
            ParameterHandler::Context { .. } => {
                Ok(ctx.runtime_call(runtime::CREATE_CONTEXT, vec![*ctx.handle()]))
            }
            ParameterHandler::Metadata { param, annotation } => {
                let ty = self.checked_type(annotation)?;
                let accessor = runtime::metadata_accessor(ty)
                    .ok_or_else(|| unsupported_type(param, annotation))?;
                Ok(ctx.runtime_call(
                    accessor,
                    vec![*ctx.handle(), *o::literal(self.binding_name())],
                ))
            }
        }
    }

    /// Publishes an output parameter's captured value. Does nothing for the
    /// other variants.
    pub fn post_invocation_process(
        &self,
        ctx: &mut GenerationContext<'_>,
        captured: &str,
    ) -> Result<(), FatalDiagnosticError> {
        let ParameterHandler::Output { param, annotation } = self else {
            return Ok(());
        };
        let setter = runtime::output_setter(&param.declared_type, annotation.entry.named_type)
            .ok_or_else(|| unsupported_type(param, annotation))?;
        let call = ctx.runtime_call(
            setter,
            vec![
                *ctx.handle(),
                *o::literal(param.name.as_str()),
                *o::variable(captured),
            ],
        );
        ctx.assembler
            .append(call.to_stmt().with_source_span(param.span.clone()));
        Ok(())
    }

    pub fn generate_binding(&self) -> Option<DescriptorFragment> {
        match self {
            ParameterHandler::Trigger { param, annotation }
            | ParameterHandler::Input { param, annotation }
            | ParameterHandler::Output { param, annotation } => {
                DescriptorFragment::for_binding(annotation, &param.declared_type, &param.name)
            }
            ParameterHandler::Context { .. } | ParameterHandler::Metadata { .. } => None,
        }
    }

    pub fn span(&self) -> Option<ParseSourceSpan> {
        let param = self.param();
        param
            .span
            .clone()
            .or_else(|| self.annotation().and_then(|a| a.span.clone()))
    }

    fn checked_type(
        &self,
        annotation: &ResolvedAnnotation,
    ) -> Result<&'d DeclaredType, FatalDiagnosticError> {
        let param = self.param();
        if annotation.entry.accepts(&param.declared_type) {
            Ok(&param.declared_type)
        } else {
            Err(unsupported_type(param, annotation))
        }
    }
}

fn unsupported_type(param: &ParameterSpec, annotation: &ResolvedAnnotation) -> FatalDiagnosticError {
    FatalDiagnosticError::new(
        ErrorCode::UnsupportedParameterType,
        param.span.clone().or_else(|| annotation.span.clone()),
        format!(
            "parameter `{}` of type `{}` cannot be bound as `{}` (expected one of: {})",
            param.name,
            param.declared_type,
            annotation.kind(),
            annotation.entry.accepted_types()
        ),
    )
}

/// Type descriptor handed to record accessors: a reference to the user
/// record type with one `[]` per array level.
fn type_descriptor(ty: &DeclaredType) -> Box<Expression> {
    let mut dims = 0;
    let mut element = ty;
    while let DeclaredType::Array(inner) = element {
        dims += 1;
        element = inner.as_ref();
    }
    o::type_ref(element.to_string(), dims)
}
