use super::runtime;
use crate::annotations::{self, ResolvedAnnotation};
use crate::declaration::{BindingAnnotation, ReturnSpec};
use crate::diagnostics::{ErrorCode, FatalDiagnosticError};
use crate::schema::BindingRole;
use crate::transform::context::GenerationContext;
use crate::transform::descriptor::{DescriptorFragment, RETURN_BINDING_NAME};
use azfunc_compiler::output::output_ast::{self as o, Expression, Statement};
use azfunc_compiler::parse_util::ParseSourceSpan;

/// Kind bound to an unannotated, non-nil return value.
pub const IMPLICIT_RETURN_KIND: &str = "httpOutput";

/// Publishes a function's return value through an output binding.
#[derive(Debug, Clone)]
pub struct ReturnHandler<'d> {
    spec: &'d ReturnSpec,
    annotation: ResolvedAnnotation,
    setter: &'static str,
    implicit: bool,
}

impl<'d> ReturnHandler<'d> {
    /// Selects the handler for `spec`. A nil return without annotation has
    /// none.
    pub fn resolve(spec: &'d ReturnSpec) -> Result<Option<Self>, FatalDiagnosticError> {
        let (annotation, implicit) = match &spec.annotation {
            Some(annotation) => (annotations::resolve_annotation(annotation)?, false),
            None if spec.declared_type.is_nil() => return Ok(None),
            None => {
                let mut implicit = BindingAnnotation::new(IMPLICIT_RETURN_KIND);
                implicit.span = spec.span.clone();
                (annotations::resolve_annotation(&implicit)?, true)
            }
        };

        if annotation.entry.role != BindingRole::Output {
            return Err(FatalDiagnosticError::new(
                ErrorCode::UnsupportedReturnAnnotation,
                spec.span.clone().or_else(|| annotation.span.clone()),
                format!("`{}` cannot bind a return value", annotation.kind()),
            ));
        }

        let ty = &spec.declared_type;
        let setter = annotation
            .entry
            .accepts(ty)
            .then(|| runtime::output_setter(ty, annotation.entry.named_type))
            .flatten()
            .ok_or_else(|| {
                FatalDiagnosticError::new(
                    ErrorCode::UnsupportedReturnAnnotation,
                    spec.span.clone().or_else(|| annotation.span.clone()),
                    format!(
                        "`{}` cannot carry a return value of type `{}` (expected one of: {})",
                        annotation.kind(),
                        ty,
                        annotation.entry.accepted_types()
                    ),
                )
            })?;

        Ok(Some(ReturnHandler {
            spec,
            annotation,
            setter,
            implicit,
        }))
    }

    pub fn annotation(&self) -> &ResolvedAnnotation {
        &self.annotation
    }

    /// Whether the binding was inferred rather than annotated.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn setter(&self) -> &'static str {
        self.setter
    }

    pub fn span(&self) -> Option<ParseSourceSpan> {
        self.spec.span.clone().or_else(|| self.annotation.span.clone())
    }

    /// Binds the result of `user_call` to a fresh variable. Returns the
    /// declaration, which belongs to the user body, and a read of the
    /// variable.
    pub fn invocation_process(
        &self,
        ctx: &mut GenerationContext<'_>,
        user_call: Box<Expression>,
    ) -> (Statement, Box<Expression>) {
        let name = ctx.next_name();
        let decl = o::declare_var(name.as_str(), Some(user_call))
            .with_source_span(self.spec.span.clone());
        (decl, o::variable(name))
    }

    /// Appends the setter for the evaluated return value. Runs after every
    /// parameter's post-call statement.
    pub fn post_invocation_process(&self, ctx: &mut GenerationContext<'_>, value: &Expression) {
        let call = ctx.runtime_call(
            self.setter,
            vec![
                *ctx.handle(),
                *o::literal(RETURN_BINDING_NAME),
                value.clone(),
            ],
        );
        ctx.assembler
            .append(call.to_stmt().with_source_span(self.spec.span.clone()));
    }

    pub fn generate_binding(&self) -> Option<DescriptorFragment> {
        DescriptorFragment::for_binding(
            &self.annotation,
            &self.spec.declared_type,
            RETURN_BINDING_NAME,
        )
    }
}
