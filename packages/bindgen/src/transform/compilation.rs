// Compilation - generation of handlers and descriptors for annotated functions
//
// Each function is generated on its own GenerationContext. A fatal diagnostic
// aborts that function only; the validation pass runs regardless and its
// findings about the other parts are attached to the same outcome.

use rayon::prelude::*;

use crate::config::GeneratorOptions;
use crate::declaration::{DeclarationPart, FunctionDeclaration};
use crate::diagnostics::{Diagnostic, ErrorCode, FatalDiagnosticError};
use crate::handlers::{self, runtime};
use crate::transform::context::GenerationContext;
use crate::transform::descriptor::{DescriptorAssembler, FunctionDescriptor};
use crate::validation;
use azfunc_compiler::output::abstract_emitter::emit_statements;
use azfunc_compiler::output::output_ast::{self as o, FnParam, Statement};

// ============================================================================
// Artifacts
// ============================================================================

/// Everything generated for one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArtifact {
    /// Name of the generated wrapper.
    pub handler_name: String,
    /// The wrapper declaration.
    pub handler: Statement,
    /// The wrapper rendered as source text.
    pub source: String,
    pub descriptor: FunctionDescriptor,
}

/// Result of compiling one function.
#[derive(Debug, Clone)]
pub struct FunctionOutcome {
    /// Host-visible function name.
    pub function_name: String,
    /// `None` when generation failed.
    pub artifact: Option<FunctionArtifact>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FunctionOutcome {
    pub fn is_success(&self) -> bool {
        self.artifact.is_some() && !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleOutcome {
    /// One outcome per marked function, in declaration order.
    pub functions: Vec<FunctionOutcome>,
}

impl ModuleOutcome {
    pub fn is_success(&self) -> bool {
        self.functions.iter().all(FunctionOutcome::is_success)
    }

    pub fn get(&self, function_name: &str) -> Option<&FunctionOutcome> {
        self.functions
            .iter()
            .find(|f| f.function_name == function_name)
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.functions.iter().flat_map(|f| f.diagnostics.iter())
    }

    /// Descriptors of the successful functions, keyed by host name.
    pub fn descriptors(&self) -> Vec<(&str, serde_json::Value)> {
        self.functions
            .iter()
            .filter(|f| f.is_success())
            .filter_map(|f| {
                let artifact = f.artifact.as_ref()?;
                Some((f.function_name.as_str(), artifact.descriptor.to_json()))
            })
            .collect()
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generates the wrapper handler and descriptor of `decl`.
pub fn generate_function(
    decl: &FunctionDeclaration,
    options: &GeneratorOptions,
) -> Result<FunctionArtifact, FatalDiagnosticError> {
    generate_parts(decl, options).map_err(|(_, err)| err)
}

/// Like `generate_function`, but also names the part of the declaration that
/// caused a failure.
#[tracing::instrument(level = "debug", skip_all, fields(function = %decl.name))]
fn generate_parts(
    decl: &FunctionDeclaration,
    options: &GeneratorOptions,
) -> Result<FunctionArtifact, (DeclarationPart, FatalDiagnosticError)> {
    check_function_name(decl, options).map_err(|err| (DeclarationPart::Function, err))?;
    let handler_name = format!("{}{}", decl.name, options.handler_suffix);

    // Resolve every handler before emitting anything.
    let param_handlers = decl
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            handlers::resolve_parameter(param).map_err(|err| (DeclarationPart::Parameter(i), err))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let return_handler = match &decl.return_spec {
        Some(spec) => {
            handlers::resolve_return(spec).map_err(|err| (DeclarationPart::Return, err))?
        }
        None => None,
    };

    let reserved = decl
        .params
        .iter()
        .map(|p| p.name.as_str())
        .chain([decl.name.as_str(), handler_name.as_str()]);
    let mut ctx = GenerationContext::new(options, reserved);
    let mut descriptor = DescriptorAssembler::new();

    let mut captured = Vec::with_capacity(param_handlers.len());
    for (i, handler) in param_handlers.iter().enumerate() {
        let init = handler
            .invocation_process(&ctx)
            .map_err(|err| (DeclarationPart::Parameter(i), err))?;
        captured.push(ctx.declare_synthetic(init));
        if let Some(fragment) = handler.generate_binding() {
            descriptor.add_fragment(fragment, handler.span());
        }
    }

    let user_call = o::variable(decl.name.as_str())
        .call_fn(captured.iter().map(|name| *o::variable(name.as_str())).collect());
    let (user_body, return_value) = match &return_handler {
        Some(handler) => {
            let (stmt, value) = handler.invocation_process(&mut ctx, user_call);
            (vec![stmt], Some(value))
        }
        None => (vec![user_call.to_stmt()], None),
    };

    for (i, (handler, var)) in param_handlers.iter().zip(&captured).enumerate() {
        handler
            .post_invocation_process(&mut ctx, var)
            .map_err(|err| (DeclarationPart::Parameter(i), err))?;
    }
    if let (Some(handler), Some(value)) = (&return_handler, &return_value) {
        handler.post_invocation_process(&mut ctx, value);
        if let Some(fragment) = handler.generate_binding() {
            descriptor.add_fragment(fragment, handler.span());
        }
    }

    let descriptor = descriptor
        .build()
        .map_err(|err| (DeclarationPart::Function, err))?;
    let body = std::mem::take(&mut ctx.assembler).assemble(user_body);
    let handler = o::declare_fn(
        handler_name.as_str(),
        vec![FnParam {
            name: options.invocation_handle.clone(),
        }],
        body,
    )
    .with_source_span(decl.span.clone());
    let source = emit_statements(std::slice::from_ref(&handler), options.indent);

    tracing::debug!(
        handler = %handler_name,
        bindings = descriptor.bindings.len(),
        "generated function"
    );
    Ok(FunctionArtifact {
        handler_name,
        handler,
        source,
        descriptor,
    })
}

/// The wrapper calls the user function by its bare name, so that name must
/// not be shadowed by the wrapper's parameter or by an unqualified runtime
/// function.
fn check_function_name(
    decl: &FunctionDeclaration,
    options: &GeneratorOptions,
) -> Result<(), FatalDiagnosticError> {
    let shadowed_by = if decl.name == options.invocation_handle {
        "the invocation handle"
    } else if options.runtime_module().is_none() && runtime::is_export(&decl.name) {
        "a runtime function"
    } else {
        return Ok(());
    };
    Err(FatalDiagnosticError::new(
        ErrorCode::ReservedFunctionName,
        decl.span.clone(),
        format!(
            "function `{}` would be shadowed by {} in its generated handler",
            decl.name, shadowed_by
        ),
    ))
}

/// Generates and validates one function. Never fails; problems are reported
/// as diagnostics on the outcome.
///
/// A failed parameter or return value is reported once: validator findings
/// about the same part are dropped.
pub fn compile_function(decl: &FunctionDeclaration, options: &GeneratorOptions) -> FunctionOutcome {
    let mut diagnostics = Vec::new();
    let (artifact, failed) = match generate_parts(decl, options) {
        Ok(artifact) => (Some(artifact), None),
        Err((part, err)) => {
            tracing::warn!(function = %decl.name, error = %err, "generation failed");
            diagnostics.push(Diagnostic::from(err));
            (None, Some(part).filter(|p| *p != DeclarationPart::Function))
        }
    };
    diagnostics.extend(
        validation::validate_parts(decl)
            .into_iter()
            .filter(|finding| Some(finding.part) != failed)
            .map(|finding| finding.diagnostic),
    );

    FunctionOutcome {
        function_name: decl.host_name().to_string(),
        artifact,
        diagnostics,
    }
}

/// Compiles every marked function of a module. Unmarked functions are
/// skipped. Outcomes keep declaration order whether or not the batch runs in
/// parallel.
#[tracing::instrument(skip_all, fields(declarations = decls.len()))]
pub fn compile_module(decls: &[FunctionDeclaration], options: &GeneratorOptions) -> ModuleOutcome {
    let marked: Vec<&FunctionDeclaration> = decls.iter().filter(|d| d.is_marked()).collect();
    tracing::info!(
        functions = marked.len(),
        skipped = decls.len() - marked.len(),
        parallel = options.parallel,
        "compiling module"
    );

    let functions: Vec<FunctionOutcome> = if options.parallel {
        marked
            .par_iter()
            .map(|decl| compile_function(decl, options))
            .collect()
    } else {
        marked
            .iter()
            .map(|decl| compile_function(decl, options))
            .collect()
    };
    ModuleOutcome { functions }
}
