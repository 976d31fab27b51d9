//! Binding generation for serverless functions.
//!
//! Takes function declarations whose parameters and return values carry
//! binding annotations and produces, per function, a wrapper handler that
//! marshals values through the runtime support library and the JSON binding
//! descriptor the function host reads.

pub mod annotations;
pub mod config;
pub mod declaration;
pub mod diagnostics;
pub mod handlers;
pub mod schema;
pub mod transform;
pub mod validation;

pub use config::GeneratorOptions;
pub use declaration::{
    AnnotationValue, BindingAnnotation, DeclarationPart, DeclaredType, FunctionDeclaration,
    ParameterRole, ParameterSpec, ReturnSpec,
};
pub use diagnostics::{Diagnostic, DiagnosticCategory, ErrorCode, FatalDiagnosticError};
pub use transform::{
    compile_function, compile_module, generate_function, FunctionArtifact, FunctionDescriptor,
    FunctionOutcome, ModuleOutcome,
};
pub use validation::{validate_function, validate_parts, Finding};
