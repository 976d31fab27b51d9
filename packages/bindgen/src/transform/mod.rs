pub mod compilation;
pub mod context;
pub mod descriptor;

pub use compilation::{
    compile_function, compile_module, generate_function, FunctionArtifact, FunctionOutcome,
    ModuleOutcome,
};
pub use context::{CodeAssembler, GenerationContext};
pub use descriptor::{
    DescriptorAssembler, DescriptorFragment, FunctionDescriptor, RETURN_BINDING_NAME,
};
