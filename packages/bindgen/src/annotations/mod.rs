pub mod extractor;

pub use extractor::{resolve_against, resolve_annotation, ResolvedAnnotation};
