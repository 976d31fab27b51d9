//! Binding Schema
//!
//! The static registry of binding kinds and their annotation key schemas.

pub mod registry;

pub use registry::{
    entries, lookup, BindingRole, DataTypePolicy, DefaultValue, Direction, KeyRequirement,
    KeySpec, KeyType, NamedType, SchemaEntry, TypeSet,
};
