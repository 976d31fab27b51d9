//! Descriptor fragments and their assembly into a function descriptor.

use crate::annotations::ResolvedAnnotation;
use crate::declaration::DeclaredType;
use crate::diagnostics::{ErrorCode, FatalDiagnosticError};
use crate::schema::DataTypePolicy;
use azfunc_compiler::parse_util::ParseSourceSpan;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Descriptor name of a binding attached to the return value.
pub const RETURN_BINDING_NAME: &str = "$return";

/// One binding object of the descriptor. Field order is `type`, the
/// kind-specific keys, `dataType`, `direction`, `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DescriptorFragment(Map<String, Value>);

impl DescriptorFragment {
    /// Builds the fragment for `annotation` bound under `name`. Returns `None`
    /// for kinds without a host-visible binding.
    pub fn for_binding(
        annotation: &ResolvedAnnotation,
        declared_type: &DeclaredType,
        name: &str,
    ) -> Option<Self> {
        let entry = annotation.entry;
        let (binding_type, direction) = (entry.descriptor_type?, entry.direction?);

        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::from(binding_type));
        for (key, value) in &annotation.values {
            fields.insert(key.to_string(), value.to_json());
        }
        match entry.data_type {
            DataTypePolicy::Absent => {}
            DataTypePolicy::Derived => {
                let data_type = match declared_type {
                    DeclaredType::Bytes => "binary",
                    _ => "string",
                };
                fields.insert("dataType".to_string(), Value::from(data_type));
            }
            DataTypePolicy::Forced(data_type) => {
                fields.insert("dataType".to_string(), Value::from(data_type));
            }
        }
        fields.insert("direction".to_string(), Value::from(direction.as_str()));
        fields.insert("name".to_string(), Value::from(name));
        Some(DescriptorFragment(fields))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn binding_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// The descriptor of one function: its bindings in parameter order, the
/// return binding last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDescriptor {
    pub bindings: Vec<DescriptorFragment>,
}

impl FunctionDescriptor {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "bindings": self.bindings.iter().map(DescriptorFragment::to_json).collect::<Vec<_>>()
        })
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Default)]
pub struct DescriptorAssembler {
    fragments: Vec<(DescriptorFragment, Option<ParseSourceSpan>)>,
}

impl DescriptorAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fragment(&mut self, fragment: DescriptorFragment, span: Option<ParseSourceSpan>) {
        tracing::trace!(name = ?fragment.name(), binding_type = ?fragment.binding_type(), "descriptor fragment");
        self.fragments.push((fragment, span));
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Finishes the descriptor. Fails if two fragments share a name.
    pub fn build(self) -> Result<FunctionDescriptor, FatalDiagnosticError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, (fragment, span)) in self.fragments.iter().enumerate() {
            let Some(name) = fragment.name() else { continue };
            if let Some(first) = seen.insert(name, index) {
                return Err(FatalDiagnosticError::new(
                    ErrorCode::DuplicateBindingName,
                    span.clone(),
                    format!(
                        "bindings #{} and #{} are both named `{}`",
                        first + 1,
                        index + 1,
                        name
                    ),
                ));
            }
        }
        Ok(FunctionDescriptor {
            bindings: self.fragments.into_iter().map(|(f, _)| f).collect(),
        })
    }
}
