//! Function declarations as handed over by the annotation extractor.
//!
//! These types are immutable input to generation. They deserialize from the
//! JSON the extractor produces, one object per annotated function.

use azfunc_compiler::parse_util::ParseSourceSpan;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind name of the function-level marker annotation.
pub const FUNCTION_MARKER: &str = "function";

/// The declared type of a parameter or return value, reduced to the shapes
/// binding generation cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "camelCase")]
pub enum DeclaredType {
    String,
    Json,
    Bytes,
    Int,
    Float,
    Boolean,
    Nil,
    /// A type exported by the runtime support library, e.g. `HttpRequest`.
    Named(String),
    /// A user-declared record type.
    Record(String),
    Array(Box<DeclaredType>),
    Tuple(Vec<DeclaredType>),
}

impl DeclaredType {
    pub fn named(name: impl Into<String>) -> Self {
        DeclaredType::Named(name.into())
    }

    pub fn record(name: impl Into<String>) -> Self {
        DeclaredType::Record(name.into())
    }

    pub fn array_of(element: DeclaredType) -> Self {
        DeclaredType::Array(Box::new(element))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, DeclaredType::Nil)
    }

    pub fn is_record_array(&self) -> bool {
        matches!(self, DeclaredType::Array(elem) if matches!(elem.as_ref(), DeclaredType::Record(_)))
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::String => write!(f, "string"),
            DeclaredType::Json => write!(f, "json"),
            DeclaredType::Bytes => write!(f, "byte[]"),
            DeclaredType::Int => write!(f, "int"),
            DeclaredType::Float => write!(f, "float"),
            DeclaredType::Boolean => write!(f, "boolean"),
            DeclaredType::Nil => write!(f, "()"),
            DeclaredType::Named(name) | DeclaredType::Record(name) => write!(f, "{}", name),
            DeclaredType::Array(elem) => write!(f, "{}[]", elem),
            DeclaredType::Tuple(elems) => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A literal value inside an annotation's key/value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AnnotationValue::Bool(b) => serde_json::Value::Bool(*b),
            AnnotationValue::Int(n) => serde_json::Value::from(*n),
            AnnotationValue::String(s) => serde_json::Value::String(s.clone()),
            AnnotationValue::List(items) => {
                serde_json::Value::Array(items.iter().map(AnnotationValue::to_json).collect())
            }
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        AnnotationValue::String(s.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(s: String) -> Self {
        AnnotationValue::String(s)
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        AnnotationValue::Bool(b)
    }
}

impl From<i64> for AnnotationValue {
    fn from(n: i64) -> Self {
        AnnotationValue::Int(n)
    }
}

impl From<Vec<&str>> for AnnotationValue {
    fn from(items: Vec<&str>) -> Self {
        AnnotationValue::List(items.into_iter().map(AnnotationValue::from).collect())
    }
}

/// A binding annotation: a kind name plus its ordered key/value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingAnnotation {
    pub kind: String,
    #[serde(default)]
    pub values: IndexMap<String, AnnotationValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<ParseSourceSpan>,
}

impl BindingAnnotation {
    pub fn new(kind: impl Into<String>) -> Self {
        BindingAnnotation {
            kind: kind.into(),
            values: IndexMap::new(),
            span: None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_span(mut self, span: ParseSourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterRole {
    #[default]
    Normal,
    /// The parameter receives the invocation context object.
    Context,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    #[serde(default)]
    pub role: ParameterRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<BindingAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<ParseSourceSpan>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        ParameterSpec {
            name: name.into(),
            declared_type,
            role: ParameterRole::Normal,
            annotation: None,
            span: None,
        }
    }

    pub fn context(name: impl Into<String>) -> Self {
        ParameterSpec {
            role: ParameterRole::Context,
            ..ParameterSpec::new(name, DeclaredType::named("Context"))
        }
    }

    pub fn annotated(mut self, annotation: BindingAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_span(mut self, span: ParseSourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSpec {
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<BindingAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<ParseSourceSpan>,
}

impl ReturnSpec {
    pub fn new(declared_type: DeclaredType) -> Self {
        ReturnSpec {
            declared_type,
            annotation: None,
            span: None,
        }
    }

    pub fn annotated(mut self, annotation: BindingAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }
}

/// The part of a declaration a diagnostic is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationPart {
    Function,
    /// Index into `FunctionDeclaration::params`.
    Parameter(usize),
    Return,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    /// Function-level marker annotation; only marked functions are generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<BindingAnnotation>,
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
    #[serde(default, rename = "returns", skip_serializing_if = "Option::is_none")]
    pub return_spec: Option<ReturnSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<ParseSourceSpan>,
}

impl FunctionDeclaration {
    /// A marked function with no parameters and no return value.
    pub fn new(name: impl Into<String>) -> Self {
        FunctionDeclaration {
            name: name.into(),
            marker: Some(BindingAnnotation::new(FUNCTION_MARKER)),
            params: Vec::new(),
            return_spec: None,
            span: None,
        }
    }

    pub fn with_param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn returning(mut self, return_spec: ReturnSpec) -> Self {
        self.return_spec = Some(return_spec);
        self
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    /// The host-visible function name: the marker's `name` key, else the
    /// declared name.
    pub fn host_name(&self) -> &str {
        self.marker
            .as_ref()
            .and_then(|m| m.values.get("name"))
            .and_then(AnnotationValue::as_str)
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_nested_types() {
        let ty = DeclaredType::Tuple(vec![
            DeclaredType::Bytes,
            DeclaredType::array_of(DeclaredType::record("Order")),
        ]);
        assert_eq!(ty.to_string(), "[byte[], Order[]]");
    }

    #[test]
    fn should_detect_record_arrays() {
        assert!(DeclaredType::array_of(DeclaredType::record("Order")).is_record_array());
        assert!(!DeclaredType::array_of(DeclaredType::String).is_record_array());
    }

    #[test]
    fn should_prefer_marker_name_for_host_name() {
        let mut decl = FunctionDeclaration::new("onOrder");
        assert_eq!(decl.host_name(), "onOrder");
        decl.marker = Some(BindingAnnotation::new(FUNCTION_MARKER).with("name", "orders"));
        assert_eq!(decl.host_name(), "orders");
    }

    #[test]
    fn should_deserialize_extractor_output() {
        let decl: FunctionDeclaration = serde_json::from_value(serde_json::json!({
            "name": "onMessage",
            "marker": { "kind": "function" },
            "params": [{
                "name": "msg",
                "type": { "kind": "string" },
                "annotation": {
                    "kind": "queueTrigger",
                    "values": { "queueName": "orders" },
                    "span": {
                        "start": { "file": "main.bal", "line": 4, "col": 5 },
                        "end": { "file": "main.bal", "line": 4, "col": 40 }
                    }
                }
            }],
            "returns": { "type": { "kind": "array", "of": { "kind": "record", "of": "Order" } } }
        }))
        .expect("valid declaration");

        assert!(decl.is_marked());
        assert_eq!(decl.params[0].declared_type, DeclaredType::String);
        assert_eq!(decl.params[0].role, ParameterRole::Normal);
        let ann = decl.params[0].annotation.as_ref().expect("annotation");
        assert_eq!(ann.values.get("queueName"), Some(&AnnotationValue::from("orders")));
        assert!(decl.return_spec.expect("returns").declared_type.is_record_array());
    }
}
