//! Annotation Extractor
//!
//! Resolves a raw annotation key/value map against its registry entry before
//! any handler sees it: unknown keys and mistyped values are rejected,
//! required keys are enforced and defaults are filled in.

use crate::declaration::{AnnotationValue, BindingAnnotation};
use crate::diagnostics::{ErrorCode, FatalDiagnosticError};
use crate::schema::{self, DefaultValue, KeyRequirement, KeyType, SchemaEntry};
use azfunc_compiler::parse_util::ParseSourceSpan;
use indexmap::IndexMap;

/// An annotation whose values conform to its schema entry.
///
/// `values` holds every key that is present after defaulting, in registry
/// order, so descriptor fields come out in a fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnnotation {
    pub entry: &'static SchemaEntry,
    pub values: IndexMap<&'static str, AnnotationValue>,
    pub span: Option<ParseSourceSpan>,
}

impl ResolvedAnnotation {
    pub fn kind(&self) -> &'static str {
        self.entry.kind
    }

    pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnnotationValue::as_str)
    }
}

/// Resolves `annotation` against the registry.
pub fn resolve_annotation(
    annotation: &BindingAnnotation,
) -> Result<ResolvedAnnotation, FatalDiagnosticError> {
    let entry = schema::lookup(&annotation.kind).ok_or_else(|| {
        FatalDiagnosticError::new(
            ErrorCode::UnknownBindingKind,
            annotation.span.clone(),
            format!("unknown binding annotation `{}`", annotation.kind),
        )
    })?;
    resolve_against(entry, annotation)
}

/// Resolves `annotation` against an already selected entry.
pub fn resolve_against(
    entry: &'static SchemaEntry,
    annotation: &BindingAnnotation,
) -> Result<ResolvedAnnotation, FatalDiagnosticError> {
    for (key, value) in &annotation.values {
        let spec = entry.key(key).ok_or_else(|| {
            FatalDiagnosticError::new(
                ErrorCode::UnknownAnnotationKey,
                annotation.span.clone(),
                format!("`{}` has no key named `{}`", entry.kind, key),
            )
        })?;
        if !value_matches(spec.ty, value) {
            return Err(FatalDiagnosticError::new(
                ErrorCode::InvalidAnnotationValue,
                annotation.span.clone(),
                format!(
                    "`{}.{}` expects a {} value",
                    entry.kind, spec.name, spec.ty
                ),
            ));
        }
    }

    let mut values = IndexMap::new();
    for spec in entry.keys {
        match (annotation.values.get(spec.name), spec.requirement) {
            (Some(value), _) => {
                values.insert(spec.name, value.clone());
            }
            (None, KeyRequirement::Default(default)) => {
                values.insert(spec.name, default_value(default));
            }
            (None, KeyRequirement::Optional) => {}
            (None, KeyRequirement::Required) => {
                return Err(FatalDiagnosticError::new(
                    ErrorCode::MissingRequiredKey,
                    annotation.span.clone(),
                    format!("`{}` requires the `{}` key", entry.kind, spec.name),
                ));
            }
        }
    }

    Ok(ResolvedAnnotation {
        entry,
        values,
        span: annotation.span.clone(),
    })
}

fn value_matches(ty: KeyType, value: &AnnotationValue) -> bool {
    match (ty, value) {
        (KeyType::String, AnnotationValue::String(_)) => true,
        (KeyType::Bool, AnnotationValue::Bool(_)) => true,
        (KeyType::Int, AnnotationValue::Int(_)) => true,
        (KeyType::StringList, AnnotationValue::List(items)) => {
            items.iter().all(|item| matches!(item, AnnotationValue::String(_)))
        }
        _ => false,
    }
}

fn default_value(default: DefaultValue) -> AnnotationValue {
    match default {
        DefaultValue::Str(s) => AnnotationValue::String(s.to_string()),
        DefaultValue::Bool(b) => AnnotationValue::Bool(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_defaults_in_registry_order() {
        let ann = BindingAnnotation::new("queueTrigger").with("queueName", "orders");
        let resolved = resolve_annotation(&ann).expect("resolves");
        let keys: Vec<_> = resolved.values.keys().copied().collect();
        assert_eq!(keys, vec!["queueName", "connection"]);
        assert_eq!(resolved.get_str("connection"), Some("AzureWebJobsStorage"));
    }

    #[test]
    fn should_keep_explicit_values_over_defaults() {
        let ann = BindingAnnotation::new("timerTrigger")
            .with("schedule", "*/10 * * * * *")
            .with("runOnStartup", false);
        let resolved = resolve_annotation(&ann).expect("resolves");
        assert_eq!(resolved.get("runOnStartup"), Some(&AnnotationValue::Bool(false)));
    }

    #[test]
    fn should_reject_unknown_kind() {
        let err = resolve_annotation(&BindingAnnotation::new("serviceBusTrigger")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownBindingKind);
        assert!(err.message.contains("serviceBusTrigger"));
    }

    #[test]
    fn should_reject_missing_required_key() {
        let err = resolve_annotation(&BindingAnnotation::new("blobOutput")).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredKey);
        assert!(err.message.contains("`path`"));
    }

    #[test]
    fn should_reject_unknown_key() {
        let ann = BindingAnnotation::new("queueOutput")
            .with("queueName", "out")
            .with("queue", "oops");
        let err = resolve_annotation(&ann).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownAnnotationKey);
    }

    #[test]
    fn should_reject_mistyped_value() {
        let ann = BindingAnnotation::new("timerTrigger")
            .with("schedule", "0 * * * * *")
            .with("runOnStartup", "yes");
        let err = resolve_annotation(&ann).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAnnotationValue);
    }

    #[test]
    fn should_accept_string_lists() {
        let ann = BindingAnnotation::new("httpTrigger").with("methods", vec!["GET", "POST"]);
        let resolved = resolve_annotation(&ann).expect("resolves");
        assert_eq!(
            resolved.get("methods").map(AnnotationValue::to_json),
            Some(serde_json::json!(["GET", "POST"]))
        );
    }
}
