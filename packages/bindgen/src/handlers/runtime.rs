//! Names exported by the runtime support library.
//!
//! Generated code calls these by name only; they must stay in sync with the
//! library's exports.

use crate::declaration::DeclaredType;
use crate::schema::NamedType;

pub const GET_STRING_FROM_INPUT_DATA: &str = "getStringFromInputData";
pub const GET_JSON_FROM_INPUT_DATA: &str = "getJsonFromInputData";
pub const GET_BYTES_FROM_INPUT_DATA: &str = "getBytesFromInputData";
pub const GET_RECORD_FROM_INPUT_DATA: &str = "getRecordFromInputData";
pub const GET_HTTP_REQUEST_FROM_INPUT_DATA: &str = "getHttpRequestFromInputData";
pub const GET_STRING_FROM_HTTP_BODY: &str = "getStringFromHttpBody";
pub const GET_JSON_FROM_HTTP_BODY: &str = "getJsonFromHttpBody";
pub const GET_STRING_FROM_METADATA: &str = "getStringFromMetadata";
pub const GET_JSON_FROM_METADATA: &str = "getJsonFromMetadata";
pub const CREATE_CONTEXT: &str = "createContext";
pub const NEW_OUTPUT_BINDING: &str = "newOutputBinding";

pub const SET_STRING_OUTPUT: &str = "setStringOutput";
pub const SET_JSON_OUTPUT: &str = "setJsonOutput";
pub const SET_BYTES_OUTPUT: &str = "setBytesOutput";
pub const SET_HTTP_OUTPUT: &str = "setHttpOutput";
pub const SET_VALUE_AS_JSON_OUTPUT: &str = "setValueAsJsonOutput";

/// Every name above, for collision checks against unqualified calls.
pub const EXPORTS: &[&str] = &[
    GET_STRING_FROM_INPUT_DATA,
    GET_JSON_FROM_INPUT_DATA,
    GET_BYTES_FROM_INPUT_DATA,
    GET_RECORD_FROM_INPUT_DATA,
    GET_HTTP_REQUEST_FROM_INPUT_DATA,
    GET_STRING_FROM_HTTP_BODY,
    GET_JSON_FROM_HTTP_BODY,
    GET_STRING_FROM_METADATA,
    GET_JSON_FROM_METADATA,
    CREATE_CONTEXT,
    NEW_OUTPUT_BINDING,
    SET_STRING_OUTPUT,
    SET_JSON_OUTPUT,
    SET_BYTES_OUTPUT,
    SET_HTTP_OUTPUT,
    SET_VALUE_AS_JSON_OUTPUT,
];

pub fn is_export(name: &str) -> bool {
    EXPORTS.contains(&name)
}

/// Accessor reading a trigger or input binding of type `ty`.
///
/// `named` is the binding kind's pass-through type; its own runtime function
/// reads it.
pub fn input_accessor(
    ty: &DeclaredType,
    http_body: bool,
    named: Option<NamedType>,
) -> Option<&'static str> {
    match ty {
        DeclaredType::String if http_body => Some(GET_STRING_FROM_HTTP_BODY),
        DeclaredType::Json if http_body => Some(GET_JSON_FROM_HTTP_BODY),
        DeclaredType::String => Some(GET_STRING_FROM_INPUT_DATA),
        DeclaredType::Json => Some(GET_JSON_FROM_INPUT_DATA),
        DeclaredType::Bytes => Some(GET_BYTES_FROM_INPUT_DATA),
        DeclaredType::Named(name) => pass_through(name, named),
        DeclaredType::Record(_) => Some(GET_RECORD_FROM_INPUT_DATA),
        _ if ty.is_record_array() => Some(GET_RECORD_FROM_INPUT_DATA),
        _ => None,
    }
}

/// Accessor reading trigger metadata of type `ty`.
pub fn metadata_accessor(ty: &DeclaredType) -> Option<&'static str> {
    match ty {
        DeclaredType::String => Some(GET_STRING_FROM_METADATA),
        DeclaredType::Json => Some(GET_JSON_FROM_METADATA),
        _ => None,
    }
}

/// Setter publishing an output value of type `ty`.
///
/// `named` is the binding kind's pass-through type, which has a dedicated
/// setter.
pub fn output_setter(ty: &DeclaredType, named: Option<NamedType>) -> Option<&'static str> {
    match ty {
        DeclaredType::String => Some(SET_STRING_OUTPUT),
        DeclaredType::Json => Some(SET_JSON_OUTPUT),
        DeclaredType::Bytes => Some(SET_BYTES_OUTPUT),
        DeclaredType::Named(name) => pass_through(name, named),
        DeclaredType::Record(_) => Some(SET_VALUE_AS_JSON_OUTPUT),
        _ if ty.is_record_array() => Some(SET_VALUE_AS_JSON_OUTPUT),
        _ => None,
    }
}

fn pass_through(name: &str, named: Option<NamedType>) -> Option<&'static str> {
    named.filter(|n| n.name == name).map(|n| n.runtime_fn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::{self, HTTP_BINDING_TYPE, HTTP_REQUEST_TYPE};

    fn named_type(kind: &str) -> Option<NamedType> {
        registry::lookup(kind).and_then(|e| e.named_type)
    }

    #[test]
    fn should_pick_http_body_accessors() {
        assert_eq!(
            input_accessor(&DeclaredType::String, true, None),
            Some(GET_STRING_FROM_HTTP_BODY)
        );
        assert_eq!(
            input_accessor(&DeclaredType::String, false, None),
            Some(GET_STRING_FROM_INPUT_DATA)
        );
    }

    #[test]
    fn should_read_pass_through_type_with_its_own_accessor() {
        let request = DeclaredType::named(HTTP_REQUEST_TYPE);
        assert_eq!(
            input_accessor(&request, true, named_type("httpTrigger")),
            Some(GET_HTTP_REQUEST_FROM_INPUT_DATA)
        );
        assert_eq!(input_accessor(&request, false, None), None);
    }

    #[test]
    fn should_use_generic_json_setter_for_records() {
        let orders = DeclaredType::array_of(DeclaredType::record("Order"));
        assert_eq!(output_setter(&orders, None), Some(SET_VALUE_AS_JSON_OUTPUT));
        assert_eq!(
            output_setter(&DeclaredType::record("Order"), None),
            Some(SET_VALUE_AS_JSON_OUTPUT)
        );
    }

    #[test]
    fn should_only_use_pass_through_setter_for_own_type() {
        let binding = DeclaredType::named(HTTP_BINDING_TYPE);
        assert_eq!(
            output_setter(&binding, named_type("httpOutput")),
            Some(SET_HTTP_OUTPUT)
        );
        assert_eq!(output_setter(&binding, named_type("httpTrigger")), None);
        assert_eq!(output_setter(&binding, None), None);
        assert_eq!(output_setter(&DeclaredType::Boolean, None), None);
    }

    #[test]
    fn should_list_every_export() {
        assert!(is_export(CREATE_CONTEXT));
        assert!(is_export(SET_VALUE_AS_JSON_OUTPUT));
        assert!(!is_export("onOrder"));
    }
}
