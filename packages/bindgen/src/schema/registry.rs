//! Binding Schema Registry
//!
//! The closed table of binding kinds. Each entry declares the descriptor
//! `type`, the direction, the declared types it accepts and its annotation
//! keys with their defaults. This table is the single source of default
//! values; handlers never invent their own.

use crate::declaration::DeclaredType;
use crate::handlers::runtime;
use bitflags::bitflags;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;

/// Default storage connection setting for blob and queue bindings.
pub const DEFAULT_STORAGE_CONNECTION: &str = "AzureWebJobsStorage";
pub const DEFAULT_TWILIO_ACCOUNT_SID_SETTING: &str = "AzureWebJobsTwilioAccountSid";
pub const DEFAULT_TWILIO_AUTH_TOKEN_SETTING: &str = "AzureWebJobsTwilioAuthToken";
pub const DEFAULT_HTTP_AUTH_LEVEL: &str = "anonymous";
pub const DEFAULT_TIMER_RUN_ON_STARTUP: bool = true;
pub const DEFAULT_CREATE_LEASE_COLLECTION: bool = true;

/// Blob output descriptors always declare `string`, whatever the marshaled
/// type. The host mishandles `binary` for blob outputs.
pub const BLOB_OUTPUT_DATA_TYPE: &str = "string";

pub const HTTP_REQUEST_TYPE: &str = "HttpRequest";
pub const HTTP_BINDING_TYPE: &str = "HttpBinding";

bitflags! {
    /// Declared-type shapes a binding kind accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeSet: u8 {
        const STRING = 1 << 0;
        const JSON = 1 << 1;
        const BYTES = 1 << 2;
        const RECORD = 1 << 3;
        const RECORD_ARRAY = 1 << 4;
        /// The entry's `named_type`.
        const NAMED = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which handler variant serves a binding kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingRole {
    Trigger,
    Input,
    Output,
    Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    String,
    Bool,
    Int,
    StringList,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::String => write!(f, "string"),
            KeyType::Bool => write!(f, "boolean"),
            KeyType::Int => write!(f, "int"),
            KeyType::StringList => write!(f, "string[]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyRequirement {
    Required,
    Optional,
    Default(DefaultValue),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySpec {
    /// Annotation key, also the descriptor field name.
    pub name: &'static str,
    pub ty: KeyType,
    pub requirement: KeyRequirement,
}

const fn required(name: &'static str) -> KeySpec {
    KeySpec {
        name,
        ty: KeyType::String,
        requirement: KeyRequirement::Required,
    }
}

const fn optional(name: &'static str, ty: KeyType) -> KeySpec {
    KeySpec {
        name,
        ty,
        requirement: KeyRequirement::Optional,
    }
}

const fn defaulted(name: &'static str, value: DefaultValue) -> KeySpec {
    let ty = match value {
        DefaultValue::Str(_) => KeyType::String,
        DefaultValue::Bool(_) => KeyType::Bool,
    };
    KeySpec {
        name,
        ty,
        requirement: KeyRequirement::Default(value),
    }
}

/// How the descriptor's `dataType` field is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypePolicy {
    /// No `dataType` field.
    Absent,
    /// `binary` for byte sequences, `string` otherwise.
    Derived,
    Forced(&'static str),
}

/// A runtime-library type a binding kind passes through as is, together with
/// the runtime function that reads it (inputs) or publishes it (outputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedType {
    pub name: &'static str,
    pub runtime_fn: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    pub kind: &'static str,
    /// Descriptor `type`; `None` for kinds with no host-visible binding.
    pub descriptor_type: Option<&'static str>,
    pub direction: Option<Direction>,
    pub role: BindingRole,
    pub accepts: TypeSet,
    pub named_type: Option<NamedType>,
    pub keys: &'static [KeySpec],
    pub data_type: DataTypePolicy,
}

impl SchemaEntry {
    pub fn key(&self, name: &str) -> Option<&KeySpec> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn accepts(&self, ty: &DeclaredType) -> bool {
        match ty {
            DeclaredType::String => self.accepts.contains(TypeSet::STRING),
            DeclaredType::Json => self.accepts.contains(TypeSet::JSON),
            DeclaredType::Bytes => self.accepts.contains(TypeSet::BYTES),
            DeclaredType::Record(_) => self.accepts.contains(TypeSet::RECORD),
            DeclaredType::Named(name) => {
                self.accepts.contains(TypeSet::NAMED)
                    && self.named_type.map(|n| n.name) == Some(name.as_str())
            }
            DeclaredType::Array(_) if ty.is_record_array() => {
                self.accepts.contains(TypeSet::RECORD_ARRAY)
            }
            _ => false,
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.role == BindingRole::Trigger
    }

    /// Human-readable list of accepted types, for diagnostics.
    pub fn accepted_types(&self) -> String {
        let mut names = Vec::new();
        if self.accepts.contains(TypeSet::STRING) {
            names.push("string".to_string());
        }
        if self.accepts.contains(TypeSet::JSON) {
            names.push("json".to_string());
        }
        if self.accepts.contains(TypeSet::BYTES) {
            names.push("byte[]".to_string());
        }
        if self.accepts.contains(TypeSet::RECORD) {
            names.push("record".to_string());
        }
        if self.accepts.contains(TypeSet::RECORD_ARRAY) {
            names.push("record[]".to_string());
        }
        if let (true, Some(named)) = (self.accepts.contains(TypeSet::NAMED), self.named_type) {
            names.push(named.name.to_string());
        }
        names.join(", ")
    }
}

const STORAGE_CONNECTION: KeySpec =
    defaulted("connection", DefaultValue::Str(DEFAULT_STORAGE_CONNECTION));

const COSMOS_TARGET: [KeySpec; 3] = [
    required("connectionStringSetting"),
    required("databaseName"),
    required("collectionName"),
];

static HTTP_TRIGGER_KEYS: [KeySpec; 3] = [
    defaulted("authLevel", DefaultValue::Str(DEFAULT_HTTP_AUTH_LEVEL)),
    optional("methods", KeyType::StringList),
    optional("route", KeyType::String),
];
static QUEUE_KEYS: [KeySpec; 2] = [required("queueName"), STORAGE_CONNECTION];
static BLOB_KEYS: [KeySpec; 2] = [required("path"), STORAGE_CONNECTION];
static TIMER_KEYS: [KeySpec; 2] = [
    required("schedule"),
    defaulted("runOnStartup", DefaultValue::Bool(DEFAULT_TIMER_RUN_ON_STARTUP)),
];
static COSMOS_TRIGGER_KEYS: [KeySpec; 12] = [
    COSMOS_TARGET[0],
    COSMOS_TARGET[1],
    COSMOS_TARGET[2],
    optional("leaseConnectionStringSetting", KeyType::String),
    optional("leaseDatabaseName", KeyType::String),
    optional("leaseCollectionName", KeyType::String),
    defaulted(
        "createLeaseCollectionIfNotExists",
        DefaultValue::Bool(DEFAULT_CREATE_LEASE_COLLECTION),
    ),
    optional("leasesCollectionThroughput", KeyType::Int),
    optional("leaseCollectionPrefix", KeyType::String),
    optional("feedPollDelay", KeyType::Int),
    optional("startFromBeginning", KeyType::Bool),
    optional("preferredLocations", KeyType::String),
];
static COSMOS_INPUT_KEYS: [KeySpec; 7] = [
    COSMOS_TARGET[0],
    COSMOS_TARGET[1],
    COSMOS_TARGET[2],
    optional("id", KeyType::String),
    optional("sqlQuery", KeyType::String),
    optional("partitionKey", KeyType::String),
    optional("preferredLocations", KeyType::String),
];
static COSMOS_OUTPUT_KEYS: [KeySpec; 8] = [
    COSMOS_TARGET[0],
    COSMOS_TARGET[1],
    COSMOS_TARGET[2],
    optional("createIfNotExists", KeyType::Bool),
    optional("partitionKey", KeyType::String),
    optional("collectionThroughput", KeyType::Int),
    optional("useMultipleWriteLocations", KeyType::Bool),
    optional("preferredLocations", KeyType::String),
];
static TWILIO_KEYS: [KeySpec; 4] = [
    defaulted(
        "accountSidSetting",
        DefaultValue::Str(DEFAULT_TWILIO_ACCOUNT_SID_SETTING),
    ),
    defaulted(
        "authTokenSetting",
        DefaultValue::Str(DEFAULT_TWILIO_AUTH_TOKEN_SETTING),
    ),
    required("from"),
    optional("to", KeyType::String),
];
static METADATA_KEYS: [KeySpec; 1] = [optional("name", KeyType::String)];

static REGISTRY: Lazy<IndexMap<&'static str, SchemaEntry>> = Lazy::new(|| {
    let mut registry = IndexMap::new();

    // Triggers
    register(
        &mut registry,
        binding("httpTrigger", "httpTrigger", Direction::In, BindingRole::Trigger)
            .accepting(TypeSet::STRING | TypeSet::JSON | TypeSet::NAMED)
            .named(HTTP_REQUEST_TYPE, runtime::GET_HTTP_REQUEST_FROM_INPUT_DATA)
            .keys(&HTTP_TRIGGER_KEYS),
    );
    register(
        &mut registry,
        binding("queueTrigger", "queueTrigger", Direction::In, BindingRole::Trigger)
            .accepting(TypeSet::STRING | TypeSet::JSON)
            .keys(&QUEUE_KEYS),
    );
    register(
        &mut registry,
        binding("blobTrigger", "blobTrigger", Direction::In, BindingRole::Trigger)
            .accepting(TypeSet::STRING | TypeSet::BYTES)
            .keys(&BLOB_KEYS)
            .data_type(DataTypePolicy::Derived),
    );
    register(
        &mut registry,
        binding("timerTrigger", "timerTrigger", Direction::In, BindingRole::Trigger)
            .accepting(TypeSet::JSON)
            .keys(&TIMER_KEYS),
    );
    register(
        &mut registry,
        binding("cosmosDBTrigger", "cosmosDBTrigger", Direction::In, BindingRole::Trigger)
            .accepting(TypeSet::JSON | TypeSet::RECORD_ARRAY)
            .keys(&COSMOS_TRIGGER_KEYS),
    );

    // Inputs
    register(
        &mut registry,
        binding("blobInput", "blob", Direction::In, BindingRole::Input)
            .accepting(TypeSet::STRING | TypeSet::BYTES)
            .keys(&BLOB_KEYS)
            .data_type(DataTypePolicy::Derived),
    );
    register(
        &mut registry,
        binding("cosmosDBInput", "cosmosDB", Direction::In, BindingRole::Input)
            .accepting(TypeSet::JSON | TypeSet::RECORD | TypeSet::RECORD_ARRAY)
            .keys(&COSMOS_INPUT_KEYS),
    );

    // Outputs
    register(
        &mut registry,
        binding("httpOutput", "http", Direction::Out, BindingRole::Output)
            .accepting(TypeSet::STRING | TypeSet::JSON | TypeSet::NAMED)
            .named(HTTP_BINDING_TYPE, runtime::SET_HTTP_OUTPUT),
    );
    register(
        &mut registry,
        binding("queueOutput", "queue", Direction::Out, BindingRole::Output)
            .accepting(TypeSet::STRING | TypeSet::JSON)
            .keys(&QUEUE_KEYS),
    );
    register(
        &mut registry,
        binding("blobOutput", "blob", Direction::Out, BindingRole::Output)
            .accepting(TypeSet::STRING | TypeSet::BYTES)
            .keys(&BLOB_KEYS)
            .data_type(DataTypePolicy::Forced(BLOB_OUTPUT_DATA_TYPE)),
    );
    register(
        &mut registry,
        binding("twilioSmsOutput", "twilioSms", Direction::Out, BindingRole::Output)
            .accepting(TypeSet::STRING | TypeSet::JSON)
            .keys(&TWILIO_KEYS),
    );
    register(
        &mut registry,
        binding("cosmosDBOutput", "cosmosDB", Direction::Out, BindingRole::Output)
            .accepting(TypeSet::JSON | TypeSet::RECORD | TypeSet::RECORD_ARRAY)
            .keys(&COSMOS_OUTPUT_KEYS),
    );

    // Trigger metadata, no host-visible binding
    register(
        &mut registry,
        SchemaEntry {
            kind: "bindingName",
            descriptor_type: None,
            direction: None,
            role: BindingRole::Metadata,
            accepts: TypeSet::STRING | TypeSet::JSON,
            named_type: None,
            keys: &METADATA_KEYS,
            data_type: DataTypePolicy::Absent,
        },
    );

    registry
});

fn binding(
    kind: &'static str,
    descriptor_type: &'static str,
    direction: Direction,
    role: BindingRole,
) -> SchemaEntry {
    SchemaEntry {
        kind,
        descriptor_type: Some(descriptor_type),
        direction: Some(direction),
        role,
        accepts: TypeSet::empty(),
        named_type: None,
        keys: &[],
        data_type: DataTypePolicy::Absent,
    }
}

impl SchemaEntry {
    fn accepting(mut self, accepts: TypeSet) -> Self {
        self.accepts = accepts;
        self
    }

    fn named(mut self, name: &'static str, runtime_fn: &'static str) -> Self {
        self.named_type = Some(NamedType { name, runtime_fn });
        self
    }

    fn keys(mut self, keys: &'static [KeySpec]) -> Self {
        self.keys = keys;
        self
    }

    fn data_type(mut self, policy: DataTypePolicy) -> Self {
        self.data_type = policy;
        self
    }
}

fn register(registry: &mut IndexMap<&'static str, SchemaEntry>, entry: SchemaEntry) {
    registry.insert(entry.kind, entry);
}

/// Looks up a binding kind by its annotation name.
pub fn lookup(kind: &str) -> Option<&'static SchemaEntry> {
    REGISTRY.get(kind)
}

/// All registered kinds, in registration order.
pub fn entries() -> impl Iterator<Item = &'static SchemaEntry> {
    REGISTRY.values()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_register_every_kind_once() {
        assert_eq!(entries().count(), 13);
        for entry in entries() {
            assert_eq!(lookup(entry.kind).map(|e| e.kind), Some(entry.kind));
        }
    }

    #[test]
    fn should_match_named_type_exactly() {
        let http = lookup("httpTrigger").expect("httpTrigger");
        assert!(http.accepts(&DeclaredType::named(HTTP_REQUEST_TYPE)));
        assert!(!http.accepts(&DeclaredType::named(HTTP_BINDING_TYPE)));
    }

    #[test]
    fn should_reject_plain_arrays_for_record_array_kinds() {
        let cosmos = lookup("cosmosDBOutput").expect("cosmosDBOutput");
        assert!(cosmos.accepts(&DeclaredType::array_of(DeclaredType::record("Order"))));
        assert!(!cosmos.accepts(&DeclaredType::array_of(DeclaredType::String)));
    }

    #[test]
    fn should_list_accepted_types() {
        let blob = lookup("blobOutput").expect("blobOutput");
        assert_eq!(blob.accepted_types(), "string, byte[]");
    }
}
