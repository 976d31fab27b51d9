use std::fmt;

/// Stable diagnostic codes. Generation failures live in the 1xxx range,
/// findings of the independent validation pass in the 2xxx range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The annotation kind has no registry entry.
    UnknownBindingKind = 1001,

    /// A parameter's declared type is not accepted by its binding kind.
    UnsupportedParameterType = 1002,

    /// The return type cannot be carried by the return annotation, or the
    /// annotation cannot be used on a return value at all.
    UnsupportedReturnAnnotation = 1003,

    /// Two descriptor fragments of one function share a `name`.
    DuplicateBindingName = 1004,

    MissingRequiredKey = 1005,
    UnknownAnnotationKey = 1006,

    /// An annotation value has the wrong shape for its key.
    InvalidAnnotationValue = 1007,

    /// A non-context parameter carries no binding annotation.
    MissingBindingAnnotation = 1008,

    /// The function's name would be shadowed in its generated wrapper, by the
    /// invocation handle or by an unqualified runtime function.
    ReservedFunctionName = 1009,

    MissingTrigger = 2001,
    MultipleTriggers = 2002,

    /// One element of a tuple-typed value does not fit the binding kind
    /// attached to the value.
    IncompatibleBindingType = 2003,

    HttpOutputWithoutHttpTrigger = 2004,
    DuplicateContextParameter = 2005,

    /// The function-level marker has a kind other than `function`.
    MisplacedBinding = 2006,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Whether the code is produced by the validation pass rather than by
    /// handler dispatch.
    pub fn is_validation(self) -> bool {
        self.as_u32() >= 2000
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AZF{:04}", self.as_u32())
    }
}
