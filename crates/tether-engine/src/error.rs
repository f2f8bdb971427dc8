//! Bridge and engine error types

use std::fmt;

use tether_sdk::HostError;

use crate::wrap::ScriptValue;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure raised while resolving or accessing host members
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// The type is not on the shutter allow-list
    #[error("Access denied: type '{class}' is not granted")]
    AccessDenied {
        /// Fully-qualified type name
        class: String,
    },

    /// No overload accepts the given arguments
    #[error("No overload of {class}.{name} accepts ({args})")]
    NoMatchingOverload {
        /// Declaring class
        class: String,
        /// Function name
        name: String,
        /// Runtime types of the arguments
        args: String,
    },

    /// More than one overload matches equally well
    #[error("Ambiguous call to {class}.{name}: candidates {}", .candidates.join(", "))]
    AmbiguousOverload {
        /// Declaring class
        class: String,
        /// Function name
        name: String,
        /// Signatures of the undominated candidates
        candidates: Vec<String>,
    },

    /// A getter or field read failed
    #[error("Failed to retrieve {member}: {source}")]
    MemberRetrievalFailed {
        /// Member name
        member: String,
        /// Host failure
        source: HostError,
    },

    /// A setter or function raised an error
    #[error("Invocation of {member} failed: {source}")]
    InvocationFailed {
        /// Member name
        member: String,
        /// Host failure
        source: HostError,
    },

    /// Assignment to a property without a setter
    #[error("Property {class}.{member} is read-only")]
    ReadOnly {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },

    /// Assignment or call to a name the class does not expose
    #[error("{class} has no member '{member}'")]
    UnknownMember {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },

    /// Call through a name that is not a function
    #[error("{class}.{member} is not a function")]
    NotCallable {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },
}

impl From<BridgeError> for HostError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::MemberRetrievalFailed { source, .. }
            | BridgeError::InvocationFailed { source, .. } => source,
            other => HostError::Failed(other.to_string()),
        }
    }
}

// ============================================================================
// Runtime Faults
// ============================================================================

/// Exception raised by a script runtime
#[derive(Debug, Clone, Default, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeFault {
    /// Runtime message
    pub message: String,
    /// Value thrown by script code, if any
    pub thrown: Option<ScriptValue>,
    /// Source name
    pub source_name: Option<String>,
    /// 1-based line
    pub line: Option<u32>,
    /// 1-based column
    pub column: Option<u32>,
    /// Bridge failure that raised this fault
    pub cause: Option<BridgeError>,
}

impl RuntimeFault {
    /// Create a fault with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Create a fault carrying a thrown script value
    pub fn thrown(value: ScriptValue) -> Self {
        Self {
            message: "uncaught exception".to_string(),
            thrown: Some(value),
            ..Default::default()
        }
    }

    /// Attach a source position
    pub fn at(mut self, source_name: impl Into<String>, line: u32, column: u32) -> Self {
        self.source_name = Some(source_name.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl From<BridgeError> for RuntimeFault {
    fn from(error: BridgeError) -> Self {
        Self {
            message: error.to_string(),
            cause: Some(error),
            ..Default::default()
        }
    }
}

// ============================================================================
// Script Errors
// ============================================================================

/// Classification of a [`ScriptError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    /// Source failed to compile
    Compile,
    /// Script raised an exception
    Runtime,
    /// A host member access failed
    Bridge,
    /// The named function or method does not exist
    NoSuchMethod,
}

/// Engine-level exception returned by [`ScriptEngine`](crate::ScriptEngine)
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}{}", location(.source_name, .line, .column))]
pub struct ScriptError {
    message: String,
    kind: ScriptErrorKind,
    source_name: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
    cause: Option<BridgeError>,
}

fn location(source_name: &Option<String>, line: &Option<u32>, column: &Option<u32>) -> String {
    let mut out = String::new();
    if let Some(name) = source_name {
        out.push_str(&format!(" in {}", name));
    }
    if let Some(line) = line {
        out.push_str(&format!(" at line {}", line));
        if let Some(column) = column {
            out.push_str(&format!(", column {}", column));
        }
    }
    out
}

impl ScriptError {
    /// Create an error without position
    pub fn new(kind: ScriptErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            source_name: None,
            line: None,
            column: None,
            cause: None,
        }
    }

    /// Convert a runtime fault; `kind` applies unless the fault came from the bridge
    pub fn from_fault(fault: RuntimeFault, kind: ScriptErrorKind, source_name: &str) -> Self {
        let message = match &fault.thrown {
            Some(value) => value.to_string(),
            None => fault.message,
        };
        Self {
            message,
            kind: if fault.cause.is_some() {
                ScriptErrorKind::Bridge
            } else {
                kind
            },
            source_name: fault
                .source_name
                .or_else(|| (!source_name.is_empty()).then(|| source_name.to_string())),
            line: fault.line,
            column: fault.column,
            cause: fault.cause,
        }
    }

    /// Message without position
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classification
    pub fn kind(&self) -> ScriptErrorKind {
        self.kind
    }

    /// Source name, if known
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// 1-based line, if known
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// 1-based column, if known
    pub fn column(&self) -> Option<u32> {
        self.column
    }

    /// Underlying bridge failure
    pub fn bridge_error(&self) -> Option<&BridgeError> {
        self.cause.as_ref()
    }
}

impl From<RuntimeFault> for ScriptError {
    fn from(fault: RuntimeFault) -> Self {
        ScriptError::from_fault(fault, ScriptErrorKind::Runtime, "")
    }
}

impl From<BridgeError> for ScriptError {
    fn from(error: BridgeError) -> Self {
        Self {
            message: error.to_string(),
            kind: ScriptErrorKind::Bridge,
            source_name: None,
            line: None,
            column: None,
            cause: Some(error),
        }
    }
}

impl fmt::Display for ScriptErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptErrorKind::Compile => "compile",
            ScriptErrorKind::Runtime => "runtime",
            ScriptErrorKind::Bridge => "bridge",
            ScriptErrorKind::NoSuchMethod => "no such method",
        };
        write!(f, "{}", name)
    }
}
