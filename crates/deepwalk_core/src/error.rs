//! Error types for registry construction and traversal.

use deepwalk_value::Kind;
use thiserror::Error;

/// Error returned by a user handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building a binding registry.
///
/// These are always fatal to registry creation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two operations bound to the same type, category, or nil pointer.
    #[error("duplicated binding function {name} found for {target}")]
    DuplicateBinding { name: String, target: String },

    /// The capability set exposed no operation usable as a binding.
    #[error("no available binding function found")]
    NoUsableBinding,
}

impl RegistryError {
    /// Creates a duplicate binding error.
    pub fn duplicate(name: impl Into<String>, target: impl std::fmt::Display) -> Self {
        Self::DuplicateBinding {
            name: name.into(),
            target: target.to_string(),
        }
    }
}

/// Errors that abort a traversal.
#[derive(Debug, Error)]
pub enum TraverseError {
    /// No rule matched a value and missing bindings are not tolerated.
    #[error("type:{type_name} kind:{kind} binding is missing")]
    BindingMissing { type_name: String, kind: Kind },

    /// A handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),

    /// A container end handler returned an error.
    #[error("call container end failed: {0}")]
    ContainerEnd(#[source] HandlerError),

    /// The traversed value disagrees with what was measured for it.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl TraverseError {
    /// Creates an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    /// Returns true if this error reports a missing binding.
    pub fn is_binding_missing(&self) -> bool {
        matches!(self, Self::BindingMissing { .. })
    }
}

/// Errors that can occur while loading a traversal configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unknown configuration entries.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors in explicit member ordering of a record type.
///
/// These describe programming errors in a record schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyOrderError {
    /// An order tag that is not a non-negative integer.
    #[error("illegal order ({tag}) for field {field}")]
    Unparsable { field: String, tag: String },

    /// An explicit order smaller than the member's sorted position.
    #[error("illegal order ({order}) for field {field}, should >= {minimum}")]
    BelowPosition {
        field: String,
        order: usize,
        minimum: usize,
    },

    /// Two members ended up with the same effective order.
    #[error("duplicated order ({order}) for field {field}")]
    Duplicate { field: String, order: usize },
}
