//! Capability sets.
//!
//! An [`Adapter`] is the ordered list of operations a caller offers to the
//! engine. Declaration order is registration order and decides precedence
//! when several rules match the same value.

use deepwalk_value::{InterfaceTag, Kind, TypeTag, Value};

use crate::HandlerError;
use crate::binding::{
    ASSIGN_PREFIX, CONTAINER_PREFIX, Handler, IMPL_PREFIX, INT_X_NAME, KIND_PREFIX, NIL_PTR_NAME,
    Operation, Target, UINT_X_NAME,
};
use crate::context::TravContext;
use crate::frame::{ContainerVisit, Visit};

/// Ordered set of named operations.
///
/// The typed methods name their operations after the binding vocabulary,
/// so they go through the same classification and validation as
/// [`Adapter::operation`].
///
/// # Example
///
/// ```rust
/// use deepwalk_core::Adapter;
/// use deepwalk_value::Kind;
///
/// let adapter = Adapter::new()
///     .for_kind(Kind::Int, |_ctx, visit, value| {
///         println!("{} at depth {}", value, visit.depth);
///         Ok(())
///     })
///     .for_container(Kind::Slice, |_ctx, _visit, _value| Ok(true));
///
/// assert_eq!(adapter.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Adapter {
    operations: Vec<Operation>,
}

impl Adapter {
    /// Creates an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw operation, classified by its name when the registry is built.
    pub fn operation(
        mut self,
        name: impl Into<String>,
        target: Option<Target>,
        handler: Handler,
    ) -> Self {
        self.operations.push(Operation {
            name: name.into(),
            target,
            handler,
        });
        self
    }

    /// Binds a leaf handler to a scalar kind (`ForKind<Kind>`).
    ///
    /// Container kinds are not accepted here and the operation is ignored at
    /// build time; use [`Adapter::for_container`].
    pub fn for_kind<F>(self, kind: Kind, f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = format!("{}{}", KIND_PREFIX, kind.name());
        self.operation(name, None, Handler::leaf(f))
    }

    /// Binds a container handler to a container kind (`ForContainer<Kind>`).
    pub fn for_container<F>(self, kind: Kind, f: F) -> Self
    where
        F: Fn(&TravContext, &ContainerVisit<'_>, &Value) -> Result<bool, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        let name = format!("{}{}", CONTAINER_PREFIX, kind.name());
        self.operation(name, None, Handler::container(f))
    }

    /// Binds a leaf handler to a concrete type and the types assignable to it.
    pub fn for_type<F>(self, ty: &TypeTag, f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = format!("{}{}", ASSIGN_PREFIX, ty);
        self.operation(name, Some(Target::Type(ty.clone())), Handler::leaf(f))
    }

    /// Binds a leaf handler to every type implementing `iface`.
    pub fn for_impl<F>(self, iface: &InterfaceTag, f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = format!("{}{}", IMPL_PREFIX, iface);
        self.operation(name, Some(Target::Interface(iface.clone())), Handler::leaf(f))
    }

    /// Binds a leaf handler to nil pointers. It takes precedence over every
    /// other rule and stops the walk of that branch.
    pub fn for_nil_ptr<F>(self, f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.operation(NIL_PTR_NAME, None, Handler::leaf(f))
    }

    /// Binds a leaf handler to the signed integer family.
    pub fn for_int_x<F>(self, f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.operation(INT_X_NAME, None, Handler::leaf(f))
    }

    /// Binds a leaf handler to the unsigned integer family.
    pub fn for_uint_x<F>(self, f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.operation(UINT_X_NAME, None, Handler::leaf(f))
    }

    /// Operations in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if no operation was added.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}
