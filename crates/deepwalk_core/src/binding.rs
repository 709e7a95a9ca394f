//! Binding taxonomy and handler shapes.
//!
//! Every operation of a capability set is classified by its name into one
//! [`BindingKind`]. The vocabulary is closed:
//!
//! | name                      | binds to                              | handler   |
//! |---------------------------|---------------------------------------|-----------|
//! | `ForImpl<Name>`           | an interface                          | leaf      |
//! | `ForAssign<Name>`         | a concrete type (or assignable types) | leaf      |
//! | `ForKind<Kind>`           | a scalar kind                         | leaf      |
//! | `ForContainer<Kind>`      | a container kind                      | container |
//! | `ForNilPtr`               | nil pointers of any type              | leaf      |
//! | `ForIntX`                 | the signed integer family             | leaf      |
//! | `ForUintX`                | the unsigned integer family           | leaf      |

use std::fmt;
use std::sync::Arc;

use deepwalk_value::{InterfaceTag, Kind, TypeTag, Value};

use crate::HandlerError;
use crate::context::TravContext;
use crate::frame::{ContainerVisit, Visit};

pub const IMPL_PREFIX: &str = "ForImpl";
pub const ASSIGN_PREFIX: &str = "ForAssign";
pub const KIND_PREFIX: &str = "ForKind";
pub const CONTAINER_PREFIX: &str = "ForContainer";
pub const NIL_PTR_NAME: &str = "ForNilPtr";
pub const INT_X_NAME: &str = "ForIntX";
pub const UINT_X_NAME: &str = "ForUintX";

/// Handler for leaf bindings.
pub type LeafFn = dyn Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync;

/// Handler for container bindings. Returns whether to visit the children
/// (ignored for the end call).
pub type ContainerFn =
    dyn Fn(&TravContext, &ContainerVisit<'_>, &Value) -> Result<bool, HandlerError> + Send + Sync;

/// A callable with one of the two accepted shapes.
#[derive(Clone)]
pub enum Handler {
    Leaf(Arc<LeafFn>),
    Container(Arc<ContainerFn>),
}

impl Handler {
    /// Wraps a leaf handler.
    pub fn leaf<F>(f: F) -> Self
    where
        F: Fn(&TravContext, &Visit<'_>, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self::Leaf(Arc::new(f))
    }

    /// Wraps a container handler.
    pub fn container<F>(f: F) -> Self
    where
        F: Fn(&TravContext, &ContainerVisit<'_>, &Value) -> Result<bool, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        Self::Container(Arc::new(f))
    }

    /// Returns true for a container handler.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("Handler::Leaf"),
            Self::Container(_) => f.write_str("Handler::Container"),
        }
    }
}

/// Explicit binding target of `ForImpl` / `ForAssign` operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Interface(InterfaceTag),
    Type(TypeTag),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface(iface) => write!(f, "Interface:{}", iface),
            Self::Type(ty) => write!(f, "Type:{}", ty),
        }
    }
}

/// One named operation of a capability set.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub target: Option<Target>,
    pub handler: Handler,
}

/// Classification of an operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Impl,
    Assign,
    Kind,
    Container,
    NilPtr,
    IntX,
    UintX,
}

impl BindingKind {
    /// Classifies an operation name.
    ///
    /// Returns the classification and, for `ForKind` / `ForContainer`, the
    /// bound kind. Names outside the vocabulary, unknown kind suffixes,
    /// `ForKind` with a container kind and `ForContainer` with a scalar kind
    /// yield `None`.
    pub fn classify(name: &str) -> Option<(BindingKind, Option<Kind>)> {
        match name {
            NIL_PTR_NAME => return Some((BindingKind::NilPtr, None)),
            INT_X_NAME => return Some((BindingKind::IntX, None)),
            UINT_X_NAME => return Some((BindingKind::UintX, None)),
            _ => {}
        }
        if name.starts_with(IMPL_PREFIX) {
            Some((BindingKind::Impl, None))
        } else if name.starts_with(ASSIGN_PREFIX) {
            Some((BindingKind::Assign, None))
        } else if let Some(suffix) = name.strip_prefix(KIND_PREFIX) {
            let kind = Kind::from_name(suffix).filter(|k| !k.is_container())?;
            Some((BindingKind::Kind, Some(kind)))
        } else if let Some(suffix) = name.strip_prefix(CONTAINER_PREFIX) {
            let kind = Kind::from_name(suffix).filter(Kind::is_container)?;
            Some((BindingKind::Container, Some(kind)))
        } else {
            None
        }
    }

    /// Returns true if `handler` has the shape this classification requires.
    pub fn accepts(self, handler: &Handler) -> bool {
        match self {
            BindingKind::Container => handler.is_container(),
            _ => !handler.is_container(),
        }
    }

    /// Returns true if `target` is what this classification binds to.
    pub fn accepts_target(self, target: Option<&Target>) -> bool {
        match self {
            BindingKind::Impl => matches!(target, Some(Target::Interface(_))),
            BindingKind::Assign => matches!(target, Some(Target::Type(_))),
            _ => target.is_none(),
        }
    }

    /// Name prefix, or full name for the fixed-name classifications.
    pub const fn prefix(self) -> &'static str {
        match self {
            BindingKind::Impl => IMPL_PREFIX,
            BindingKind::Assign => ASSIGN_PREFIX,
            BindingKind::Kind => KIND_PREFIX,
            BindingKind::Container => CONTAINER_PREFIX,
            BindingKind::NilPtr => NIL_PTR_NAME,
            BindingKind::IntX => INT_X_NAME,
            BindingKind::UintX => UINT_X_NAME,
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::nil_ptr("ForNilPtr", Some((BindingKind::NilPtr, None)))]
    #[case::int_x("ForIntX", Some((BindingKind::IntX, None)))]
    #[case::uint_x("ForUintX", Some((BindingKind::UintX, None)))]
    #[case::impl_("ForImplStringer", Some((BindingKind::Impl, None)))]
    #[case::assign("ForAssignPoint", Some((BindingKind::Assign, None)))]
    #[case::kind("ForKindInt64", Some((BindingKind::Kind, Some(Kind::Int64))))]
    #[case::kind_with_container("ForKindSlice", None)]
    #[case::kind_unknown("ForKindComplex64", None)]
    #[case::container("ForContainerMap", Some((BindingKind::Container, Some(Kind::Map))))]
    #[case::container_pointer_alias("ForContainerPointer", Some((BindingKind::Container, Some(Kind::Ptr))))]
    #[case::container_with_scalar("ForContainerString", None)]
    #[case::unrelated("Visit", None)]
    #[case::short("For", None)]
    #[case::int_x_suffix("ForIntXs", None)]
    fn test_classify(#[case] name: &str, #[case] expected: Option<(BindingKind, Option<Kind>)>) {
        assert_eq!(BindingKind::classify(name), expected);
    }

    #[test]
    fn test_accepts_handler_shape() {
        let leaf = Handler::leaf(|_, _, _| Ok(()));
        let container = Handler::container(|_, _, _| Ok(true));

        assert!(BindingKind::Kind.accepts(&leaf));
        assert!(!BindingKind::Kind.accepts(&container));
        assert!(BindingKind::Container.accepts(&container));
        assert!(!BindingKind::Container.accepts(&leaf));
        assert!(BindingKind::NilPtr.accepts(&leaf));
    }

    #[test]
    fn test_accepts_target() {
        let iface = Target::Interface(InterfaceTag::new("Stringer"));
        let ty = Target::Type(TypeTag::builtin(Kind::Int));

        assert!(BindingKind::Impl.accepts_target(Some(&iface)));
        assert!(!BindingKind::Impl.accepts_target(Some(&ty)));
        assert!(!BindingKind::Impl.accepts_target(None));
        assert!(BindingKind::Assign.accepts_target(Some(&ty)));
        assert!(!BindingKind::Assign.accepts_target(Some(&iface)));
        assert!(BindingKind::Kind.accepts_target(None));
        assert!(!BindingKind::Kind.accepts_target(Some(&ty)));
    }
}
