//! Binding registry.
//!
//! Built once from an [`Adapter`] and a [`TraverseConfig`], then shared
//! read-only by every walk. The only mutable state is the per-type cache of
//! resolved record members.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use deepwalk_value::{InterfaceTag, Kind, TypeTag};
use parking_lot::RwLock;
use tracing::debug;

use crate::adapter::Adapter;
use crate::binding::{BindingKind, Handler, LeafFn, Target};
use crate::config::TraverseConfig;
use crate::error::RegistryError;
use crate::property::{DefaultPropertyResolver, Properties, PropertyResolver};

/// What a capability binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Every type implementing the interface.
    Interface(InterfaceTag),
    /// The type itself and the types assignable to it.
    Type(TypeTag),
    /// Every value of the kind.
    Kind(Kind),
    /// `Int` through `Int64`.
    SignedInts,
    /// `Uint` through `Uint64`.
    UnsignedInts,
}

impl Bound {
    /// Returns true if values of type `ty` fall under this binding.
    pub fn matches(&self, ty: &TypeTag) -> bool {
        match self {
            Bound::Interface(iface) => ty.implements(iface),
            Bound::Type(target) => ty == target || ty.is_assignable_to(target),
            Bound::Kind(kind) => ty.kind() == *kind,
            Bound::SignedInts => ty.kind().is_signed_int(),
            Bound::UnsignedInts => ty.kind().is_unsigned_int(),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Interface(iface) => write!(f, "Interface:{}", iface),
            Bound::Type(ty) => write!(f, "Type:{}", ty),
            Bound::Kind(kind) => write!(f, "Kind:{}", kind),
            Bound::SignedInts => f.write_str("IntX"),
            Bound::UnsignedInts => f.write_str("UintX"),
        }
    }
}

/// One accepted dispatch rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    /// Declaration index of the operation in its capability set.
    pub index: usize,
    /// Operation name.
    pub name: String,
    pub bound: Bound,
    /// Whether the handler is a container handler.
    pub container: bool,
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} -> {}", self.index, self.name, self.bound)
    }
}

/// Dispatch table of a capability set.
pub struct BindingRegistry {
    pub(crate) config: TraverseConfig,
    pub(crate) nil_ptr: Option<Arc<LeafFn>>,
    pub(crate) descriptors: Vec<CapabilityDescriptor>,
    handlers: HashMap<Bound, Handler>,
    properties: RwLock<HashMap<TypeTag, Arc<Properties>>>,
}

impl BindingRegistry {
    /// Classifies and validates the operations of `adapter`.
    ///
    /// Operations whose name is outside the binding vocabulary, or whose
    /// handler or target does not fit their classification, are ignored.
    ///
    /// # Errors
    ///
    /// - two operations bound to the same type, category or nil pointer
    /// - no operation usable as a binding
    pub fn build(adapter: Adapter, config: TraverseConfig) -> Result<Self, RegistryError> {
        let mut nil_ptr: Option<Arc<LeafFn>> = None;
        let mut descriptors = Vec::new();
        let mut handlers = HashMap::new();

        for (index, operation) in adapter.into_operations().into_iter().enumerate() {
            let Some((binding, kind)) = BindingKind::classify(&operation.name) else {
                debug!("Ignoring operation {}: not a binding name", operation.name);
                continue;
            };
            if !binding.accepts(&operation.handler) {
                debug!(
                    "Ignoring operation {}: handler shape does not fit {}",
                    operation.name, binding
                );
                continue;
            }
            if !binding.accepts_target(operation.target.as_ref()) {
                debug!(
                    "Ignoring operation {}: target does not fit {}",
                    operation.name, binding
                );
                continue;
            }

            let bound = match (binding, kind, operation.target) {
                (BindingKind::NilPtr, _, _) => {
                    let Handler::Leaf(handler) = operation.handler else {
                        continue;
                    };
                    if nil_ptr.is_some() {
                        return Err(RegistryError::duplicate(operation.name, "nil pointer"));
                    }
                    debug!("Accepted nil pointer binding {}", operation.name);
                    nil_ptr = Some(handler);
                    continue;
                }
                (BindingKind::Impl, _, Some(Target::Interface(iface))) => Bound::Interface(iface),
                (BindingKind::Assign, _, Some(Target::Type(ty))) => Bound::Type(ty),
                (BindingKind::Kind | BindingKind::Container, Some(kind), _) => Bound::Kind(kind),
                (BindingKind::IntX, _, _) => Bound::SignedInts,
                (BindingKind::UintX, _, _) => Bound::UnsignedInts,
                _ => continue,
            };

            match handlers.entry(bound.clone()) {
                Entry::Occupied(_) => {
                    return Err(RegistryError::duplicate(operation.name, bound));
                }
                Entry::Vacant(slot) => {
                    slot.insert(operation.handler.clone());
                }
            }
            let descriptor = CapabilityDescriptor {
                index,
                name: operation.name,
                bound,
                container: operation.handler.is_container(),
            };
            debug!("Accepted binding {}", descriptor);
            descriptors.push(descriptor);
        }

        if descriptors.is_empty() {
            return Err(RegistryError::NoUsableBinding);
        }
        descriptors.sort_by_key(|d| d.index);

        let registry = Self {
            config,
            nil_ptr,
            descriptors,
            handlers,
            properties: RwLock::new(HashMap::new()),
        };
        debug!("Built binding registry:\n{}", registry);
        Ok(registry)
    }

    /// Options this registry was built with.
    pub fn config(&self) -> &TraverseConfig {
        &self.config
    }

    /// Accepted rules in declaration order.
    pub fn descriptors(&self) -> &[CapabilityDescriptor] {
        &self.descriptors
    }

    /// Returns true if a nil pointer binding is registered.
    pub fn has_nil_ptr_binding(&self) -> bool {
        self.nil_ptr.is_some()
    }

    /// Handler of an accepted rule.
    ///
    /// # Panics
    ///
    /// Panics if `descriptor` does not belong to this registry.
    pub fn handler(&self, descriptor: &CapabilityDescriptor) -> &Handler {
        self.handlers
            .get(&descriptor.bound)
            .unwrap_or_else(|| panic!("binding {} has no handler", descriptor))
    }

    /// Members of a record type, resolved once per type.
    pub fn properties(&self, record: &TypeTag) -> Arc<Properties> {
        if let Some(properties) = self.properties.read().get(record) {
            return Arc::clone(properties);
        }

        let resolved = match self.config.property_resolver.as_deref() {
            Some(resolver) => resolver.properties(record),
            None => DefaultPropertyResolver.properties(record),
        };
        debug!(
            "Resolved {} members of {} (size {})",
            resolved.members.len(),
            record,
            resolved.size
        );

        let mut cache = self.properties.write();
        Arc::clone(
            cache
                .entry(record.clone())
                .or_insert_with(|| Arc::new(resolved)),
        )
    }
}

impl fmt::Display for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nil pointer bound: {}", self.nil_ptr.is_some())?;
        for descriptor in &self.descriptors {
            writeln!(f, "{}", descriptor)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("config", &self.config)
            .field("nil_ptr", &self.nil_ptr.is_some())
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}
