//! Depth-first traversal engine.
//!
//! A walk visits the root value, then every child of every container whose
//! start handler asks for it, in pre-order. Each container level gets its
//! own [`Frame`] that lives on the stack of the call that opened it.

use std::sync::Arc;

use deepwalk_value::{Data, Value};
use tracing::trace;

use crate::adapter::Adapter;
use crate::binding::{ContainerFn, Handler};
use crate::config::TraverseConfig;
use crate::context::TravContext;
use crate::error::{RegistryError, TraverseError};
use crate::frame::{ContainerVisit, Frame, Phase, Visit};
use crate::matcher::Resolution;
use crate::property::Properties;
use crate::registry::BindingRegistry;

/// Walks values with the rules of one registry.
///
/// Cloning is cheap and clones share the registry, so a single `Traveller`
/// can serve walks on many threads.
///
/// # Example
///
/// ```rust
/// use deepwalk_core::{Adapter, TraverseConfig, Traveller};
/// use deepwalk_value::{Kind, TypeTag, Value};
///
/// let traveller = Traveller::new(
///     Adapter::new()
///         .for_container(Kind::Slice, |_ctx, _visit, _value| Ok(true))
///         .for_int_x(|_ctx, visit, value| {
///             assert_eq!(visit.depth, 1);
///             assert!(value.as_int().is_some());
///             Ok(())
///         }),
///     TraverseConfig::new(),
/// )
/// .unwrap();
///
/// let int = TypeTag::builtin(Kind::Int);
/// traveller
///     .traverse(&Value::slice(&int, vec![Value::int(1), Value::int(2)]))
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Traveller {
    registry: Arc<BindingRegistry>,
}

impl Traveller {
    /// Builds a registry from `adapter` and wraps it.
    pub fn new(adapter: Adapter, config: TraverseConfig) -> Result<Self, RegistryError> {
        let registry = BindingRegistry::build(adapter, config)?;
        Ok(Self::from_registry(Arc::new(registry)))
    }

    /// Wraps an existing registry.
    pub fn from_registry(registry: Arc<BindingRegistry>) -> Self {
        Self { registry }
    }

    /// Registry shared by all clones.
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Walks `value` with a fresh context.
    pub fn traverse(&self, value: &Value) -> Result<(), TraverseError> {
        self.traverse_with(&TravContext::new(), value)
    }

    /// Walks `value`, handing `ctx` to every handler call.
    ///
    /// The first handler error aborts the walk and is returned as is, wrapped
    /// in [`TraverseError::Handler`] or [`TraverseError::ContainerEnd`].
    pub fn traverse_with(&self, ctx: &TravContext, value: &Value) -> Result<(), TraverseError> {
        self.walk(ctx, Visit::ROOT, value)
    }

    fn walk(
        &self,
        ctx: &TravContext,
        position: Visit<'_>,
        value: &Value,
    ) -> Result<(), TraverseError> {
        let mut current = value;
        let descriptor = loop {
            match self.registry.resolve(current)? {
                Resolution::Matched(descriptor) => break descriptor,
                Resolution::NilPointer(handler) => {
                    trace!("nil pointer {} at depth {}", current.ty(), position.depth);
                    return handler(ctx, &position, current).map_err(TraverseError::Handler);
                }
                Resolution::Dereference(pointee) => {
                    trace!("dereference {} at depth {}", current.ty(), position.depth);
                    current = pointee;
                }
                Resolution::Skip => {
                    trace!("skip {} at depth {}", current.ty(), position.depth);
                    return Ok(());
                }
            }
        };

        trace!(
            "dispatch {} at depth {} to {}",
            current.ty(),
            position.depth,
            descriptor.name
        );
        match self.registry.handler(descriptor) {
            Handler::Leaf(handler) => {
                handler(ctx, &position, current).map_err(TraverseError::Handler)
            }
            Handler::Container(handler) => self.walk_container(ctx, &position, current, handler),
        }
    }

    fn walk_container(
        &self,
        ctx: &TravContext,
        position: &Visit<'_>,
        value: &Value,
        handler: &Arc<ContainerFn>,
    ) -> Result<(), TraverseError> {
        let properties = match value.data() {
            Data::Record(_) => Some(self.registry.properties(value.ty())),
            _ => None,
        };
        let size = measure(value, properties.as_deref())?;
        let mut frame = Frame {
            value,
            depth: position.depth + 1,
            size,
            offset: None,
            properties,
            handler: Arc::clone(handler),
        };

        let start = ContainerVisit::new(position, size, Phase::Start);
        if !handler(ctx, &start, value).map_err(TraverseError::Handler)? {
            trace!("container {} declined its children", value.ty());
            return Ok(());
        }

        self.walk_children(ctx, &mut frame)?;

        if self.registry.config().bracket_containers {
            let end = ContainerVisit::new(position, frame.size, Phase::End);
            (frame.handler)(ctx, &end, value).map_err(TraverseError::ContainerEnd)?;
        }
        Ok(())
    }

    fn walk_children(&self, ctx: &TravContext, frame: &mut Frame<'_>) -> Result<(), TraverseError> {
        let value = frame.value;
        match value.data() {
            Data::Seq(items) => {
                for (i, item) in items.iter().enumerate() {
                    frame.offset = Some(i);
                    self.walk(ctx, frame.child_visit(), item)?;
                }
            }
            Data::Map(pairs) => {
                if pairs.len() * 2 != frame.size {
                    return Err(TraverseError::invariant(format!(
                        "map {} has {} entries, measured {} slots",
                        value.ty(),
                        pairs.len(),
                        frame.size
                    )));
                }
                for (i, (key, item)) in pairs.iter().enumerate() {
                    frame.offset = Some(2 * i);
                    self.walk(ctx, frame.child_visit(), key)?;
                    frame.offset = Some(2 * i + 1);
                    self.walk(ctx, frame.child_visit(), item)?;
                }
            }
            Data::Record(fields) => {
                let Some(properties) = frame.properties.clone() else {
                    return Err(TraverseError::invariant(format!(
                        "record {} has no resolved members",
                        value.ty()
                    )));
                };
                for (i, member) in properties.members.iter().enumerate() {
                    let Some(index) = member.index else {
                        continue;
                    };
                    let Some(field) = fields.get(index) else {
                        return Err(TraverseError::invariant(format!(
                            "member {} of {} points past its {} fields",
                            member,
                            value.ty(),
                            fields.len()
                        )));
                    };
                    frame.offset = Some(i);
                    self.walk(ctx, frame.child_visit(), field)?;
                }
            }
            Data::Ptr(Some(pointee)) => {
                frame.offset = Some(0);
                self.walk(ctx, frame.child_visit(), pointee)?;
            }
            Data::Ptr(None) => {}
            _ => {
                return Err(TraverseError::invariant(format!(
                    "{} value has no children",
                    value.kind()
                )));
            }
        }
        Ok(())
    }
}

/// Number of child slots of a container value.
fn measure(value: &Value, properties: Option<&Properties>) -> Result<usize, TraverseError> {
    match (value.data(), properties) {
        (Data::Seq(items), _) => Ok(items.len()),
        (Data::Map(pairs), _) => Ok(pairs.len() * 2),
        (Data::Record(_), Some(properties)) => Ok(properties.size),
        (Data::Ptr(pointee), _) => Ok(usize::from(pointee.is_some())),
        _ => Err(TraverseError::invariant(format!(
            "{} value of type {} bound to a container rule",
            value.kind(),
            value.ty()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepwalk_value::{FieldDef, Kind, TypeTag};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_measure() {
        let int = TypeTag::builtin(Kind::Int);
        let seq = Value::slice(&int, vec![Value::int(1), Value::int(2)]);
        let map = Value::map(&int, &int, vec![(Value::int(1), Value::int(2))]);
        let nil = Value::nil_ptr(&int);
        let ptr = Value::ptr(Value::int(1));

        assert_eq!(measure(&seq, None).unwrap(), 2);
        assert_eq!(measure(&map, None).unwrap(), 2);
        assert_eq!(measure(&nil, None).unwrap(), 0);
        assert_eq!(measure(&ptr, None).unwrap(), 1);
        assert!(matches!(
            measure(&Value::int(1), None),
            Err(TraverseError::Invariant(_))
        ));
    }

    #[test]
    fn test_measure_record_uses_properties() {
        let record = TypeTag::record("R").field(FieldDef::new("A")).build();
        let value = Value::record(&record, vec![Value::int(1)]);
        let properties = Properties {
            size: 4,
            members: Vec::new(),
        };

        assert_eq!(measure(&value, Some(&properties)).unwrap(), 4);
    }

    #[test]
    fn test_record_member_past_fields_is_invariant_violation() {
        let record = TypeTag::record("Short")
            .field(FieldDef::new("A"))
            .field(FieldDef::new("B"))
            .build();
        // Payload with fewer fields than the schema declares.
        let value = Value::record(&record, vec![Value::int(1)]);
        let traveller = Traveller::new(
            Adapter::new()
                .for_container(Kind::Struct, |_, _, _| Ok(true))
                .for_kind(Kind::Int, |_, _, _| Ok(())),
            TraverseConfig::new(),
        )
        .unwrap();

        let err = traveller.traverse(&value).unwrap_err();
        assert!(matches!(err, TraverseError::Invariant(_)));
        assert!(err.to_string().contains("member {1.B} of Short"));
    }

    #[test]
    fn test_scalar_payload_under_container_kind_is_invariant_violation() {
        let value = Value::new(
            TypeTag::slice_of(&TypeTag::builtin(Kind::Int)),
            Data::Int(3),
        );
        let traveller = Traveller::new(
            Adapter::new().for_container(Kind::Slice, |_, _, _| Ok(true)),
            TraverseConfig::new(),
        )
        .unwrap();

        let err = traveller.traverse(&value).unwrap_err();
        assert!(matches!(err, TraverseError::Invariant(_)));
    }
}
