//! # deepwalk_core
//!
//! Depth-first traversal engine with rule-based handler dispatch.
//!
//! This crate provides:
//! - Capability sets (`Adapter`) naming handlers after the binding vocabulary
//! - The binding registry, which validates a capability set once
//! - The traversal engine (`Traveller`) and its per-walk context
//! - Record member resolution, with optional tag-driven ordering
//!
//! ## Example
//!
//! ```rust
//! use deepwalk_core::{Adapter, ContextKey, TravContext, TraverseConfig, Traveller};
//! use deepwalk_value::{FieldDef, Kind, TypeTag, Value};
//!
//! const SUM: ContextKey<i64> = ContextKey::new("example", "sum");
//!
//! let order = TypeTag::record("Order")
//!     .field(FieldDef::new("Id"))
//!     .field(FieldDef::new("Quantity"))
//!     .build();
//!
//! let traveller = Traveller::new(
//!     Adapter::new()
//!         .for_container(Kind::Struct, |_ctx, _visit, _value| Ok(true))
//!         .for_int_x(|ctx, visit, value| {
//!             if visit.name == "Quantity" {
//!                 let sum = ctx.get(&SUM).map_or(0, |s| *s);
//!                 ctx.put(&SUM, sum + value.as_int().unwrap_or(0));
//!             }
//!             Ok(())
//!         }),
//!     TraverseConfig::new(),
//! )?;
//!
//! let ctx = TravContext::new();
//! traveller.traverse_with(&ctx, &Value::record(&order, vec![Value::int(7), Value::int(3)]))?;
//! assert_eq!(ctx.get(&SUM).map(|s| *s), Some(3));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod adapter;
pub mod binding;
mod config;
mod context;
mod error;
mod frame;
mod matcher;
mod property;
mod registry;
mod traveller;

pub use adapter::Adapter;
pub use binding::{BindingKind, ContainerFn, Handler, LeafFn, Operation, Target};
pub use config::TraverseConfig;
pub use context::{ContextKey, TravContext};
pub use error::{ConfigError, HandlerError, PropertyOrderError, RegistryError, TraverseError};
pub use frame::{ContainerVisit, Phase, Visit};
pub use matcher::Resolution;
pub use property::{
    DefaultPropertyResolver, Properties, Property, PropertyResolver, TaggedPropertyResolver,
    order_properties,
};
pub use registry::{BindingRegistry, Bound, CapabilityDescriptor};
pub use traveller::Traveller;
