//! # deepwalk_value
//!
//! Traversable value model for deepwalk.
//!
//! Rust has no runtime reflection, so the values the traversal engine walks
//! describe themselves: every [`Value`] carries a [`TypeTag`] (exact type
//! identity, implemented interfaces, record schema) and a coarse [`Kind`],
//! and container values expose their children through [`Data`].
//!
//! ## Example
//!
//! ```rust
//! use deepwalk_value::{FieldDef, InterfaceTag, Kind, TypeTag, Value};
//!
//! let named = InterfaceTag::new("Named");
//! let user = TypeTag::record("User")
//!     .field(FieldDef::new("Name"))
//!     .field(FieldDef::new("Tags"))
//!     .implements(named.clone())
//!     .build();
//!
//! let string = TypeTag::builtin(Kind::String);
//! let value = Value::record(
//!     &user,
//!     vec![
//!         Value::string("ada"),
//!         Value::slice(&string, vec![Value::string("admin")]),
//!     ],
//! );
//!
//! assert!(value.ty().implements(&named));
//! assert_eq!(value.field("Name").and_then(Value::as_str), Some("ada"));
//! ```

mod kind;
mod type_tag;
mod value;

pub use kind::Kind;
pub use type_tag::{FieldDef, InterfaceTag, RecordTypeBuilder, TypeTag};
pub use value::{Data, Value};
