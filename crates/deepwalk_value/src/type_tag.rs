//! Type identity tokens.
//!
//! A [`TypeTag`] stands in for a runtime type descriptor. It carries just
//! enough information to drive dispatch:
//!
//! - identity (name, kind and underlying shape) for exact-type bindings
//! - the underlying shape for assignability between named and unnamed types
//! - the set of implemented interfaces for interface bindings
//! - the field schema of record types for member resolution

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::Kind;

/// A named capability contract that types may implement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceTag {
    name: Arc<str>,
}

impl InterfaceTag {
    /// Creates a new interface tag.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the interface name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for InterfaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Schema of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Whether the field is externally visible.
    pub exported: bool,
    /// Free-form `key -> value` annotations.
    pub tags: Vec<(String, String)>,
}

impl FieldDef {
    /// Creates an exported field without tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exported: true,
            tags: Vec::new(),
        }
    }

    /// Creates a field hidden from default member resolution.
    pub fn private(name: impl Into<String>) -> Self {
        Self {
            exported: false,
            ..Self::new(name)
        }
    }

    /// Adds a tag annotation.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Returns the value of the first tag with the given key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
struct TypeInfo {
    name: Option<String>,
    kind: Kind,
    underlying: String,
    interfaces: Vec<InterfaceTag>,
    fields: Vec<FieldDef>,
}

/// Cheaply cloneable type identity.
///
/// Equality and hashing follow type identity: two tags are identical when
/// their name, kind and underlying shape agree. Interfaces and field
/// schemas are descriptive and do not take part in identity.
#[derive(Clone)]
pub struct TypeTag(Arc<TypeInfo>);

impl TypeTag {
    fn from_info(info: TypeInfo) -> Self {
        Self(Arc::new(info))
    }

    /// Predeclared type for a kind.
    ///
    /// Scalar kinds yield the named predeclared type (`int`, `string`, ...).
    /// Container kinds yield a loose unnamed tag (`slice`, `map`, ...) that is
    /// only useful when the element types do not matter.
    pub fn builtin(kind: Kind) -> Self {
        let name = kind.type_name();
        Self::from_info(TypeInfo {
            name: (!kind.is_container()).then(|| name.to_string()),
            kind,
            underlying: name.to_string(),
            interfaces: Vec::new(),
            fields: Vec::new(),
        })
    }

    /// Unnamed slice type `[]elem`.
    pub fn slice_of(elem: &TypeTag) -> Self {
        Self::unnamed(Kind::Slice, format!("[]{}", elem))
    }

    /// Unnamed array type `[len]elem`.
    pub fn array_of(elem: &TypeTag, len: usize) -> Self {
        Self::unnamed(Kind::Array, format!("[{}]{}", len, elem))
    }

    /// Unnamed map type `map[key]value`.
    pub fn map_of(key: &TypeTag, value: &TypeTag) -> Self {
        Self::unnamed(Kind::Map, format!("map[{}]{}", key, value))
    }

    /// Unnamed pointer type `*elem`.
    pub fn ptr_to(elem: &TypeTag) -> Self {
        Self::unnamed(Kind::Ptr, format!("*{}", elem))
    }

    /// Unnamed type with an explicit shape key.
    pub fn unnamed(kind: Kind, underlying: impl Into<String>) -> Self {
        Self::from_info(TypeInfo {
            name: None,
            kind,
            underlying: underlying.into(),
            interfaces: Vec::new(),
            fields: Vec::new(),
        })
    }

    /// Named type defined over another type.
    ///
    /// The new type shares kind, shape and fields with `underlying` but has
    /// its own identity, so it is assignable to the underlying type only when
    /// that one is unnamed.
    pub fn named(name: impl Into<String>, underlying: &TypeTag) -> Self {
        Self::from_info(TypeInfo {
            name: Some(name.into()),
            kind: underlying.0.kind,
            underlying: underlying.0.underlying.clone(),
            interfaces: Vec::new(),
            fields: underlying.0.fields.clone(),
        })
    }

    /// Starts building a named record type.
    pub fn record(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    /// Returns a copy of this tag that also implements `iface`.
    pub fn implementing(&self, iface: InterfaceTag) -> Self {
        let mut interfaces = self.0.interfaces.clone();
        if !interfaces.contains(&iface) {
            interfaces.push(iface);
        }
        Self::from_info(TypeInfo {
            name: self.0.name.clone(),
            kind: self.0.kind,
            underlying: self.0.underlying.clone(),
            interfaces,
            fields: self.0.fields.clone(),
        })
    }

    /// Type name, or `None` for unnamed types.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Coarse category.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    /// Underlying shape key.
    #[inline]
    pub fn underlying(&self) -> &str {
        &self.0.underlying
    }

    /// Record fields in declaration order (empty for non-record types).
    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.0.fields
    }

    /// Implemented interfaces.
    #[inline]
    pub fn interfaces(&self) -> &[InterfaceTag] {
        &self.0.interfaces
    }

    /// Returns true if this type satisfies `iface`.
    pub fn implements(&self, iface: &InterfaceTag) -> bool {
        self.0.interfaces.contains(iface)
    }

    /// Returns true if a value of this type can be used where `target` is expected.
    ///
    /// Holds for identical types, and for types sharing an underlying shape
    /// when at least one of them is unnamed.
    pub fn is_assignable_to(&self, target: &TypeTag) -> bool {
        if self == target {
            return true;
        }
        self.0.kind == target.0.kind
            && self.0.underlying == target.0.underlying
            && (self.0.name.is_none() || target.0.name.is_none())
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name
                && self.0.kind == other.0.kind
                && self.0.underlying == other.0.underlying)
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
        self.0.kind.hash(state);
        self.0.underlying.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.name {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.0.underlying),
        }
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({} {})", self, self.0.kind)
    }
}

/// Builder for named record types.
///
/// ```rust
/// use deepwalk_value::{FieldDef, Kind, TypeTag};
///
/// let point = TypeTag::record("Point")
///     .field(FieldDef::new("X"))
///     .field(FieldDef::new("Y"))
///     .field(FieldDef::private("cache"))
///     .build();
///
/// assert_eq!(point.kind(), Kind::Struct);
/// assert_eq!(point.fields().len(), 3);
/// ```
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<FieldDef>,
    interfaces: Vec<InterfaceTag>,
}

impl RecordTypeBuilder {
    /// Appends a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares an implemented interface.
    pub fn implements(mut self, iface: InterfaceTag) -> Self {
        if !self.interfaces.contains(&iface) {
            self.interfaces.push(iface);
        }
        self
    }

    /// Finishes the record type.
    pub fn build(self) -> TypeTag {
        let shape = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        TypeTag::from_info(TypeInfo {
            name: Some(self.name),
            kind: Kind::Struct,
            underlying: format!("struct{{{}}}", shape),
            interfaces: self.interfaces,
            fields: self.fields,
        })
    }
}
