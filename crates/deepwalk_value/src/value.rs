//! Traversable values.

use std::fmt;

use serde::Serialize;

use crate::{Kind, TypeTag};

/// Payload of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    /// Array or slice elements, in index order.
    Seq(Vec<Value>),
    /// Key/value pairs, in enumeration order.
    Map(Vec<(Value, Value)>),
    /// Pointee, or `None` for a nil pointer.
    Ptr(Option<Box<Value>>),
    /// Field values in structural (declaration) order.
    Record(Vec<Value>),
}

/// A value together with its runtime type.
///
/// # Example
///
/// ```rust
/// use deepwalk_value::{FieldDef, Kind, TypeTag, Value};
///
/// let point = TypeTag::record("Point")
///     .field(FieldDef::new("X"))
///     .field(FieldDef::new("Y"))
///     .build();
/// let value = Value::ptr(Value::record(&point, vec![Value::int(1), Value::int(2)]));
///
/// assert_eq!(value.kind(), Kind::Ptr);
/// assert_eq!(value.to_string(), "&Point{X: 1, Y: 2}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    ty: TypeTag,
    data: Data,
}

impl Value {
    /// Creates a value from raw parts.
    pub fn new(ty: TypeTag, data: Data) -> Self {
        Self { ty, data }
    }

    /// `bool` value.
    pub fn bool(value: bool) -> Self {
        Self::new(TypeTag::builtin(Kind::Bool), Data::Bool(value))
    }

    /// `int` value.
    pub fn int(value: i64) -> Self {
        Self::int_of(Kind::Int, value)
    }

    /// Signed integer of a specific width.
    pub fn int_of(kind: Kind, value: i64) -> Self {
        debug_assert!(kind.is_signed_int(), "{} is not a signed integer kind", kind);
        Self::new(TypeTag::builtin(kind), Data::Int(value))
    }

    /// `uint` value.
    pub fn uint(value: u64) -> Self {
        Self::uint_of(Kind::Uint, value)
    }

    /// Unsigned integer of a specific width (including `Uintptr`).
    pub fn uint_of(kind: Kind, value: u64) -> Self {
        debug_assert!(
            kind.is_unsigned_int() || kind == Kind::Uintptr,
            "{} is not an unsigned integer kind",
            kind
        );
        Self::new(TypeTag::builtin(kind), Data::Uint(value))
    }

    /// `float64` value.
    pub fn float(value: f64) -> Self {
        Self::new(TypeTag::builtin(Kind::Float64), Data::Float(value))
    }

    /// `float32` value.
    pub fn float32(value: f32) -> Self {
        Self::new(TypeTag::builtin(Kind::Float32), Data::Float(f64::from(value)))
    }

    /// `string` value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(TypeTag::builtin(Kind::String), Data::String(value.into()))
    }

    /// Slice `[]elem`.
    pub fn slice(elem: &TypeTag, items: Vec<Value>) -> Self {
        Self::new(TypeTag::slice_of(elem), Data::Seq(items))
    }

    /// Array `[len]elem`, where `len` is the number of items.
    pub fn array(elem: &TypeTag, items: Vec<Value>) -> Self {
        Self::new(TypeTag::array_of(elem, items.len()), Data::Seq(items))
    }

    /// Map `map[key]value`; pairs keep the given enumeration order.
    pub fn map(key: &TypeTag, value: &TypeTag, pairs: Vec<(Value, Value)>) -> Self {
        Self::new(TypeTag::map_of(key, value), Data::Map(pairs))
    }

    /// Non-nil pointer to `value`.
    pub fn ptr(value: Value) -> Self {
        Self::new(TypeTag::ptr_to(&value.ty), Data::Ptr(Some(Box::new(value))))
    }

    /// Nil pointer of type `*elem`.
    pub fn nil_ptr(elem: &TypeTag) -> Self {
        Self::new(TypeTag::ptr_to(elem), Data::Ptr(None))
    }

    /// Record of type `ty` with field values in declaration order.
    pub fn record(ty: &TypeTag, fields: Vec<Value>) -> Self {
        Self::new(ty.clone(), Data::Record(fields))
    }

    /// Re-types this value, keeping its payload.
    pub fn with_type(mut self, ty: TypeTag) -> Self {
        self.ty = ty;
        self
    }

    /// Runtime type.
    #[inline]
    pub fn ty(&self) -> &TypeTag {
        &self.ty
    }

    /// Coarse category of the runtime type.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.ty.kind()
    }

    /// Payload.
    #[inline]
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Returns true for a pointer whose pointee is absent.
    #[inline]
    pub fn is_nil_ptr(&self) -> bool {
        matches!(self.data, Data::Ptr(None))
    }

    /// Pointee of a non-nil pointer.
    pub fn elem(&self) -> Option<&Value> {
        match &self.data {
            Data::Ptr(Some(inner)) => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// Value of the named record field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let Data::Record(values) = &self.data else {
            return None;
        };
        let index = self.ty.fields().iter().position(|f| f.name == name)?;
        values.get(index)
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Signed integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            Data::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Unsigned integer payload, if any.
    pub fn as_uint(&self) -> Option<u64> {
        match self.data {
            Data::Uint(u) => Some(u),
            _ => None,
        }
    }

    /// Floating point payload, if any.
    pub fn as_float(&self) -> Option<f64> {
        match self.data {
            Data::Float(f) => Some(f),
            _ => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::String(s) => Some(s),
            _ => None,
        }
    }

    fn field_name(&self, index: usize) -> &str {
        self.ty
            .fields()
            .get(index)
            .map(|f| f.name.as_str())
            .unwrap_or("?")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Bool(b) => write!(f, "{}", b),
            Data::Int(i) => write!(f, "{}", i),
            Data::Uint(u) => write!(f, "{}", u),
            Data::Float(x) => write!(f, "{}", x),
            Data::String(s) => write!(f, "{:?}", s),
            Data::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Data::Map(pairs) => {
                f.write_str("map[")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("]")
            }
            Data::Ptr(None) => f.write_str("nil"),
            Data::Ptr(Some(inner)) => write!(f, "&{}", inner),
            Data::Record(values) => {
                write!(f, "{}{{", self.ty)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", self.field_name(i), value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match &self.data {
            Data::Bool(b) => serializer.serialize_bool(*b),
            Data::Int(i) => serializer.serialize_i64(*i),
            Data::Uint(u) => serializer.serialize_u64(*u),
            Data::Float(x) => serializer.serialize_f64(*x),
            Data::String(s) => serializer.serialize_str(s),
            Data::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            // Keys are arbitrary values, so pairs are emitted as 2-element sequences.
            Data::Map(pairs) => {
                let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
                for (k, v) in pairs {
                    seq.serialize_element(&(k, v))?;
                }
                seq.end()
            }
            Data::Ptr(inner) => match inner {
                Some(value) => value.serialize(serializer),
                None => serializer.serialize_none(),
            },
            Data::Record(values) => {
                let mut map = serializer.serialize_map(Some(values.len()))?;
                for (i, value) in values.iter().enumerate() {
                    map.serialize_entry(self.field_name(i), value)?;
                }
                map.end()
            }
        }
    }
}
