//! Coarse value categories.
//!
//! A [`Kind`] is the category of a value independent of its exact type:
//! two distinct record types are both [`Kind::Struct`], a named `Celsius`
//! type defined over `float64` is still [`Kind::Float64`].

use serde::{Deserialize, Serialize};

/// Coarse runtime category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Kind {
    // Scalars
    /// Boolean.
    Bool,
    /// Platform-sized signed integer.
    Int,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Platform-sized unsigned integer.
    Uint,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// Unsigned integer large enough to hold an address.
    Uintptr,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// UTF-8 string.
    String,

    // Containers
    /// Fixed-length sequence.
    Array,
    /// Variable-length sequence.
    Slice,
    /// Key/value mapping.
    Map,
    /// Pointer or reference, possibly nil.
    Ptr,
    /// Record with named fields.
    Struct,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 20] = [
        Kind::Bool,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Uintptr,
        Kind::Float32,
        Kind::Float64,
        Kind::String,
        Kind::Array,
        Kind::Slice,
        Kind::Map,
        Kind::Ptr,
        Kind::Struct,
    ];

    /// Returns true if values of this kind own child values.
    #[inline]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Kind::Array | Kind::Slice | Kind::Map | Kind::Ptr | Kind::Struct
        )
    }

    /// Returns true for the signed integer family.
    #[inline]
    pub const fn is_signed_int(&self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    /// Returns true for the unsigned integer family.
    ///
    /// `Uintptr` is deliberately outside the family.
    #[inline]
    pub const fn is_unsigned_int(&self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64
        )
    }

    /// Canonical PascalCase name, as used in binding names.
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "Bool",
            Kind::Int => "Int",
            Kind::Int8 => "Int8",
            Kind::Int16 => "Int16",
            Kind::Int32 => "Int32",
            Kind::Int64 => "Int64",
            Kind::Uint => "Uint",
            Kind::Uint8 => "Uint8",
            Kind::Uint16 => "Uint16",
            Kind::Uint32 => "Uint32",
            Kind::Uint64 => "Uint64",
            Kind::Uintptr => "Uintptr",
            Kind::Float32 => "Float32",
            Kind::Float64 => "Float64",
            Kind::String => "String",
            Kind::Array => "Array",
            Kind::Slice => "Slice",
            Kind::Map => "Map",
            Kind::Ptr => "Ptr",
            Kind::Struct => "Struct",
        }
    }

    /// Lowercase name used for predeclared scalar types (`int`, `float64`, ...).
    pub const fn type_name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Ptr => "ptr",
            Kind::Struct => "struct",
        }
    }

    /// Parses a canonical kind name. `"Pointer"` is accepted as an alias of `Ptr`.
    pub fn from_name(name: &str) -> Option<Kind> {
        if name == "Pointer" {
            return Some(Kind::Ptr);
        }
        Kind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
