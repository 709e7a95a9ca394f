//! Record member resolution.
//!
//! A [`PropertyResolver`] turns a record type into the ordered list of
//! members the engine visits. [`DefaultPropertyResolver`] lists exported
//! fields in declaration order; [`TaggedPropertyResolver`] lets a schema
//! hide fields and assign explicit dispatch positions through field tags.

use std::fmt;

use deepwalk_value::TypeTag;

use crate::error::PropertyOrderError;

/// One visitable slot of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Position in the record's fields, or `None` for a placeholder that has
    /// no backing slot.
    pub index: Option<usize>,
    /// Member name.
    pub name: String,
    /// Dispatch position; `None` means "use `index`".
    pub order: Option<usize>,
}

impl Property {
    /// Member backed by the field at `index`.
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            name: name.into(),
            order: None,
        }
    }

    /// Placeholder occupying dispatch position `order`.
    pub fn placeholder(name: impl Into<String>, order: usize) -> Self {
        Self {
            index: None,
            name: name.into(),
            order: Some(order),
        }
    }

    /// Sets an explicit dispatch position.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns true if this member has no backing field.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.index.is_none()
    }

    /// Position reported to handlers: the explicit order, else the field index.
    #[inline]
    pub fn dispatch_index(&self) -> Option<usize> {
        self.order.or(self.index)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self
            .index
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        match self.order {
            Some(order) => write!(f, "{{{}({}).{}}}", index, order, self.name),
            None => write!(f, "{{{}.{}}}", index, self.name),
        }
    }
}

/// Resolved members of a record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// Number of dispatch slots. May exceed `members.len()` when the
    /// ordering leaves gaps.
    pub size: usize,
    /// Members in dispatch order.
    pub members: Vec<Property>,
}

impl Properties {
    /// Members listed in order, one slot each.
    pub fn dense(members: Vec<Property>) -> Self {
        Self {
            size: members.len(),
            members,
        }
    }
}

/// Produces the ordered member list of a record type.
///
/// Implementations must depend on the type only: results are cached per
/// type for the lifetime of a registry. Members must be sorted by effective
/// order (explicit order, else declaration index) with declaration index as
/// tie-break; see [`order_properties`].
pub trait PropertyResolver: Send + Sync {
    /// Returns the members of `record`.
    fn properties(&self, record: &TypeTag) -> Properties;
}

/// Exported fields in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPropertyResolver;

impl PropertyResolver for DefaultPropertyResolver {
    fn properties(&self, record: &TypeTag) -> Properties {
        let members = record
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.exported)
            .map(|(i, field)| Property::new(i, field.name.clone()))
            .collect();
        Properties::dense(members)
    }
}

/// Sorts members by effective order and validates explicit orders.
///
/// `members` are given in declaration order. Members without an explicit
/// order take their declaration index as effective order. Explicit orders
/// are kept verbatim but must not be smaller than the member's sorted
/// position, and the resulting effective orders must be strictly increasing.
///
/// The returned size is the last effective order plus one.
pub fn order_properties(mut members: Vec<Property>) -> Result<Properties, PropertyOrderError> {
    // Stable sort: equal keys keep declaration order.
    members.sort_by_key(|p| (p.order.or(p.index), p.index));

    let mut previous: Option<usize> = None;
    for (position, member) in members.iter_mut().enumerate() {
        let order = match member.order {
            None => member.index.unwrap_or(position),
            Some(order) if order < position => {
                return Err(PropertyOrderError::BelowPosition {
                    field: member.name.clone(),
                    order,
                    minimum: position,
                });
            }
            Some(order) => order,
        };
        if previous.is_some_and(|prev| prev >= order) {
            return Err(PropertyOrderError::Duplicate {
                field: member.name.clone(),
                order,
            });
        }
        member.order = Some(order);
        previous = Some(order);
    }

    Ok(Properties {
        size: previous.map_or(0, |last| last + 1),
        members,
    })
}

/// Tag-driven member resolution.
///
/// - a field whose skip tag contains `-` (comma separated) is hidden
/// - a field whose order tag holds an integer gets that dispatch position
///
/// Invalid orders are schema errors and panic.
#[derive(Debug, Clone)]
pub struct TaggedPropertyResolver {
    order_key: String,
    skip_key: String,
}

impl TaggedPropertyResolver {
    pub const DEFAULT_ORDER_KEY: &'static str = "order";
    pub const DEFAULT_SKIP_KEY: &'static str = "walk";

    /// Creates a resolver using the default tag keys.
    pub fn new() -> Self {
        Self {
            order_key: Self::DEFAULT_ORDER_KEY.to_string(),
            skip_key: Self::DEFAULT_SKIP_KEY.to_string(),
        }
    }

    /// Sets the tag key holding explicit orders.
    pub fn order_key(mut self, key: impl Into<String>) -> Self {
        self.order_key = key.into();
        self
    }

    /// Sets the tag key holding skip markers.
    pub fn skip_key(mut self, key: impl Into<String>) -> Self {
        self.skip_key = key.into();
        self
    }

    /// Fallible form of [`PropertyResolver::properties`].
    pub fn try_properties(&self, record: &TypeTag) -> Result<Properties, PropertyOrderError> {
        let mut members = Vec::new();
        for (i, field) in record.fields().iter().enumerate() {
            if !field.exported {
                continue;
            }
            let skipped = field
                .tag(&self.skip_key)
                .is_some_and(|tag| tag.split(',').any(|part| part.trim() == "-"));
            if skipped {
                continue;
            }

            let mut member = Property::new(i, field.name.clone());
            if let Some(tag) = field.tag(&self.order_key).map(str::trim) {
                if !tag.is_empty() {
                    let order = tag.parse::<usize>().map_err(|_| PropertyOrderError::Unparsable {
                        field: field.name.clone(),
                        tag: tag.to_string(),
                    })?;
                    member = member.with_order(order);
                }
            }
            members.push(member);
        }
        order_properties(members)
    }
}

impl Default for TaggedPropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyResolver for TaggedPropertyResolver {
    fn properties(&self, record: &TypeTag) -> Properties {
        match self.try_properties(record) {
            Ok(properties) => properties,
            Err(e) => panic!("{} of type {}", e, record),
        }
    }
}
