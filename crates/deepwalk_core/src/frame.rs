//! Traversal frames and visit positions.

use std::sync::Arc;

use deepwalk_value::Value;

use crate::binding::ContainerFn;
use crate::property::Properties;

/// Position of a visited value, as seen by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'a> {
    /// Number of enclosing containers (0 for the root).
    pub depth: usize,
    /// Index in the parent container; `None` for the root.
    ///
    /// For record members this is the member's dispatch position.
    pub index: Option<usize>,
    /// Member name in the parent record; empty otherwise.
    pub name: &'a str,
}

impl Visit<'static> {
    /// Position of the root value.
    pub const ROOT: Visit<'static> = Visit {
        depth: 0,
        index: None,
        name: "",
    };
}

/// Whether a container call opens or closes the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    End,
}

impl Phase {
    /// Returns true for the opening call.
    #[inline]
    pub const fn is_start(self) -> bool {
        matches!(self, Phase::Start)
    }
}

/// Position and size of a visited container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerVisit<'a> {
    pub depth: usize,
    pub index: Option<usize>,
    pub name: &'a str,
    /// Number of child slots: elements, twice the map pairs, record slots,
    /// or 1/0 for a non-nil/nil pointer.
    pub size: usize,
    pub phase: Phase,
}

impl<'a> ContainerVisit<'a> {
    pub(crate) fn new(position: &Visit<'a>, size: usize, phase: Phase) -> Self {
        Self {
            depth: position.depth,
            index: position.index,
            name: position.name,
            size,
            phase,
        }
    }

    /// Position part of this visit.
    pub fn position(&self) -> Visit<'a> {
        Visit {
            depth: self.depth,
            index: self.index,
            name: self.name,
        }
    }
}

/// Traversal state of one container level.
///
/// Owned by the walk call that created it and never shared between sibling
/// branches.
pub(crate) struct Frame<'v> {
    pub(crate) value: &'v Value,
    pub(crate) depth: usize,
    pub(crate) size: usize,
    pub(crate) offset: Option<usize>,
    pub(crate) properties: Option<Arc<Properties>>,
    pub(crate) handler: Arc<ContainerFn>,
}

impl<'v> Frame<'v> {
    /// Position of the child at the current offset.
    pub(crate) fn child_visit(&self) -> Visit<'_> {
        let Some(offset) = self.offset else {
            return Visit {
                depth: self.depth,
                index: None,
                name: "",
            };
        };
        match self
            .properties
            .as_deref()
            .and_then(|props| props.members.get(offset))
        {
            Some(member) => Visit {
                depth: self.depth,
                index: member.dispatch_index(),
                name: &member.name,
            },
            None => Visit {
                depth: self.depth,
                index: Some(offset),
                name: "",
            },
        }
    }
}

impl std::fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("type", &self.value.ty())
            .field("depth", &self.depth)
            .field("size", &self.size)
            .field("offset", &self.offset)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
