//! Rule selection for a single value.

use std::fmt;

use deepwalk_value::{Kind, Value};

use crate::binding::LeafFn;
use crate::error::TraverseError;
use crate::registry::{BindingRegistry, CapabilityDescriptor};

/// Outcome of matching a value against a registry.
pub enum Resolution<'r, 'v> {
    /// The first rule, in declaration order, that applies to the value.
    Matched(&'r CapabilityDescriptor),
    /// The value is a nil pointer and a nil pointer handler is registered.
    NilPointer(&'r LeafFn),
    /// Nothing matched; retry with the pointee.
    Dereference(&'v Value),
    /// Nothing matched and the value is ignored.
    Skip,
}

impl fmt::Debug for Resolution<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched(descriptor) => f.debug_tuple("Matched").field(descriptor).finish(),
            Self::NilPointer(_) => f.write_str("NilPointer"),
            Self::Dereference(value) => f.debug_tuple("Dereference").field(value).finish(),
            Self::Skip => f.write_str("Skip"),
        }
    }
}

impl BindingRegistry {
    /// Selects the rule for `value`.
    ///
    /// A registered nil pointer handler intercepts nil pointers before any
    /// other rule. Otherwise the first matching rule wins. Unmatched pointers
    /// are dereferenced when configured to (nil ones are skipped), then
    /// unmatched values are skipped or reported depending on the missing
    /// binding tolerance.
    pub fn resolve<'r, 'v>(
        &'r self,
        value: &'v Value,
    ) -> Result<Resolution<'r, 'v>, TraverseError> {
        if value.is_nil_ptr() {
            if let Some(handler) = self.nil_ptr.as_deref() {
                return Ok(Resolution::NilPointer(handler));
            }
        }

        let ty = value.ty();
        if let Some(descriptor) = self.descriptors.iter().find(|d| d.bound.matches(ty)) {
            return Ok(Resolution::Matched(descriptor));
        }

        if self.config.auto_dereference_pointers && value.kind() == Kind::Ptr {
            return Ok(match value.elem() {
                Some(pointee) => Resolution::Dereference(pointee),
                None => Resolution::Skip,
            });
        }

        if self.config.tolerates_missing_binding {
            return Ok(Resolution::Skip);
        }
        Err(TraverseError::BindingMissing {
            type_name: ty.to_string(),
            kind: value.kind(),
        })
    }
}
