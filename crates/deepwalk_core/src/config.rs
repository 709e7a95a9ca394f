//! Traversal configuration.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::property::PropertyResolver;

/// Options resolved once per registry and fixed for every walk.
///
/// The boolean options can be loaded from JSON:
///
/// ```rust
/// use deepwalk_core::TraverseConfig;
///
/// let config = TraverseConfig::from_json_str(
///     r#"{ "bracketContainers": true, "autoDereferencePointers": true }"#,
/// )
/// .unwrap();
/// assert!(config.bracket_containers);
/// assert!(!config.tolerates_missing_binding);
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TraverseConfig {
    /// Skip values without a matching binding instead of failing.
    /// Default: false
    pub tolerates_missing_binding: bool,

    /// Call container handlers again (with [`Phase::End`](crate::Phase::End))
    /// after their children.
    /// Default: false
    pub bracket_containers: bool,

    /// Walk into the pointee of pointers that have no binding of their own.
    /// Nil pointers without a binding are skipped.
    /// Default: false
    pub auto_dereference_pointers: bool,

    /// Record member resolver; `None` uses
    /// [`DefaultPropertyResolver`](crate::DefaultPropertyResolver).
    #[serde(skip)]
    pub property_resolver: Option<Arc<dyn PropertyResolver>>,
}

impl TraverseConfig {
    /// Creates a configuration with every option off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether missing bindings are tolerated.
    pub fn tolerates_missing_binding(mut self, yes: bool) -> Self {
        self.tolerates_missing_binding = yes;
        self
    }

    /// Sets whether container end handlers are called.
    pub fn bracket_containers(mut self, yes: bool) -> Self {
        self.bracket_containers = yes;
        self
    }

    /// Sets whether unbound pointers are dereferenced.
    pub fn auto_dereference_pointers(mut self, yes: bool) -> Self {
        self.auto_dereference_pointers = yes;
        self
    }

    /// Overrides the record member resolver.
    pub fn property_resolver(mut self, resolver: impl PropertyResolver + 'static) -> Self {
        self.property_resolver = Some(Arc::new(resolver));
        self
    }

    /// Parses the boolean options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads the boolean options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}

impl fmt::Debug for TraverseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraverseConfig")
            .field("tolerates_missing_binding", &self.tolerates_missing_binding)
            .field("bracket_containers", &self.bracket_containers)
            .field("auto_dereference_pointers", &self.auto_dereference_pointers)
            .field("property_resolver", &self.property_resolver.is_some())
            .finish()
    }
}
