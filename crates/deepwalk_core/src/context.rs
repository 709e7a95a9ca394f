//! Shared traversal context.
//!
//! A [`TravContext`] is created per top-level walk and handed to every
//! handler call, so handlers can accumulate or share state across the whole
//! walk without globals. Keys are typed and namespaced through
//! [`ContextKey`], which keeps two libraries from trampling each other's
//! entries even when they pick the same name.
//!
//! # Example
//!
//! ```rust
//! use deepwalk_core::{ContextKey, TravContext};
//!
//! const VISITED: ContextKey<usize> = ContextKey::new("example", "visited");
//!
//! let ctx = TravContext::new();
//! ctx.put(&VISITED, 3);
//! assert_eq!(ctx.get(&VISITED).as_deref(), Some(&3));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

/// Typed, namespaced key into a [`TravContext`].
pub struct ContextKey<T> {
    namespace: &'static str,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Creates a new key.
    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self {
            namespace,
            name,
            _marker: PhantomData,
        }
    }

    /// Namespace the key belongs to.
    pub const fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Key name within its namespace.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextKey({}::{})", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Slot {
    namespace: &'static str,
    name: &'static str,
    ty: TypeId,
}

impl Slot {
    fn of<T: Any>(key: &ContextKey<T>) -> Self {
        Self {
            namespace: key.namespace,
            name: key.name,
            ty: TypeId::of::<T>(),
        }
    }
}

type Local = Arc<dyn Any + Send + Sync>;

/// Thread-safe key/value store shared by all handlers of one walk.
///
/// Reuse across unrelated walks is allowed; nothing is reset automatically.
#[derive(Default)]
pub struct TravContext {
    locals: RwLock<HashMap<Slot, Local>>,
}

impl TravContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Option<Arc<T>> {
        let local = self.locals.read().get(&Slot::of(key)).cloned()?;
        local.downcast::<T>().ok()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put<T: Any + Send + Sync>(&self, key: &ContextKey<T>, value: T) -> &Self {
        self.locals.write().insert(Slot::of(key), Arc::new(value));
        self
    }

    /// Returns the value under `key`, inserting the result of `init` first if absent.
    ///
    /// Useful for accumulators: store a `Mutex<Vec<_>>` once, then push into it
    /// from every handler.
    pub fn get_or_insert_with<T, F>(&self, key: &ContextKey<T>, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get(key) {
            return existing;
        }
        let mut locals = self.locals.write();
        let local = locals
            .entry(Slot::of(key))
            .or_insert_with(|| Arc::new(init()))
            .clone();
        drop(locals);
        match local.downcast::<T>() {
            Ok(value) => value,
            Err(_) => unreachable!("slot type id matches key type"),
        }
    }

    /// Removes and returns the value under `key`.
    pub fn remove<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Option<Arc<T>> {
        let local = self.locals.write().remove(&Slot::of(key))?;
        local.downcast::<T>().ok()
    }

    /// Returns true if a value is stored under `key`.
    pub fn contains<T: Any>(&self, key: &ContextKey<T>) -> bool {
        self.locals.read().contains_key(&Slot::of(key))
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.locals.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.locals.read().is_empty()
    }
}

impl fmt::Debug for TravContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TravContext")
            .field("entries", &self.len())
            .finish()
    }
}
