//! Ordered, kind-keyed handler lists.
//!
//! # Design
//! The registry is generic over the handler type `H` and never calls a
//! handler itself: `apply` hands each one to an invoker closure supplied by
//! the owner, which knows what arguments to pass. That keeps the registry
//! free of any knowledge about responses or managers.
//!
//! The set of recognized kinds is fixed at construction. Handlers can be
//! added but never removed.

use std::collections::HashMap;

use crate::error::ManagerError;

pub struct CallbackRegistry<H: ?Sized> {
    handlers: HashMap<String, Vec<Box<H>>>,
}

impl<H: ?Sized> CallbackRegistry<H> {
    /// Create a registry that accepts exactly `kinds`.
    pub fn new(kinds: &[&str]) -> Self {
        Self {
            handlers: kinds
                .iter()
                .map(|kind| (kind.to_string(), Vec::new()))
                .collect(),
        }
    }

    pub fn recognizes(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Append `handler` to the list for `kind`. The same handler may be
    /// registered more than once and will run once per registration.
    pub fn register(&mut self, kind: &str, handler: Box<H>) -> Result<(), ManagerError> {
        match self.handlers.get_mut(kind) {
            Some(list) => {
                list.push(handler);
                Ok(())
            }
            None => Err(ManagerError::UnknownEventKind(kind.to_string())),
        }
    }

    pub fn handler_count(&self, kind: &str) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }

    /// Run every handler registered for `kind`, in registration order,
    /// stopping at the first one whose invocation fails.
    ///
    /// An unrecognized kind has no handlers and is a no-op.
    pub fn apply<E>(&self, kind: &str, mut invoke: impl FnMut(&H) -> Result<(), E>) -> Result<(), E> {
        let Some(list) = self.handlers.get(kind) else {
            return Ok(());
        };
        for (index, handler) in list.iter().enumerate() {
            tracing::trace!(kind, index, "invoking handler");
            invoke(&**handler)?;
        }
        Ok(())
    }
}

impl<H: ?Sized> std::fmt::Debug for CallbackRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, list) in &self.handlers {
            map.entry(kind, &list.len());
        }
        map.finish()
    }
}
