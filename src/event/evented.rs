use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A registered event handler.
///
/// Handlers get the instance that triggered the event and the context the
/// trigger site passed along.
pub type Handler<S, A> = Arc<dyn Fn(&S, &A) + Send + Sync>;

/// Order-preserving publish/subscribe registry.
///
/// `S` is the type of the triggering instance and `A` the context carried by
/// every trigger. Handlers run synchronously on the caller's thread, in the
/// order they were registered. No lock is held while a handler runs, so a
/// handler may register more handlers or trigger further events.
pub struct Evented<S: ?Sized, A> {
    handlers: Mutex<HashMap<String, Vec<Handler<S, A>>>>,
}

impl<S: ?Sized, A> Evented<S, A> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `handler` for `name`.
    ///
    /// Names that are never triggered are accepted; their handlers simply
    /// never run.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&S, &A) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Invokes every handler registered for `name`.
    ///
    /// A panicking handler propagates to the caller and the remaining
    /// handlers are skipped.
    pub fn trigger(&self, name: &str, source: &S, context: &A) {
        let handlers = match self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            Some(handlers) => handlers.clone(),
            None => return,
        };

        for handler in handlers {
            handler(source, context);
        }
    }

    /// Number of handlers registered for `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, Vec::len)
    }
}

impl<S: ?Sized, A> Default for Evented<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized, A> fmt::Debug for Evented<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_map()
            .entries(handlers.iter().map(|(name, list)| (name, list.len())))
            .finish()
    }
}
