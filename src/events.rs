//! Synchronous event emission for lifecycle notifications.

/// Receives events emitted by a data structure.
///
/// Any `FnMut(&E)` closure is an observer.
pub trait Observer<E> {
    fn notify(&mut self, event: &E);
}

impl<E, F> Observer<E> for F
where
    F: FnMut(&E),
{
    fn notify(&mut self, event: &E) {
        self(event)
    }
}

/// Ordered list of observers. Events are delivered in registration order.
pub struct Emitter<E> {
    observers: Vec<Box<dyn Observer<E>>>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
        }
    }
}

impl<E> Emitter<E> {
    /// Register an observer for all future events.
    pub fn on<O>(&mut self, observer: O)
    where
        O: Observer<E> + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: &E) {
        for o in self.observers.iter_mut() {
            o.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("observers", &self.observers.len())
            .finish()
    }
}
