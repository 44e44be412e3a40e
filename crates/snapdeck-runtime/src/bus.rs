#![forbid(unsafe_code)]

//! Synchronous, same-thread publish/subscribe for page signals.
//!
//! # How it works
//!
//! 1. A component calls [`SignalBus::subscribe`] or [`SignalBus::on`] and
//!    keeps the returned [`Subscription`] for as long as it wants delivery.
//! 2. [`SignalBus::publish`] snapshots the matching listeners and calls each
//!    one in registration order before returning.
//! 3. Dropping the [`Subscription`] unregisters the listener.
//!
//! Because delivery completes inside `publish`, every effect of a signal is
//! visible to the publisher when the call returns. A listener may publish
//! further signals; those are delivered depth-first, before the outer
//! dispatch continues with the next listener.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use snapdeck_core::signal::Signal;

/// A unique identifier for a subscription.
pub type SubId = u64;

type Callback = Rc<dyn Fn(Signal)>;

struct Listener {
    id: SubId,
    filter: Option<Signal>,
    callback: Callback,
}

#[derive(Default)]
struct BusInner {
    next_id: Cell<SubId>,
    listeners: RefCell<Vec<Listener>>,
    published: Cell<u64>,
}

/// Page-wide signal bus.
///
/// Cheap to clone; all clones share one listener list. Not `Send`: the bus
/// lives on the UI thread together with every component that uses it.
#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Rc<BusInner>,
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("listeners", &self.listener_count())
            .field("published", &self.published_count())
            .finish()
    }
}

impl SignalBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every signal.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(Signal) + 'static) -> Subscription {
        self.register(None, Rc::new(callback))
    }

    /// Listen to one signal.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn on(&self, signal: Signal, callback: impl Fn() + 'static) -> Subscription {
        self.register(Some(signal), Rc::new(move |_| callback()))
    }

    fn register(&self, filter: Option<Signal>, callback: Callback) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            filter,
            callback,
        });
        tracing::trace!(sub_id = id, filter = ?filter, "bus subscribe");
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver `signal` to every matching listener, in registration order.
    ///
    /// Returns the number of listeners that were called.
    pub fn publish(&self, signal: Signal) -> usize {
        let targets: Vec<Callback> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.filter.is_none_or(|f| f == signal))
            .map(|l| Rc::clone(&l.callback))
            .collect();
        self.inner.published.set(self.inner.published.get() + 1);

        crate::debug_trace!("publish {} -> {} listeners", signal, targets.len());
        tracing::debug!(signal = signal.name(), listeners = targets.len(), "bus publish");

        for callback in &targets {
            callback(signal);
        }
        targets.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Number of `publish` calls so far.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.inner.published.get()
    }

    /// A handle that does not keep the bus alive.
    ///
    /// Listeners that publish must hold one of these instead of a clone,
    /// otherwise the bus and the listener keep each other alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakSignalBus {
        WeakSignalBus {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning [`SignalBus`] handle.
#[derive(Clone, Default)]
pub struct WeakSignalBus {
    inner: Weak<BusInner>,
}

impl std::fmt::Debug for WeakSignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakSignalBus")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl WeakSignalBus {
    /// The bus, if it still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<SignalBus> {
        self.inner.upgrade().map(|inner| SignalBus { inner })
    }
}

/// Handle keeping a listener registered.
///
/// Dropping it unsubscribes. Outliving the bus is fine.
#[derive(Debug)]
pub struct Subscription {
    id: SubId,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// The subscription's id.
    #[must_use]
    pub const fn id(&self) -> SubId {
        self.id
    }

    /// Whether the listener is still registered on a live bus.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|bus| bus.listeners.borrow().iter().any(|l| l.id == self.id))
    }

    /// Unsubscribe now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.listeners.borrow_mut().retain(|l| l.id != self.id);
            tracing::trace!(sub_id = self.id, "bus unsubscribe");
        }
    }
}
