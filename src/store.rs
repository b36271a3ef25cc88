use crate::{
    listener::{SubscriberList, Subscription},
    shallow, Callback, Filter, LogLevel, Meta, Record, Unsubscribe,
};
use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    fmt::Debug,
    ops::Deref,
    rc::Rc,
};

/// A wrapper for an [Rc] reference to a [Store].
///
/// This is the capability object handed to connected components (via
/// a [Context](crate::Context)): it can read the current store,
/// subscribe to changes and dispatch new stores.
#[derive(Clone)]
pub struct StoreRef(Rc<Store>);

impl StoreRef {
    pub fn new(initial: Record) -> Self {
        Self(Rc::new(Store::with_initial(initial)))
    }

    /// A handle which can only dispatch to this store.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher(self.clone())
    }
}

impl From<Store> for StoreRef {
    fn from(store: Store) -> Self {
        Self(Rc::new(store))
    }
}

impl Deref for StoreRef {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for StoreRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for StoreRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreRef @ {:p}", Rc::as_ptr(&self.0))
    }
}

/// The `dispatch` capability passed to rendered components, bound to
/// the [Store] it originated from.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatcher(StoreRef);

impl Dispatcher {
    /// See [Store::dispatch()].
    pub fn dispatch<F: FnOnce(&Record) -> Record>(&self, transform: F) {
        self.0.dispatch(transform)
    }

    /// See [Store::dispatch_with()].
    pub fn dispatch_with<F: FnOnce(&Record) -> Record>(&self, transform: F, meta: Meta) {
        self.0.dispatch_with(transform, meta)
    }

    /// See [Store::try_dispatch()].
    pub fn try_dispatch<F, E>(&self, transform: F, meta: Meta) -> Result<(), E>
    where
        F: FnOnce(&Record) -> Result<Record, E>,
    {
        self.0.try_dispatch(transform, meta)
    }
}

/// Owns one flat store [Record] and the subscriptions interested in
/// it.
///
/// The current store ([Store::state()]) is replaced wholesale by each
/// [Store::dispatch()], it is never mutated in place, so previous
/// stores handed out remain valid snapshots. Subscribers are only
/// notified when the new store differs from the old one in the
/// identity of at least one top-level value (see [shallow::changed()]).
pub struct Store {
    /// `None` until the store is initialized or first dispatched to.
    state: RefCell<Option<Rc<Record>>>,
    subscribers: Rc<SubscriberList>,
    next_subscription_id: Cell<u64>,
    /// Invoked after every dispatch which changed the store, so the
    /// host can re-render the view owning this store.
    render_request: RefCell<Option<Callback>>,
    log_level: Cell<LogLevel>,
}

impl Store {
    /// Create a new, uninitialized [Store]. The first dispatch to it
    /// always counts as a change.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(None),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_subscription_id: Cell::new(0),
            render_request: RefCell::new(None),
            log_level: Cell::new(LogLevel::default()),
        }
    }

    /// Create a new [Store] holding `initial`.
    pub fn with_initial(initial: Record) -> Self {
        let store = Self::new();
        store.initialize(&Record::new(), initial);
        store
    }

    /// Set the level at which dispatches are logged.
    pub fn log_level(self, log_level: LogLevel) -> Self {
        self.log_level.set(log_level);
        self
    }

    /// Replace the store with `defaults` merged with `initial` (the
    /// latter wins). Nothing is validated and nobody is notified.
    pub fn initialize(&self, defaults: &Record, initial: Record) {
        let record = defaults.merge(&initial);
        log::debug!("initialized store with keys {:?}", record.keys().collect::<Vec<_>>());
        *self.state.borrow_mut() = Some(Rc::new(record));
    }

    /// Get the current store.
    ///
    /// Modifications need to be performed by dispatching a transform
    /// with [dispatch()](Store::dispatch()).
    pub fn state(&self) -> Rc<Record> {
        self.state.borrow().clone().unwrap_or_default()
    }

    /// Set the callback invoked after each dispatch which changed the
    /// store.
    pub fn set_render_request<C: Into<Callback>>(&self, render_request: C) {
        *self.render_request.borrow_mut() = Some(render_request.into());
    }

    /// The number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Subscribe `notify` to every future dispatch which changes the
    /// store. The callback receives no payload, read
    /// [state()](Store::state()) to see the new store.
    pub fn subscribe<C: Into<Callback>>(&self, notify: C) -> Unsubscribe {
        self.add_subscription(notify.into(), None)
    }

    /// Like [subscribe()](Store::subscribe()), but `notify` is only
    /// invoked for changes that `filter` allows.
    pub fn subscribe_filtered<C: Into<Callback>>(&self, notify: C, filter: Filter) -> Unsubscribe {
        self.add_subscription(notify.into(), Some(filter))
    }

    pub(crate) fn add_subscription(&self, notify: Callback, filter: Option<Filter>) -> Unsubscribe {
        let id = self.next_subscription_id.get();
        self.next_subscription_id.set(id + 1);

        self.subscribers.borrow_mut().push(Subscription { id, notify, filter });
        log::trace!("added subscription {}", id);

        Unsubscribe::new(id, &self.subscribers)
    }

    /// Replace the store with the result of `transform` applied to the
    /// current store, notifying subscribers if any top-level value
    /// changed.
    pub fn dispatch<F: FnOnce(&Record) -> Record>(&self, transform: F) {
        self.dispatch_with(transform, Meta::none())
    }

    /// [dispatch()](Store::dispatch()) with `meta` attached, which is
    /// passed to the [Filter]s of the subscriptions.
    pub fn dispatch_with<F: FnOnce(&Record) -> Record>(&self, transform: F, meta: Meta) {
        let result: Result<(), Infallible> = self.try_dispatch(|store| Ok(transform(store)), meta);
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// A [dispatch_with()](Store::dispatch_with()) whose `transform`
    /// may fail. On failure the error is returned, the store keeps its
    /// current value and nobody is notified.
    pub fn try_dispatch<F, E>(&self, transform: F, meta: Meta) -> Result<(), E>
    where
        F: FnOnce(&Record) -> Result<Record, E>,
    {
        // The borrow must not be held while user code runs, the
        // transform may read the store itself.
        let prev = self.state.borrow().clone();
        let next = transform(prev.as_deref().unwrap_or(&Record::new()))?;

        self.commit(prev, next, meta);
        Ok(())
    }

    /// Concrete tail of [Store::try_dispatch()], to avoid generating
    /// a copy of it for every transform closure.
    fn commit(&self, prev: Option<Rc<Record>>, next: Record, meta: Meta) {
        let next = Rc::new(next);
        let changed = match &prev {
            Some(prev) => shallow::changed(prev, &next),
            None => true,
        };

        *self.state.borrow_mut() = Some(next.clone());

        let log_level = self.log_level.get();
        if log_level.enabled() {
            let changed_keys = match &prev {
                Some(prev) => shallow::changed_keys(prev, &next),
                None => next.keys().map(String::from).collect(),
            };
            log_level.log(format!(
                "dispatch meta: {:?}, changed keys: {:?}, subscribers: {}",
                meta.as_record(),
                changed_keys,
                self.subscriber_count()
            ));
        }

        if !changed {
            return;
        }

        let prev = prev.unwrap_or_default();
        self.notify_subscribers(&prev, &next, &meta);

        let render_request = self.render_request.borrow().clone();
        if let Some(render_request) = render_request {
            render_request.emit();
        }
    }

    /// Notify every subscription whose filter accepts this change.
    ///
    /// Iterates over a snapshot of the subscriber list, subscriptions
    /// added or removed by the callbacks take effect from the next
    /// dispatch on. Callbacks may dispatch again.
    fn notify_subscribers(&self, prev: &Record, next: &Record, meta: &Meta) {
        let subscribers: Vec<Subscription> = self.subscribers.borrow().clone();

        for subscription in subscribers
            .iter()
            .filter(|subscription| subscription.accepts(prev, next, meta))
        {
            subscription.notify.emit();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new()
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
