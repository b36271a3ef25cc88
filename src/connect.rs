use crate::{
    shallow, Callback, Component, Context, Error, Filter, Project, Projection, Record, Result,
    StoreRef, Unsubscribe,
};
use std::{
    cell::{Cell, RefCell},
    fmt::Debug,
    rc::Rc,
};

/// The own prop which is never passed to projections, nor stored in
/// a provider's store. Connected components still render with it.
pub const CHILDREN_KEY: &str = "children";

/// Configuration for a [Connect].
#[derive(Clone, Debug)]
pub struct ConnectConfig {
    filter: Option<Filter>,
    pure: bool,
}

impl ConnectConfig {
    pub fn new() -> Self {
        Self {
            filter: None,
            pure: true,
        }
    }

    /// Only get notified of the store changes `filter` allows.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// A pure component (the default) only ever re-renders because of
    /// store notifications, changing its own props alone never
    /// re-renders it. An impure component also re-resolves its props
    /// when its own props change, and re-renders if they differ.
    pub fn pure(mut self, pure: bool) -> Self {
        self.pure = pure;
        self
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        ConnectConfig::new()
    }
}

/// Subscribes components to a slice of the store of the
/// [Provider](crate::Provider) above them.
///
/// ```
/// use codux::{record, Connect, ConnectConfig, Context, Dispatcher, Projection, Record, StoreRef};
///
/// let store = StoreRef::new(record! { "foo" => 1 });
/// let connect = Connect::new(
///     Projection::stateless(|store, _| record! { "foo" => store.get("foo").cloned().unwrap() }),
///     ConnectConfig::new(),
/// );
/// let label = connect.wrap(|props: &Record, _: &Dispatcher| format!("{:?}", props.get("foo")));
///
/// let instance = label.mount(Record::new());
/// instance.attach(&Context::with_store(store), || {}).unwrap();
/// assert_eq!(instance.render().unwrap(), "Some(1)");
/// ```
#[derive(Clone, Debug)]
pub struct Connect {
    projection: Projection,
    config: ConnectConfig,
}

impl Connect {
    pub fn new(projection: Projection, config: ConnectConfig) -> Self {
        Self { projection, config }
    }

    pub fn wrap<C: Component>(&self, component: C) -> Wrapped<C> {
        let display_name = format!("Connect({})", component.name());
        Wrapped {
            component: Rc::new(component),
            projection: self.projection.clone(),
            config: self.config.clone(),
            display_name,
        }
    }
}

/// A component wrapped by [Connect::wrap()], from which connected
/// instances are mounted.
pub struct Wrapped<C> {
    component: Rc<C>,
    projection: Projection,
    config: ConnectConfig,
    display_name: String,
}

impl<C: Component> Wrapped<C> {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Create a new, unattached instance with the given own props.
    pub fn mount(&self, own_props: Record) -> Connected<C> {
        Connected {
            component: self.component.clone(),
            pure: self.config.pure,
            filter: self.config.filter.clone(),
            stale: Rc::new(Cell::new(false)),
            proxy: Rc::new(RefCell::new(Proxy {
                projection: self.projection.instantiate(),
                own_props,
                resolved: None,
                lifecycle: Lifecycle::Unattached,
            })),
        }
    }
}

impl<C> Debug for Wrapped<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Wrapped({})", self.display_name)
    }
}

/// Where a [Connected] instance is in its lifecycle. There is no way
/// back from `Detached`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unattached,
    Attached,
    Detached,
}

enum Lifecycle {
    Unattached,
    Attached {
        store: StoreRef,
        unsubscribe: Unsubscribe,
        rerender: Callback,
    },
    Detached,
}

/// The mutable part of a [Connected], shared with its subscription.
struct Proxy {
    projection: Box<dyn Project>,
    own_props: Record,
    resolved: Option<Record>,
    lifecycle: Lifecycle,
}

impl Proxy {
    /// Re-run the projection and merge it over the own props. Returns
    /// `true` if this is the first resolve, or the result differs from
    /// the previous one.
    fn resolve(&mut self, store: &Record) -> bool {
        let own_props = self.own_props.without(CHILDREN_KEY);
        let mapped = self.projection.project(store, &own_props);
        let next = own_props.merge(&mapped);

        let needs_update = match &self.resolved {
            Some(prev) => shallow::changed_from(prev, &next),
            None => true,
        };

        self.resolved = Some(next);
        needs_update
    }

    /// Resolve against the store this proxy is attached to, returning
    /// the re-render callback if the host needs to re-render.
    fn resolve_attached(&mut self) -> Option<Callback> {
        let (store, rerender) = match &self.lifecycle {
            Lifecycle::Attached {
                store, rerender, ..
            } => (store.state(), rerender.clone()),
            _ => return None,
        };

        if self.resolve(&store) {
            Some(rerender)
        } else {
            None
        }
    }

    fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Unattached => Phase::Unattached,
            Lifecycle::Attached { .. } => Phase::Attached,
            Lifecycle::Detached => Phase::Detached,
        }
    }

    /// Resolve until the store stops changing under the projection.
    ///
    /// A notification arriving while the proxy is already resolving
    /// (its projection dispatched) only marks it `stale`, and the outer
    /// resolve runs once more against the newer store.
    fn settle(proxy: &RefCell<Proxy>, stale: &Cell<bool>) -> Option<Callback> {
        let mut rerender = None;

        loop {
            stale.set(false);
            let resolved = match proxy.try_borrow_mut() {
                Ok(mut proxy) => proxy.resolve_attached(),
                Err(_) => {
                    log::trace!("deferred notification of a connected component which is resolving its props");
                    stale.set(true);
                    return None;
                }
            };

            rerender = resolved.or(rerender);
            if !stale.get() {
                return rerender;
            }
        }
    }

    fn on_notify(proxy: &RefCell<Proxy>, stale: &Cell<bool>) {
        if let Some(rerender) = Proxy::settle(proxy, stale) {
            rerender.emit();
        }
    }
}

/// A mounted instance of a [Wrapped] component: subscribes to the
/// store while attached, and asks the host to re-render only when its
/// resolved props change.
///
/// Dropping an attached instance detaches it.
pub struct Connected<C> {
    component: Rc<C>,
    pure: bool,
    filter: Option<Filter>,
    /// Set by notifications which arrive while the proxy is resolving.
    stale: Rc<Cell<bool>>,
    proxy: Rc<RefCell<Proxy>>,
}

impl<C: Component> Connected<C> {
    /// Attach to the store in `context`: props are resolved once, then
    /// the instance subscribes to the store. `rerender` is the host's
    /// force re-render primitive for this instance.
    pub fn attach<R: Into<Callback>>(&self, context: &Context, rerender: R) -> Result<()> {
        match self.phase() {
            Phase::Unattached => {}
            Phase::Attached => return Err(Error::AlreadyAttached),
            Phase::Detached => return Err(Error::Detached),
        }

        let store = context.store()?.clone();
        let mut resolved_from = store.state();
        self.proxy.borrow_mut().resolve(&resolved_from);

        let proxy = Rc::downgrade(&self.proxy);
        let stale = self.stale.clone();
        let notify = Callback::new(move || {
            if let Some(proxy) = proxy.upgrade() {
                Proxy::on_notify(&proxy, &stale);
            }
        });
        let unsubscribe = store.add_subscription(notify, self.filter.clone());

        // nobody was subscribed yet if the projection dispatched
        while !Rc::ptr_eq(&resolved_from, &store.state()) {
            resolved_from = store.state();
            self.proxy.borrow_mut().resolve(&resolved_from);
        }

        self.proxy.borrow_mut().lifecycle = Lifecycle::Attached {
            store,
            unsubscribe,
            rerender: rerender.into(),
        };
        Ok(())
    }

    /// Replace the own props of this instance. Returns `true` if a
    /// re-render was requested, which only impure instances do.
    pub fn set_props(&self, own_props: Record) -> bool {
        self.proxy.borrow_mut().own_props = own_props;

        if self.pure {
            return false;
        }

        match Proxy::settle(&self.proxy, &self.stale) {
            Some(rerender) => {
                rerender.emit();
                true
            }
            None => false,
        }
    }

    /// Render the wrapped component with the resolved props plus the
    /// own `children`, and the dispatcher of the attached store.
    pub fn render(&self) -> Result<C::Output> {
        let (props, dispatcher) = {
            let proxy = self.proxy.borrow();
            match (&proxy.lifecycle, &proxy.resolved) {
                (Lifecycle::Attached { store, .. }, Some(resolved)) => {
                    let mut props = resolved.clone();
                    if let Some(children) = proxy.own_props.get(CHILDREN_KEY) {
                        props.insert(CHILDREN_KEY, children.clone());
                    }
                    (props, store.dispatcher())
                }
                (Lifecycle::Detached, _) => return Err(Error::Detached),
                _ => return Err(Error::NotAttached),
            }
        };

        Ok(self.component.render(&props, &dispatcher))
    }

    /// Stop listening to the store. Unsubscribes exactly once if the
    /// instance was attached, later calls do nothing.
    pub fn detach(&self) {
        let lifecycle = std::mem::replace(&mut self.proxy.borrow_mut().lifecycle, Lifecycle::Detached);

        if let Lifecycle::Attached { unsubscribe, .. } = lifecycle {
            unsubscribe.unsubscribe();
        }
    }
}

impl<C> Connected<C> {
    pub fn phase(&self) -> Phase {
        self.proxy.borrow().phase()
    }

    /// The props the wrapped component is rendered with, `None` until
    /// attached.
    pub fn resolved_props(&self) -> Option<Record> {
        self.proxy.borrow().resolved.clone()
    }

    pub fn own_props(&self) -> Record {
        self.proxy.borrow().own_props.clone()
    }
}

impl<C> Drop for Connected<C> {
    fn drop(&mut self) {
        if let Ok(mut proxy) = self.proxy.try_borrow_mut() {
            let lifecycle = std::mem::replace(&mut proxy.lifecycle, Lifecycle::Detached);
            if let Lifecycle::Attached { unsubscribe, .. } = lifecycle {
                unsubscribe.unsubscribe();
            }
        }
    }
}

impl<C> Debug for Connected<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connected")
            .field("phase", &self.phase())
            .field("pure", &self.pure)
            .field("resolved", &self.resolved_props())
            .finish()
    }
}
