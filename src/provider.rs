use crate::{
    shallow, Callback, Component, Context, LogLevel, Record, Store, StoreRef, CHILDREN_KEY,
};
use std::fmt::Debug;

/// Configuration for a [Provider].
#[derive(Clone, Debug, Default)]
pub struct ProviderConfig {
    initial: Record,
    log_level: LogLevel,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default values of the store, overridden by the provider's own
    /// props.
    pub fn initial(mut self, initial: Record) -> Self {
        self.initial = initial;
        self
    }

    /// The level at which the provider's store logs dispatches.
    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

/// Wraps a component, owning a [Store] which the component is
/// rendered from, and which connected components below it reach
/// through [Provider::context()].
///
/// The provider's own props are part of the store: they seed it, and
/// later changes to them are merged into it with a dispatch.
pub struct Provider<C> {
    component: C,
    store: StoreRef,
}

impl<C: Component> Provider<C> {
    pub fn new(component: C, config: ProviderConfig, props: Record) -> Self {
        let store = Store::new().log_level(config.log_level);
        store.initialize(&config.initial, props.without(CHILDREN_KEY));

        Self {
            component,
            store: store.into(),
        }
    }

    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    /// The context to attach connected components with.
    pub fn context(&self) -> Context {
        Context::with_store(self.store.clone())
    }

    /// Register the host's force re-render primitive for this
    /// provider, invoked after every dispatch which changed the store.
    pub fn attach<R: Into<Callback>>(&self, rerender: R) {
        self.store.set_render_request(rerender);
    }

    /// Receive new own props. If any of them differs from the store,
    /// they are merged into it by a dispatch.
    pub fn set_props(&self, props: Record) {
        let props = props.without(CHILDREN_KEY);

        if shallow::changed_from(&self.store.state(), &props) {
            self.store.dispatch(move |store| store.merge(&props));
        }
    }

    /// Render the wrapped component with the current store as its
    /// props.
    pub fn render(&self) -> C::Output {
        self.component
            .render(&self.store.state(), &self.store.dispatcher())
    }
}

impl<C> Debug for Provider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Provider{{store: {:?}}}", self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::{Provider, ProviderConfig};
    use crate::{
        Callback, Connect, ConnectConfig, Dispatcher, LogLevel, Projection, Record, Value,
    };
    use std::{cell::Cell, rc::Rc};

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let count_copy = count.clone();
        (count, Callback::new(move || count_copy.set(count_copy.get() + 1)))
    }

    fn int(record: &Record, key: &str) -> Option<i64> {
        record.get(key).and_then(Value::as_int)
    }

    fn app() -> impl Fn(&Record, &Dispatcher) -> Record {
        |props: &Record, _: &Dispatcher| props.clone()
    }

    #[test]
    fn test_props_seed_store() {
        let config = ProviderConfig::new()
            .initial(record! { "foo" => 1, "bar" => 1 })
            .log_level(LogLevel::Debug);
        let provider = Provider::new(app(), config, record! { "bar" => 2, "children" => 3 });

        let props = provider.render();
        assert_eq!(int(&props, "foo"), Some(1));
        assert_eq!(int(&props, "bar"), Some(2));
        assert!(!props.contains_key("children"));
    }

    #[test]
    fn test_set_props_dispatches_changes() {
        let provider = Provider::new(app(), ProviderConfig::new(), record! { "foo" => 1 });
        let (renders, rerender) = counter();
        provider.attach(rerender);
        let (notified, notify) = counter();
        let _unsubscribe = provider.store().subscribe(notify);

        provider.set_props(record! { "foo" => 1 });
        assert_eq!(notified.get(), 0);
        assert_eq!(renders.get(), 0);

        provider.set_props(record! { "foo" => 2, "bar" => 3 });
        assert_eq!(notified.get(), 1);
        assert_eq!(renders.get(), 1);
        assert_eq!(int(&provider.render(), "foo"), Some(2));
        assert_eq!(int(&provider.render(), "bar"), Some(3));
    }

    #[test]
    fn test_store_values_survive_prop_updates() {
        let provider = Provider::new(app(), ProviderConfig::new(), record! { "foo" => 1 });
        provider
            .store()
            .dispatch(|store| store.clone().with("count", 10));

        provider.set_props(record! { "foo" => 2 });
        let props = provider.render();
        assert_eq!(int(&props, "count"), Some(10));
        assert_eq!(int(&props, "foo"), Some(2));
    }

    #[test]
    fn test_connected_tree() {
        let provider = Provider::new(
            app(),
            ProviderConfig::new().initial(record! { "foo" => 1, "bar" => 2 }),
            Record::new(),
        );
        let context = provider.context();
        let (provider_renders, provider_rerender) = counter();
        provider.attach(provider_rerender);

        let pick = |key: &'static str| {
            Projection::stateless(move |store, _| {
                record! { key => store.get(key).cloned().unwrap_or(Value::Null) }
            })
        };
        let view = |props: &Record, _: &Dispatcher| props.clone();

        let a = Connect::new(pick("foo"), ConnectConfig::new()).wrap(view).mount(Record::new());
        let b = Connect::new(pick("bar"), ConnectConfig::new()).wrap(view).mount(Record::new());
        let (a_renders, a_rerender) = counter();
        let (b_renders, b_rerender) = counter();
        a.attach(&context, a_rerender).unwrap();
        b.attach(&context, b_rerender).unwrap();

        // the wrapped component dispatches through the provider's store
        let button = Connect::new(Projection::never_update(), ConnectConfig::new())
            .wrap(|_: &Record, dispatch: &Dispatcher| dispatch.clone())
            .mount(Record::new());
        button.attach(&context, || {}).unwrap();
        let dispatch = button.render().unwrap();

        dispatch.dispatch(|store| {
            let foo = store.get("foo").and_then(Value::as_int).unwrap_or_default();
            store.clone().with("foo", foo + 1)
        });
        assert_eq!(a_renders.get(), 1);
        assert_eq!(b_renders.get(), 0);
        assert_eq!(provider_renders.get(), 1);
        assert_eq!(int(&a.render().unwrap(), "foo"), Some(2));

        dispatch.dispatch(|store| store.clone());
        assert_eq!(a_renders.get(), 1);
        assert_eq!(b_renders.get(), 0);
        assert_eq!(provider_renders.get(), 1);

        provider.set_props(record! { "bar" => 5 });
        assert_eq!(a_renders.get(), 1);
        assert_eq!(b_renders.get(), 1);
        assert_eq!(int(&b.render().unwrap(), "bar"), Some(5));
    }
}
