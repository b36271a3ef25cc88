use crate::{Meta, Record};
use std::{
    cell::RefCell,
    fmt::Debug,
    rc::{Rc, Weak},
};

/// A shared callback taking no arguments. Used for subscription
/// notifications (subscribers re-read the store themselves), and for
/// the host's force re-render primitive.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    pub fn new<C: Fn() + 'static>(closure: C) -> Self {
        Callback(Rc::new(closure))
    }

    pub fn emit(&self) {
        (self.0)()
    }
}

impl<C> From<C> for Callback
where
    C: Fn() + 'static,
{
    fn from(closure: C) -> Self {
        Callback(Rc::new(closure))
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback @ {:p}", Rc::as_ptr(&self.0) as *const ())
    }
}

/// A predicate deciding whether a subscription gets notified of a
/// change, given `(old_store, new_store, meta)`.
#[derive(Clone)]
pub struct Filter(Rc<dyn Fn(&Record, &Record, &Meta) -> bool>);

impl Filter {
    pub fn new<F: Fn(&Record, &Record, &Meta) -> bool + 'static>(predicate: F) -> Self {
        Filter(Rc::new(predicate))
    }

    /// Filter out every dispatch whose [Meta::kind()] is `kind`.
    pub fn ignore_kind<S: Into<String>>(kind: S) -> Self {
        let kind = kind.into();
        Filter::new(move |_, _, meta| meta.kind() != Some(kind.as_str()))
    }

    pub fn allows(&self, old: &Record, new: &Record, meta: &Meta) -> bool {
        (self.0)(old, new, meta)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter @ {:p}", Rc::as_ptr(&self.0) as *const ())
    }
}

/// A notify [Callback] registered with a [Store](crate::Store),
/// optionally guarded by a [Filter].
#[derive(Clone, Debug)]
pub(crate) struct Subscription {
    pub id: u64,
    pub notify: Callback,
    pub filter: Option<Filter>,
}

impl Subscription {
    pub fn accepts(&self, old: &Record, new: &Record, meta: &Meta) -> bool {
        match &self.filter {
            Some(filter) => filter.allows(old, new, meta),
            None => true,
        }
    }
}

pub(crate) type SubscriberList = RefCell<Vec<Subscription>>;

/// The capability to remove one subscription from a
/// [Store](crate::Store), returned by
/// [Store::subscribe()](crate::Store::subscribe()).
///
/// Calling [Unsubscribe::unsubscribe()] more than once is a no-op, as
/// is calling it after the store has been dropped. Dropping this
/// value does *not* unsubscribe.
pub struct Unsubscribe {
    id: u64,
    subscribers: Weak<SubscriberList>,
}

impl Unsubscribe {
    pub(crate) fn new(id: u64, subscribers: &Rc<SubscriberList>) -> Self {
        Self {
            id,
            subscribers: Rc::downgrade(subscribers),
        }
    }

    pub fn unsubscribe(&self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            let mut subscribers = subscribers.borrow_mut();
            let before = subscribers.len();
            subscribers.retain(|subscription| subscription.id != self.id);
            if subscribers.len() != before {
                log::trace!("unsubscribed subscription {}", self.id);
            }
        }
    }
}

impl Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsubscribe({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Callback, Filter};
    use crate::{Meta, Record};
    use std::{cell::Cell, rc::Rc};

    #[test]
    fn callback_emit() {
        let count = Rc::new(Cell::new(0));
        let count_copy = count.clone();
        let callback: Callback = (move || count_copy.set(count_copy.get() + 1)).into();
        callback.emit();
        callback.clone().emit();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn ignore_kind_filter() {
        let filter = Filter::ignore_kind("fromCursor");
        let store = Record::new();
        assert!(!filter.allows(&store, &store, &Meta::typed("fromCursor")));
        assert!(filter.allows(&store, &store, &Meta::typed("click")));
        assert!(filter.allows(&store, &store, &Meta::none()));
    }
}
