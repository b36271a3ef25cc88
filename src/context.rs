use crate::{Error, Result, StoreRef};

/// The explicit handle through which connected components reach the
/// [StoreRef] of the provider above them.
///
/// A [Provider](crate::Provider) hands out a context carrying its
/// store; [Context::new()] carries none.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    store: Option<StoreRef>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: StoreRef) -> Self {
        Self { store: Some(store) }
    }

    /// The store of this context, or [Error::MissingStore].
    pub fn store(&self) -> Result<&StoreRef> {
        self.store.as_ref().ok_or(Error::MissingStore)
    }
}

#[cfg(test)]
mod tests {
    use super::Context;
    use crate::{Error, Record, StoreRef};

    #[test]
    fn empty_context_has_no_store() {
        assert_eq!(Context::new().store().err(), Some(Error::MissingStore));

        let store = StoreRef::new(Record::new());
        let context = Context::with_store(store.clone());
        assert_eq!(context.store().ok(), Some(&store));
    }
}
