use crate::{Record, Value};

/// The key under which [Meta::typed()] stores its kind.
pub const META_TYPE_KEY: &str = "type";

/// Metadata attached to a [Store::dispatch_with()](crate::Store::dispatch_with()).
///
/// It carries no store semantics itself, and is only visible to the
/// [Filter](crate::Filter)s of subscriptions.
#[derive(Clone, Debug, Default)]
pub struct Meta(Record);

impl Meta {
    /// Empty metadata, used by [Store::dispatch()](crate::Store::dispatch()).
    pub fn none() -> Self {
        Self::default()
    }

    /// Metadata with its `type` set to `kind`, e.g. `Meta::typed("fromCursor")`.
    pub fn typed<S: AsRef<str>>(kind: S) -> Self {
        Self::none().with(META_TYPE_KEY, kind.as_ref())
    }

    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `type` of this metadata, if it has a string one.
    pub fn kind(&self) -> Option<&str> {
        self.get(META_TYPE_KEY).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_record(&self) -> &Record {
        &self.0
    }
}

impl From<Record> for Meta {
    fn from(record: Record) -> Self {
        Meta(record)
    }
}

#[cfg(test)]
mod tests {
    use super::Meta;

    #[test]
    fn typed_meta() {
        let meta = Meta::typed("fromCursor").with("x", 3);
        assert_eq!(meta.kind(), Some("fromCursor"));
        assert_eq!(meta.get("x").and_then(|v| v.as_int()), Some(3));
        assert!(Meta::none().kind().is_none());
        assert!(Meta::none().is_empty());
    }
}
