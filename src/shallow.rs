//! Shallow, single level comparison of [Record]s.

use crate::Record;

/// Returns `true` if any key in the union of both records' keys maps
/// to values which are not [same](crate::Value::same()), including
/// keys present in only one of them.
pub fn changed(a: &Record, b: &Record) -> bool {
    changed_from(a, b) || b_lacks_keys_of_a(a, b)
}

/// Returns `true` if any of `next`'s keys is absent from `prev` or
/// holds a value that is not [same](crate::Value::same()) as in
/// `prev`. Keys only present in `prev` are ignored.
pub fn changed_from(prev: &Record, next: &Record) -> bool {
    next.iter().any(|(key, value)| match prev.get(key) {
        Some(prev_value) => !prev_value.same(value),
        None => true,
    })
}

/// The keys which make [changed()] return `true`, in key order.
pub fn changed_keys(a: &Record, b: &Record) -> Vec<String> {
    let mut keys: Vec<String> = a
        .iter()
        .filter(|(key, value)| match b.get(key) {
            Some(other) => !other.same(value),
            None => true,
        })
        .map(|(key, _)| key.clone())
        .collect();

    keys.extend(b.keys().filter(|key| !a.contains_key(key)).map(String::from));
    keys.sort();
    keys
}

fn b_lacks_keys_of_a(a: &Record, b: &Record) -> bool {
    a.keys().any(|key| !b.contains_key(key))
}

#[cfg(test)]
mod tests {
    use super::{changed, changed_from, changed_keys};
    use crate::{Record, Value};
    use proptest::prelude::*;

    #[test]
    fn identical_records_are_unchanged() {
        let object = Value::object(String::from("shared"));
        let a = record! { "foo" => 1, "obj" => object.clone() };
        let b = record! { "foo" => 1, "obj" => object };
        assert!(!changed(&a, &b));
        assert!(changed_keys(&a, &b).is_empty());
    }

    #[test]
    fn new_object_with_equal_contents_is_changed() {
        let a = record! { "obj" => Value::object(vec![1]) };
        let b = record! { "obj" => Value::object(vec![1]) };
        assert!(changed(&a, &b));
    }

    #[test]
    fn one_sided_keys_are_changed() {
        let a = record! { "foo" => 1 };
        let b = record! { "foo" => 1, "bar" => Value::Null };
        assert!(changed(&a, &b));
        assert!(changed(&b, &a));
        assert_eq!(changed_keys(&a, &b), vec!["bar".to_string()]);
        assert_eq!(changed_keys(&b, &a), vec!["bar".to_string()]);
    }

    #[test]
    fn changed_from_only_walks_next_keys() {
        let prev = record! { "foo" => 1, "gone" => 2 };
        let next = record! { "foo" => 1 };
        assert!(!changed_from(&prev, &next));
        assert!(changed_from(&next, &prev));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (0i64..4).prop_map(Value::from),
            prop_oneof![Just("a"), Just("b")].prop_map(Value::from),
        ]
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        proptest::collection::btree_map(
            prop_oneof![Just("k1"), Just("k2"), Just("k3"), Just("k4")],
            arb_value(),
            0..4,
        )
        .prop_map(|map| map.into_iter().collect())
    }

    // For any two flat records, `changed` holds iff some key of the
    // union differs.
    proptest! {
        #[test]
        fn prop_changed_matches_union_definition(a in arb_record(), b in arb_record()) {
            let union: Vec<&str> = a.keys().chain(b.keys()).collect();
            let expected = union.iter().any(|key| match (a.get(key), b.get(key)) {
                (Some(x), Some(y)) => !x.same(y),
                _ => true,
            });

            prop_assert_eq!(changed(&a, &b), expected);
            prop_assert_eq!(changed(&a, &b), changed(&b, &a));
            prop_assert_eq!(changed_keys(&a, &b).is_empty(), !expected);
            prop_assert!(!changed(&a, &a.clone()));
        }
    }
}
