//! Effect classification.
//!
//! A PUT effect is a record carrying the `"PUT"` marker key; what the key
//! maps to is irrelevant. A batched PUT is a non-empty list whose every
//! element is a PUT effect. PUTs are recorded by the engine and never need a
//! mapping entry.

use saga_types::{Value, PUT_KEY};

/// Tagged view of a yielded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect<'a> {
    /// The saga yielded nothing.
    Undefined,
    /// A single PUT; carries the payload stored under the marker key.
    Put(&'a Value),
    /// A batch of PUTs, e.g. from an `all` combinator.
    BatchedPut(&'a [Value]),
    /// Any other effect. Needs a substitute from the mapping.
    Other(&'a Value),
}

impl<'a> Effect<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Undefined => Self::Undefined,
            Value::Record(fields) => match fields.get(PUT_KEY) {
                Some(payload) => Self::Put(payload),
                None => Self::Other(value),
            },
            Value::List(items) if is_batched_put(items) => Self::BatchedPut(items),
            _ => Self::Other(value),
        }
    }

    /// Single or batched PUT.
    pub fn is_put(&self) -> bool {
        matches!(self, Self::Put(_) | Self::BatchedPut(_))
    }
}

/// True iff `value` is a record whose keys include `"PUT"`.
pub fn is_put_effect(value: &Value) -> bool {
    matches!(value, Value::Record(fields) if fields.contains_key(PUT_KEY))
}

/// True iff `value` is a non-empty list of PUT effects.
pub fn is_nested_put_effect(value: &Value) -> bool {
    value.as_list().is_some_and(is_batched_put)
}

fn is_batched_put(items: &[Value]) -> bool {
    // Empty lists would pass `all` vacuously.
    !items.is_empty() && items.iter().all(is_put_effect)
}
