//! Environment mappings and substitute resolution.
//!
//! A mapping associates effect-shaped keys with the substitute values a saga
//! is resumed with. It comes either as an ordered list of `[key, value]`
//! pairs or as an insertion-ordered map. Lookup walks entries in order and the
//! first key structurally equal to the yielded value wins, whatever the
//! representation.

use crate::equality::{DeepEqual, StructuralEq};
use crate::error::{ensure, EngineError};
use saga_types::Value;

/// Terminal sentinel: an `Undefined` yield always resolves to `Undefined`.
static UNDEFINED: Value = Value::Undefined;

/// Insertion-ordered associative mapping from effect keys to substitutes.
///
/// Inserting a key identical to an existing one replaces its value in place;
/// any other key is appended, so two keys that are merely structurally equal
/// can coexist and the earlier one shadows the later one during lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectMap {
    entries: Vec<(Value, Value)>,
}

impl EffectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Returns the previous value for an identical key.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for EffectMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// The caller-supplied effect-to-substitute table for one engine run.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvMapping {
    /// Ordered `[key, value]` pairs. Keys may repeat.
    Pairs(Vec<(Value, Value)>),
    /// Insertion-ordered map.
    Map(EffectMap),
}

impl EnvMapping {
    /// Build a pair-list mapping.
    pub fn pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// An empty mapping. Only PUTs and `Undefined` yields can pass it.
    pub fn empty() -> Self {
        Self::Pairs(Vec::new())
    }

    /// Entries in lookup order.
    pub fn entries(&self) -> impl Iterator<Item = (&Value, &Value)> {
        let entries: &[(Value, Value)] = match self {
            Self::Pairs(pairs) => pairs,
            Self::Map(map) => &map.entries,
        };
        entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Pairs(pairs) => pairs.len(),
            Self::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries followed by the terminal `(Undefined, Undefined)` pair.
    ///
    /// Same lookup result as appending the pair to a copy of the mapping.
    pub(crate) fn effective_entries(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries().chain(std::iter::once((&UNDEFINED, &UNDEFINED)))
    }
}

impl Default for EnvMapping {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<EffectMap> for EnvMapping {
    fn from(map: EffectMap) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<(Value, Value)>> for EnvMapping {
    fn from(pairs: Vec<(Value, Value)>) -> Self {
        Self::Pairs(pairs)
    }
}

/// Accepts a nested-array value: a list whose every element is a
/// two-element list `[key, value]`.
impl TryFrom<Value> for EnvMapping {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ensure(
            is_nested_array_mapping(&value),
            "The second parameter must be a nested array or Map.",
        )?;
        let pairs = match value {
            Value::List(items) => items.into_iter().filter_map(into_pair).collect(),
            _ => Vec::new(),
        };
        Ok(Self::Pairs(pairs))
    }
}

fn into_pair(pair: Value) -> Option<(Value, Value)> {
    match pair {
        Value::List(kv) => {
            let mut kv = kv.into_iter();
            Some((kv.next()?, kv.next()?))
        }
        _ => None,
    }
}

/// True iff `value` is a list whose every element is a list of exactly two
/// items. The empty list qualifies. Strings never count as pairs, whatever
/// their length.
pub fn is_nested_array_mapping(value: &Value) -> bool {
    value.as_list().is_some_and(|items| {
        items
            .iter()
            .all(|pair| pair.as_list().is_some_and(|kv| kv.len() == 2))
    })
}

/// First substitute whose key is structurally equal to `search`.
///
/// `Some(&Value::Undefined)` means an entry explicitly maps to `Undefined`;
/// `None` means no entry matched.
pub fn resolve<'m>(
    search: &Value,
    mapping: &'m EnvMapping,
    equality: &impl StructuralEq,
) -> Option<&'m Value> {
    first_match(search, mapping.entries(), equality)
}

/// Lookup with the default deep equality; a miss yields `Undefined`.
pub fn get_next_val(search: &Value, mapping: &EnvMapping) -> Value {
    resolve(search, mapping, &DeepEqual)
        .cloned()
        .unwrap_or_default()
}

/// Lookup over the mapping plus the terminal `Undefined` sentinel.
pub(crate) fn resolve_effective<'m>(
    search: &Value,
    mapping: &'m EnvMapping,
    equality: &impl StructuralEq,
) -> Option<&'m Value> {
    first_match(search, mapping.effective_entries(), equality)
}

fn first_match<'m>(
    search: &Value,
    mut entries: impl Iterator<Item = (&'m Value, &'m Value)>,
    equality: &impl StructuralEq,
) -> Option<&'m Value> {
    entries
        .find(|(key, _)| equality.equals(key, search))
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_array_detection() {
        assert!(is_nested_array_mapping(&Value::from(json!([["a", 1], ["b", 2]]))));
        assert!(is_nested_array_mapping(&Value::from(json!([]))));
        assert!(!is_nested_array_mapping(&Value::from(json!([["a", 1, 2]]))));
        assert!(!is_nested_array_mapping(&Value::from(json!([["a"]]))));
        assert!(!is_nested_array_mapping(&Value::from(json!(["ab"]))));
        assert!(!is_nested_array_mapping(&Value::from(json!({"a": 1}))));
        assert!(!is_nested_array_mapping(&Value::Null));
        assert!(!is_nested_array_mapping(&Value::Undefined));
    }

    #[test]
    fn test_try_from_rejects_malformed() {
        let err = EnvMapping::try_from(Value::from(json!([["a", 1], ["b"]]))).unwrap_err();
        assert_eq!(
            err.assertion_message(),
            Some("The second parameter must be a nested array or Map.")
        );
    }

    #[test]
    fn test_try_from_keeps_order() {
        let mapping = EnvMapping::try_from(Value::from(json!([["a", 1], ["b", 2]]))).unwrap();
        let keys: Vec<_> = mapping.entries().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_first_match_wins() {
        let mapping = EnvMapping::pairs([("k", 1), ("k", 2)]);
        assert_eq!(resolve(&Value::from("k"), &mapping, &DeepEqual), Some(&Value::from(1)));
    }

    #[test]
    fn test_miss_and_explicit_undefined_are_distinct() {
        let mapping = EnvMapping::pairs([("k", Value::Undefined)]);
        assert_eq!(resolve(&Value::from("k"), &mapping, &DeepEqual), Some(&Value::Undefined));
        assert_eq!(resolve(&Value::from("other"), &mapping, &DeepEqual), None);
        assert_eq!(get_next_val(&Value::from("other"), &mapping), Value::Undefined);
    }

    #[test]
    fn test_effective_entries_resolve_undefined() {
        let mapping = EnvMapping::empty();
        assert_eq!(resolve(&Value::Undefined, &mapping, &DeepEqual), None);
        assert_eq!(
            resolve_effective(&Value::Undefined, &mapping, &DeepEqual),
            Some(&Value::Undefined)
        );
    }

    #[test]
    fn test_effect_map_insert_replaces_identical_key() {
        let mut map = EffectMap::new();
        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("b", 2), None);
        assert_eq!(map.insert("a", 3), Some(Value::from(1)));
        let entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![(Value::from("a"), Value::from(3)), (Value::from("b"), Value::from(2))]
        );
    }
}
