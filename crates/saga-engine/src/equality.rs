//! Structural equality used to match yielded effects against mapping keys.

use saga_types::Value;

/// Compares two values by content rather than identity.
///
/// Injected into the engine so callers can loosen or tighten matching
/// (e.g. ignore a volatile field) without touching the driver.
pub trait StructuralEq {
    fn equals(&self, a: &Value, b: &Value) -> bool;
}

impl<F> StructuralEq for F
where
    F: Fn(&Value, &Value) -> bool,
{
    fn equals(&self, a: &Value, b: &Value) -> bool {
        self(a, b)
    }
}

/// Default deep equality.
///
/// - records compare field-by-field, independent of key order
/// - lists compare element-by-element, in order
/// - no coercion between types: `1` never equals `"1"`, `Null` never
///   equals `Undefined`
/// - `NaN` equals `NaN`
/// - functions are equal iff name and source text are equal
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepEqual;

impl StructuralEq for DeepEqual {
    fn equals(&self, a: &Value, b: &Value) -> bool {
        deep_equal(a, b)
    }
}

fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Record(fa), Value::Record(fb)) => {
            fa.len() == fb.len()
                && fa
                    .iter()
                    .all(|(k, v)| fb.get(k).is_some_and(|v2| deep_equal(v, v2)))
        }
        (
            Value::Function { name: na, source: sa },
            Value::Function { name: nb, source: sb },
        ) => na == nb && sa == sb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eq(a: serde_json::Value, b: serde_json::Value) -> bool {
        DeepEqual.equals(&Value::from(a), &Value::from(b))
    }

    #[test]
    fn test_nested_records_by_value() {
        assert!(eq(
            json!({"CALL": {"fn": "fetch", "args": [1, {"x": 2}]}}),
            json!({"CALL": {"args": [1, {"x": 2}], "fn": "fetch"}})
        ));
        assert!(!eq(
            json!({"CALL": {"fn": "fetch", "args": [1]}}),
            json!({"CALL": {"fn": "fetch", "args": [2]}})
        ));
    }

    #[test]
    fn test_list_order_matters() {
        assert!(!eq(json!([1, 2]), json!([2, 1])));
        assert!(!eq(json!([1]), json!([1, 1])));
    }

    #[test]
    fn test_type_sensitive() {
        assert!(!eq(json!(1), json!("1")));
        assert!(!eq(json!(null), json!(false)));
        assert!(!DeepEqual.equals(&Value::Null, &Value::Undefined));
        assert!(!eq(json!({}), json!([])));
    }

    #[test]
    fn test_extra_field_not_equal() {
        assert!(!eq(json!({"a": 1}), json!({"a": 1, "b": 2})));
        assert!(!eq(json!({"a": 1, "b": 2}), json!({"a": 1})));
    }

    #[test]
    fn test_nan_equals_nan() {
        let nan = Value::Number(f64::NAN);
        assert!(DeepEqual.equals(&nan, &nan));
    }

    #[test]
    fn test_functions() {
        let a = Value::function(Some("f"), "function f() {}");
        let b = Value::function(Some("f"), "function f() {}");
        let c = Value::function(Some("g"), "function f() {}");
        assert!(DeepEqual.equals(&a, &b));
        assert!(!DeepEqual.equals(&a, &c));
    }

    #[test]
    fn test_closure_as_equality() {
        let by_type = |a: &Value, b: &Value| a.type_name() == b.type_name();
        assert!(by_type.equals(&Value::from(1), &Value::from(2)));
        assert!(!by_type.equals(&Value::from(1), &Value::from("1")));
    }
}
