//! Embedded evaluation of definition functions.
//!
//! Definition props written as single-argument arrow functions
//! (`f: d => d.value + d.g`) are rewritten at definition time into a named
//! function (see [`Udt::from_definition`]) and evaluated here against each
//! materialised record. Every call runs in a fresh engine and scope, so no
//! state leaks between records.
//!
//! The original notation promised JavaScript expression semantics, so the
//! few coercions its documents rely on are registered as `+` overloads:
//! string/array concatenation joins elements with commas, integral floats
//! print without a fractional part, and arithmetic over missing properties
//! yields NaN. NaN results and every failure mode degrade to null.
//!
//! [`Udt::from_definition`]: crate::registry::Udt::from_definition

use rhai::{Array, Dynamic, Engine, ImmutableString, Map, Scope};

use crate::log_debug;
use crate::value::{Record, Value};

/// Run a rewritten definition function against a record. The record binds
/// to the function's single argument. Returns null on any failure.
pub fn run_script(source: &str, datum: &Record) -> Value {
    let engine = script_engine();

    let ast = match engine.compile(source) {
        Ok(ast) => ast,
        Err(err) => {
            log_debug!("script compile failed: {}", err);
            return Value::Null;
        }
    };

    let mut scope = Scope::new();
    let arg = value_to_dynamic(&Value::Record(datum.clone()));

    match engine.call_fn::<Dynamic>(&mut scope, &ast, "f", (arg,)) {
        Ok(result) => dynamic_to_value(result),
        Err(err) => {
            log_debug!("script call failed: {}", err);
            Value::Null
        }
    }
}

/// An engine with the JavaScript-flavoured `+` coercions registered.
fn script_engine() -> Engine {
    let mut engine = Engine::new();

    engine.register_fn("+", |a: ImmutableString, b: Array| format!("{}{}", a, js_join(&b)));
    engine.register_fn("+", |a: Array, b: ImmutableString| format!("{}{}", js_join(&a), b));
    engine.register_fn("+", |a: Array, b: Array| format!("{}{}", js_join(&a), js_join(&b)));
    engine.register_fn("+", |a: ImmutableString, b: f64| format!("{}{}", a, js_number(b)));
    engine.register_fn("+", |a: f64, b: ImmutableString| format!("{}{}", js_number(a), b));
    engine.register_fn("+", |a: f64, b: Array| format!("{}{}", js_number(a), js_join(&b)));
    engine.register_fn("+", |a: Array, b: f64| format!("{}{}", js_join(&a), js_number(b)));
    engine.register_fn("+", |a: ImmutableString, _: ()| format!("{}undefined", a));
    engine.register_fn("+", |_: (), a: ImmutableString| format!("undefined{}", a));
    engine.register_fn("+", |_: (), _: ()| f64::NAN);
    engine.register_fn("+", |_: f64, _: ()| f64::NAN);
    engine.register_fn("+", |_: (), _: f64| f64::NAN);

    engine
}

fn value_to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => (*n).into(),
        Value::String(s) => s.as_str().into(),
        Value::List(items) => {
            Dynamic::from_array(items.iter().map(value_to_dynamic).collect())
        }
        Value::Record(map) => {
            let mut object = Map::new();
            for (key, field) in map {
                object.insert(key.as_str().into(), value_to_dynamic(field));
            }
            Dynamic::from_map(object)
        }
    }
}

fn dynamic_to_value(d: Dynamic) -> Value {
    if d.is_unit() {
        Value::Null
    } else if let Ok(b) = d.as_bool() {
        Value::Bool(b)
    } else if let Ok(i) = d.as_int() {
        Value::Number(i as f64)
    } else if let Ok(f) = d.as_float() {
        if f.is_nan() {
            Value::Null
        } else {
            Value::Number(f)
        }
    } else if let Some(s) = d.clone().try_cast::<ImmutableString>() {
        Value::String(s.to_string())
    } else if let Some(items) = d.clone().try_cast::<Array>() {
        Value::List(items.into_iter().map(dynamic_to_value).collect())
    } else if let Some(map) = d.try_cast::<Map>() {
        Value::Record(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), dynamic_to_value(v)))
                .collect(),
        )
    } else {
        Value::Null
    }
}

/// JavaScript number-to-string: integral values print without a fraction,
/// `-0` prints as `0`.
fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 9.007_199_254_740_992e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// JavaScript array-to-string: elements joined with commas, nulls empty,
/// nested arrays flattened by the same rule.
fn js_join(array: &Array) -> String {
    let parts: Vec<String> = array.iter().map(js_element).collect();
    parts.join(",")
}

fn js_element(d: &Dynamic) -> String {
    if d.is_unit() {
        String::new()
    } else if let Ok(b) = d.as_bool() {
        b.to_string()
    } else if let Ok(i) = d.as_int() {
        i.to_string()
    } else if let Ok(f) = d.as_float() {
        js_number(f)
    } else if let Some(s) = d.clone().try_cast::<ImmutableString>() {
        s.to_string()
    } else if let Some(inner) = d.clone().try_cast::<Array>() {
        js_join(&inner)
    } else if d.is_map() {
        "[object Object]".to_string()
    } else {
        d.to_string()
    }
}
