//! WASM bindings for bb.
//!
//! When compiled with the `wasm` feature this exposes the converter to
//! JavaScript: `convert(input)` returns a structured value, and
//! `convert_json(input)` returns the canonical JSON string. Injection-mode
//! variants take foreign source and extract the bb snippets first.

use js_sys::{Array, JsString, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::value::Value;

/// Parse a bb document and return the row as a JavaScript value.
#[wasm_bindgen]
pub fn convert(input: &str) -> JsValue {
    let row = crate::parse(input);
    let array = Array::new();
    for value in &row {
        array.push(&value_to_js(value));
    }
    array.into()
}

/// Parse a bb document and return the canonical JSON text.
///
/// # Throws
/// If the row cannot be serialised.
#[wasm_bindgen]
pub fn convert_json(input: &str) -> Result<String, JsValue> {
    let row = crate::parse(input);
    serde_json::to_string(&row)
        .map_err(|e| JsValue::from_str(&format!("serialisation failed: {}", e)))
}

/// Extract bb snippets from foreign source and convert them.
#[wasm_bindgen]
pub fn convert_injection(input: &str) -> JsValue {
    let row = crate::parse_injection(input);
    let array = Array::new();
    for value in &row {
        array.push(&value_to_js(value));
    }
    array.into()
}

/// Classify every span of the input for editor highlighting.
#[wasm_bindgen]
pub fn syntax(input: &str) -> Result<String, JsValue> {
    serde_json::to_string(&crate::syntax(input))
        .map_err(|e| JsValue::from_str(&format!("serialisation failed: {}", e)))
}

/// Convert a parsed value to a JavaScript value.
fn value_to_js(value: &Value) -> JsValue {
    match value {
        Value::Null => JsValue::NULL,

        Value::Bool(b) => JsValue::from_bool(*b),

        Value::Number(n) => JsValue::from_f64(*n),

        Value::String(s) => JsString::from(s.as_str()).into(),

        Value::List(items) => {
            let array = Array::new();
            for item in items {
                array.push(&value_to_js(item));
            }
            array.into()
        }

        Value::Record(map) => {
            let object = Object::new();
            for (key, field) in map {
                let js_key = JsString::from(key.as_str());
                Reflect::set(&object, &js_key.into(), &value_to_js(field))
                    .unwrap_or_else(|_| panic!("Failed to set record key"));
            }
            object.into()
        }
    }
}

/// Initialize function for WASM
#[wasm_bindgen]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
