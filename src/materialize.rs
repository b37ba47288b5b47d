//! Materialisation of typed quantities into keyed records.
//!
//! The lexer guarantees a `TypedQuantity` lexeme is well-formed; this module
//! re-reads it against the stored definition and produces the output record:
//! quantity, primary value, accumulated modifier fields, the definition's
//! own props, and evaluated script props. The special pass-through units
//! substitute a parsed JSON or YAML tree for the record.

use crate::registry::{TypeRegistry, Udt};
use crate::scanner::classes;
use crate::script;
use crate::token::TypedInstance;
use crate::value::{strip_matching_quotes, Record, Value};

/// Materialise one typed quantity. `instance` is the entry recorded when the
/// token was emitted; `lexeme` is the token's source slice.
pub(crate) fn typed_quantity(
    registry: &mut TypeRegistry,
    instance: &TypedInstance,
    lexeme: &str,
) -> Value {
    let udt = match registry.get_mut(&instance.unit) {
        Some(udt) => udt,
        None => return Value::Null,
    };
    let special = udt.special;
    let record = build_record(udt, instance, lexeme);

    if !special {
        return Value::Record(record);
    }
    match instance.unit.as_str() {
        "json" => json_value(record),
        _ => yaml_value(record),
    }
}

fn build_record(udt: &mut Udt, instance: &TypedInstance, lexeme: &str) -> Record {
    let mut record = Record::new();

    let (quantity, tail) = match lexeme.find(&udt.unit) {
        Some(pos) => (&lexeme[..pos], &lexeme[pos + udt.unit.len()..]),
        None => ("", ""),
    };
    if !quantity.is_empty() {
        record.insert("quantity".to_string(), Value::number_or_string(quantity));
    }

    if !tail.is_empty() {
        parse_primary_value(udt, tail, &mut record);
    }

    for (modifier, raw) in &instance.modifiers {
        add_modifier(udt, &mut record, modifier, raw);
    }

    for (key, number) in &udt.numeric_props {
        record.insert(key.clone(), Value::Number(*number));
    }

    for (key, text) in &udt.string_props {
        if udt.is_hidden(key) || TypeRegistry::starts_with_modifier_char(key) {
            continue;
        }
        record.insert(key.clone(), Value::string(text.clone()));
    }

    // scripts run against the record built so far, earlier results included
    for (key, source) in &udt.script_props {
        let result = script::run_script(source, &record);
        record.insert(key.clone(), result);
    }

    record
}

/// The value directly after the unit: quoted, `:`-introduced (for units
/// declaring `:` as a modifier), or numeric.
fn parse_primary_value(udt: &Udt, tail: &str, record: &mut Record) {
    let first = match tail.chars().next() {
        Some(c) => c,
        None => return,
    };

    if classes::is_quote_char(first) {
        let inner_start = first.len_utf8();
        let mut end = None;
        let mut runes = tail[inner_start..].char_indices().peekable();
        while let Some((i, c)) = runes.next() {
            if c == first {
                end = Some(inner_start + i);
                break;
            }
            if c == '\\' {
                if let Some(&(_, next)) = runes.peek() {
                    if next == first {
                        runes.next();
                    }
                }
            }
        }
        // No closing quote means the quote was a modifier (quote-modifier
        // units), so there is no value.
        if let Some(end) = end {
            record.insert(
                "value".to_string(),
                Value::string(tail[inner_start..end].to_string()),
            );
        }
    } else if first == ':' && udt.allows_colon_value() {
        // unquoted value: the rest of the lexeme, escapes kept
        record.insert(
            "value".to_string(),
            Value::string(tail[first.len_utf8()..].to_string()),
        );
    } else if classes::is_numeric(first) {
        let mut end = 0;
        let mut is_decimal = false;
        for (i, c) in tail.char_indices() {
            if c == '-' {
                if i != 0 {
                    break;
                }
            } else if c == '.' {
                if is_decimal {
                    break;
                }
                is_decimal = true;
            } else if !c.is_numeric() {
                break;
            }
            end = i + c.len_utf8();
        }
        let value = &tail[..end];
        if value != "-" && value != "." {
            record.insert("value".to_string(), Value::number_or_string(value));
        }
    }
}

/// Fold one `(modifier, raw value)` pair into the record under the field
/// the definition names for it. Empty values read as `true`; repeats turn
/// the field into a list. The modifier key itself is hidden from prop
/// copying for the rest of the parse.
fn add_modifier(udt: &mut Udt, record: &mut Record, modifier: &str, raw: &str) {
    udt.hidden_props.push(modifier.to_string());
    let field = match udt.string_props.get(modifier) {
        Some(field) => field.clone(),
        None => return,
    };

    let value = if raw.is_empty() {
        Value::Bool(true)
    } else {
        let stripped = strip_matching_quotes(raw);
        match stripped.parse::<f64>() {
            Ok(number) => Value::Number(number),
            Err(_) => Value::string(stripped.to_string()),
        }
    };

    match record.get_mut(&field) {
        Some(Value::List(list)) => list.push(value),
        Some(existing) => {
            let previous = std::mem::take(existing);
            *existing = Value::List(vec![previous, value]);
        }
        None => {
            record.insert(field, value);
        }
    }
}

fn json_value(mut record: Record) -> Value {
    match record.get("value").cloned() {
        Some(Value::String(text)) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(parsed) => Value::from_json(parsed),
            Err(_) => {
                record.insert("value".to_string(), Value::Null);
                Value::Record(record)
            }
        },
        Some(other) => other,
        None => {
            record.insert("value".to_string(), Value::Null);
            Value::Record(record)
        }
    }
}

fn yaml_value(mut record: Record) -> Value {
    match record.get("value").cloned() {
        Some(Value::String(text)) => match serde_yaml::from_str::<serde_yaml::Value>(&text) {
            Ok(parsed) => Value::from_yaml(parsed),
            Err(_) => {
                record.insert("value".to_string(), Value::Null);
                Value::Record(record)
            }
        },
        Some(_) => Value::Record(record),
        None => {
            record.insert("value".to_string(), Value::Null);
            Value::Record(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TypedInstance;

    fn instance(unit: &str, modifiers: &[(&str, &str)]) -> TypedInstance {
        TypedInstance {
            unit: unit.to_string(),
            modifiers: modifiers
                .iter()
                .map(|(m, v)| (m.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn registry_with(unit: &str, props: &[(&str, &str)]) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.define(Udt::from_definition(
            unit,
            props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        ));
        registry
    }

    #[test]
    fn test_quantity_and_value() {
        let mut registry = registry_with("a", &[("b", "c")]);
        let value = typed_quantity(&mut registry, &instance("a", &[]), "1a2");
        assert_eq!(value.get("quantity"), Some(&Value::Number(1.0)));
        assert_eq!(value.get("value"), Some(&Value::Number(2.0)));
        assert_eq!(value.get("b"), Some(&Value::string("c")));
    }

    #[test]
    fn test_modifier_hides_prop_for_rest_of_parse() {
        let mut registry = registry_with("a", &[("b", "c")]);
        let first = typed_quantity(&mut registry, &instance("a", &[("b", "")]), "a3");
        assert_eq!(first.get("c"), Some(&Value::Bool(true)));
        assert_eq!(first.get("b"), None);

        // the prop stays hidden for later instances
        let second = typed_quantity(&mut registry, &instance("a", &[]), "a");
        assert_eq!(second.get("b"), None);
    }

    #[test]
    fn test_repeated_modifiers_become_lists() {
        let mut registry = registry_with("∆", &[("+", "f")]);
        let value = typed_quantity(
            &mut registry,
            &instance("∆", &[("+", "3"), ("+", "\"b\"")]),
            "∆+3+\"b\"",
        );
        assert_eq!(
            value.get("f"),
            Some(&Value::List(vec![Value::Number(3.0), Value::string("b")]))
        );
    }

    #[test]
    fn test_empty_modifier_values_are_true() {
        let mut registry = registry_with("∆", &[("+", "f")]);
        let value = typed_quantity(
            &mut registry,
            &instance("∆", &[("+", ""), ("+", ""), ("+", "")]),
            "∆+++",
        );
        assert_eq!(
            value.get("f"),
            Some(&Value::List(vec![
                Value::Bool(true),
                Value::Bool(true),
                Value::Bool(true)
            ]))
        );
    }

    #[test]
    fn test_quoted_value_with_escapes() {
        let mut registry = registry_with("∆", &[("x", "y")]);
        let value = typed_quantity(&mut registry, &instance("∆", &[]), r#"∆"a\"b""#);
        assert_eq!(value.get("value"), Some(&Value::string(r#"a\"b"#)));
    }

    #[test]
    fn test_invalid_quantity_kept_as_string() {
        let mut registry = registry_with("a", &[("b", "c")]);
        let value = typed_quantity(&mut registry, &instance("a", &[]), "1.0.0a");
        assert_eq!(value.get("quantity"), Some(&Value::string("1.0.0")));
    }

    #[test]
    fn test_json_special_unit() {
        let mut registry = TypeRegistry::new();
        let value = typed_quantity(
            &mut registry,
            &instance("json", &[]),
            "json`{\"a\": [1, 2]}`",
        );
        assert_eq!(
            value.get("a"),
            Some(&Value::List(vec![Value::Number(1.0), Value::Number(2.0)]))
        );
    }

    #[test]
    fn test_json_without_value_is_null_record() {
        let mut registry = TypeRegistry::new();
        let value = typed_quantity(&mut registry, &instance("json", &[]), "json");
        assert_eq!(value.get("value"), Some(&Value::Null));
    }

    #[test]
    fn test_yaml_special_unit() {
        let mut registry = TypeRegistry::new();
        let value = typed_quantity(&mut registry, &instance("yaml", &[]), "yaml`a: 1`");
        assert_eq!(value.get("a"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_md_is_a_plain_tag() {
        let mut registry = TypeRegistry::new();
        let value = typed_quantity(&mut registry, &instance("md", &[]), "md\"# hi\"");
        assert_eq!(value.get("type"), Some(&Value::string("markdown")));
        assert_eq!(value.get("value"), Some(&Value::string("# hi")));
    }

    #[test]
    fn test_script_props_see_modifier_fields() {
        let mut registry = registry_with("∆", &[("g", "g"), ("f", "d =>d.value+d.g")]);
        let value = typed_quantity(&mut registry, &instance("∆", &[("g", "3")]), "∆1g3");
        assert_eq!(value.get("f"), Some(&Value::Number(4.0)));
        assert_eq!(value.get("g"), Some(&Value::Number(3.0)));
        assert_eq!(value.get("value"), Some(&Value::Number(1.0)));
    }
}
