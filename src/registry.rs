//! Unit definitions and the per-parse type registry.
//!
//! A [`Udt`] is the stored shape of one unit definition, user-declared or
//! pre-defined. The [`TypeRegistry`] maps units to definitions and answers
//! the probes the lexer needs: could a rune start a unit, and what is the
//! longest registered prefix of a word. The registry is plain per-parse
//! state; nothing here is process-global.

use std::collections::{BTreeMap, HashMap};

use crate::catalog;
use crate::scanner::classes;
use crate::value::strip_matching_quotes;

/// The definition of a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Udt {
    /// The unit glyph sequence. Never empty; never contains whitespace.
    pub unit: String,
    /// Props whose values parse as finite floats.
    pub numeric_props: BTreeMap<String, f64>,
    /// All other plain props. Keys double as modifier declarations: any
    /// string-prop key can be matched by the modifier scanner, and its value
    /// names the output field the modifier accumulates into.
    pub string_props: BTreeMap<String, String>,
    /// Props holding a rewritten single-argument function, keyed by output
    /// field name.
    pub script_props: BTreeMap<String, String>,
    /// Prop keys consumed as modifiers; suppressed when copying
    /// `string_props` into output records. Grows as instances use modifiers
    /// and persists for the rest of the parse.
    pub hidden_props: Vec<String>,
    /// True when some prop key contains `"`, which makes an unterminated
    /// quote after the unit read as a modifier rather than a value.
    pub quote_modifiers: bool,
    /// True for units with parsing behaviour of their own (`json`, `yaml`).
    pub special: bool,
}

impl Udt {
    /// A bare definition with no props.
    pub fn new(unit: impl Into<String>) -> Self {
        Udt { unit: unit.into(), ..Udt::default() }
    }

    pub(crate) fn with_string_props<const N: usize>(
        unit: &str,
        props: [(&str, &str); N],
    ) -> Self {
        let mut udt = Udt::new(unit);
        for (k, v) in props {
            udt.string_props.insert(k.to_string(), v.to_string());
        }
        udt
    }

    /// Build a definition from the raw `name:value` pairs of an inline
    /// `unit = { … }` declaration. Names and values are trimmed and
    /// unescaped, then classified:
    ///
    /// - parses as a finite float → numeric prop;
    /// - contains `=>` → single-argument arrow function, rewritten to the
    ///   named form the evaluator runs (see [`crate::script`]);
    /// - anything else → string prop, surrounding matching quotes stripped.
    pub fn from_definition(unit: &str, props: Vec<(String, String)>) -> Self {
        let mut udt = Udt::new(unit);

        for (name, value) in props {
            let name = name.trim().replace("\\:", ":").replace("\\}", "}");
            let value = value.trim().replace("\\,", ",").replace("\\}", "}");

            if name.contains('"') {
                udt.quote_modifiers = true;
            }

            if let Ok(number) = value.parse::<f64>() {
                if number.is_finite() {
                    udt.numeric_props.insert(name, number);
                    continue;
                }
            }

            if let Some(arrow) = value.find("=>") {
                let arg = value[..arrow].trim();
                let body = value[arrow + 2..].trim();
                udt.script_props.insert(name, rewrite_function(arg, body));
            } else {
                udt.string_props
                    .insert(name, strip_matching_quotes(&value).to_string());
            }
        }

        udt
    }

    /// True when `:` is a declared modifier, which flips the meaning of a
    /// `:` directly after the unit from "modifier" to "unquoted value".
    #[inline]
    pub(crate) fn allows_colon_value(&self) -> bool {
        self.string_props.contains_key(":")
    }

    #[inline]
    pub(crate) fn is_hidden(&self, key: &str) -> bool {
        self.hidden_props.iter().any(|hidden| hidden == key)
    }
}

/// Rewrite a `d => body` arrow into the named function the evaluator runs.
/// Expression bodies gain an explicit return; braced bodies are kept whole.
fn rewrite_function(arg: &str, body: &str) -> String {
    if body.starts_with('{') {
        format!("fn f({}) {}", arg, body)
    } else {
        format!("fn f({}) {{ return {}; }}", arg, body)
    }
}

/// Unit → definition mapping for one parse.
///
/// `udts` holds definitions found in the document, `pdts` the built-in and
/// imported catalogues. User definitions shadow pre-defined ones even when
/// shorter; within one table the longest matching prefix wins.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    udts: HashMap<String, Udt>,
    pdts: HashMap<String, Udt>,
}

impl TypeRegistry {
    /// A registry holding only the unconditional built-ins
    /// (`json`, `yaml`, `md`).
    pub fn new() -> Self {
        let mut registry = TypeRegistry::default();
        catalog::define_builtins(&mut registry);
        registry
    }

    /// Record a user definition, shadowing any previous unit of that name.
    pub fn define(&mut self, udt: Udt) {
        self.udts.insert(udt.unit.clone(), udt);
    }

    pub(crate) fn define_predefined(&mut self, udt: Udt) {
        self.pdts.insert(udt.unit.clone(), udt);
    }

    /// Load a named catalogue into the pre-defined table. Unknown names are
    /// ignored. Accepts `si` and `currency` (alias `money`).
    pub fn import(&mut self, collection: &str) {
        catalog::define_imported(self, collection);
    }

    /// Look a unit up, user definitions first.
    pub fn get(&self, unit: &str) -> Option<&Udt> {
        self.udts.get(unit).or_else(|| self.pdts.get(unit))
    }

    /// Mutable lookup with the same precedence as [`TypeRegistry::get`].
    pub fn get_mut(&mut self, unit: &str) -> Option<&mut Udt> {
        if self.udts.contains_key(unit) {
            self.udts.get_mut(unit)
        } else {
            self.pdts.get_mut(unit)
        }
    }

    /// Could `c` be the first rune of any registered unit?
    pub fn could_start_unit(&self, c: char) -> bool {
        let starts_with = |udt: &Udt| udt.unit.chars().next() == Some(c);
        self.udts.values().any(starts_with) || self.pdts.values().any(starts_with)
    }

    /// The longest registered unit that is a prefix of `word`. User
    /// definitions take priority over pre-defined ones even when shorter,
    /// so a document can shadow a catalogue unit.
    pub fn longest_prefix(&self, word: &str) -> Option<&str> {
        Self::longest_in(&self.udts, word).or_else(|| Self::longest_in(&self.pdts, word))
    }

    fn longest_in<'t>(table: &'t HashMap<String, Udt>, word: &str) -> Option<&'t str> {
        table
            .keys()
            .filter(|unit| word.starts_with(unit.as_str()))
            .max_by_key(|unit| unit.len())
            .map(|unit| unit.as_str())
    }

    /// True if the key is declared as a prop that should never appear as a
    /// literal key in output (a standard modifier character).
    pub(crate) fn starts_with_modifier_char(key: &str) -> bool {
        key.chars().next().is_some_and(classes::is_modifier_char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_definition_classifies_props() {
        let udt = Udt::from_definition(
            "∆",
            props(&[
                ("unit", "pizza"),
                ("length", "2"),
                ("+", "topping"),
                ("f", "d => d.length + 1"),
            ]),
        );
        assert_eq!(udt.numeric_props.get("length"), Some(&2.0));
        assert_eq!(udt.string_props.get("unit").map(String::as_str), Some("pizza"));
        assert_eq!(udt.string_props.get("+").map(String::as_str), Some("topping"));
        assert_eq!(
            udt.script_props.get("f").map(String::as_str),
            Some("fn f(d) { return d.length + 1; }")
        );
    }

    #[test]
    fn test_from_definition_unescapes_and_strips_quotes() {
        let udt = Udt::from_definition(
            "∆",
            props(&[("a\\:b", "\"quoted, value\""), ("c", "x\\,y\\}")]),
        );
        assert_eq!(
            udt.string_props.get("a:b").map(String::as_str),
            Some("quoted, value")
        );
        assert_eq!(udt.string_props.get("c").map(String::as_str), Some("x,y}"));
    }

    #[test]
    fn test_from_definition_braced_script_body() {
        let udt = Udt::from_definition("∆", props(&[("f", "d => { return d.x }")]));
        assert_eq!(
            udt.script_props.get("f").map(String::as_str),
            Some("fn f(d) { return d.x }")
        );
    }

    #[test]
    fn test_quote_modifiers_flag() {
        let udt = Udt::from_definition("∆", props(&[("\"", "note")]));
        assert!(udt.quote_modifiers);
    }

    #[test]
    fn test_non_finite_numbers_stay_strings() {
        let udt = Udt::from_definition("∆", props(&[("x", "inf"), ("y", "NaN")]));
        assert!(udt.numeric_props.is_empty());
        assert_eq!(udt.string_props.get("x").map(String::as_str), Some("inf"));
        assert_eq!(udt.string_props.get("y").map(String::as_str), Some("NaN"));
    }

    #[test]
    fn test_user_definitions_shadow_predefined() {
        let mut registry = TypeRegistry::new();
        registry.import("si");
        assert!(registry.get("W").is_some());

        registry.define(Udt::from_definition("W", props(&[("type", "watts")])));
        assert_eq!(
            registry.get("W").unwrap().string_props.get("type").map(String::as_str),
            Some("watts")
        );
        // Shorter user unit beats a longer pre-defined one.
        registry.define(Udt::new("Wx"));
        assert_eq!(registry.longest_prefix("Wb"), Some("W"));
    }

    #[test]
    fn test_longest_prefix_within_table() {
        let mut registry = TypeRegistry::new();
        registry.import("si");
        assert_eq!(registry.longest_prefix("Wb3"), Some("Wb"));
        assert_eq!(registry.longest_prefix("W3"), Some("W"));
        assert_eq!(registry.longest_prefix("zzz"), None);
    }

    #[test]
    fn test_could_start_unit() {
        let mut registry = TypeRegistry::new();
        assert!(registry.could_start_unit('j')); // json
        assert!(!registry.could_start_unit('Ω'));
        registry.import("si");
        assert!(registry.could_start_unit('Ω'));
        assert!(registry.could_start_unit('°'));
    }
}
