//! Built-in and importable unit catalogues.
//!
//! `json`, `yaml` and `md` are always available. The SI and currency tables
//! are loaded on demand by an `// import <collection>` directive in the
//! source.

use crate::registry::{TypeRegistry, Udt};

/// symbol, long name, quantity kind
const SI_UNITS: &[(&str, &str, &str)] = &[
    ("g", "gram", "weight"),
    ("kg", "kilogram", "weight"),
    ("s", "second", "time"),
    ("min", "minute", "time"),
    ("h", "hour", "time"),
    ("d", "day", "time"),
    ("m", "metre", "length"),
    ("km", "kilometre", "length"),
    ("au", "astronomical unit", "length"),
    ("l", "litre", "volume"),
    ("K", "kelvin", "temperature"),
    ("A", "ampere", "electric current"),
    ("mol", "mole", "amount of substance"),
    ("cd", "candela", "luminous intensity"),
    ("rad", "radian", "plane angle"),
    ("sr", "steradian", "solid angle"),
    ("Hz", "hertz", "frequency"),
    ("N", "newton", "force"),
    ("Pa", "pascal", "pressure"),
    ("J", "joule", "energy"),
    ("eV", "electron volt", "energy"),
    ("W", "watt", "power"),
    ("C", "coulomb", "electric charge"),
    ("V", "volt", "voltage"),
    ("F", "farad", "capacitance"),
    ("Ω", "ohm", "resistance"),
    ("S", "siemens", "electrical conductance"),
    ("Wb", "weber", "magnetic flux"),
    ("T", "tesla", "magnetic flux density"),
    ("H", "henry", "inductance"),
    ("°C", "Celsius", "temperature"),
    ("lm", "lumen", "luminous flux"),
    ("lx", "lux", "illuminance"),
    ("Bq", "becquerel", "radioactivity"),
    ("Gy", "gray", "absorbed dose"),
    ("Sv", "sievert", "equivalent dose"),
    ("kat", "katal", "catalytic activity"),
];

/// aliases, currency name. Several symbols may name the same currency.
const CURRENCIES: &[(&[&str], &str)] = &[
    (&["$", "USD"], "United States dollar"),
    (&["£", "GBP"], "British pound"),
    (&["€", "EUR"], "Euro"),
    (&["¥", "JPY"], "Japanese yen"),
    (&["円"], "Japanese yen"),
    (&["元"], "Chinese renminbi yuan"),
    (&["₹"], "Indian rupee"),
    (&["₽", "RUB"], "Russian ruble"),
    (&["฿"], "Thai baht"),
    // crypto
    (&["₿", "BTC"], "Bitcoin"),
    (&["ETH"], "Ether"),
    (&["Ł", "LTE"], "Litecoin"),
    (&["₳", "ADA"], "Ada"),
];

/// Register the unconditional built-ins: the special pass-through units and
/// the markdown tag.
pub(crate) fn define_builtins(registry: &mut TypeRegistry) {
    let mut json = Udt::new("json");
    json.special = true;
    registry.define_predefined(json);

    let mut yaml = Udt::new("yaml");
    yaml.special = true;
    registry.define_predefined(yaml);

    registry.define_predefined(Udt::with_string_props("md", [("type", "markdown")]));
}

/// Load a named catalogue, if known. Collection names arrive lowercased.
pub(crate) fn define_imported(registry: &mut TypeRegistry, collection: &str) {
    match collection {
        "si" => {
            for &(symbol, name, kind) in SI_UNITS {
                registry.define_predefined(Udt::with_string_props(
                    symbol,
                    [("unit", name), ("type", kind)],
                ));
            }
        }
        "currency" | "money" => {
            for &(aliases, name) in CURRENCIES {
                for &alias in aliases {
                    registry.define_predefined(Udt::with_string_props(
                        alias,
                        [("unit", name), ("type", "money")],
                    ));
                }
            }
        }
        _ => {}
    }
}
