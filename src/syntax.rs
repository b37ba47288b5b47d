//! Editor-facing emitters: classified spans, coloured preview, token dump.
//!
//! These consume the same token stream as the data emitter but keep the
//! spans the data path throws away, so editors can highlight a document and
//! users can see how their input will be interpreted before converting it.

use serde_json::json;

use crate::lexer::Lexer;
use crate::materialize;
use crate::parser::with_trailing_newline;
use crate::token::TokenKind;

/// Classify every span of `input` for syntax highlighting. Typed quantities
/// are split into quantity/unit/value sub-spans and carry their materialised
/// record under `data`; error spans carry their diagnostic under `error`.
pub fn syntax(input: &str) -> serde_json::Value {
    let source = with_trailing_newline(input);
    let mut lexer = Lexer::new(&source);
    let mut items = Vec::new();

    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::TypedQuantity => {
                let instance = match lexer.next_instance() {
                    Some(instance) => instance,
                    None => continue,
                };
                let data = materialize::typed_quantity(
                    &mut lexer.context_mut().registry,
                    &instance,
                    token.lexeme,
                );
                let (quantity, value) =
                    token.lexeme.split_once(&instance.unit).unwrap_or(("", ""));
                let spans = vec![
                    json!({ "class": "quantity", "value": quantity }),
                    json!({ "class": "unit", "value": instance.unit }),
                    json!({ "class": "value", "value": value }),
                ];
                items.push(json!({
                    "class": format!("UDT UDT-{}", instance.unit),
                    "value": spans,
                    "data": data,
                }));
            }
            TokenKind::String => items.push(classified("string", token.lexeme)),
            TokenKind::Number => items.push(classified("number", token.lexeme)),
            TokenKind::Assignment => items.push(classified("assignment", token.lexeme)),
            TokenKind::PropName => items.push(classified("propName", token.lexeme)),
            TokenKind::PropValue => items.push(classified("propValue", token.lexeme)),
            TokenKind::Bool => items.push(classified("bool", token.lexeme)),
            TokenKind::Null => items.push(classified("null", token.lexeme)),
            TokenKind::Comment => items.push(classified("comment", token.lexeme)),
            TokenKind::Error => items.push(json!({
                "class": "error",
                "value": token.lexeme,
                "error": token.message.clone().unwrap_or_default(),
            })),
            // whitespace and the rest pass through as plain text
            _ => items.push(json!(token.lexeme)),
        }
    }

    json!({ "classes": [], "items": items })
}

fn classified(class: &str, value: &str) -> serde_json::Value {
    json!({ "class": class, "value": value })
}

/// Render `input` with ANSI colours per token kind, typed quantities with
/// their unit in bold blue. Error spans come out red.
pub fn preview(input: &str) -> String {
    let source = with_trailing_newline(input);
    let mut lexer = Lexer::new(&source);
    let mut out = String::new();

    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }

        if token.kind == TokenKind::TypedQuantity {
            let unit = lexer
                .next_instance()
                .map(|instance| instance.unit)
                .unwrap_or_default();
            let (before, after) = token.lexeme.split_once(&unit).unwrap_or((token.lexeme, ""));
            out.push_str(&format!(
                "\x1b[37m{}\x1b[1m\x1b[94m{}\x1b[0m\x1b[37m{}\x1b[0m",
                before, unit, after
            ));
            continue;
        }

        let colour = match token.kind {
            TokenKind::String => "92",
            TokenKind::Number => "96",
            TokenKind::Assignment => "30",
            TokenKind::PropName => "32",
            TokenKind::PropValue => "34",
            TokenKind::Bool | TokenKind::Null => "95",
            TokenKind::Error => "91",
            TokenKind::Comment | TokenKind::Definition => "90",
            _ => "",
        };
        out.push_str(&format!("\x1b[{}m{}\x1b[0m", colour, token.lexeme));
    }

    out
}

/// Dump each token with its type name and, for typed quantities, the
/// materialised record. Diagnostic output for `--explain`.
pub fn explain(input: &str) -> String {
    let source = with_trailing_newline(input);
    let mut lexer = Lexer::new(&source);
    let mut out = String::new();

    loop {
        let token = lexer.next_token();

        let (name, show_value) = match token.kind {
            TokenKind::Space => (" space", false),
            TokenKind::Tab => (" tab", false),
            TokenKind::Newline => (" newline", false),
            TokenKind::Eof => (" EOF", false),
            TokenKind::TypedQuantity => ("\nUDT", true),
            TokenKind::String => ("\nString", true),
            TokenKind::Number => ("\nNumber", true),
            TokenKind::Definition => ("\nDefinition", true),
            TokenKind::Assignment => ("\nAssignment", true),
            TokenKind::PropName => ("\nPropName", true),
            TokenKind::PropValue => ("\nPropValue", true),
            TokenKind::Bool => ("\nBool", true),
            TokenKind::Null => ("\nNull", true),
            TokenKind::Comment => ("\nComment", true),
            TokenKind::Error => ("\nError", true),
        };

        let mut record_json = String::new();
        if token.kind == TokenKind::TypedQuantity {
            if let Some(instance) = lexer.next_instance() {
                let data = materialize::typed_quantity(
                    &mut lexer.context_mut().registry,
                    &instance,
                    token.lexeme,
                );
                record_json = serde_json::to_string(&data).unwrap_or_default();
            }
        }

        if show_value && !token.lexeme.is_empty() {
            out.push_str(&format!("{} \x1b[92m{}\x1b[0m", name, token.lexeme));
        } else {
            out.push_str(&format!("\x1b[90m{}\x1b[0m", name));
        }
        if !record_json.is_empty() {
            out.push_str(&format!(" \x1b[91m{}\x1b[0m", record_json));
        }

        if token.kind == TokenKind::Eof {
            break;
        }
    }

    out.push('\n');
    out
}
