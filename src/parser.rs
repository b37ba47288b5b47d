//! The data emitter: token stream in, row of values out.
//!
//! This is the consumer side of the lexer contract. Tokens arrive in source
//! order; `TypedQuantity` tokens are materialised against the registry the
//! definition lexer has been filling in, so a definition is visible to
//! every typed quantity after it. Layout, definitions and errors carry no
//! data and are skipped.
//!
//! # Examples
//!
//! ```
//! use bb::parse;
//!
//! let row = parse("a = { b: c }\n1a2");
//! assert_eq!(serde_json::to_string(&row).unwrap(),
//!            r#"[{"b":"c","quantity":1,"value":2}]"#);
//! ```

use std::borrow::Cow;

use crate::injection;
use crate::lexer::Lexer;
use crate::materialize;
use crate::token::TokenKind;
use crate::value::{strip_matching_quotes, Row, Value};

/// Parse a bb document into its row of values.
pub fn parse(input: &str) -> Row {
    let source = with_trailing_newline(input);
    let mut lexer = Lexer::new(&source);
    emit_row(&mut lexer)
}

/// Extract `bb` snippets from a foreign-language source and parse them as
/// one document.
pub fn parse_injection(input: &str) -> Row {
    let snippets = injection::extract(input);
    parse(&snippets)
}

/// Drive a lexer to EOF, materialising as we go.
pub(crate) fn emit_row(lexer: &mut Lexer<'_>) -> Row {
    let mut row = Row::new();
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Number => row.push(Value::number_or_string(token.lexeme)),
            TokenKind::String => {
                row.push(Value::string(strip_matching_quotes(token.lexeme.trim())))
            }
            TokenKind::Bool => row.push(Value::Bool(token.lexeme == "true")),
            TokenKind::Null => row.push(Value::Null),
            TokenKind::TypedQuantity => {
                if let Some(instance) = lexer.next_instance() {
                    let value = materialize::typed_quantity(
                        &mut lexer.context_mut().registry,
                        &instance,
                        token.lexeme,
                    );
                    row.push(value);
                }
            }
            TokenKind::Eof => break,
            // layout, comments, definitions and errors carry no data
            _ => {}
        }
    }
    row
}

/// The scanner wants a trailing newline; add one when the caller's input
/// lacks it.
pub(crate) fn with_trailing_newline(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{}\n", input))
    }
}
