//! Integration tests for the token stream contract.
//!
//! These drive the lexer through its public API and check the stream
//! shapes, the instance bookkeeping invariant, and the leniency guarantee:
//! errors never stop the stream short of EOF.

use bb::{Lexer, TokenKind};

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input).map(|t| t.kind).collect()
}

fn data_kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
        .filter(|t| {
            !matches!(
                t.kind,
                TokenKind::Space | TokenKind::Tab | TokenKind::Newline | TokenKind::Comment
            )
        })
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_stream_always_ends_with_eof() {
    for input in ["", "1 2 3\n", "\"open", "∆ = {", "/* open", "a = 5\n"] {
        let kinds = kinds(input);
        assert_eq!(kinds.last(), Some(&TokenKind::Eof), "input {:?}", input);
        assert_eq!(
            kinds.iter().filter(|k| **k == TokenKind::Eof).count(),
            1,
            "input {:?}",
            input
        );
    }
}

#[test]
fn test_mixed_document_stream_shape() {
    assert_eq!(
        data_kinds("a = { b: c }\n1a2 \"s\" true null 7\n"),
        vec![
            TokenKind::Assignment,
            TokenKind::PropName,
            TokenKind::Assignment,
            TokenKind::PropValue,
            TokenKind::Assignment,
            TokenKind::TypedQuantity,
            TokenKind::String,
            TokenKind::Bool,
            TokenKind::Null,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_instances_match_typed_quantity_tokens() {
    let inputs = [
        "a = { b: c }\n1a2 a3b a4b5\n",
        "∆ = {+:f} ∆+++ ∆ nope 3∆\n",
        "// import si\n50g 1x 2y 3z\n",
        "∆ = {a:b}\n∆\"open\n",
    ];
    for input in inputs {
        let mut lexer = Lexer::new(input);
        let mut typed = 0;
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::TypedQuantity {
                typed += 1;
            }
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        assert_eq!(lexer.pending_instances(), typed, "input {:?}", input);
    }
}

#[test]
fn test_instances_arrive_in_emission_order() {
    let mut lexer = Lexer::new("// import si\n1g 2K 3Hz\n");
    while lexer.next_token().kind != TokenKind::Eof {}
    let units: Vec<String> = std::iter::from_fn(|| lexer.next_instance())
        .map(|i| i.unit)
        .collect();
    assert_eq!(units, vec!["g", "K", "Hz"]);
}

#[test]
fn test_longest_prefix_wins_within_a_table() {
    // `W` and `Wb` are both SI units; `Wb3` must resolve to `Wb`
    let mut lexer = Lexer::new("// import si\n3Wb2\n");
    while lexer.next_token().kind != TokenKind::Eof {}
    let instance = lexer.next_instance().expect("one instance");
    assert_eq!(instance.unit, "Wb");
}

#[test]
fn test_user_definitions_take_precedence() {
    let mut lexer = Lexer::new("// import si\nW = { t: u }\n3Wb\n");
    while lexer.next_token().kind != TokenKind::Eof {}
    let instance = lexer.next_instance().expect("one instance");
    assert_eq!(instance.unit, "W");
}

#[test]
fn test_errors_keep_the_stream_going() {
    let kinds = data_kinds("\"open\nnext `raw\nlast\n");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Error,  // unterminated quote
            TokenKind::String, // next
            TokenKind::Error,  // unterminated raw quote swallows the rest
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_error_messages_name_the_problem() {
    let messages: Vec<String> = Lexer::new("\"open\n/* block\n")
        .filter(|t| t.kind == TokenKind::Error)
        .map(|t| t.message.unwrap_or_default())
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("unterminated quoted string"));
    assert!(messages[1].contains("unclosed comment"));
}

#[test]
fn test_import_directive_is_case_insensitive_after_import() {
    let mut lexer = Lexer::new("// import Currency\n");
    while lexer.next_token().kind != TokenKind::Eof {}
    assert!(lexer.context().registry.get("€").is_some());
}

#[test]
fn test_token_positions_are_advisory_lines() {
    let tokens: Vec<_> = Lexer::new("1\n2\n3\n").collect();
    let lines: Vec<usize> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Number)
        .map(|t| t.line)
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_lexemes_reconstruct_the_source() {
    let input = "a = { b: c }\n1a2 \"s\" /* k */ true\n";
    let reconstructed: String = Lexer::new(input).map(|t| t.lexeme.to_string()).collect();
    assert_eq!(reconstructed, input);
}

#[test]
fn test_quantityless_and_valueless_forms() {
    let mut lexer = Lexer::new("∆ = {+:f}\n∆ 3∆ ∆7 3∆7\n");
    let mut lexemes = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::TypedQuantity {
            lexemes.push(token.lexeme.to_string());
        }
        if token.kind == TokenKind::Eof {
            break;
        }
    }
    assert_eq!(lexemes, vec!["∆", "3∆", "∆7", "3∆7"]);
}
