//! The bb state machine lexer.
//!
//! The lexer is pull-based: [`Lexer::next_token`] runs states until at least
//! one token is queued, then hands tokens out in source order, ending with a
//! final [`TokenKind::Eof`]. `Lexer` also implements [`Iterator`], yielding
//! every token up to and including the Eof sentinel.
//!
//! All mutable parse state — the type registry and the typed-quantity
//! instance queue — lives in a per-parse [`ParseContext`] owned by the
//! lexer, so parses never share state and a lexer can be dropped mid-stream
//! without cleanup.
//!
//! # Examples
//!
//! ```
//! use bb::{Lexer, TokenKind};
//!
//! let mut kinds = Vec::new();
//! for token in Lexer::new("\"hi\" 42\n") {
//!     kinds.push(token.kind);
//! }
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::String,
//!         TokenKind::Space,
//!         TokenKind::Number,
//!         TokenKind::Newline,
//!         TokenKind::Eof,
//!     ]
//! );
//! ```

use std::collections::VecDeque;

use crate::error::ErrorKind;
use crate::log_debug;
use crate::registry::TypeRegistry;
use crate::scanner::{classes, Scanner};
use crate::token::{Token, TokenKind, TypedInstance};

/// Per-parse mutable state shared between the lexer and the emitters.
#[derive(Debug)]
pub struct ParseContext {
    /// The unit registry this parse resolves typed quantities against.
    pub registry: TypeRegistry,
    /// Resolved unit and modifier chain per emitted `TypedQuantity` token,
    /// in emission order.
    pub(crate) instances: VecDeque<TypedInstance>,
}

impl ParseContext {
    /// A fresh context holding only the built-in units.
    pub fn new() -> Self {
        ParseContext { registry: TypeRegistry::new(), instances: VecDeque::new() }
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The states of the machine, named for the scan they dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Bb,
    Space,
    Identifier,
    Udt,
    Number,
    Quote,
    RawQuote,
    Definition,
    Done,
}

/// The bb lexer. Create one per source text; the input is expected to end
/// with a newline (the top-level entry points in [`crate::parser`] append
/// one when missing).
pub struct Lexer<'a> {
    pub(crate) s: Scanner<'a>,
    pub(crate) ctx: ParseContext,
    state: State,
    tokens: VecDeque<Token<'a>>,
    iter_finished: bool,
}

impl<'a> Lexer<'a> {
    /// Lex `input` with a fresh [`ParseContext`].
    pub fn new(input: &'a str) -> Self {
        Self::with_context(input, ParseContext::new())
    }

    /// Lex `input` against an existing context, e.g. one with catalogues
    /// already imported.
    pub fn with_context(input: &'a str, ctx: ParseContext) -> Self {
        Lexer {
            s: Scanner::new(input),
            ctx,
            state: State::Bb,
            tokens: VecDeque::new(),
            iter_finished: false,
        }
    }

    /// The next token in source order. After the stream ends this keeps
    /// returning `Eof` tokens.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            if let Some(token) = self.tokens.pop_front() {
                return token;
            }
            if self.state == State::Done {
                return Token::new(TokenKind::Eof, "", self.s.start_line(), self.s.start());
            }
            self.step();
        }
    }

    /// The instance entry for the next unconsumed `TypedQuantity` token.
    /// Consumers pop exactly one entry per `TypedQuantity` they see.
    pub fn next_instance(&mut self) -> Option<TypedInstance> {
        self.ctx.instances.pop_front()
    }

    /// The number of typed-quantity instances waiting to be consumed.
    pub fn pending_instances(&self) -> usize {
        self.ctx.instances.len()
    }

    /// Shared parse state.
    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// Mutable access to shared parse state, e.g. for materialisation.
    pub fn context_mut(&mut self) -> &mut ParseContext {
        &mut self.ctx
    }

    fn step(&mut self) {
        self.state = match self.state {
            State::Bb => self.lex_bb(),
            State::Space => self.lex_space(),
            State::Identifier => self.lex_identifier(),
            State::Udt => self.lex_udt(),
            State::Number => self.lex_number(),
            State::Quote => self.lex_quote(),
            State::RawQuote => self.lex_raw_quote(),
            State::Definition => self.lex_definition(),
            State::Done => State::Done,
        };
    }

    pub(crate) fn emit(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.s.pending(), self.s.start_line(), self.s.start());
        self.s.ignore();
        self.tokens.push_back(token);
    }

    pub(crate) fn emit_error(&mut self, kind: ErrorKind) {
        let mut token =
            Token::new(TokenKind::Error, self.s.pending(), self.s.start_line(), self.s.start());
        token.message = Some(kind.to_string());
        self.s.ignore();
        self.tokens.push_back(token);
    }

    pub(crate) fn commit_instance(&mut self, unit: String, modifiers: Vec<(String, String)>) {
        self.ctx.instances.push_back(TypedInstance { unit, modifiers });
        self.emit(TokenKind::TypedQuantity);
    }

    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    fn lex_bb(&mut self) -> State {
        log_debug!("lexBb");
        let r = match self.s.next() {
            Some(r) => r,
            None => {
                self.emit(TokenKind::Eof);
                return State::Done;
            }
        };

        if classes::is_space(r) {
            self.s.backup();
            return State::Space;
        }
        if r == '"' {
            return State::Quote;
        }
        if r == '`' {
            return State::RawQuote;
        }
        if classes::is_numeric(r) || self.ctx.registry.could_start_unit(r) {
            self.s.backup();
            return State::Udt;
        }
        if r == '/' {
            if self.s.accept("*") {
                if let Err(kind) = self.lex_block_comment() {
                    self.emit_error(kind);
                }
                return State::Bb;
            }
            if self.s.accept("/") {
                self.lex_line_comment();
                return State::Bb;
            }
            self.s.backup();
            return State::Identifier;
        }

        // All unicode is allowed, so anything else starts a word.
        self.s.backup();
        State::Identifier
    }

    fn lex_space(&mut self) -> State {
        log_debug!("lexSpace");
        let mut units = 0usize;
        loop {
            match self.s.peek() {
                Some(' ') => {
                    self.s.next();
                    units += 1;
                }
                Some('\n') => {
                    self.s.next();
                    // indentation of the next line belongs to the newline
                    self.s.accept_run(" ");
                    self.emit(TokenKind::Newline);
                    return State::Bb;
                }
                Some(c) if classes::is_space(c) => {
                    // tabs (and stray carriage returns) count as two units
                    self.s.next();
                    units += 2;
                }
                _ => break,
            }
        }
        if units > 1 {
            self.emit(TokenKind::Tab);
        } else {
            self.emit(TokenKind::Space);
        }
        State::Bb
    }

    fn lex_identifier(&mut self) -> State {
        log_debug!("lexIdentifier");
        loop {
            match self.s.next() {
                // catch an assignment with no space before the '='
                Some(r) if r != '=' && classes::is_unit_char(r) => {}
                Some(_) => {
                    self.s.backup();
                    break;
                }
                None => break,
            }
        }

        match self.s.pending() {
            "true" | "false" => {
                self.emit(TokenKind::Bool);
                State::Bb
            }
            "null" => {
                self.emit(TokenKind::Null);
                State::Bb
            }
            _ => {
                // look ahead for an assignment
                self.s.accept_run(" ");
                if self.s.accept("=") {
                    State::Definition
                } else {
                    // any unquoted non-unit word is a string literal
                    self.emit(TokenKind::String);
                    State::Bb
                }
            }
        }
    }

    fn lex_quote(&mut self) -> State {
        log_debug!("lexQuote");
        loop {
            match self.s.next() {
                Some('\\') => match self.s.next() {
                    Some(r) if r != '\n' => {}
                    _ => {
                        self.emit_error(ErrorKind::UnterminatedString);
                        return State::Bb;
                    }
                },
                Some('\n') | None => {
                    self.emit_error(ErrorKind::UnterminatedString);
                    return State::Bb;
                }
                Some('"') => {
                    self.emit(TokenKind::String);
                    return State::Bb;
                }
                Some(_) => {}
            }
        }
    }

    fn lex_raw_quote(&mut self) -> State {
        log_debug!("lexRawQuote");
        loop {
            match self.s.next() {
                None => {
                    self.emit_error(ErrorKind::UnterminatedRawString);
                    return State::Bb;
                }
                Some('`') => {
                    self.emit(TokenKind::String);
                    return State::Bb;
                }
                Some(_) => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Scan a block comment; `/*` has been consumed. On a missing closer the
    /// rest of the input is consumed and the error is returned to the caller
    /// to report.
    pub(crate) fn lex_block_comment(&mut self) -> Result<(), ErrorKind> {
        log_debug!("lexComment");
        match self.s.rest().find("*/") {
            Some(i) => {
                self.s.seek(self.s.offset() + i + 2);
                self.emit(TokenKind::Comment);
                Ok(())
            }
            None => {
                self.s.seek(self.s.end());
                Err(ErrorKind::UnclosedComment)
            }
        }
    }

    /// Scan a `//` comment to the end of the line; `//` has been consumed.
    /// Line comments may carry an `import <collection>` directive.
    pub(crate) fn lex_line_comment(&mut self) {
        log_debug!("lexInlineComment");
        let rest = self.s.rest();
        let end = rest.find('\n').unwrap_or(rest.len());
        let content = rest[..end].trim();
        if let Some(collection) = content.strip_prefix("import ") {
            self.ctx.registry.import(&collection.trim().to_lowercase());
        }
        self.s.seek(self.s.offset() + end);
        self.emit(TokenKind::Comment);
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.iter_finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.iter_finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            kinds("true null 1.5\n"),
            vec![
                TokenKind::Bool,
                TokenKind::Space,
                TokenKind::Null,
                TokenKind::Space,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unquoted_words_are_strings() {
        // a word's assignment lookahead absorbs the spaces after it
        let tokens: Vec<_> = Lexer::new("hello ∆∆∆\n").collect();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "hello ");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].lexeme, "∆∆∆");
    }

    #[test]
    fn test_tab_versus_space() {
        assert_eq!(
            kinds("1  2\t3\n"),
            vec![
                TokenKind::Number,
                TokenKind::Tab,
                TokenKind::Number,
                TokenKind::Tab,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("1 2\n"),
            vec![
                TokenKind::Number,
                TokenKind::Space,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newline_absorbs_indentation() {
        let tokens: Vec<_> = Lexer::new("a\n   b\n").collect();
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].lexeme, "\n   ");
    }

    #[test]
    fn test_unterminated_quote_is_lenient() {
        let tokens: Vec<_> = Lexer::new("\"abc\nafter\n").collect();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert!(tokens[0].message.as_deref().unwrap().contains("unterminated"));
        // the stream continues after the error
        assert!(tokens.iter().any(|t| t.kind == TokenKind::String && t.lexeme.trim() == "after"));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_block_comment_and_unclosed_comment() {
        let tokens: Vec<_> = Lexer::new("/* note */ 1\n").collect();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].lexeme, "/* note */");

        let tokens: Vec<_> = Lexer::new("/* never closes\n").collect();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_line_comment_import_directive() {
        let mut lexer = Lexer::new("// import SI\n50g\n");
        let first = lexer.next_token();
        assert_eq!(first.kind, TokenKind::Comment);
        assert!(lexer.context().registry.get("g").is_some());
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let tokens: Vec<_> = Lexer::new(r#""a\"b""#).collect();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, r#""a\"b""#);
    }

    #[test]
    fn test_eof_repeats_after_done() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
